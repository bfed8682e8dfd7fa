//! Partner dispatch: how payment affordances come into existence.
//!
//! Partners with a mapping schema are driven entirely by configuration
//! (`PartnerKind::Dynamic`); the rest fall back to built-in generators per
//! partner kind.

use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::AppError;
use crate::mapping::{self, MappingSchema};
use crate::services::retry::RetryPolicy;

#[derive(Debug, Clone)]
pub enum PartnerKind {
    EWallet,
    BankVa,
    Gateway,
    Generic,
    /// Schema-driven partner call. Selected whenever a mapping schema with a
    /// request section is present, regardless of the stored kind string.
    Dynamic(MappingSchema),
}

impl PartnerKind {
    pub fn resolve(kind: &str, mapping_schema: Option<&Value>) -> Self {
        if let Some(schema) = mapping_schema.and_then(MappingSchema::parse) {
            if schema.has_request() {
                return PartnerKind::Dynamic(schema);
            }
        }
        match kind {
            "EWALLET" => PartnerKind::EWallet,
            "BANK_VA" => PartnerKind::BankVa,
            "PAYMENT_GATEWAY" => PartnerKind::Gateway,
            _ => PartnerKind::Generic,
        }
    }
}

/// Normalized output of a partner interaction, promoted onto the
/// transaction row and kept verbatim in `payment_data`.
#[derive(Debug, Clone, Default)]
pub struct PaymentAffordances {
    pub partner_transaction_id: Option<String>,
    pub payment_url: Option<String>,
    pub virtual_account: Option<String>,
    pub qr_data: Option<String>,
    pub deeplink: Option<String>,
    pub instructions: Option<Vec<String>>,
    pub raw: Value,
}

/// Inputs the generators need beyond the schema context itself.
pub struct PartnerContext<'a> {
    pub transaction_id: &'a str,
    pub partner_code: &'a str,
    pub customer_name: Option<&'a str>,
    pub public_base_url: &'a str,
}

fn bank_prefix(partner_code: &str) -> &'static str {
    match partner_code {
        "BCA_VA" => "39012",
        "BNI_VA" => "88123",
        "BRI_VA" => "90234",
        "MANDIRI_VA" => "45678",
        _ => "99999",
    }
}

fn bank_name(partner_code: &str) -> &'static str {
    match partner_code {
        "BCA_VA" => "BCA",
        "BNI_VA" => "BNI",
        "BRI_VA" => "BRI",
        "MANDIRI_VA" => "Mandiri",
        _ => "Bank",
    }
}

/// Bank prefix plus a random 10-digit suffix.
fn generate_va_number(partner_code: &str) -> String {
    let suffix = Uuid::new_v4().as_u128() % 10_000_000_000;
    format!("{}{:010}", bank_prefix(partner_code), suffix)
}

fn external_id(prefix: &str) -> String {
    format!("{}{}", prefix, chrono::Utc::now().timestamp_millis())
}

/// Built-in affordance generation for partners without a mapping schema.
pub fn built_in_affordances(kind: &PartnerKind, ctx: &PartnerContext<'_>) -> PaymentAffordances {
    let mut affordances = match kind {
        PartnerKind::EWallet => {
            let code = ctx.partner_code.to_lowercase();
            PaymentAffordances {
                partner_transaction_id: Some(external_id("EW")),
                payment_url: Some(format!(
                    "{}/api/payments/pay-simulate/{}",
                    ctx.public_base_url, ctx.transaction_id
                )),
                deeplink: Some(format!("{}://payment/{}", code, ctx.transaction_id)),
                ..Default::default()
            }
        }
        PartnerKind::BankVa => {
            let va_number = generate_va_number(ctx.partner_code);
            let instructions = vec![
                format!("Transfer ke VA: {}", va_number),
                format!("Bank: {}", bank_name(ctx.partner_code)),
                format!("A/N: {}", ctx.customer_name.unwrap_or("Customer")),
            ];
            PaymentAffordances {
                partner_transaction_id: Some(external_id("VA")),
                virtual_account: Some(va_number),
                instructions: Some(instructions),
                ..Default::default()
            }
        }
        PartnerKind::Gateway => PaymentAffordances {
            partner_transaction_id: Some(external_id("PG")),
            payment_url: Some(format!(
                "https://payment.example.com/pay/{}",
                ctx.transaction_id
            )),
            qr_data: Some(format!(
                "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data={}",
                ctx.transaction_id
            )),
            ..Default::default()
        },
        PartnerKind::Generic => PaymentAffordances {
            partner_transaction_id: Some(external_id("TX")),
            payment_url: Some(format!(
                "https://payment.example.com/pay/{}",
                ctx.transaction_id
            )),
            ..Default::default()
        },
        // Dynamic partners never reach the built-in path.
        PartnerKind::Dynamic(_) => PaymentAffordances::default(),
    };

    affordances.raw = json!({
        "partner_transaction_id": affordances.partner_transaction_id,
        "payment_url": affordances.payment_url,
        "virtual_account": affordances.virtual_account,
        "qr_data": affordances.qr_data,
        "deeplink": affordances.deeplink,
        "instructions": affordances.instructions,
    });
    affordances
}

/// Schema-driven partner call: build the mapped request, perform it under
/// the retry policy, extract the mapped response fields.
pub async fn dynamic_affordances(
    client: &reqwest::Client,
    schema: &MappingSchema,
    context: &Value,
    retry: &RetryPolicy,
) -> Result<PaymentAffordances, AppError> {
    let template = schema
        .request
        .as_ref()
        .ok_or_else(|| AppError::Internal("dynamic partner without request template".into()))?;
    let request = mapping::build_request(template, context);

    let response_body: Value = retry
        .run(|| {
            let mut builder = match request.method.to_uppercase().as_str() {
                "GET" => client.get(&request.url),
                "PUT" => client.put(&request.url),
                _ => client.post(&request.url),
            };
            if let Some(headers) = request.headers.as_object() {
                for (name, value) in headers {
                    if let Some(v) = value.as_str() {
                        builder = builder.header(name.as_str(), v);
                    }
                }
            }
            if !request.body.is_null() {
                builder = builder.json(&request.body);
            }

            async move {
                let response = builder
                    .send()
                    .await
                    .map_err(|e| AppError::PartnerApi(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(AppError::PartnerApi(format!(
                        "partner returned {}",
                        status
                    )));
                }
                response
                    .json::<Value>()
                    .await
                    .map_err(|e| AppError::PartnerApi(format!("invalid partner response: {}", e)))
            }
        })
        .await?;

    let mapped = mapping::parse_response(schema, &response_body);
    Ok(PaymentAffordances {
        partner_transaction_id: mapped.partner_transaction_id,
        payment_url: mapped.payment_url,
        virtual_account: mapped.virtual_account,
        qr_data: mapped.qr_data,
        deeplink: None,
        instructions: None,
        raw: response_body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(partner_code: &'a str, transaction_id: &'a str) -> PartnerContext<'a> {
        PartnerContext {
            transaction_id,
            partner_code,
            customer_name: Some("Budi"),
            public_base_url: "http://localhost:3000",
        }
    }

    #[test]
    fn test_resolve_prefers_dynamic_over_kind() {
        let schema = json!({
            "request": {"url": "https://p.test/charge"},
            "response_mapping": {}
        });
        let kind = PartnerKind::resolve("EWALLET", Some(&schema));
        assert!(matches!(kind, PartnerKind::Dynamic(_)));
    }

    #[test]
    fn test_resolve_ignores_schema_without_request() {
        let schema = json!({"response_mapping": {"payment_url": "url"}});
        let kind = PartnerKind::resolve("BANK_VA", Some(&schema));
        assert!(matches!(kind, PartnerKind::BankVa));
    }

    #[test]
    fn test_unknown_kind_falls_back_to_generic() {
        assert!(matches!(
            PartnerKind::resolve("QRIS", None),
            PartnerKind::Generic
        ));
    }

    #[test]
    fn test_bank_va_number_shape() {
        let affordances = built_in_affordances(&PartnerKind::BankVa, &ctx("BCA_VA", "TRX1"));
        let va = affordances.virtual_account.unwrap();
        assert_eq!(va.len(), 15);
        assert!(va.starts_with("39012"));
        assert!(va.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_unknown_bank_gets_fallback_prefix() {
        let affordances = built_in_affordances(&PartnerKind::BankVa, &ctx("PERMATA_VA", "TRX1"));
        assert!(affordances.virtual_account.unwrap().starts_with("99999"));
    }

    #[test]
    fn test_bank_va_instructions_name_customer() {
        let affordances = built_in_affordances(&PartnerKind::BankVa, &ctx("BNI_VA", "TRX1"));
        let instructions = affordances.instructions.unwrap();
        assert_eq!(instructions.len(), 3);
        assert!(instructions[1].contains("BNI"));
        assert!(instructions[2].contains("Budi"));
    }

    #[test]
    fn test_ewallet_points_at_simulate_link() {
        let affordances = built_in_affordances(&PartnerKind::EWallet, &ctx("GOPAY", "TRX7"));
        let url = affordances.payment_url.unwrap();
        assert_eq!(url, "http://localhost:3000/api/payments/pay-simulate/TRX7");
        assert_eq!(affordances.deeplink.as_deref(), Some("gopay://payment/TRX7"));
    }

    #[test]
    fn test_gateway_emits_payment_and_qr_urls() {
        let affordances = built_in_affordances(&PartnerKind::Gateway, &ctx("MIDTRANS", "TRX3"));
        assert!(affordances.payment_url.unwrap().ends_with("/pay/TRX3"));
        assert!(affordances.qr_data.unwrap().contains("data=TRX3"));
    }

    #[test]
    fn test_generic_has_url_only() {
        let affordances = built_in_affordances(&PartnerKind::Generic, &ctx("OTHER", "TRX4"));
        assert!(affordances.payment_url.is_some());
        assert!(affordances.virtual_account.is_none());
        assert!(affordances.qr_data.is_none());
    }
}
