//! Data-driven partner request/response mapping.
//!
//! Partners carrying a mapping schema are called through templates instead
//! of code: the request side is a JSON document whose strings may contain
//! `{{dot.path}}` placeholders resolved against the orchestration context,
//! the response side names dot-paths into the partner's JSON reply for the
//! handful of fields this core understands.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingSchema {
    pub request: Option<RequestTemplate>,
    #[serde(default)]
    pub response_mapping: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestTemplate {
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: Value,
    #[serde(default)]
    pub body: Value,
}

fn default_method() -> String {
    "POST".to_string()
}

/// Fully substituted outbound request, ready for an HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedRequest {
    pub url: String,
    pub method: String,
    pub headers: Value,
    pub body: Value,
}

/// The fields a partner response can surface, extracted by dot-path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappedResponse {
    pub payment_url: Option<String>,
    pub virtual_account: Option<String>,
    pub qr_data: Option<String>,
    pub partner_transaction_id: Option<String>,
}

impl MappingSchema {
    pub fn parse(raw: &Value) -> Option<Self> {
        serde_json::from_value(raw.clone()).ok()
    }

    /// A schema only drives the partner call when it has a request section.
    pub fn has_request(&self) -> bool {
        self.request.is_some()
    }
}

/// Walk `value` at `path` (`a.b.c`), returning the node if every segment
/// resolves through an object.
fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// String form used for substitution. Strings are inlined bare, everything
/// else through its JSON rendering.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Replace every `{{dot.path}}` occurrence in `template` with the context
/// value at that path. Total by design: an unresolved path substitutes the
/// empty string rather than failing, trading silent omission for
/// availability.
fn substitute_str(template: &str, context: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                out.push_str(&rest[..start]);
                let path = after[..end].trim();
                if let Some(value) = lookup_path(context, path) {
                    out.push_str(&stringify(value));
                }
                rest = &after[end + 2..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Recursive transform over the template document: strings are substituted,
/// arrays and objects walked, scalars passed through.
fn substitute(template: &Value, context: &Value) -> Value {
    match template {
        Value::String(s) => Value::String(substitute_str(s, context)),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| substitute(item, context)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute(v, context)))
                .collect(),
        ),
        other => other.clone(),
    }
}

pub fn build_request(schema: &RequestTemplate, context: &Value) -> MappedRequest {
    MappedRequest {
        url: substitute_str(&schema.url, context),
        method: schema.method.clone(),
        headers: substitute(&schema.headers, context),
        body: substitute(&schema.body, context),
    }
}

pub fn parse_response(schema: &MappingSchema, response_body: &Value) -> MappedResponse {
    let extract = |field: &str| {
        schema
            .response_mapping
            .get(field)
            .and_then(|path| lookup_path(response_body, path))
            .map(stringify)
    };

    MappedResponse {
        payment_url: extract("payment_url"),
        virtual_account: extract("virtual_account"),
        qr_data: extract("qr_data"),
        partner_transaction_id: extract("partner_transaction_id"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_substitution() {
        let template = RequestTemplate {
            url: "https://x/{{transaction_id}}".to_string(),
            method: "POST".to_string(),
            headers: Value::Null,
            body: Value::Null,
        };
        let context = json!({"transaction_id": "TRX1"});
        let request = build_request(&template, &context);
        assert_eq!(request.url, "https://x/TRX1");
    }

    #[test]
    fn test_nested_body_and_headers_substitution() {
        let template = RequestTemplate {
            url: "https://partner.test/charge".to_string(),
            method: "POST".to_string(),
            headers: json!({"Authorization": "Bearer {{credentials.api_key}}"}),
            body: json!({
                "order": {"id": "{{transaction_id}}", "total": "{{amount}}"},
                "items": ["{{customer.name}}", "fixed"]
            }),
        };
        let context = json!({
            "transaction_id": "TRX9",
            "amount": 50000,
            "credentials": {"api_key": "sk-test"},
            "customer": {"name": "Budi"}
        });
        let request = build_request(&template, &context);
        assert_eq!(
            request.headers,
            json!({"Authorization": "Bearer sk-test"})
        );
        assert_eq!(
            request.body,
            json!({
                "order": {"id": "TRX9", "total": "50000"},
                "items": ["Budi", "fixed"]
            })
        );
    }

    #[test]
    fn test_missing_path_substitutes_empty_string() {
        let context = json!({"transaction_id": "TRX1"});
        let out = substitute_str("ref={{nope.deep.path}};id={{transaction_id}}", &context);
        assert_eq!(out, "ref=;id=TRX1");
    }

    #[test]
    fn test_unterminated_placeholder_left_as_is() {
        let context = json!({});
        assert_eq!(substitute_str("hello {{world", &context), "hello {{world");
    }

    #[test]
    fn test_parse_response_extracts_mapped_fields() {
        let schema = MappingSchema {
            request: None,
            response_mapping: BTreeMap::from([
                ("payment_url".to_string(), "data.url".to_string()),
                ("partner_transaction_id".to_string(), "data.id".to_string()),
            ]),
        };
        let body = json!({"data": {"url": "https://pay", "id": 12345}});
        let mapped = parse_response(&schema, &body);
        assert_eq!(mapped.payment_url.as_deref(), Some("https://pay"));
        assert_eq!(mapped.partner_transaction_id.as_deref(), Some("12345"));
        assert_eq!(mapped.virtual_account, None);
        assert_eq!(mapped.qr_data, None);
    }

    #[test]
    fn test_parse_response_absent_path_yields_absent_field() {
        let schema = MappingSchema {
            request: None,
            response_mapping: BTreeMap::from([(
                "virtual_account".to_string(),
                "va.number".to_string(),
            )]),
        };
        let mapped = parse_response(&schema, &json!({"status": "ok"}));
        assert_eq!(mapped.virtual_account, None);
    }

    #[test]
    fn test_schema_parse_defaults_method_to_post() {
        let raw = json!({
            "request": {"url": "https://p.test", "body": {"id": "{{transaction_id}}"}},
            "response_mapping": {"payment_url": "redirect_url"}
        });
        let schema = MappingSchema::parse(&raw).unwrap();
        assert!(schema.has_request());
        assert_eq!(schema.request.unwrap().method, "POST");
    }
}
