use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

pub const PREFLIGHT_METHOD: &str = "OPTIONS";

pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "authorization, x-client-info, apikey, content-type",
    ),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
];

/// One inbound call as handed over by the hosting runtime.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct InboundRequest {
    #[serde(alias = "httpMethod")]
    pub method: String,

    #[serde(
        default,
        rename = "queryStringParameters",
        alias = "queryParams",
        skip_serializing_if = "Option::is_none"
    )]
    pub query_params: Option<HashMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl InboundRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            query_params: None,
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_preflight(&self) -> bool {
        self.method.eq_ignore_ascii_case(PREFLIGHT_METHOD)
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query_params
            .as_ref()
            .and_then(|params| params.get(key))
            .map(String::as_str)
    }
}

/// The single response produced for an invocation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl OutboundResponse {
    /// Response carrying the CORS headers and nothing else yet.
    pub(crate) fn with_cors(status_code: u16, body: String) -> Self {
        let headers = CORS_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self {
            status_code,
            headers,
            body,
        }
    }

    pub(crate) fn content_type(mut self, content_type: &str) -> Self {
        self.headers
            .insert("Content-Type".to_string(), content_type.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
