//! Read-only view of an inbound request

use std::collections::HashMap;

use serde_json::Value;

/// Parsed request body
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedBody {
    /// `application/x-www-form-urlencoded` fields
    Form(HashMap<String, String>),
    /// JSON document
    Json(Value),
}

impl ParsedBody {
    /// String field of a form or of a top-level JSON object
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            ParsedBody::Form(fields) => fields.get(name).map(String::as_str),
            ParsedBody::Json(value) => value.get(name).and_then(Value::as_str),
        }
    }
}

/// Access to the parts of a request a token may be carried in
pub trait RequestReader {
    /// Header value by case-insensitive name
    fn header(&self, name: &str) -> Option<&str>;

    fn query_param(&self, name: &str) -> Option<&str>;

    fn cookie(&self, name: &str) -> Option<&str>;

    fn body(&self) -> Option<&ParsedBody>;
}

/// In-memory request, used by non-HTTP callers and tests
#[derive(Debug, Clone, Default)]
pub struct SimpleRequest {
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
    cookies: HashMap<String, String>,
    body: Option<ParsedBody>,
}

impl SimpleRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: ParsedBody) -> Self {
        self.body = Some(body);
        self
    }
}

impl RequestReader for SimpleRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn body(&self) -> Option<&ParsedBody> {
        self.body.as_ref()
    }
}
