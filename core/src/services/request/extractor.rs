//! Single-source token extractors

use tw_shared::config::ParserSpec;

use super::reader::RequestReader;

/// Where to look for a token in a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenExtractor {
    /// `<prefix> <token>` in the named header
    Header { name: String, prefix: String },
    /// Named query parameter
    Query { name: String },
    /// Named cookie
    Cookie { name: String },
    /// Named field of a form or JSON body
    Body { name: String },
}

impl TokenExtractor {
    /// `Authorization: Bearer <token>`
    pub fn authorization_header() -> Self {
        TokenExtractor::Header {
            name: "Authorization".to_string(),
            prefix: "Bearer".to_string(),
        }
    }

    pub fn query(name: impl Into<String>) -> Self {
        TokenExtractor::Query { name: name.into() }
    }

    pub fn cookie(name: impl Into<String>) -> Self {
        TokenExtractor::Cookie { name: name.into() }
    }

    pub fn body(name: impl Into<String>) -> Self {
        TokenExtractor::Body { name: name.into() }
    }

    /// Pull a token out of the request. Values are trimmed and whitespace-only
    /// values count as absent.
    pub fn extract<R: RequestReader + ?Sized>(&self, request: &R) -> Option<String> {
        let value = match self {
            TokenExtractor::Header { name, prefix } => {
                strip_scheme(request.header(name)?, prefix)?
            }
            TokenExtractor::Query { name } => request.query_param(name)?,
            TokenExtractor::Cookie { name } => request.cookie(name)?,
            TokenExtractor::Body { name } => request.body()?.field(name)?,
        };

        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

impl From<&ParserSpec> for TokenExtractor {
    fn from(spec: &ParserSpec) -> Self {
        match spec {
            ParserSpec::Header { name, prefix } => TokenExtractor::Header {
                name: name.clone(),
                prefix: prefix.clone(),
            },
            ParserSpec::Query { name } => TokenExtractor::query(name.clone()),
            ParserSpec::Cookie { name } => TokenExtractor::cookie(name.clone()),
            ParserSpec::Body { name } => TokenExtractor::body(name.clone()),
        }
    }
}

/// Strip `<prefix> ` (case-insensitive prefix, exactly one space) from a
/// header value. An empty prefix accepts the raw value.
fn strip_scheme<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(value);
    }

    let scheme = value.get(..prefix.len())?;
    if !scheme.eq_ignore_ascii_case(prefix) {
        return None;
    }

    let rest = value[prefix.len()..].strip_prefix(' ')?;
    if rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::request::{ParsedBody, SimpleRequest};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_header_requires_prefix_and_single_space() {
        let extractor = TokenExtractor::authorization_header();

        let request = SimpleRequest::new().with_header("Authorization", "Bearer abc.def.ghi");
        assert_eq!(extractor.extract(&request), Some("abc.def.ghi".to_string()));

        let request = SimpleRequest::new().with_header("authorization", "bearer abc");
        assert_eq!(extractor.extract(&request), Some("abc".to_string()));

        let request = SimpleRequest::new().with_header("Authorization", "Bearer  abc");
        assert_eq!(extractor.extract(&request), None);

        let request = SimpleRequest::new().with_header("Authorization", "Basic abc");
        assert_eq!(extractor.extract(&request), None);

        let request = SimpleRequest::new().with_header("Authorization", "Bearerabc");
        assert_eq!(extractor.extract(&request), None);
    }

    #[test]
    fn test_custom_header_without_prefix() {
        let extractor = TokenExtractor::Header {
            name: "X-Api-Token".to_string(),
            prefix: String::new(),
        };
        let request = SimpleRequest::new().with_header("X-Api-Token", " raw-token ");
        assert_eq!(extractor.extract(&request), Some("raw-token".to_string()));
    }

    #[test]
    fn test_whitespace_only_values_are_absent() {
        let request = SimpleRequest::new()
            .with_query("token", "   ")
            .with_cookie("token", "");
        assert_eq!(TokenExtractor::query("token").extract(&request), None);
        assert_eq!(TokenExtractor::cookie("token").extract(&request), None);
    }

    #[test]
    fn test_body_form_and_json() {
        let mut form = HashMap::new();
        form.insert("token".to_string(), "from-form".to_string());
        let request = SimpleRequest::new().with_body(ParsedBody::Form(form));
        assert_eq!(
            TokenExtractor::body("token").extract(&request),
            Some("from-form".to_string())
        );

        let request = SimpleRequest::new().with_body(ParsedBody::Json(json!({"token": "from-json"})));
        assert_eq!(
            TokenExtractor::body("token").extract(&request),
            Some("from-json".to_string())
        );

        let request = SimpleRequest::new().with_body(ParsedBody::Json(json!({"token": 42})));
        assert_eq!(TokenExtractor::body("token").extract(&request), None);
    }

    #[test]
    fn test_from_parser_spec() {
        let spec = ParserSpec::Cookie {
            name: "session".to_string(),
        };
        assert_eq!(TokenExtractor::from(&spec), TokenExtractor::cookie("session"));
    }
}
