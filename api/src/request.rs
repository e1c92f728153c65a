//! Actix adapter for the core request reader

use std::collections::HashMap;

use actix_web::{http::header::CONTENT_TYPE, web, HttpRequest};
use tw_core::services::request::{ParsedBody, RequestReader};

/// [`RequestReader`] over an actix `HttpRequest`
///
/// Query parameters and cookies are parsed once up front. The body is only
/// available to handlers that buffered it and attached it with
/// [`ActixRequestReader::with_body`].
pub struct ActixRequestReader<'a> {
    request: &'a HttpRequest,
    query: HashMap<String, String>,
    cookies: HashMap<String, String>,
    body: Option<ParsedBody>,
}

impl<'a> ActixRequestReader<'a> {
    pub fn new(request: &'a HttpRequest) -> Self {
        let query = web::Query::<HashMap<String, String>>::from_query(request.query_string())
            .map(web::Query::into_inner)
            .unwrap_or_default();

        let cookies: HashMap<String, String> = request
            .cookies()
            .map(|cookies| {
                cookies
                    .iter()
                    .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            request,
            query,
            cookies,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Option<ParsedBody>) -> Self {
        self.body = body;
        self
    }
}

impl RequestReader for ActixRequestReader<'_> {
    fn header(&self, name: &str) -> Option<&str> {
        self.request.headers().get(name)?.to_str().ok()
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

/// Parse a buffered JSON or urlencoded body according to its content type
pub fn parse_body(request: &HttpRequest, bytes: &[u8]) -> Option<ParsedBody> {
    if bytes.is_empty() {
        return None;
    }

    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        serde_json::from_slice(bytes).ok().map(ParsedBody::Json)
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let text = std::str::from_utf8(bytes).ok()?;
        web::Query::<HashMap<String, String>>::from_query(text)
            .ok()
            .map(|form| ParsedBody::Form(form.into_inner()))
    } else {
        None
    }
}
