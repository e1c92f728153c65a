//! Ordered token extraction

use tw_shared::config::ParserSpec;

use super::extractor::TokenExtractor;
use super::reader::RequestReader;

/// Ordered list of extractors; the first non-empty result wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserChain {
    extractors: Vec<TokenExtractor>,
}

impl ParserChain {
    pub fn new(extractors: Vec<TokenExtractor>) -> Self {
        Self { extractors }
    }

    /// Chain used when none is configured:
    ///
    /// 1. `Authorization: Bearer <token>` header
    /// 2. `token` query parameter
    /// 3. `token` body field
    /// 4. `token` cookie
    pub fn default_chain() -> Self {
        Self::new(vec![
            TokenExtractor::authorization_header(),
            TokenExtractor::query("token"),
            TokenExtractor::body("token"),
            TokenExtractor::cookie("token"),
        ])
    }

    /// Build from configuration; an empty list yields the default chain
    pub fn from_specs(specs: &[ParserSpec]) -> Self {
        if specs.is_empty() {
            return Self::default_chain();
        }
        Self::new(specs.iter().map(TokenExtractor::from).collect())
    }

    pub fn extractors(&self) -> &[TokenExtractor] {
        &self.extractors
    }

    /// First token found in the request
    pub fn extract<R: RequestReader + ?Sized>(&self, request: &R) -> Option<String> {
        self.extractors
            .iter()
            .find_map(|extractor| extractor.extract(request))
    }
}

impl Default for ParserChain {
    fn default() -> Self {
        Self::default_chain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::request::SimpleRequest;

    #[test]
    fn test_header_wins_over_query() {
        let chain = ParserChain::new(vec![
            TokenExtractor::authorization_header(),
            TokenExtractor::query("token"),
        ]);
        let request = SimpleRequest::new()
            .with_header("Authorization", "Bearer H")
            .with_query("token", "Q");

        assert_eq!(chain.extract(&request), Some("H".to_string()));
    }

    #[test]
    fn test_falls_through_to_later_extractors() {
        let chain = ParserChain::default_chain();
        let request = SimpleRequest::new()
            .with_header("Authorization", "Basic creds")
            .with_cookie("token", "C");

        assert_eq!(chain.extract(&request), Some("C".to_string()));
    }

    #[test]
    fn test_nothing_found() {
        let chain = ParserChain::default();
        assert_eq!(chain.extract(&SimpleRequest::new()), None);
    }

    #[test]
    fn test_from_specs() {
        let chain = ParserChain::from_specs(&[ParserSpec::Query {
            name: "access_token".to_string(),
        }]);
        assert_eq!(chain.extractors(), &[TokenExtractor::query("access_token")]);

        assert_eq!(ParserChain::from_specs(&[]), ParserChain::default_chain());
    }
}
