//! Token extraction from inbound requests
//!
//! A [`ParserChain`] tries each [`TokenExtractor`] in order against a
//! [`RequestReader`] and returns the first non-empty credential.

mod chain;
mod extractor;
mod reader;

pub use chain::ParserChain;
pub use extractor::TokenExtractor;
pub use reader::{ParsedBody, RequestReader, SimpleRequest};
