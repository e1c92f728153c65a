//! Tests for domain entities

#[cfg(test)]
mod claims_tests;
