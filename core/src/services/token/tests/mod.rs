//! Tests for token services
