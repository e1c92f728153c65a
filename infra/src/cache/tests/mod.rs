//! Unit tests for cache backends
