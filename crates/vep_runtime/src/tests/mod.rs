//! Tests for the VEP runtime
//!
//! Unit tests for the endpoint caller plus integration tests that spin up a
//! JavaScript runtime with the extension installed.

mod runtime_integration;
