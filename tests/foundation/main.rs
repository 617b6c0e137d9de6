//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Term, Triple, ValueType, Error.

mod errors;
