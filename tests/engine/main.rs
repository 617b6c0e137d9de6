//! Integration tests for Layer 3: Engine
//!
//! Tests for the mapping model, rule compilation, and inference runs.

mod fixtures;
mod inference;
mod models;
mod templates;
