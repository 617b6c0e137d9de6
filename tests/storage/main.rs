//! Integration tests for Layer 1: Storage
//!
//! Tests for graphs, union views, the schema oracle, and class membership.

mod graphs;
mod membership;
mod views;
