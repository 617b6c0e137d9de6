//! Cross-layer integration tests for Ontobridge
//!
//! End-to-end mapping runs from schema and source data to a derived target
//! graph, through every layer.

mod scenarios;
