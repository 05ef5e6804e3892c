//! Adapter implementations (hexagonal architecture)
//!
//! Adapters implement port traits with concrete technology.

pub mod duckdb;
