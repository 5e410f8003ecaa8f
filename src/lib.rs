//! Bibliotheca - GraphQL gateway for a library catalog
//!
//! The binary in `main.rs` wires these modules together; integration tests
//! build the schema directly against an in-memory database.

pub mod app;
pub mod config;
pub mod db;
pub mod graphql;
pub mod services;
