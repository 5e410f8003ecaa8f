//! GraphQL API with subscriptions for real-time updates
//!
//! This module provides the single API surface of the backend using
//! async-graphql: queries, mutations, and subscriptions over WebSocket.
//! Queries and mutations live in per-domain modules merged into the roots
//! via `MergedObject`.

pub mod auth;
pub mod errors;
mod helpers;
pub mod mutations;
pub mod queries;
mod schema;
mod subscriptions;
pub mod types;

pub use auth::{AuthExt, AuthUser};
pub use schema::{BibliothecaSchema, build_schema};
