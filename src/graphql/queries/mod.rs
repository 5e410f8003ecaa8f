//! GraphQL queries, grouped by domain

pub mod catalog;
pub mod user;

pub use catalog::CatalogQueries;
pub use user::UserQueries;
