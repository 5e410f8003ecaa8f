//! Backend services shared by the GraphQL layer

pub mod auth;
pub mod events;

pub use auth::{AuthConfig, AuthService, TokenClaims};
pub use events::{BookAddedEvent, EventBus, EventBusConfig};
