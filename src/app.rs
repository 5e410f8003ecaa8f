//! Application state and HTTP router construction
//!
//! The router exposes GraphiQL and the query/mutation endpoint on /graphql
//! and the subscription WebSocket on /graphql/ws. Authentication context is
//! derived here, once per request: the bearer token (if any) is verified and
//! the referenced user resolved before the operation executes.

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLProtocol, GraphQLRequest, GraphQLResponse, GraphQLWebSocket};
use axum::Router;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Database;
use crate::graphql::{AuthUser, BibliothecaSchema};
use crate::services::{AuthService, EventBus};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Database,
    pub schema: BibliothecaSchema,
    pub auth: Arc<AuthService>,
    pub events: Arc<EventBus>,
}

/// Build the full Axum router: /graphql, /graphql/ws, CORS and trace layers
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/graphql/ws", get(graphql_ws_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Strip a case-insensitive "bearer " prefix from the Authorization header.
/// A missing header, or one without the prefix, means an anonymous caller.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_at_checked(7)?;
    if !scheme.eq_ignore_ascii_case("bearer ") {
        return None;
    }
    Some(token.to_string())
}

/// Verify a bearer token and resolve it to an identity.
///
/// `Ok(Some(_))`: valid token referencing an existing user.
/// `Ok(None)`: valid token whose user no longer exists; downstream
/// credential checks treat the caller as anonymous.
/// `Err(_)`: invalid or malformed token; the whole request fails.
async fn resolve_identity(
    auth: &AuthService,
    db: &Database,
    token: &str,
) -> async_graphql::Result<Option<AuthUser>> {
    let claims = auth.verify_token(token).map_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
        crate::graphql::errors::unauthorized("Invalid token")
    })?;

    let user = db
        .users()
        .get_by_id(&claims.id)
        .await
        .map_err(crate::graphql::errors::storage)?;

    Ok(user.map(AuthUser::from))
}

fn error_response(err: async_graphql::Error) -> GraphQLResponse {
    let server_error = err.into_server_error(async_graphql::Pos::default());
    async_graphql::Response::from_errors(vec![server_error]).into()
}

async fn graphiql() -> impl IntoResponse {
    axum::response::Html(
        GraphiQLSource::build()
            .endpoint("/graphql")
            .subscription_endpoint("/graphql/ws")
            .finish(),
    )
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(token) = extract_token(&headers) {
        match resolve_identity(&state.auth, &state.db, &token).await {
            Ok(Some(user)) => {
                tracing::debug!(username = %user.username, "Authenticated request");
                request = request.data(user);
            }
            Ok(None) => {
                tracing::debug!("Token user no longer exists, treating as anonymous");
            }
            Err(err) => return error_response(err),
        }
    }

    state.schema.execute(request).await.into()
}

async fn graphql_ws_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    protocol: GraphQLProtocol,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    // Headers are available at upgrade time; the connection_init payload is
    // checked as well because browser WebSocket clients cannot set headers
    let header_user = match extract_token(&headers) {
        Some(token) => resolve_identity(&state.auth, &state.db, &token)
            .await
            .ok()
            .flatten(),
        None => None,
    };

    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .on_upgrade(move |socket| {
            let mut ws = GraphQLWebSocket::new(socket, state.schema.clone(), protocol);
            if let Some(user) = header_user {
                let mut data = async_graphql::Data::default();
                data.insert(user);
                ws = ws.with_data(data);
            }
            let auth = state.auth.clone();
            let db = state.db.clone();
            ws.on_connection_init(move |params| {
                let auth = auth.clone();
                let db = db.clone();
                async move {
                    let mut data = async_graphql::Data::default();
                    if let Some(raw) = params
                        .get("Authorization")
                        .or_else(|| params.get("authorization"))
                        .and_then(|v| v.as_str())
                    {
                        let token = match raw.split_at_checked(7) {
                            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer ") => rest,
                            _ => raw,
                        };
                        if let Some(user) = resolve_identity(&auth, &db, token).await? {
                            data.insert(user);
                        }
                    }
                    Ok(data)
                }
            })
            .serve()
        })
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_prefix_is_case_insensitive() {
        assert_eq!(
            extract_token(&headers_with("Bearer abc.def")),
            Some("abc.def".to_string())
        );
        assert_eq!(
            extract_token(&headers_with("bearer abc.def")),
            Some("abc.def".to_string())
        );
        assert_eq!(
            extract_token(&headers_with("BEARER abc.def")),
            Some("abc.def".to_string())
        );
    }

    #[test]
    fn non_bearer_headers_yield_anonymous() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
        assert_eq!(extract_token(&headers_with("Basic abc")), None);
        assert_eq!(extract_token(&headers_with("bearer")), None);
    }
}
