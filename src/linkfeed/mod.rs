#![allow(clippy::needless_for_each)]

use crate::linkfeed::{
    handlers::{auth, health, posts, types},
    storage::{PgStore, Store},
    token::TokenService,
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    middleware,
    routing::{get, post, put},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

pub mod credentials;
pub mod error;
pub mod guard;
pub(crate) mod handlers;
pub mod ownership;
pub mod storage;
pub mod token;

/// Immutable state shared by every request.
pub struct AppState {
    tokens: TokenService,
    store: Arc<dyn Store>,
}

impl AppState {
    #[must_use]
    pub fn new(tokens: TokenService, store: Arc<dyn Store>) -> Self {
        Self { tokens, store }
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::signup,
        auth::login,
        posts::list_posts,
        posts::create_post,
        posts::update_post,
        posts::delete_post,
    ),
    components(schemas(
        health::Health,
        types::SignupRequest,
        types::LoginRequest,
        types::UserResponse,
        types::AuthResponse,
        types::PostRequest,
        types::PostResponse,
        types::PostEnvelope,
        types::PostListResponse,
        types::MessageResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Signup and login"),
        (name = "posts", description = "Feed posts, bearer token required"),
        (name = "health", description = "Service health")
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router around `state`.
///
/// All `/api/posts` routes are wrapped by the auth guard.
pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    let protected = Router::new()
        .route(
            "/api/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/api/posts/:id",
            put(handlers::update_post).delete(handlers::delete_post),
        )
        .route_layer(middleware::from_fn(guard::auth_guard));

    Router::new()
        .route("/", get(handlers::root))
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
        .route("/health", get(handlers::health).options(handlers::health))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(state)),
        )
}

/// CORS for the browser client: an exact origin when configured, any otherwise.
///
/// # Errors
/// Returns an error if `origin` is not a URL with a host.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    match origin {
        Some(origin) => Ok(cors.allow_origin(AllowOrigin::exact(frontend_origin(origin)?))),
        None => Ok(cors.allow_origin(Any)),
    }
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    dsn: &str,
    tokens: TokenService,
    cors_origin: Option<&str>,
) -> Result<()> {
    let store = PgStore::connect(dsn).await?;

    store
        .apply_schema()
        .await
        .context("Failed to apply database schema")?;

    let state = Arc::new(AppState::new(tokens, Arc::new(store)));

    let app = router(state, cors_layer(cors_origin)?);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid CORS origin: {frontend_base_url}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("CORS origin must include a valid host: {frontend_base_url}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build CORS origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_origin_strips_path_and_keeps_port() -> Result<()> {
        let origin = frontend_origin("http://localhost:3000/feed?x=1")?;
        assert_eq!(origin, HeaderValue::from_static("http://localhost:3000"));
        Ok(())
    }

    #[test]
    fn frontend_origin_rejects_hostless_urls() {
        assert!(frontend_origin("not a url").is_err());
        assert!(frontend_origin("mailto:a@x.com").is_err());
    }

    #[test]
    fn openapi_documents_every_route() {
        let doc = openapi();
        for path in [
            "/health",
            "/api/auth/signup",
            "/api/auth/login",
            "/api/posts",
            "/api/posts/{id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemes = doc
            .components
            .as_ref()
            .map(|components| components.security_schemes.contains_key("bearer"));
        assert_eq!(schemes, Some(true));
    }
}
