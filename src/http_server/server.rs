use super::config::HttpServerConfig;
use super::student_routes::health_routes;
use super::student_routes::student_routes;
use super::student_routes::RosterState;
use axum::http::HeaderValue;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::AllowOrigin;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn with_config(config: HttpServerConfig, state: Arc<RosterState>) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Health check at the root, student endpoints under `/api/students`.
    pub fn build_router(config: &HttpServerConfig, state: Arc<RosterState>) -> Router {
        Router::new()
            .merge(health_routes())
            .nest("/api/students", student_routes(state))
            .layer(cors_layer(&config.cors_origins))
            .layer(TraceLayer::new_for_http())
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        info!(addr = %listener.local_addr()?, "roster HTTP server listening");
        axum::serve(listener, self.router).await
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::StudentStore;
    use crate::service::RosterService;
    use crate::validation::ErrorPolicy;
    use axum::body::Body;
    use axum::http::header;
    use axum::http::Request;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn state() -> Arc<RosterState> {
        let service = RosterService::new(StudentStore::open_in_memory().unwrap(), ErrorPolicy::default());
        Arc::new(RosterState::new(service, 1024))
    }

    #[test]
    fn server_uses_configured_address() {
        let server = HttpServer::with_config(HttpServerConfig::with_port(9090), state());
        assert_eq!(server.socket_addr(), "0.0.0.0:9090");
    }

    #[tokio::test]
    async fn health_check() {
        let router = HttpServer::with_config(HttpServerConfig::default(), state()).router();
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn configured_origin_is_allowed() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:5173".to_string()],
            ..Default::default()
        };
        let router = HttpServer::build_router(&config, state());
        let response = router
            .oneshot(
                Request::get("/health")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
    }
}
