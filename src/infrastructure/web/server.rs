use crate::infrastructure::observability::render;
use crate::infrastructure::web::landing::LandingPage;
use anyhow::{Context, Result};
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use prometheus::Registry;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    registry: Registry,
    landing: Arc<LandingPage>,
}

/// Routes `/` to the landing page and `metrics_path` to the registry.
pub fn router(registry: Registry, landing: LandingPage, metrics_path: &str) -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route(metrics_path, get(metrics))
        .with_state(AppState {
            registry,
            landing: Arc::new(landing),
        })
}

async fn landing_page(State(state): State<AppState>) -> Html<String> {
    Html(state.landing.html().to_string())
}

async fn metrics(State(state): State<AppState>) -> Response {
    // Gathering runs the status command, which blocks until it exits.
    let registry = state.registry.clone();
    match tokio::task::spawn_blocking(move || render(&registry)).await {
        Ok(Ok(body)) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Ok(Err(err)) => {
            error!(error = %format!("{:#}", err), "Error encoding metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error encoding metrics").into_response()
        }
        Err(err) => {
            error!(error = %err, "Metrics gathering task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Error gathering metrics").into_response()
        }
    }
}

/// Serves `router` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = listener.local_addr().context("Listener has no local address")?;
    info!(listen = %addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{IntGauge, Opts};

    fn state() -> AppState {
        let registry = Registry::new();
        let gauge = IntGauge::with_opts(Opts::new("test_handler_gauge", "test")).unwrap();
        gauge.set(7);
        registry.register(Box::new(gauge)).unwrap();

        AppState {
            registry,
            landing: Arc::new(LandingPage::for_exporter("/metrics").unwrap()),
        }
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_metrics_handler_renders_registry() {
        tokio_test::block_on(async {
            let response = metrics(State(state())).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                response.headers()[header::CONTENT_TYPE],
                prometheus::TEXT_FORMAT
            );
            assert!(body_text(response).await.contains("test_handler_gauge 7"));
        });
    }

    #[test]
    fn test_landing_handler_returns_html() {
        tokio_test::block_on(async {
            let Html(body) = landing_page(State(state())).await;
            assert!(body.contains("href=\"/metrics\""));
        });
    }
}
