//! Prometheus metrics endpoint.
//!
//! # Responsibilities
//! - Bind the metrics listener (failure is fatal to the daemon)
//! - Serve `GET /metrics` in Prometheus text format
//! - Copy a counter snapshot into the recorder on every scrape
//!
//! # Design Decisions
//! - Local recorder, not the global one: nothing else can register metrics into it
//! - Read-only: the exporter never mutates daemon state

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{extract::State, http::header, response::IntoResponse, routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::observability::metrics::{
    DaemonCounters, ERROR_COUNTER, HANDLING_GAUGE, PENDING_GAUGE, SUBMITTED_COUNTER,
};

/// State injected into the metrics handler.
#[derive(Clone)]
pub struct ExporterState {
    counters: Arc<DaemonCounters>,
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl ExporterState {
    pub fn new(counters: Arc<DaemonCounters>) -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            metrics::describe_gauge!(HANDLING_GAUGE, "Number of requests currently being handled");
            metrics::describe_gauge!(PENDING_GAUGE, "Number of requests currently pending for submission");
            metrics::describe_counter!(ERROR_COUNTER, "Number of request errors since last restart");
            metrics::describe_counter!(SUBMITTED_COUNTER, "Number of requests submitted since last restart");
        });

        Self {
            counters,
            recorder: Arc::new(recorder),
            handle,
        }
    }

    /// Render the current counter values.
    pub fn render(&self) -> String {
        let snap = self.counters.snapshot();
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            metrics::gauge!(HANDLING_GAUGE).set(snap.handling as f64);
            metrics::gauge!(PENDING_GAUGE).set(snap.pending as f64);
            metrics::counter!(ERROR_COUNTER).absolute(snap.error_count.max(0) as u64);
            metrics::counter!(SUBMITTED_COUNTER).absolute(snap.submitted_count.max(0) as u64);
        });
        self.handle.render()
    }
}

/// Build the exporter router.
pub fn router(counters: Arc<DaemonCounters>) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .with_state(ExporterState::new(counters))
        .layer(TraceLayer::new_for_http())
}

async fn get_metrics(State(state): State<ExporterState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.render(),
    )
}

/// A bound, not yet serving, metrics endpoint.
pub struct MetricsExporter {
    listener: TcpListener,
    counters: Arc<DaemonCounters>,
}

impl MetricsExporter {
    /// Bind the listener. An error here means metrics cannot be served at all.
    pub async fn bind(addr: &str, counters: Arc<DaemonCounters>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, counters })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve until the shutdown signal fires.
    pub async fn serve(self, mut shutdown: broadcast::Receiver<()>) -> std::io::Result<()> {
        let addr = self.listener.local_addr()?;
        tracing::info!(address = %addr, "Metrics endpoint listening");

        axum::serve(self.listener, router(self.counters))
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Metrics endpoint received shutdown signal");
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::metrics::MetricsSink;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_metrics_route_renders_counters() {
        let counters = Arc::new(DaemonCounters::new());
        counters.record_error();
        counters.record_error();
        counters.record_submitted();
        counters.set_pending(1);

        let response = router(counters)
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("price_requester_requests_error_total 2"));
        assert!(text.contains("price_requester_requests_submitted_total 1"));
        assert!(text.contains("price_requester_requests_pending_count 1"));
        assert!(text.contains("price_requester_requests_handling_count 0"));
    }

    #[tokio::test]
    async fn test_render_follows_counters() {
        let counters = Arc::new(DaemonCounters::new());
        let state = ExporterState::new(counters.clone());
        assert!(state.render().contains("price_requester_requests_error_total 0"));

        counters.record_error();
        assert!(state.render().contains("price_requester_requests_error_total 1"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let response = router(Arc::new(DaemonCounters::new()))
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
