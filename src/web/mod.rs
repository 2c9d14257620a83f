//! Web module - HTTP routing and the dashboard surface

pub mod handlers;
mod page;
mod session;
mod upload;

pub use upload::UploadStore;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tracing::warn;

use crate::charts::{ChartError, ChartPlotter};
use crate::data::DataLoader;
use crate::stats::{Summary, SummaryCalculator};
use page::{render_dashboard, PageContext};

/// Default request body limit (16 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Shared, read-only handles used by every request.
#[derive(Clone)]
pub struct AppState {
    pub loader: Arc<DataLoader>,
    pub uploads: Arc<UploadStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(loader: DataLoader, uploads: UploadStore, max_upload_bytes: usize) -> Self {
        Self {
            loader: Arc::new(loader),
            uploads: Arc::new(uploads),
            max_upload_bytes,
        }
    }

    /// Load the session's source and reduce it to a summary.
    pub fn summary_for(&self, source: Option<&str>) -> Summary {
        let table = self.loader.load(source);
        SummaryCalculator::aggregate(&table)
    }

    /// Full dashboard page for a source.
    pub fn dashboard(&self, source: Option<&str>) -> String {
        let summary = self.summary_for(source);
        let ctx = PageContext {
            source,
            category_chart: chart_or_nothing(ChartPlotter::category_bar_chart(&summary)),
            time_series_chart: chart_or_nothing(ChartPlotter::time_series_chart(&summary)),
        };
        render_dashboard(&summary, &ctx)
    }

    /// [`AppState::summary_for`] on the blocking pool.
    ///
    /// CSV parsing and aggregation are synchronous and must not stall the
    /// async workers.
    pub async fn summary(&self, source: Option<String>) -> Summary {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.summary_for(source.as_deref()))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "summary task failed, using empty summary");
                Summary::empty()
            })
    }

    /// [`AppState::dashboard`] on the blocking pool.
    pub async fn dashboard_page(&self, source: Option<String>) -> String {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.dashboard(source.as_deref()))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "dashboard task failed, rendering empty page");
                render_dashboard(&Summary::empty(), &PageContext::default())
            })
    }
}

fn chart_or_nothing(chart: Result<Option<String>, ChartError>) -> Option<String> {
    chart.unwrap_or_else(|e| {
        warn!(error = %e, "chart omitted");
        None
    })
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::upload))
        .route("/api/data", get(handlers::api_data))
        .route("/healthz", get(handlers::healthz))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}
