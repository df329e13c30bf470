//! HTTP surface - thin request controller
//!
//! Wires selection and export requests to the store, the model builder and
//! the two renderers. Holds no report state of its own: each request builds
//! a fresh `ReportModel` and discards it after rendering.

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use std::fmt::Write as _;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::report::charts::escape_xml;
use crate::report::convert::ExportError;
use crate::report::document::DocumentRenderer;
use crate::report::interactive::render_fragment;
use crate::report::model::build_report;
use crate::store::{CourseStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CourseStore>,
    pub renderer: Arc<DocumentRenderer>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/report/{class}", get(report_fragment))
        .route("/export/{class}", get(export_document))
        .route("/health", get(health_check))
        .route("/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Stats endpoint - returns basic server information
async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let stats = serde_json::json!({
        "status": "running",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "records": state.store.len(),
        "classes": state.store.class_names().len(),
    });
    (StatusCode::OK, stats.to_string())
}

/// Selection page: course dropdown defaulting to the first class, with that
/// class's report server-rendered into the target on initial load.
async fn index(State(state): State<AppState>) -> Html<String> {
    let classes = state.store.class_names();

    let initial = classes
        .first()
        .and_then(|class| state.store.lookup(class).ok())
        .map(|record| render_fragment(&build_report(record)))
        .unwrap_or_else(|| "<p>No courses available.</p>".to_string());

    let mut options = String::new();
    for (i, class) in classes.iter().enumerate() {
        let selected = if i == 0 { " selected" } else { "" };
        let _ = write!(
            options,
            r#"<option value="{0}"{selected}>{0}</option>"#,
            escape_xml(class)
        );
    }

    Html(page_html(&options, &initial))
}

async fn report_fragment(
    State(state): State<AppState>,
    Path(class): Path<String>,
) -> Response {
    match state.store.lookup(&class) {
        Ok(record) => Html(render_fragment(&build_report(record))).into_response(),
        Err(StoreError::NotFound(class)) => {
            (StatusCode::NOT_FOUND, format!("Unknown course '{class}'")).into_response()
        }
        Err(err) => {
            error!("Report lookup failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

async fn export_document(
    State(state): State<AppState>,
    Path(class): Path<String>,
) -> Response {
    let record = match state.store.lookup(&class) {
        Ok(record) => record,
        Err(StoreError::NotFound(class)) => {
            return (StatusCode::NOT_FOUND, format!("Unknown course '{class}'")).into_response();
        }
        Err(err) => {
            error!("Export lookup failed: {}", err);
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };

    let model = build_report(record);

    match state.renderer.render(&model).await {
        Ok(document) => (
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", document.filename),
                ),
            ],
            document.bytes,
        )
            .into_response(),
        Err(ExportError::BackendUnavailable(detail)) => {
            error!("Export backend unavailable: {}", detail);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Export backend missing: install Chrome/Chromium or set browser_path in the configuration".to_string(),
            )
                .into_response()
        }
        Err(err) => {
            error!("Export failed for '{}': {}", class, err);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Export failed: {err}")).into_response()
        }
    }
}

fn page_html(options: &str, initial_fragment: &str) -> String {
    let mut page = String::with_capacity(initial_fragment.len() + 4096);

    page.push_str(concat!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"/>",
        "<title>Class Profile</title><style>",
        "body { font-family: Arial, sans-serif; margin: 20px; }",
        ".sidebar { width: 20%; display: inline-block; vertical-align: top; }",
        ".dashboard { width: 75%; display: inline-block; }",
        ".chart-row { display: flex; justify-content: space-between; }",
        ".chart-cell { width: 48%; }",
        ".course-table { width: 60%; margin: auto; border-collapse: collapse; }",
        ".course-table th, .course-table td { text-align: left; padding: 10px; border: 1px solid #ddd; }",
        ".course-table th { background-color: #f2f2f2; font-weight: bold; }",
        // Placeholder rows keep their space but hide their text.
        ".row-placeholder td { color: transparent; }",
        "button { margin-top: 20px; padding: 8px 16px; }",
        "</style></head><body>",
        "<div class=\"sidebar\"><h2>Course Selection</h2>",
        "<select id=\"course-dropdown\">",
    ));
    page.push_str(options);
    page.push_str(concat!(
        "</select>",
        "<button id=\"download-pdf\" type=\"button\">Download as PDF</button>",
        "</div>",
        "<div class=\"dashboard\" id=\"course-dashboard\">",
    ));
    page.push_str(initial_fragment);
    page.push_str(concat!(
        "</div>",
        "<script>",
        "const dropdown = document.getElementById('course-dropdown');",
        "dropdown.addEventListener('change', async () => {",
        "  const res = await fetch('/report/' + encodeURIComponent(dropdown.value));",
        "  document.getElementById('course-dashboard').innerHTML = await res.text();",
        "});",
        "document.getElementById('download-pdf').addEventListener('click', () => {",
        "  window.location = '/export/' + encodeURIComponent(dropdown.value);",
        "});",
        "</script></body></html>",
    ));

    page
}
