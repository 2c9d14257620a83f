use axum::extract::{Multipart, State};
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::{info, warn};

use super::session::{session_cookie, uploaded_file};
use super::upload::UploadError;
use super::AppState;
use crate::stats::Summary;

fn describe(source: Option<&str>) -> &str {
    source.unwrap_or("default sample data")
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let source = uploaded_file(&headers);
    info!("Using file: {}", describe(source.as_deref()));
    Html(state.dashboard_page(source).await)
}

pub async fn upload(State(state): State<AppState>, multipart: Multipart) -> Response {
    let stored = match receive_upload(&state, multipart).await {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "upload rejected");
            return (e.status(), e.to_string()).into_response();
        }
    };

    let mut response = Html(state.dashboard_page(Some(stored.clone())).await).into_response();
    if let Some(cookie) = session_cookie(&stored) {
        response.headers_mut().insert(SET_COOKIE, cookie);
    }
    response
}

/// Store the `file` part of the form and return its stored name.
async fn receive_upload(state: &AppState, mut multipart: Multipart) -> Result<String, UploadError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(UploadError::MissingFilePart);
        };
        if file_name.is_empty() {
            return Err(UploadError::NoSelectedFile);
        }
        let bytes = field.bytes().await?;
        return state.uploads.save(&file_name, &bytes).await;
    }
    Err(UploadError::MissingFilePart)
}

pub async fn api_data(State(state): State<AppState>, headers: HeaderMap) -> Json<Summary> {
    let source = uploaded_file(&headers);
    info!("API call using file: {}", describe(source.as_deref()));
    Json(state.summary(source).await)
}

pub async fn healthz() -> &'static str {
    "ok"
}
