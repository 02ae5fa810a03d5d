use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    BoxError, Json,
};
use common::{Entry, RangeQuery};

use crate::{
    error::{ApiError, StoreError},
    utils::{now_micros, parse_day},
    AppState, LAST_TEMPLATE,
};

pub const NO_ENTRIES: &str = "No entries";

/// Most recent entry as an HTML fragment. An empty journal is not an error
/// here: it answers 200 with a plain-text notice.
pub async fn last(State(state): State<AppState>) -> Response {
    match state.db.last().await {
        Ok(entry) => render_last(&state.templates, &entry),
        Err(StoreError::NotFound) => NO_ENTRIES.into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

fn render_last(templates: &tera::Tera, entry: &Entry) -> Response {
    let mut context = tera::Context::new();
    context.insert("time", &entry.time.format("%Y-%m-%dT%H:%M").to_string());
    context.insert("user", &entry.user);
    context.insert("content", &entry.content);

    match templates.render(LAST_TEMPLATE, &context) {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            tracing::error!("render {LAST_TEMPLATE}: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "template error").into_response()
        }
    }
}

pub async fn new_entry(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Entry>, ApiError> {
    // Decode failures are logged; the client only sees "bad json".
    let body = body.map_err(|err| {
        tracing::warn!("read body: {err}");
        ApiError::Decode
    })?;
    let mut entry: Entry = serde_json::from_slice(&body).map_err(|err| {
        tracing::warn!("decode json: {err}");
        ApiError::Decode
    })?;

    entry.validate()?;

    entry.time = now_micros();
    state.db.add(&entry).await?;

    Ok(Json(entry))
}

pub async fn query(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    let (start, end) = match (range.start.as_deref(), range.end.as_deref()) {
        (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => (start, end),
        _ => return Err(ApiError::MissingRange),
    };

    let start = parse_day(start)?;
    let end = parse_day(end)?;
    let entries = state.db.query(start, end).await?;

    Ok(Json(entries))
}

pub async fn health(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state.db.health().await?;
    Ok("OK")
}

pub async fn handle_timeout(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, String::from("request timed out"))
    } else {
        tracing::error!("unhandled middleware error: {err}");
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}
