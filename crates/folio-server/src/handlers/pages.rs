//! Page endpoint.
//!
//! Every request lands here. The path is resolved by the
//! [`Dispatcher`](crate::dispatch::Dispatcher), then the page is looked up
//! in the cache on the blocking pool and rendered through the template.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use folio_cache::{Lookup, Page};
use md5::{Digest, Md5};

use crate::dispatch::Dispatch;
use crate::error::ServerError;
use crate::state::AppState;

/// Title of the page rendered when no content exists for a path.
pub(crate) const NOT_FOUND_TITLE: &str = "Resource not found";

/// Body of the page rendered when no content exists for a path.
pub(crate) const NOT_FOUND_BODY: &str = "<h1> 404, resource not found </h1>";

/// Handle any request path.
pub(crate) async fn serve_path(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let (category, subpath) = match state.dispatcher.resolve(uri.path()) {
        Dispatch::Page { category, subpath } => (category.to_owned(), subpath.to_owned()),
        Dispatch::Redirect { location } => {
            return Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response());
        }
        Dispatch::Ignore => {
            tracing::debug!(path = %uri.path(), "Ignoring unmatched page path");
            return Ok(StatusCode::NOT_FOUND.into_response());
        }
    };

    // Storage reads block, so the lookup runs on the blocking pool.
    let cache = Arc::clone(&state.cache);
    let lookup = tokio::task::spawn_blocking(move || cache.lookup(&category, &subpath)).await?;

    render_lookup(&state, lookup, &headers)
}

/// Render a lookup result into an HTML response.
fn render_lookup(
    state: &AppState,
    lookup: Lookup,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let Lookup::Found(page) = lookup else {
        let html = state
            .template
            .render_to_string(&Page::new(NOT_FOUND_TITLE, NOT_FOUND_BODY))?;
        return Ok((StatusCode::NOT_FOUND, html_headers(None), html).into_response());
    };

    let html = state.template.render_to_string(&page)?;
    let etag = compute_etag(&state.version, &html);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    Ok((StatusCode::OK, html_headers(Some(etag)), html).into_response())
}

/// Response headers for an HTML page.
fn html_headers(etag: Option<String>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    if let Some(etag) = etag.and_then(|e| HeaderValue::from_str(&e).ok()) {
        headers.insert(header::ETAG, etag);
    }
    headers
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
