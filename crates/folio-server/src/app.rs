//! Router construction.
//!
//! Builds the axum router with the page fallback and middleware.

use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::security;
use crate::state::AppState;

/// Create the application router.
///
/// Every path goes to the page handler; the dispatcher decides between
/// serving, redirecting and dropping.
pub(crate) fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(handlers::pages::serve_path)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use folio_cache::PageCache;
    use folio_renderer::Template;
    use folio_storage::MockStorage;
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;
    use crate::dispatch::Dispatcher;

    fn setup() -> (Arc<MockStorage>, Router) {
        let storage = Arc::new(
            MockStorage::new()
                .with_file("defaults/docs.html", "<p>Docs home</p>")
                .with_file("defaults/blog.html", "<p>Blog home</p>")
                .with_file("docs/intro.html", "<p>Intro</p>"),
        );
        let cache = PageCache::new(Arc::clone(&storage) as Arc<dyn folio_storage::Storage>);
        cache
            .seed("docs", Path::new("defaults/docs.html"))
            .unwrap();
        cache
            .seed("blog", Path::new("defaults/blog.html"))
            .unwrap();

        let state = Arc::new(AppState {
            cache: Arc::new(cache),
            template: Template::parse("<title>{{ title }}</title>{{ body }}").unwrap(),
            dispatcher: Dispatcher::new(["docs", "blog"], "docs").unwrap(),
            version: "1.0.0".to_owned(),
        });

        (storage, create_router(state))
    }

    async fn get(router: &Router, uri: &str) -> Response {
        router
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_root_redirects_to_default_category() {
        let (_, router) = setup();

        let response = get(&router, "/").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/docs/");
    }

    #[tokio::test]
    async fn test_bare_category_redirects_with_slash() {
        let (_, router) = setup();

        let response = get(&router, "/blog").await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/blog/");
    }

    #[tokio::test]
    async fn test_category_root_serves_seeded_page() {
        let (storage, router) = setup();

        let response = get(&router, "/blog/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        assert_eq!(
            body_text(response).await,
            "<title>blog</title><p>Blog home</p>"
        );
        // Only the two seed reads.
        assert_eq!(storage.total_reads(), 2);
    }

    #[tokio::test]
    async fn test_page_is_read_once() {
        let (storage, router) = setup();

        for _ in 0..3 {
            let response = get(&router, "/docs/intro").await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                body_text(response).await,
                "<title>intro</title><p>Intro</p>"
            );
        }

        assert_eq!(storage.read_count("docs/intro.html"), 1);
    }

    #[tokio::test]
    async fn test_missing_page_renders_not_found() {
        let (storage, router) = setup();

        let response = get(&router, "/docs/missing").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get(header::ETAG).is_none());
        let body = body_text(response).await;
        assert!(body.contains("Resource not found"));
        assert!(body.contains("404, resource not found"));

        get(&router, "/docs/missing").await;
        assert_eq!(storage.read_count("docs/missing.html"), 2);
    }

    #[tokio::test]
    async fn test_missing_page_served_once_created() {
        let (storage, router) = setup();

        let response = get(&router, "/docs/later").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        storage.insert("docs/later.html", "<p>Later</p>");
        let response = get(&router, "/docs/later").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<p>Later</p>"));
    }

    #[tokio::test]
    async fn test_invalid_subpath_is_dropped() {
        let (storage, router) = setup();

        let response = get(&router, "/docs/a/b").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, "");
        assert_eq!(storage.total_reads(), 2);
    }

    #[tokio::test]
    async fn test_etag_not_modified() {
        let (_, router) = setup();

        let response = get(&router, "/docs/intro").await;
        let etag = response.headers()[header::ETAG].clone();

        let response = router
            .clone()
            .oneshot(
                Request::get("/docs/intro")
                    .header(header::IF_NONE_MATCH, etag)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_stale_etag_returns_page() {
        let (_, router) = setup();

        let response = router
            .clone()
            .oneshot(
                Request::get("/docs/intro")
                    .header(header::IF_NONE_MATCH, "\"0000000000000000\"")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_security_headers() {
        let (_, router) = setup();

        let response = get(&router, "/docs/").await;

        let headers = response.headers();
        assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
    }
}
