//! HTTP server: article, listing and JSON routes over the content tree
//!
//! Every request reads the content directory afresh, so edits show up on
//! the next reload without a rebuild step.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::ContentKind;
use crate::error::ContentError;
use crate::page::{filter_records, ListingQuery, PageAssembler, RecordSummary};
use crate::Folio;

/// Server state
struct ServerState {
    folio: Folio,
    pages: PageAssembler,
}

/// Build the application router
pub fn router(folio: Folio) -> Result<Router> {
    let pages = folio.pages()?;
    let state = Arc::new(ServerState { folio, pages });

    Ok(Router::new()
        .route("/", get(home_handler))
        .route("/blog", get(blog_handler))
        .route("/blog/:slug", get(post_handler))
        .route("/newsletter", get(newsletter_handler))
        .route("/newsletter/:slug", get(edition_handler))
        .route("/api/:kind", get(api_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Start the server
pub async fn start(folio: &Folio, ip: &str, port: u16) -> Result<()> {
    let app = router(folio.clone())?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");
    tracing::info!("Serving content from {:?}", folio.content_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<ContentError>()
        .map_or(false, ContentError::is_not_found)
}

fn not_found_response(state: &ServerState, path: &str) -> Response {
    match state.pages.not_found(path) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render 404 page: {:#}", e);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

/// Run a page build on the blocking pool and map its outcome to a response
async fn render_page<F>(state: Arc<ServerState>, path: String, build: F) -> Response
where
    F: FnOnce(&ServerState) -> Result<String> + Send + 'static,
{
    let task_state = state.clone();
    match tokio::task::spawn_blocking(move || build(&task_state)).await {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(e)) if is_not_found(&e) => {
            tracing::debug!("{}: {}", path, e);
            not_found_response(&state, &path)
        }
        Ok(Err(e)) => {
            tracing::error!("{}: {:#}", path, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
        Err(e) => {
            tracing::error!("{}: page task failed: {}", path, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

async fn home_handler(State(state): State<Arc<ServerState>>) -> Response {
    render_page(state, "/".to_string(), |state| {
        state
            .pages
            .home(&state.folio.posts(), &state.folio.editions())
    })
    .await
}

async fn listing(state: Arc<ServerState>, kind: ContentKind, query: ListingQuery) -> Response {
    let path = format!("/{}", kind.route());
    render_page(state, path, move |state| {
        state
            .pages
            .listing(&state.folio.collection(kind), &query)
    })
    .await
}

async fn article(state: Arc<ServerState>, kind: ContentKind, slug: String) -> Response {
    let path = format!("/{}/{}", kind.route(), slug);
    render_page(state, path, move |state| {
        state
            .pages
            .article(&state.folio.collection(kind), &slug)
    })
    .await
}

async fn blog_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListingQuery>,
) -> Response {
    listing(state, ContentKind::Post, query).await
}

async fn newsletter_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<ListingQuery>,
) -> Response {
    listing(state, ContentKind::Edition, query).await
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    article(state, ContentKind::Post, slug).await
}

async fn edition_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    article(state, ContentKind::Edition, slug).await
}

/// JSON listing of one kind, without bodies
async fn api_handler(
    State(state): State<Arc<ServerState>>,
    Path(kind): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let Ok(kind) = kind.parse::<ContentKind>() else {
        return (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "unknown content kind" })))
            .into_response();
    };

    let task_state = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        let records = task_state.folio.collection(kind).get_all()?;
        let config = &task_state.folio.config;
        Ok::<_, ContentError>(
            filter_records(&records, &query)
                .into_iter()
                .map(|r| RecordSummary::new(config, r))
                .collect::<Vec<_>>(),
        )
    })
    .await;

    match result {
        Ok(Ok(items)) => Json(items).into_response(),
        Ok(Err(e)) => {
            tracing::error!("/api/{}: {}", kind.route(), e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("/api/{}: task failed: {}", kind.route(), e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Static files, then the 404 page
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let path = request.uri().path().to_string();

    let mut service = ServeDir::new(&state.folio.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => not_found_response(&state, &path),
        Err(e) => {
            tracing::error!("Failed to serve {}: {}", path, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use std::fs;
    use tower::ServiceExt;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let posts = dir.path().join("content/blog");
        let editions = dir.path().join("content/newsletter");
        fs::create_dir_all(&posts).unwrap();
        fs::create_dir_all(&editions).unwrap();
        fs::create_dir_all(dir.path().join("public")).unwrap();

        fs::write(
            posts.join("hello.mdx"),
            "---\ntitle: Hello\ndescription: First post\ndate: 2024-01-01\ntags: [rust]\n---\n# Hi\n\n<Callout type=\"tip\">\nBe kind.\n</Callout>\n",
        )
        .unwrap();
        fs::write(
            posts.join("broken.mdx"),
            "---\ntitle: Broken\ndescription: Uses a missing widget\ndate: 2024-02-01\n---\n<Missing />\n",
        )
        .unwrap();
        fs::write(
            editions.join("issue-1.md"),
            "---\ntitle: Issue one\ndescription: The first\ndate: 2024-03-01\nnumber: 1\ntopics: [news]\n---\nWelcome",
        )
        .unwrap();
        fs::write(dir.path().join("public/robots.txt"), "User-agent: *\n").unwrap();
        dir
    }

    async fn get(dir: &tempfile::TempDir, uri: &str) -> (StatusCode, String) {
        let app = router(Folio::new(dir.path()).unwrap()).unwrap();
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    #[tokio::test]
    async fn test_article_routes() {
        let dir = site();

        let (status, body) = get(&dir, "/blog/hello").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("callout-tip"));

        let (status, body) = get(&dir, "/newsletter/issue-1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("#1 Issue one"));
    }

    #[tokio::test]
    async fn test_render_errors_stay_inline() {
        let (status, body) = get(&site(), "/blog/broken").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("render-error"));
    }

    #[tokio::test]
    async fn test_missing_and_invalid_slugs_are_404() {
        let dir = site();
        for uri in ["/blog/nope", "/blog/..%2Fsecret", "/newsletter/hello", "/nowhere"] {
            let (status, body) = get(&dir, uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert!(body.contains("Page not found"), "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_listings_and_static_files() {
        let dir = site();

        let (status, body) = get(&dir, "/blog?tag=RUST").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("First post"));
        assert!(!body.contains("Uses a missing widget"));

        let (status, body) = get(&dir, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Issue one"));

        let (status, body) = get(&dir, "/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with("User-agent"));
    }

    #[tokio::test]
    async fn test_api_listing() {
        let dir = site();
        let (status, body) = get(&dir, "/api/posts").await;
        assert_eq!(status, StatusCode::OK);

        let items: serde_json::Value = serde_json::from_str(&body).unwrap();
        let slugs: Vec<_> = items
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["slug"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(slugs, vec!["broken", "hello"]);
        assert!(items[0].get("body").is_none());

        let (status, _) = get(&dir, "/api/podcasts").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
