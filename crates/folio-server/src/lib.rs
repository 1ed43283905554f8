//! HTTP server for Folio.
//!
//! Serves HTML pages per category from a [`PageCache`]:
//! - `/{category}/` renders the category's default page, loaded at startup
//! - `/{category}/{page}` renders `{content_dir}/{category}/{page}.html`,
//!   read from disk on first request and cached for the process lifetime
//! - anything outside a category redirects to the default category
//!
//! # Quick Start
//!
//! ```ignore
//! use std::collections::BTreeMap;
//! use std::path::PathBuf;
//! use folio_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         default_category: "docs".to_owned(),
//!         content_dir: PathBuf::from("content"),
//!         categories: BTreeMap::from([(
//!             "docs".to_owned(),
//!             PathBuf::from("content/defaults/docs.html"),
//!         )]),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (folio-server)
//!                        │
//!                        └─► Dispatcher ──► PageCache ──► FsStorage
//!                                               │
//!                                               └─► Template ──► HTML
//! ```

mod app;
mod dispatch;
mod error;
mod handlers;
mod middleware;
mod state;

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

pub use error::StartupError;
use folio_cache::{PageCache, SeedError};
use folio_renderer::Template;
use folio_storage::{FsStorage, Storage};
use state::AppState;

use crate::dispatch::Dispatcher;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Category that unmatched paths redirect to.
    pub default_category: String,
    /// Root directory for lazily loaded pages.
    pub content_dir: PathBuf,
    /// Page template file (`None` uses the built-in template).
    pub template: Option<PathBuf>,
    /// Category name to default page path.
    pub categories: BTreeMap<String, PathBuf>,
    /// Application version (mixed into `ETag`s).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            default_category: String::new(),
            content_dir: PathBuf::from("."),
            template: None,
            categories: BTreeMap::new(),
            version: String::new(),
        }
    }
}

/// Create a cache over `storage` holding every category's default page.
///
/// # Errors
///
/// Returns [`SeedError`] for the first default page that can't be read.
pub fn seed_cache<'a, I>(
    storage: Arc<dyn Storage>,
    categories: I,
) -> Result<PageCache, SeedError>
where
    I: IntoIterator<Item = (&'a String, &'a PathBuf)>,
{
    let cache = PageCache::new(storage);
    for (category, path) in categories {
        cache.seed(category, path)?;
    }
    tracing::info!(pages = cache.len(), "Seeded default pages");
    Ok(cache)
}

/// Load everything the server needs before binding.
fn prepare(config: &ServerConfig) -> Result<AppState, StartupError> {
    let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(config.content_dir.clone()));
    let cache = seed_cache(storage, &config.categories)?;

    let template = match &config.template {
        Some(path) => Template::from_file(path)?,
        None => Template::default(),
    };

    let dispatcher = Dispatcher::new(config.categories.keys().cloned(), &config.default_category)?;

    Ok(AppState {
        cache: Arc::new(cache),
        template,
        dispatcher,
        version: config.version.clone(),
    })
}

/// Verify that the server could start with `config`.
///
/// Seeds every default page and loads the template without binding a socket.
///
/// # Errors
///
/// Returns the same [`StartupError`] that [`run_server`] would.
pub fn check(config: &ServerConfig) -> Result<usize, StartupError> {
    let state = prepare(config)?;
    Ok(state.cache.len())
}

/// Run the server until Ctrl-C.
///
/// Default pages are loaded before the listener binds, so a missing
/// default page fails startup instead of a request.
///
/// # Errors
///
/// Returns [`StartupError`] if loading, binding or serving fails.
pub async fn run_server(config: ServerConfig) -> Result<(), StartupError> {
    let state = Arc::new(prepare(&config)?);
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from Folio config.
#[must_use]
pub fn server_config_from_config(config: &folio_config::Config, version: String) -> ServerConfig {
    let site = &config.site_resolved;
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        default_category: site.default_category.clone(),
        content_dir: site.content_dir.clone(),
        template: site.template.clone(),
        categories: site.categories.clone(),
        version,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn site_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("defaults")).unwrap();
        std::fs::write(dir.path().join("defaults/docs.html"), "<p>Docs</p>").unwrap();
        std::fs::write(dir.path().join("defaults/blog.html"), "<p>Blog</p>").unwrap();
        dir
    }

    fn config(root: &Path) -> ServerConfig {
        ServerConfig {
            default_category: "docs".to_owned(),
            content_dir: root.to_path_buf(),
            categories: BTreeMap::from([
                ("docs".to_owned(), root.join("defaults/docs.html")),
                ("blog".to_owned(), root.join("defaults/blog.html")),
            ]),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_check_seeds_every_category() {
        let dir = site_dir();

        assert_eq!(check(&config(dir.path())).unwrap(), 2);
    }

    #[test]
    fn test_check_missing_default_page_fails() {
        let dir = site_dir();
        std::fs::remove_file(dir.path().join("defaults/blog.html")).unwrap();

        let err = check(&config(dir.path())).unwrap_err();

        assert!(matches!(err, StartupError::Seed(_)));
        let message = err.to_string();
        assert!(message.contains("'blog'"), "{message}");
        assert!(message.contains("blog.html"), "{message}");
    }

    #[test]
    fn test_check_bad_template_fails() {
        let dir = site_dir();
        let template = dir.path().join("template.html");
        std::fs::write(&template, "{{ footer }}").unwrap();
        let config = ServerConfig {
            template: Some(template),
            ..config(dir.path())
        };

        let err = check(&config).unwrap_err();

        assert!(matches!(err, StartupError::Template(_)));
    }

    #[test]
    fn test_seed_cache_keys_by_category() {
        let dir = site_dir();
        let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(dir.path().to_path_buf()));

        let cache = seed_cache(storage, &config(dir.path()).categories).unwrap();

        assert_eq!(cache.get("docs").unwrap().body(), "<p>Docs</p>");
        assert_eq!(cache.get("blog").unwrap().title(), "blog");
    }

    /// Site in a temp dir under the working directory, so it can be
    /// addressed by a relative path.
    fn relative_site_dir() -> tempfile::TempDir {
        let dir = tempfile::Builder::new().tempdir_in(".").unwrap();
        std::fs::create_dir_all(dir.path().join("defaults")).unwrap();
        std::fs::write(dir.path().join("defaults/docs.html"), "<p>Docs</p>").unwrap();
        std::fs::write(
            dir.path().join("folio.toml"),
            "[categories]\ndocs = \"defaults/docs.html\"\n",
        )
        .unwrap();
        dir
    }

    fn check_config_at(config_path: &Path) -> Result<usize, StartupError> {
        let config = folio_config::Config::load(Some(config_path), None).unwrap();
        check(&server_config_from_config(&config, "0.0.0".to_owned()))
    }

    #[test]
    fn test_check_with_relative_config_path() {
        let dir = relative_site_dir();
        let config_path = dir.path().join("folio.toml");
        assert!(config_path.is_relative());

        assert_eq!(check_config_at(&config_path).unwrap(), 1);
    }

    #[test]
    fn test_check_with_parent_relative_config_path() {
        let dir = relative_site_dir();
        let cwd = std::env::current_dir().unwrap();
        let config_path = Path::new("..")
            .join(cwd.file_name().unwrap())
            .join(dir.path())
            .join("folio.toml");

        assert_eq!(check_config_at(&config_path).unwrap(), 1);
    }

    #[test]
    fn test_relative_config_serves_lazy_pages_from_content_dir() {
        let dir = relative_site_dir();
        std::fs::create_dir_all(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/intro.html"), "<p>Intro</p>").unwrap();
        let config =
            folio_config::Config::load(Some(&dir.path().join("folio.toml")), None).unwrap();

        let state = prepare(&server_config_from_config(&config, "0.0.0".to_owned())).unwrap();

        let page = state.cache.lookup("docs", "intro").into_page().unwrap();
        assert_eq!(page.body(), "<p>Intro</p>");
    }

    #[tokio::test]
    async fn test_run_server_fails_before_bind_on_missing_page() {
        let dir = tempfile::tempdir().unwrap();

        let err = run_server(config(dir.path())).await.unwrap_err();

        assert!(matches!(err, StartupError::Seed(_)));
    }

    #[test]
    fn test_server_config_from_config() {
        let dir = site_dir();
        let mut config = folio_config::Config::default();
        config.server.port = 9090;
        config.site_resolved.default_category = "docs".to_owned();
        config.site_resolved.content_dir = dir.path().to_path_buf();
        config
            .site_resolved
            .categories
            .insert("docs".to_owned(), dir.path().join("defaults/docs.html"));

        let server = server_config_from_config(&config, "1.2.3".to_owned());

        assert_eq!(server.port, 9090);
        assert_eq!(server.default_category, "docs");
        assert_eq!(server.content_dir, dir.path());
        assert_eq!(server.categories.len(), 1);
        assert_eq!(server.version, "1.2.3");
        assert!(server.template.is_none());
    }
}
