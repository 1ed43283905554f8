//! Request path resolution.
//!
//! Maps an inbound URL path onto a `(category, subpath)` pair for the page
//! cache, using one anchored pattern built from the configured categories:
//!
//! ```text
//! ^/(docs|blog)/([a-zA-Z0-9-]*)$
//! ```
//!
//! Paths that don't match never reach the cache.

use regex::Regex;

/// Characters allowed in a page sub-path.
const SUBPATH_PATTERN: &str = "[a-zA-Z0-9-]*";

/// What to do with a request path.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Dispatch<'a> {
    /// Serve `subpath` under `category` (empty subpath: category default page).
    Page { category: &'a str, subpath: &'a str },
    /// Under a category prefix but not a valid page path. Dropped.
    Ignore,
    /// Outside every category. Redirect to `location`.
    Redirect { location: String },
}

/// Resolves request paths against the configured categories.
#[derive(Debug)]
pub(crate) struct Dispatcher {
    page_path: Regex,
    categories: Vec<String>,
    default_location: String,
}

impl Dispatcher {
    /// Build a dispatcher for `categories`; unmatched paths redirect to
    /// `default_category`.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the combined pattern fails to compile.
    pub(crate) fn new<I, S>(categories: I, default_category: &str) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let categories: Vec<String> = categories.into_iter().map(Into::into).collect();
        let alternation = categories
            .iter()
            .map(|c| regex::escape(c))
            .collect::<Vec<_>>()
            .join("|");
        let page_path = Regex::new(&format!("^/({alternation})/({SUBPATH_PATTERN})$"))?;

        Ok(Self {
            page_path,
            categories,
            default_location: format!("/{default_category}/"),
        })
    }

    /// Resolve a URL path (without query string).
    pub(crate) fn resolve<'a>(&self, path: &'a str) -> Dispatch<'a> {
        if let Some(captures) = self.page_path.captures(path)
            && let (Some(category), Some(subpath)) = (captures.get(1), captures.get(2))
        {
            return Dispatch::Page {
                category: category.as_str(),
                subpath: subpath.as_str(),
            };
        }

        let trimmed = path.strip_prefix('/').unwrap_or(path);
        for category in &self.categories {
            if let Some(rest) = trimmed.strip_prefix(category.as_str()) {
                if rest.is_empty() {
                    return Dispatch::Redirect {
                        location: format!("/{category}/"),
                    };
                }
                if rest.starts_with('/') {
                    return Dispatch::Ignore;
                }
            }
        }

        Dispatch::Redirect {
            location: self.default_location.clone(),
        }
    }
}
