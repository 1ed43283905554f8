//! Page value type.

/// A unit of content served by Folio.
///
/// Pages are immutable. The cache hands out `Arc<Page>` handles, so a page
/// is never changed after it has been inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    title: String,
    body: String,
}

impl Page {
    /// Create a page from a title and body.
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Create a page from raw storage bytes.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    #[must_use]
    pub fn from_bytes(title: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(title, String::from_utf8_lossy(bytes).into_owned())
    }

    /// Page title, derived from the cache key.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Full page body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = Page::new("intro", "<p>Hello</p>");

        assert_eq!(page.title(), "intro");
        assert_eq!(page.body(), "<p>Hello</p>");
    }

    #[test]
    fn test_page_from_bytes_utf8() {
        let page = Page::from_bytes("docs", "Grüße".as_bytes());

        assert_eq!(page.body(), "Grüße");
    }

    #[test]
    fn test_page_from_bytes_lossy() {
        let page = Page::from_bytes("raw", &[b'a', 0xff, b'b']);

        assert_eq!(page.body(), "a\u{fffd}b");
    }

    #[test]
    fn test_page_equality_is_by_content() {
        assert_eq!(Page::new("a", "x"), Page::from_bytes("a", b"x"));
        assert_ne!(Page::new("a", "x"), Page::new("b", "x"));
    }
}
