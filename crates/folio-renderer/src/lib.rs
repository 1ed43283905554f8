//! Page template rendering for Folio.
//!
//! A [`Template`] is an HTML document with two placeholders:
//!
//! - `{{ title }}` - the page title, HTML-escaped
//! - `{{ body }}` - the page body, inserted verbatim
//!
//! The legacy spellings `{{.Title}}` and `{{.Body}}` are accepted as well.
//! There are no loops, conditionals or other placeholders.
//!
//! # Example
//!
//! ```
//! use folio_cache::Page;
//! use folio_renderer::Template;
//!
//! let template = Template::parse("<title>{{ title }}</title>{{ body }}").unwrap();
//! let html = template.render_to_string(&Page::new("intro", "<p>Hi</p>")).unwrap();
//! assert_eq!(html, "<title>intro</title><p>Hi</p>");
//! ```

mod escape;
mod template;

pub use escape::escape_html;
pub use template::{DEFAULT_TEMPLATE, RenderError, Template, TemplateError};
