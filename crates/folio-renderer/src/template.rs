//! Template parsing and rendering.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use folio_cache::Page;

use crate::escape::escape_html;

/// Template used when no template file is configured.
pub const DEFAULT_TEMPLATE: &str = "<!DOCTYPE html>
<html lang=\"en\">
<head>
<meta charset=\"utf-8\">
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">
<title>{{ title }}</title>
</head>
<body>
{{ body }}
</body>
</html>
";

/// Error returned when a template cannot be loaded or parsed.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Template file could not be read.
    #[error("Cannot read template {}: {source}", .path.display())]
    Io {
        /// Template file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// `{{` without a matching `}}`.
    #[error("Unterminated placeholder at byte {offset}")]
    Unterminated {
        /// Byte offset of the opening braces.
        offset: usize,
    },
    /// Placeholder other than title or body.
    #[error("Unknown placeholder '{name}' at byte {offset}")]
    UnknownPlaceholder {
        /// Placeholder name as written.
        name: String,
        /// Byte offset of the opening braces.
        offset: usize,
    },
}

/// Error returned when rendering into a sink fails.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Writing to the output sink failed.
    #[error("Failed to write rendered page: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Title,
    Body,
}

/// A parsed page template.
///
/// Parse once at startup, then render any number of pages concurrently.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Default for Template {
    fn default() -> Self {
        // DEFAULT_TEMPLATE only uses known placeholders.
        Self::parse(DEFAULT_TEMPLATE).unwrap_or_else(|_| Self {
            segments: vec![Segment::Body],
        })
    }
}

impl Template {
    /// Parse template source.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] on unterminated or unknown placeholders.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut consumed = 0;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_owned()));
            }
            let offset = consumed + start;
            let after_open = &rest[start + 2..];
            let end = after_open
                .find("}}")
                .ok_or(TemplateError::Unterminated { offset })?;

            let name = after_open[..end].trim();
            segments.push(placeholder(name, offset)?);

            let advance = start + 2 + end + 2;
            rest = &rest[advance..];
            consumed += advance;
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_owned()));
        }

        Ok(Self { segments })
    }

    /// Read and parse a template file.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Io`] if the file can't be read, or a parse
    /// error from [`Template::parse`].
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    /// Render `page` into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Io`] if the sink rejects a write.
    pub fn render<W: Write + ?Sized>(&self, sink: &mut W, page: &Page) -> Result<(), RenderError> {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => sink.write_all(text.as_bytes())?,
                Segment::Title => sink.write_all(escape_html(page.title()).as_bytes())?,
                Segment::Body => sink.write_all(page.body().as_bytes())?,
            }
        }
        sink.flush()?;
        Ok(())
    }

    /// Render `page` into a new string.
    ///
    /// # Errors
    ///
    /// Only fails if rendering into memory fails, which it does not in practice.
    pub fn render_to_string(&self, page: &Page) -> Result<String, RenderError> {
        let mut buf = Vec::with_capacity(self.size_hint(page));
        self.render(&mut buf, page)?;
        String::from_utf8(buf)
            .map_err(|e| RenderError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }

    fn size_hint(&self, page: &Page) -> usize {
        self.segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.len(),
                Segment::Title => page.title().len(),
                Segment::Body => page.body().len(),
            })
            .sum()
    }
}

fn placeholder(name: &str, offset: usize) -> Result<Segment, TemplateError> {
    match name.strip_prefix('.').unwrap_or(name).to_ascii_lowercase().as_str() {
        "title" => Ok(Segment::Title),
        "body" => Ok(Segment::Body),
        _ => Err(TemplateError::UnknownPlaceholder {
            name: name.to_owned(),
            offset,
        }),
    }
}
