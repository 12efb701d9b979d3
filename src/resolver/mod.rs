//! Rewrite image placeholder tokens in compiled HTML into final image attributes.
//!
//! The upstream image step leaves tokens such as `__ASTRO_IMAGE_="./cover.png"` inside `<img>`
//! tags. Resolution replaces each whole token with the serialized attributes registered for its
//! path in an [`ImageTable`]. The pass is a single left-to-right scan of the original text:
//! replacement output is never rescanned, and every byte outside a token is copied unchanged.

mod render;
mod scanner;

use memchr::memmem::Finder;

use crate::error::ResolveError;
use crate::models::ImageTable;

pub use render::{escape_attribute_value, render_attributes};
pub use scanner::{PlaceholderScanner, Segment};

/// Marker attribute emitted by the upstream markdown compiler.
pub const DEFAULT_MARKER: &str = "__ASTRO_IMAGE_";

/// Resolver bound to a specific placeholder marker.
#[derive(Clone)]
pub struct ImageReferenceResolver {
  marker: String,
  finder: Finder<'static>,
}

impl std::fmt::Debug for ImageReferenceResolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ImageReferenceResolver")
      .field("marker", &self.marker)
      .finish()
  }
}

impl Default for ImageReferenceResolver {
  fn default() -> Self {
    Self::with_valid_marker(DEFAULT_MARKER)
  }
}

impl ImageReferenceResolver {
  /// Create a resolver for `marker`.
  ///
  /// The marker must be non-empty and free of quotes, `=`, angle brackets and whitespace, since
  /// any of those would make the token grammar ambiguous.
  pub fn new(marker: &str) -> Result<Self, ResolveError> {
    let invalid = marker.is_empty()
      || marker
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '=' | '<' | '>'));
    if invalid {
      return Err(ResolveError::InvalidMarker(marker.to_string()));
    }
    Ok(Self::with_valid_marker(marker))
  }

  fn with_valid_marker(marker: &str) -> Self {
    let prefix = format!("{marker}=\"");
    Self {
      marker: marker.to_string(),
      finder: Finder::new(prefix.as_bytes()).into_owned(),
    }
  }

  /// Marker attribute name this resolver looks for.
  pub fn marker(&self) -> &str {
    &self.marker
  }

  /// Split `html` into text and token segments.
  pub fn scan<'a>(&self, html: &'a str) -> PlaceholderScanner<'a, '_> {
    PlaceholderScanner::new(html, &self.finder)
  }

  /// Source paths of every token in document order, duplicates included.
  pub fn references<'a>(&self, html: &'a str) -> Vec<&'a str> {
    self
      .scan(html)
      .filter_map(|segment| match segment {
        Segment::Token { source_path, .. } => Some(source_path),
        Segment::Text(_) => None,
      })
      .collect()
  }

  /// Replace every token in `html` with the attributes registered for its path.
  ///
  /// Fails on the first token whose path has no record in `table`; no partial output is
  /// returned in that case.
  pub fn resolve(&self, html: &str, table: &ImageTable) -> Result<String, ResolveError> {
    let mut output = String::with_capacity(html.len());

    for segment in self.scan(html) {
      match segment {
        Segment::Text(text) => output.push_str(text),
        Segment::Token {
          source_path,
          offset,
        } => {
          let record = table
            .get(source_path)
            .ok_or_else(|| ResolveError::MissingImageRecord {
              source_path: source_path.to_string(),
              offset,
            })?;
          output.push_str(&render_attributes(record.attributes()));
        }
      }
    }

    Ok(output)
  }
}

/// Resolve `html` using the default marker.
pub fn resolve(html: &str, table: &ImageTable) -> Result<String, ResolveError> {
  ImageReferenceResolver::default().resolve(html, table)
}
