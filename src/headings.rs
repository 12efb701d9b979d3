//! Heading outline of a compiled body.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::Heading;

fn heading_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r"(?is)<h([1-6])(\s[^>]*)?>(.*?)</h([1-6])\s*>").expect("invalid heading regex")
  })
}

fn id_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| {
    Regex::new(r#"(?i)(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("invalid id regex")
  })
}

fn tag_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("invalid tag regex"))
}

/// Collect `<hN id="slug">` headings in document order.
///
/// Headings without an `id` have no anchor to link to and are skipped, as are headings whose
/// closing tag names a different level.
pub fn extract_headings(html: &str) -> Vec<Heading> {
  heading_pattern()
    .captures_iter(html)
    .filter_map(|captures| {
      let level = &captures[1];
      if level != &captures[4] {
        return None;
      }

      let attributes = captures.get(2).map_or("", |m| m.as_str());
      let id = id_pattern().captures(attributes)?;
      let slug = id.get(1).or_else(|| id.get(2))?.as_str();

      Some(Heading {
        depth: level.parse().ok()?,
        slug: decode_entities(slug),
        text: decode_entities(tag_pattern().replace_all(&captures[3], "").trim()),
      })
    })
    .collect()
}

fn decode_entities(text: &str) -> String {
  text
    .replace("&lt;", "<")
    .replace("&gt;", ">")
    .replace("&quot;", "\"")
    .replace("&#39;", "'")
    .replace("&amp;", "&")
}
