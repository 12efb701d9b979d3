use memchr::memchr;
use memchr::memmem::Finder;

/// A piece of the scanned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
  /// Text outside any token, emitted verbatim.
  Text(&'a str),
  /// A complete placeholder token.
  Token {
    /// Path captured between the quotes.
    source_path: &'a str,
    /// Byte offset of the token start in the scanned input.
    offset: usize,
  },
}

/// Single-pass scanner splitting a document into text and placeholder tokens.
///
/// A token is the literal prefix `MARKER="` followed by one or more non-quote characters and a
/// closing quote. Anything else, including an empty payload or a missing closing quote, is text.
/// The scanner never looks at its own output, so replacements cannot create new tokens.
pub struct PlaceholderScanner<'a, 'f> {
  input: &'a str,
  finder: &'f Finder<'static>,
  position: usize,
  search_from: usize,
  pending: Option<Segment<'a>>,
}

impl<'a, 'f> PlaceholderScanner<'a, 'f> {
  pub(crate) fn new(input: &'a str, finder: &'f Finder<'static>) -> Self {
    Self {
      input,
      finder,
      position: 0,
      search_from: 0,
      pending: None,
    }
  }

  fn next_token(&mut self) -> Option<(usize, usize, usize)> {
    let bytes = self.input.as_bytes();
    let prefix_len = self.finder.needle().len();

    while self.search_from < bytes.len() {
      let start = self.search_from + self.finder.find(&bytes[self.search_from..])?;
      let payload_start = start + prefix_len;
      // Without a closing quote no later candidate can terminate either.
      let payload_len = memchr(b'"', &bytes[payload_start..])?;

      if payload_len == 0 {
        self.search_from = start + 1;
        continue;
      }

      let end = payload_start + payload_len + 1;
      self.search_from = end;
      return Some((start, payload_start, end));
    }

    None
  }
}

impl<'a> Iterator for PlaceholderScanner<'a, '_> {
  type Item = Segment<'a>;

  fn next(&mut self) -> Option<Self::Item> {
    if let Some(segment) = self.pending.take() {
      return Some(segment);
    }

    if self.position >= self.input.len() {
      return None;
    }

    match self.next_token() {
      Some((start, payload_start, end)) => {
        let token = Segment::Token {
          source_path: &self.input[payload_start..end - 1],
          offset: start,
        };
        let text = &self.input[self.position..start];
        self.position = end;

        if text.is_empty() {
          Some(token)
        } else {
          self.pending = Some(token);
          Some(Segment::Text(text))
        }
      }
      None => {
        let text = &self.input[self.position..];
        self.position = self.input.len();
        Some(Segment::Text(text))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn scan(input: &str) -> Vec<Segment<'_>> {
    let finder = Finder::new(b"MARKER=\"");
    PlaceholderScanner::new(input, &finder).collect::<Vec<_>>()
  }

  #[test]
  fn splits_text_and_tokens() {
    let segments = scan(r#"<img MARKER="/a.png"> and <img MARKER="/b.png">"#);
    assert_eq!(segments, vec![
      Segment::Text("<img "),
      Segment::Token {
        source_path: "/a.png",
        offset: 5,
      },
      Segment::Text("> and <img "),
      Segment::Token {
        source_path: "/b.png",
        offset: 31,
      },
      Segment::Text(">"),
    ]);
  }

  #[test]
  fn empty_input_yields_nothing() {
    assert!(scan("").is_empty());
  }

  #[test]
  fn adjacent_tokens_have_no_text_between() {
    let segments = scan(r#"MARKER="a"MARKER="b""#);
    assert_eq!(segments.len(), 2);
    assert!(matches!(segments[0], Segment::Token { source_path: "a", offset: 0, .. }));
    assert!(matches!(segments[1], Segment::Token { source_path: "b", offset: 10, .. }));
  }

  #[test]
  fn unterminated_payload_is_plain_text() {
    let input = r#"<img MARKER="/a.png>"#;
    assert_eq!(scan(input), vec![Segment::Text(input)]);
  }

  #[test]
  fn empty_payload_is_skipped_but_scanning_continues() {
    let segments = scan(r#"MARKER="" then MARKER="/c.png""#);
    assert_eq!(segments, vec![
      Segment::Text(r#"MARKER="" then "#),
      Segment::Token {
        source_path: "/c.png",
        offset: 15,
      },
    ]);
  }

  #[test]
  fn payload_may_span_lines_and_contain_unicode() {
    let segments = scan("MARKER=\"./images/été\nphoto.png\"");
    assert!(matches!(
      segments.as_slice(),
      [Segment::Token { source_path: "./images/été\nphoto.png", .. }]
    ));
  }
}
