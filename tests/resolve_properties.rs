use compiled_image_refs::resolver::render_attributes;
use compiled_image_refs::{ImageRecord, ImageReferenceResolver, ImageTable, ResolveError};
use proptest::prelude::*;

fn resolver() -> ImageReferenceResolver {
  ImageReferenceResolver::new("MARKER").unwrap()
}

fn record_for(path: &str) -> ImageRecord {
  ImageRecord::new(path, format!("/final/{path}"))
    .with_attribute("width", path.len() as i64)
    .unwrap()
}

fn table_for<'a>(paths: impl IntoIterator<Item = &'a String>) -> ImageTable {
  paths.into_iter().map(|path| record_for(path)).collect()
}

// Lowercase-only text can never contain the uppercase marker.
fn text_strategy() -> impl Strategy<Value = String> {
  "[a-z0-9 <>=\"'/.\n-]{0,16}"
}

fn path_strategy() -> impl Strategy<Value = String> {
  "[a-z0-9/._-]{1,12}"
}

proptest! {
  #[test]
  fn documents_without_tokens_are_unchanged(
    html in "[ -~\n]{0,64}",
    paths in prop::collection::vec(path_strategy(), 0..4),
  ) {
    prop_assume!(!html.contains("MARKER=\""));
    let output = resolver().resolve(&html, &table_for(&paths)).unwrap();
    prop_assert_eq!(output, html);
  }

  #[test]
  fn every_token_is_replaced_independently(
    pieces in prop::collection::vec((text_strategy(), path_strategy()), 0..8),
    tail in text_strategy(),
  ) {
    let mut html = String::new();
    let mut expected = String::new();
    for (text, path) in &pieces {
      html.push_str(text);
      html.push_str(&format!("MARKER=\"{path}\""));
      expected.push_str(text);
      expected.push_str(&render_attributes(record_for(path).attributes()));
    }
    html.push_str(&tail);
    expected.push_str(&tail);

    let table = table_for(pieces.iter().map(|(_, path)| path));
    let resolver = resolver();
    prop_assert_eq!(resolver.references(&html).len(), pieces.len());
    prop_assert_eq!(resolver.resolve(&html, &table).unwrap(), expected);
  }

  #[test]
  fn any_missing_record_fails_the_document(
    prefix in prop::collection::vec(path_strategy(), 0..4),
    missing in path_strategy(),
    text in text_strategy(),
  ) {
    prop_assume!(!prefix.contains(&missing));
    let mut html = String::new();
    for path in &prefix {
      html.push_str(&format!("<img MARKER=\"{path}\">{text}"));
    }
    html.push_str(&format!("<img MARKER=\"{missing}\">"));

    let err = resolver().resolve(&html, &table_for(&prefix)).unwrap_err();
    prop_assert_eq!(err.source_path(), Some(missing.as_str()));
  }
}

#[test]
fn resolves_basic_scenarios() {
  let table: ImageTable = [ImageRecord::new("/a.png", "/final/a.png")
    .with_attribute("width", 512_i64)
    .unwrap()]
  .into_iter()
  .collect();

  assert_eq!(
    resolver().resolve(r#"before MARKER="/a.png" after"#, &table).unwrap(),
    r#"before src="/final/a.png" width="512" after"#
  );
  assert_eq!(
    resolver().resolve(r#"MARKER="/x.png""#, &ImageTable::new()),
    Err(ResolveError::MissingImageRecord {
      source_path: "/x.png".into(),
      offset: 0,
    })
  );
  assert_eq!(
    resolver().resolve("no tokens here", &table).unwrap(),
    "no tokens here"
  );
}
