use crate::models::{AttributeValue, Attributes};

/// Escape a value for use inside a double-quoted HTML attribute.
pub fn escape_attribute_value(value: &str) -> String {
  let mut escaped = String::with_capacity(value.len());
  for ch in value.chars() {
    match ch {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#39;"),
      _ => escaped.push(ch),
    }
  }
  escaped
}

/// Serialize attributes as `name="value"` pairs separated by single spaces.
///
/// `true` flags render as the bare attribute name and `false` flags are left out.
pub fn render_attributes(attributes: &Attributes) -> String {
  let mut rendered = String::new();
  for (name, value) in attributes.iter() {
    match value {
      AttributeValue::Flag(false) => continue,
      AttributeValue::Flag(true) => {
        push_separator(&mut rendered);
        rendered.push_str(name);
      }
      AttributeValue::Text(text) => {
        push_separator(&mut rendered);
        push_pair(&mut rendered, name, &escape_attribute_value(text));
      }
      other => {
        push_separator(&mut rendered);
        push_pair(&mut rendered, name, &other.to_string());
      }
    }
  }
  rendered
}

fn push_separator(rendered: &mut String) {
  if !rendered.is_empty() {
    rendered.push(' ');
  }
}

fn push_pair(rendered: &mut String, name: &str, value: &str) {
  rendered.push_str(name);
  rendered.push_str("=\"");
  rendered.push_str(value);
  rendered.push('"');
}
