//! Format-preserving document edits
//!
//! The accessor keeps both the raw text and the parsed structure. A patch is
//! computed by diffing the structure before and after the mutator, then
//! splicing minimal textual edits at exactly the changed paths. The document
//! is never re-serialized wholesale, so comments, key ordering and
//! formatting in untouched regions survive byte-for-byte. The span scanner
//! tolerates the same relaxed syntax the reader accepts (comments, trailing
//! commas, single-quoted strings, bare keys).

use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;

/// Apply the structural difference between `old` and `new` to `text`.
/// Returns `text` unchanged (byte-identical) when the values are equal.
pub(crate) fn apply_patch(text: &str, old: &Value, new: &Value) -> Result<String, ConfigError> {
    let mut ops = Vec::new();
    diff_values(old, new, &mut Vec::new(), &mut ops);

    // Spans shift after every splice, so each op re-locates against the
    // current text. Documents are small; clarity wins over a single pass.
    let mut current = text.to_string();
    for op in &ops {
        current = apply_op(&current, op)?;
    }
    Ok(current)
}

#[derive(Debug)]
enum EditOp {
    Replace { path: Vec<String>, value: Value },
    Insert { parent: Vec<String>, key: String, value: Value },
    Remove { path: Vec<String> },
}

fn diff_values(old: &Value, new: &Value, path: &mut Vec<String>, ops: &mut Vec<EditOp>) {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            for key in old_map.keys() {
                if !new_map.contains_key(key) {
                    let mut removed = path.clone();
                    removed.push(key.clone());
                    ops.push(EditOp::Remove { path: removed });
                }
            }
            for (key, new_value) in new_map {
                match old_map.get(key) {
                    None => ops.push(EditOp::Insert {
                        parent: path.clone(),
                        key: key.clone(),
                        value: new_value.clone(),
                    }),
                    Some(old_value) if old_value == new_value => {}
                    Some(old_value) => {
                        path.push(key.clone());
                        if old_value.is_object() && new_value.is_object() {
                            diff_values(old_value, new_value, path, ops);
                        } else {
                            ops.push(EditOp::Replace {
                                path: path.clone(),
                                value: new_value.clone(),
                            });
                        }
                        path.pop();
                    }
                }
            }
        }
        _ if old == new => {}
        _ => ops.push(EditOp::Replace {
            path: path.clone(),
            value: new.clone(),
        }),
    }
}

fn apply_op(text: &str, op: &EditOp) -> Result<String, ConfigError> {
    let unit = detect_indent(text);
    match op {
        EditOp::Replace { path, value } => {
            // A replaced root means there is nothing left to preserve.
            let Some((last, parent)) = path.split_last() else {
                return Ok(format!("{}\n", render_value(value, 0, &unit)?));
            };
            let layout = layout_at_path(text, parent)?;
            let prop = layout.prop(last).ok_or_else(|| path_error(path))?;
            let rendered = render_value(value, path.len(), &unit)?;
            Ok(splice(text, prop.value_start, prop.value_end, &rendered))
        }
        EditOp::Insert { parent, key, value } => {
            let layout = layout_at_path(text, parent)?;
            let inner = unit.repeat(parent.len() + 1);
            let outer = unit.repeat(parent.len());
            let rendered = render_value(value, parent.len() + 1, &unit)?;
            let key_json = render_key(key)?;

            if let Some(last) = layout.props.last() {
                match last.comma {
                    Some(comma) => Ok(splice(
                        text,
                        comma + 1,
                        comma + 1,
                        &format!("\n{inner}{key_json}: {rendered}"),
                    )),
                    None => Ok(splice(
                        text,
                        last.value_end,
                        last.value_end,
                        &format!(",\n{inner}{key_json}: {rendered}"),
                    )),
                }
            } else {
                let interior = &text[layout.open + 1..layout.close];
                if interior.trim().is_empty() {
                    Ok(splice(
                        text,
                        layout.open + 1,
                        layout.close,
                        &format!("\n{inner}{key_json}: {rendered}\n{outer}"),
                    ))
                } else {
                    // Empty object that still holds comments: append before
                    // the closing brace without disturbing them.
                    Ok(splice(
                        text,
                        layout.close,
                        layout.close,
                        &format!("{inner}{key_json}: {rendered}\n{outer}"),
                    ))
                }
            }
        }
        EditOp::Remove { path } => {
            let Some((last, parent)) = path.split_last() else {
                return Err(path_error(path));
            };
            let layout = layout_at_path(text, parent)?;
            let index = layout
                .props
                .iter()
                .position(|p| p.key == *last)
                .ok_or_else(|| path_error(path))?;
            let prop = &layout.props[index];

            let (start, end) = match prop.comma {
                Some(comma) => {
                    let start = line_indent_start(text, prop.prop_start);
                    (start, consume_line_tail(text, comma + 1))
                }
                None => match index.checked_sub(1).and_then(|i| layout.props[i].comma) {
                    // Eat the previous property's separating comma so the
                    // survivor stays a valid last property.
                    Some(prev_comma) => (prev_comma, prop.value_end),
                    None => {
                        let mut start = line_indent_start(text, prop.prop_start);
                        if start > 0 && text.as_bytes()[start - 1] == b'\n' {
                            start -= 1;
                        }
                        (start, prop.value_end)
                    }
                },
            };
            Ok(splice(text, start, end, ""))
        }
    }
}

fn path_error(path: &[String]) -> ConfigError {
    ConfigError::Invalid(format!(
        "cannot edit \"{}\": path not present in document",
        path.join(".")
    ))
}

fn splice(text: &str, start: usize, end: usize, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len() + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    out
}

/// Walk back over the property line's leading spaces/tabs.
fn line_indent_start(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut start = pos;
    while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
        start -= 1;
    }
    start
}

/// Walk forward over trailing spaces/tabs and at most one newline.
fn consume_line_tail(text: &str, pos: usize) -> usize {
    let bytes = text.as_bytes();
    let mut end = pos;
    while end < bytes.len() && matches!(bytes[end], b' ' | b'\t') {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'\r' {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'\n' {
        end += 1;
    }
    end
}

/// Indentation unit of the document: leading whitespace of the first
/// indented key line, two spaces when the document gives no hint.
fn detect_indent(text: &str) -> String {
    for line in text.lines() {
        let trimmed = line.trim_start();
        if trimmed.len() < line.len() && (trimmed.starts_with('"') || trimmed.starts_with('\'')) {
            return line[..line.len() - trimmed.len()].to_string();
        }
    }
    "  ".to_string()
}

fn render_key(key: &str) -> Result<String, ConfigError> {
    serde_json::to_string(key).map_err(render_error)
}

/// Pretty-print a value using the document's indent unit, with continuation
/// lines shifted to `depth`.
fn render_value(value: &Value, depth: usize, unit: &str) -> Result<String, ConfigError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(unit.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer).map_err(render_error)?;
    let rendered = String::from_utf8(buf).map_err(|e| render_error(serde::ser::Error::custom(e)))?;

    let prefix = unit.repeat(depth);
    let mut lines = rendered.split('\n');
    let mut out = lines.next().unwrap_or_default().to_string();
    for line in lines {
        out.push('\n');
        out.push_str(&prefix);
        out.push_str(line);
    }
    Ok(out)
}

fn render_error(err: serde_json::Error) -> ConfigError {
    ConfigError::Invalid(format!("failed to serialize patched value: {err}"))
}

// ---------------------------------------------------------------------------
// Span scanner
// ---------------------------------------------------------------------------

struct PropSpan {
    key: String,
    prop_start: usize,
    value_start: usize,
    value_end: usize,
    comma: Option<usize>,
}

struct ObjectLayout {
    open: usize,
    close: usize,
    props: Vec<PropSpan>,
}

impl ObjectLayout {
    fn prop(&self, key: &str) -> Option<&PropSpan> {
        self.props.iter().find(|p| p.key == key)
    }
}

/// Layout of the object reached by descending `path` from the document root.
fn layout_at_path(text: &str, path: &[String]) -> Result<ObjectLayout, ConfigError> {
    let mut scanner = Scanner::new(text);
    scanner.skip_trivia();
    let mut layout = scanner.object_layout()?;
    for (i, segment) in path.iter().enumerate() {
        let prop = layout
            .prop(segment)
            .ok_or_else(|| path_error(&path[..=i]))?;
        let mut inner = Scanner::new(text);
        inner.pos = prop.value_start;
        layout = inner.object_layout()?;
    }
    Ok(layout)
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Scanner {
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn unexpected_end(&self) -> ConfigError {
        ConfigError::Invalid("unexpected end of document while locating edit span".to_string())
    }

    fn expect(&mut self, expected: u8) -> Result<(), ConfigError> {
        match self.peek() {
            Some(b) if b == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(ConfigError::Invalid(format!(
                "expected '{}' at offset {}, found '{}'",
                expected as char, self.pos, b as char
            ))),
            None => Err(self.unexpected_end()),
        }
    }

    /// Skip whitespace plus `//` and `/* */` comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') => match self.bytes.get(self.pos + 1) {
                    Some(b'/') => {
                        while let Some(b) = self.peek() {
                            if b == b'\n' {
                                break;
                            }
                            self.pos += 1;
                        }
                    }
                    Some(b'*') => {
                        self.pos += 2;
                        while self.pos < self.bytes.len() {
                            if self.bytes[self.pos] == b'*'
                                && self.bytes.get(self.pos + 1) == Some(&b'/')
                            {
                                self.pos += 2;
                                break;
                            }
                            self.pos += 1;
                        }
                    }
                    _ => break,
                },
                _ => break,
            }
        }
    }

    /// Skip a quoted string; `pos` sits on the opening quote.
    fn skip_string(&mut self) -> Result<(), ConfigError> {
        let quote = self.peek().ok_or_else(|| self.unexpected_end())?;
        self.pos += 1;
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\\' {
                self.pos += 1;
            } else if b == quote {
                return Ok(());
            }
        }
        Err(self.unexpected_end())
    }

    /// Read a property key: quoted string (decoded) or a bare word.
    fn read_key(&mut self) -> Result<String, ConfigError> {
        match self.peek() {
            Some(b'"') | Some(b'\'') => {
                let start = self.pos;
                self.skip_string()?;
                decode_string(&self.bytes[start..self.pos])
            }
            Some(b) if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' => {
                let start = self.pos;
                while let Some(b) = self.peek() {
                    if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
            }
            Some(b) => Err(ConfigError::Invalid(format!(
                "unexpected '{}' where a key was expected at offset {}",
                b as char, self.pos
            ))),
            None => Err(self.unexpected_end()),
        }
    }

    /// Skip one value of any kind; `pos` sits on its first byte.
    fn skip_value(&mut self) -> Result<(), ConfigError> {
        match self.peek() {
            Some(b'{') => {
                self.object_layout()?;
                Ok(())
            }
            Some(b'[') => {
                self.pos += 1;
                loop {
                    self.skip_trivia();
                    match self.peek() {
                        Some(b']') => {
                            self.pos += 1;
                            return Ok(());
                        }
                        Some(_) => {
                            self.skip_value()?;
                            self.skip_trivia();
                            if self.peek() == Some(b',') {
                                self.pos += 1;
                            }
                        }
                        None => return Err(self.unexpected_end()),
                    }
                }
            }
            Some(b'"') | Some(b'\'') => self.skip_string(),
            Some(_) => {
                while let Some(b) = self.peek() {
                    if b.is_ascii_whitespace() || matches!(b, b',' | b'}' | b']' | b'/') {
                        break;
                    }
                    self.pos += 1;
                }
                Ok(())
            }
            None => Err(self.unexpected_end()),
        }
    }

    /// Scan the object starting at `pos` (on `{`), recording every property
    /// span. Leaves `pos` just past the closing brace.
    fn object_layout(&mut self) -> Result<ObjectLayout, ConfigError> {
        let open = self.pos;
        self.expect(b'{')?;
        let mut props = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b'}') => {
                    let close = self.pos;
                    self.pos += 1;
                    return Ok(ObjectLayout { open, close, props });
                }
                None => return Err(self.unexpected_end()),
                Some(_) => {}
            }
            let prop_start = self.pos;
            let key = self.read_key()?;
            self.skip_trivia();
            self.expect(b':')?;
            self.skip_trivia();
            let value_start = self.pos;
            self.skip_value()?;
            let value_end = self.pos;
            self.skip_trivia();
            let comma = if self.peek() == Some(b',') {
                let comma = self.pos;
                self.pos += 1;
                Some(comma)
            } else {
                None
            };
            props.push(PropSpan {
                key,
                prop_start,
                value_start,
                value_end,
                comma,
            });
        }
    }
}

/// Decode a quoted JSON(ish) string token, escapes included.
fn decode_string(token: &[u8]) -> Result<String, ConfigError> {
    let body = &token[1..token.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = std::str::from_utf8(body)
        .map_err(|_| ConfigError::Invalid("invalid UTF-8 in key".to_string()))?
        .chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let code = u32::from_str_radix(&hex, 16)
                    .map_err(|_| ConfigError::Invalid(format!("bad escape \\u{hex} in key")))?;
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            Some(other) => out.push(other),
            None => break,
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(text: &str, mutate: impl FnOnce(&mut Value)) -> String {
        let old: Value = serde_json_lenient::from_str(text).unwrap();
        let mut new = old.clone();
        mutate(&mut new);
        apply_patch(text, &old, &new).unwrap()
    }

    #[test]
    fn test_identity_patch_is_byte_identical() {
        let text = "{\n  // keep me\n  \"build\": {\n    \"production\": {}\n  },\n}\n";
        assert_eq!(patch(text, |_| {}), text);
    }

    #[test]
    fn test_replace_scalar_keeps_comments() {
        let text = r#"{
  // node version pin
  "build": {
    "production": {
      "node": "12.0.0"
    }
  }
}"#;
        let result = patch(text, |v| {
            v["build"]["production"]["node"] = json!("18.0.0");
        });
        assert!(result.contains("// node version pin"));
        assert!(result.contains("\"node\": \"18.0.0\""));
        assert!(!result.contains("12.0.0"));
    }

    #[test]
    fn test_insert_after_last_property() {
        let text = "{\n  \"build\": {\n    \"production\": {\n      \"node\": \"18.0.0\"\n    }\n  }\n}";
        let result = patch(text, |v| {
            v["build"]["production"]["channel"] = json!("main");
        });
        assert!(result.contains("\"node\": \"18.0.0\",\n      \"channel\": \"main\""));
    }

    #[test]
    fn test_insert_into_empty_object() {
        let text = "{\n  \"build\": {}\n}";
        let result = patch(text, |v| {
            v["build"]["production"] = json!({"node": "18.0.0"});
        });
        let reparsed: Value = serde_json_lenient::from_str(&result).unwrap();
        assert_eq!(reparsed["build"]["production"]["node"], "18.0.0");
    }

    #[test]
    fn test_insert_respects_trailing_comma_style() {
        let text = "{\n  \"build\": {\n    \"a\": 1,\n  }\n}";
        let result = patch(text, |v| {
            v["build"]["b"] = json!(2);
        });
        let reparsed: Value = serde_json_lenient::from_str(&result).unwrap();
        assert_eq!(reparsed["build"]["b"], 2);
        assert!(result.contains("\"a\": 1,"));
    }

    #[test]
    fn test_remove_middle_property() {
        let text = "{\n  \"a\": 1,\n  \"b\": 2,\n  \"c\": 3\n}";
        let result = patch(text, |v| {
            v.as_object_mut().unwrap().remove("b");
        });
        assert_eq!(result, "{\n  \"a\": 1,\n  \"c\": 3\n}");
    }

    #[test]
    fn test_remove_last_property() {
        let text = "{\n  \"a\": 1,\n  \"b\": 2\n}";
        let result = patch(text, |v| {
            v.as_object_mut().unwrap().remove("b");
        });
        assert_eq!(result, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_remove_only_property() {
        let text = "{\n  \"a\": 1\n}";
        let result = patch(text, |v| {
            v.as_object_mut().unwrap().remove("a");
        });
        assert_eq!(result, "{\n}");
    }

    #[test]
    fn test_nested_replace_leaves_siblings_untouched() {
        let text = r#"{
  "build": {
    /* pinned */
    "base": { "node": "16.0.0" },
    "child": { "extends": "base" }
  }
}"#;
        let result = patch(text, |v| {
            v["build"]["child"]["extends"] = json!("other");
        });
        assert!(result.contains("/* pinned */"));
        assert!(result.contains("\"base\": { \"node\": \"16.0.0\" }"));
        assert!(result.contains("\"extends\": \"other\""));
    }

    #[test]
    fn test_array_replaced_wholesale() {
        let text = "{\n  \"cache\": {\n    \"paths\": [\"a\", \"b\"]\n  }\n}";
        let result = patch(text, |v| {
            v["cache"]["paths"] = json!(["c"]);
        });
        let reparsed: Value = serde_json_lenient::from_str(&result).unwrap();
        assert_eq!(reparsed["cache"]["paths"], json!(["c"]));
    }

    #[test]
    fn test_successive_keys_inserted_in_order() {
        let text = "{\n  \"build\": {\n    \"x\": 1\n  }\n}";
        let result = patch(text, |v| {
            v["build"]["y"] = json!(2);
            v["build"]["z"] = json!(3);
        });
        let y = result.find("\"y\"").unwrap();
        let z = result.find("\"z\"").unwrap();
        assert!(y < z);
    }

    #[test]
    fn test_bare_and_single_quoted_keys_located() {
        let text = "{\n  build: {\n    'production': {\n      \"node\": \"1\"\n    }\n  }\n}";
        let old: Value = serde_json_lenient::from_str("{\"build\":{\"production\":{\"node\":\"1\"}}}").unwrap();
        let mut new = old.clone();
        new["build"]["production"]["node"] = json!("2");
        let result = apply_patch(text, &old, &new).unwrap();
        assert!(result.contains("\"node\": \"2\""));
        assert!(result.contains("'production'"));
    }
}
