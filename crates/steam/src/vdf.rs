//! Text KeyValues (VDF/ACF) parser.
//!
//! Steam writes its manifests while the client is running, so a file may be
//! truncated or otherwise malformed when read. The parser never fails: stray
//! braces, junk lines and dangling keys are absorbed into a best-effort tree
//! and counted in [`ParseDiagnostics`].

use std::fs;
use std::path::Path;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::trace;

use crate::SteamError;

/// A value stored under a key: either a string or a nested object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum ParseValue {
    Scalar(String),
    Object(ParseNode),
}

impl ParseValue {
    /// Returns the string content if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParseValue::Scalar(s) => Some(s),
            ParseValue::Object(_) => None,
        }
    }

    /// Returns the nested object if this is one.
    pub fn as_object(&self) -> Option<&ParseNode> {
        match self {
            ParseValue::Scalar(_) => None,
            ParseValue::Object(node) => Some(node),
        }
    }
}

/// An object in the parsed tree. Keys are unique and keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseNode {
    entries: Vec<(String, ParseValue)>,
}

impl ParseNode {
    pub fn get(&self, key: &str) -> Option<&ParseValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParseValue::as_str)
    }

    pub fn get_object(&self, key: &str) -> Option<&ParseNode> {
        self.get(key).and_then(ParseValue::as_object)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParseValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ParseNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Counters for malformed input absorbed during a parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// `{` lines with no pending key.
    pub orphan_open_braces: usize,
    /// `}` lines seen with only the root open.
    pub unmatched_close_braces: usize,
    /// Lines that were neither a brace, a comment nor a quoted token.
    pub unrecognized_lines: usize,
    /// Pending keys replaced by another key before receiving a value.
    pub superseded_keys: usize,
    /// Objects still open when the input ended.
    pub unclosed_objects: usize,
    /// A pending key was left over at end of input.
    pub dangling_key: bool,
}

impl ParseDiagnostics {
    /// Returns true when the input was well-formed.
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

/// Reads a text VDF file and parses it.
pub fn load_text_vdf(path: &Path) -> Result<ParseNode, SteamError> {
    let text = fs::read_to_string(path).map_err(|source| SteamError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse(&text))
}

/// Parses text VDF into a tree. Never fails.
pub fn parse(text: &str) -> ParseNode {
    parse_with_diagnostics(text).0
}

/// Parses text VDF and reports what malformed input was absorbed.
pub fn parse_with_diagnostics(text: &str) -> (ParseNode, ParseDiagnostics) {
    let mut diag = ParseDiagnostics::default();

    // Frame 0 is the root. The stack holds arena indices, never references.
    let mut arena: Vec<Frame> = vec![Frame::default()];
    let mut stack: Vec<usize> = vec![0];
    let mut pending_key: Option<String> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with("//") {
            continue;
        }

        let top = stack.last().copied().unwrap_or(0);

        match line {
            "{" => match pending_key.take() {
                Some(key) => {
                    let child = arena.len();
                    arena.push(Frame::default());
                    arena[top].insert(key, Slot::Child(child));
                    stack.push(child);
                }
                None => {
                    trace!(line = line_no, "ignoring '{{' without a key");
                    diag.orphan_open_braces += 1;
                }
            },
            "}" => {
                if stack.len() > 1 {
                    stack.pop();
                } else {
                    trace!(line = line_no, "ignoring '}}' at root level");
                    diag.unmatched_close_braces += 1;
                }
            }
            _ => match scan_tokens(line) {
                Some((key, Some(value))) => {
                    arena[top].insert(key.to_string(), Slot::Scalar(value.to_string()));
                    pending_key = None;
                }
                Some((key, None)) => {
                    if let Some(prev) = pending_key.replace(key.to_string()) {
                        trace!(line = line_no, key = %prev, "dropping key with no value");
                        diag.superseded_keys += 1;
                    }
                }
                None => {
                    trace!(line = line_no, "ignoring unrecognized line");
                    diag.unrecognized_lines += 1;
                }
            },
        }
    }

    diag.unclosed_objects = stack.len() - 1;
    diag.dangling_key = pending_key.is_some();
    if diag.unclosed_objects > 0 {
        trace!(count = diag.unclosed_objects, "input ended with open objects");
    }

    (assemble(arena), diag)
}

#[derive(Debug)]
enum Slot {
    Scalar(String),
    Child(usize),
}

#[derive(Debug, Default)]
struct Frame {
    entries: Vec<(String, Slot)>,
}

impl Frame {
    /// Inserts or replaces in place, keeping the key's original position.
    fn insert(&mut self, key: String, slot: Slot) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = slot,
            None => self.entries.push((key, slot)),
        }
    }
}

/// Folds the arena into an owned tree.
///
/// A child is always allocated after its parent, so walking the arena from
/// the back guarantees every child is built before it is needed. Frames that
/// lost their slot to a later assignment are simply never taken.
fn assemble(mut arena: Vec<Frame>) -> ParseNode {
    let mut built: Vec<Option<ParseNode>> = Vec::with_capacity(arena.len());
    built.resize_with(arena.len(), || None);

    for idx in (0..arena.len()).rev() {
        let frame = std::mem::take(&mut arena[idx]);
        let entries = frame
            .entries
            .into_iter()
            .map(|(key, slot)| {
                let value = match slot {
                    Slot::Scalar(s) => ParseValue::Scalar(s),
                    Slot::Child(child) => {
                        let node = built[child].take();
                        debug_assert!(node.is_some(), "frame {child} not built before {idx}");
                        ParseValue::Object(node.unwrap_or_default())
                    }
                };
                (key, value)
            })
            .collect();
        built[idx] = Some(ParseNode { entries });
    }

    built
        .into_iter()
        .next()
        .flatten()
        .unwrap_or_default()
}

/// Matches `"key"` optionally followed by `"value"` at the start of a line.
///
/// Anything after the last matched token is ignored.
fn scan_tokens(line: &str) -> Option<(&str, Option<&str>)> {
    let (key, rest) = quoted(line)?;
    let value = quoted(rest.trim_start()).map(|(v, _)| v);
    Some((key, value))
}

/// Splits a leading double-quoted token off `s`.
fn quoted(s: &str) -> Option<(&str, &str)> {
    let body = s.strip_prefix('"')?;
    let end = body.find('"')?;
    Some((&body[..end], &body[end + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\"AppState\"\n{\n\"StateFlags\"\t\"4\"\n\"buildid\"\t\"123\"\n}\n";

    #[test]
    fn parse_nested_app_state() {
        let root = parse(MANIFEST);
        assert_eq!(root.len(), 1);
        let app = root.get_object("AppState").unwrap();
        assert_eq!(app.get_str("StateFlags"), Some("4"));
        assert_eq!(app.get_str("buildid"), Some("123"));
    }

    #[test]
    fn parse_is_deterministic() {
        assert_eq!(parse(MANIFEST), parse(MANIFEST));
    }

    #[test]
    fn comments_and_blank_lines_yield_empty_root() {
        let text = "// header\n\n   \n\t// another comment\n";
        let (root, diag) = parse_with_diagnostics(text);
        assert!(root.is_empty());
        assert!(diag.is_clean());
        assert!(parse("").is_empty());
    }

    #[test]
    fn leading_close_braces_are_absorbed() {
        let (root, diag) = parse_with_diagnostics("}\n}\n\"k\" \"v\"\n");
        assert_eq!(root.get_str("k"), Some("v"));
        assert_eq!(diag.unmatched_close_braces, 2);
    }

    #[test]
    fn open_brace_without_key_is_ignored() {
        let (root, diag) = parse_with_diagnostics("{\n\"a\" \"1\"\n}\n");
        assert_eq!(root.get_str("a"), Some("1"));
        assert_eq!(diag.orphan_open_braces, 1);
        // The closing brace had nothing to pop.
        assert_eq!(diag.unmatched_close_braces, 1);
    }

    #[test]
    fn truncated_file_keeps_partial_tree() {
        let text = "\"AppState\"\n{\n\"appid\" \"10\"\n\"UserConfig\"\n{\n\"language\" \"english\"\n";
        let (root, diag) = parse_with_diagnostics(text);
        let app = root.get_object("AppState").unwrap();
        assert_eq!(app.get_str("appid"), Some("10"));
        assert_eq!(
            app.get_object("UserConfig").unwrap().get_str("language"),
            Some("english")
        );
        assert_eq!(diag.unclosed_objects, 2);
    }

    #[test]
    fn superseded_and_dangling_keys_are_dropped() {
        let (root, diag) = parse_with_diagnostics("\"lost\"\n\"kept\"\n{\n}\n\"tail\"\n");
        assert_eq!(root.keys().collect::<Vec<_>>(), vec!["kept"]);
        assert!(root.get_object("kept").unwrap().is_empty());
        assert_eq!(diag.superseded_keys, 1);
        assert!(diag.dangling_key);
    }

    #[test]
    fn reassignment_overwrites_in_place() {
        let root = parse("\"a\" \"1\"\n\"b\" \"2\"\n\"a\" \"3\"\n");
        let pairs: Vec<_> = root
            .iter()
            .map(|(k, v)| (k, v.as_str().unwrap()))
            .collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn scalar_replaces_earlier_object() {
        let root = parse("\"a\"\n{\n\"x\" \"1\"\n}\n\"a\" \"flat\"\n");
        assert_eq!(root.get_str("a"), Some("flat"));
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn replaced_and_reopened_objects_assemble() {
        // "a" is opened twice; the first frame is orphaned in the arena.
        let text = "\"a\"\n{\n\"x\" \"1\"\n}\n\"b\"\n{\n\"c\"\n{\n}\n}\n\"a\"\n{\n\"y\" \"2\"\n}\n";
        let root = parse(text);
        let a = root.get_object("a").unwrap();
        assert_eq!(a.get_str("y"), Some("2"));
        assert!(a.get_str("x").is_none());
        assert!(root.get_object("b").unwrap().get_object("c").unwrap().is_empty());
        assert_eq!(root.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn unrecognized_lines_are_counted() {
        let (root, diag) = parse_with_diagnostics("garbage\n\"unterminated\n\"ok\" \"yes\"\n");
        assert_eq!(root.get_str("ok"), Some("yes"));
        assert_eq!(diag.unrecognized_lines, 2);
    }

    #[test]
    fn empty_value_and_trailing_text() {
        let root = parse("\"name\"\t\t\"\"\n\"size\" \"42\" // bytes\n");
        assert_eq!(root.get_str("name"), Some(""));
        assert_eq!(root.get_str("size"), Some("42"));
    }

    #[test]
    fn deep_nesting_does_not_recurse_while_parsing() {
        let depth = 2_000;
        let mut text = String::new();
        for i in 0..depth {
            text.push_str(&format!("\"k{i}\"\n{{\n"));
        }
        text.push_str("\"leaf\" \"v\"\n");
        let (root, diag) = parse_with_diagnostics(&text);
        assert_eq!(diag.unclosed_objects, depth);

        let mut node = &root;
        for i in 0..depth {
            node = node.get_object(&format!("k{i}")).unwrap();
        }
        assert_eq!(node.get_str("leaf"), Some("v"));
    }

    #[test]
    fn serializes_as_ordered_json() {
        let root = parse("\"z\" \"1\"\n\"a\"\n{\n\"b\" \"2\"\n}\n");
        let json = serde_json::to_string(&root).unwrap();
        assert_eq!(json, r#"{"z":"1","a":{"b":"2"}}"#);
    }

    #[test]
    fn load_text_vdf_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("libraryfolders.vdf");
        fs::write(&path, "\"libraryfolders\"\n{\n\"0\"\n{\n\"path\" \"/games\"\n}\n}\n").unwrap();

        let root = load_text_vdf(&path).unwrap();
        let folder = root
            .get_object("libraryfolders")
            .and_then(|n| n.get_object("0"))
            .unwrap();
        assert_eq!(folder.get_str("path"), Some("/games"));
    }

    #[test]
    fn load_text_vdf_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_text_vdf(&dir.path().join("missing.vdf")).unwrap_err();
        assert!(err.to_string().contains("missing.vdf"));
    }
}
