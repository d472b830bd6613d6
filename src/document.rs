//! Source documents: front-matter parsing and field accessors.
//!
//! A source file is an optional YAML front-matter block followed by a
//! markdown body:
//!
//! ```text
//! ---
//! title: First Post
//! published: 2024-01-15
//! tags: [rust, web]
//! ---
//! # Hello
//! ```
//!
//! The block opens on a first line of exactly `---` and closes on the next
//! line of exactly `---`. A file without the opening line has no fields and
//! its whole content is the body. Field order is preserved as written, and
//! keys the crate does not know about are carried verbatim so templates and
//! header synthesis can use them.

use crate::dates;
use crate::taxonomy::TaxonomyKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Borrow;
use thiserror::Error;

/// Ordered front-matter map.
pub type Fields = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{path}: front-matter block is never closed")]
    Unterminated { path: String },
    #[error("{path}: invalid front-matter: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{path}: front-matter must be a mapping of keys to values")]
    NotAMapping { path: String },
    #[error("{path}: `{field}` must be a list of non-empty strings")]
    InvalidTerms { path: String, field: &'static str },
}

/// One parsed source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Path relative to the source root, `/`-separated.
    pub source_path: String,
    pub fields: Fields,
    /// Raw markdown body.
    pub body: String,
    /// Body HTML, filled in by the build.
    #[serde(default)]
    pub rendered_content: Option<String>,
    /// Relative output URL with a trailing slash.
    #[serde(default)]
    pub generated_url: Option<String>,
    #[serde(default)]
    pub absolute_url: Option<String>,
}

impl Document {
    pub fn new(source_path: impl Into<String>, fields: Fields, body: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            fields,
            body: body.into(),
            rendered_content: None,
            generated_url: None,
            absolute_url: None,
        }
    }

    /// String value of a field, if present and a string.
    pub fn field_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.field_str("title")
    }

    pub fn description(&self) -> Option<&str> {
        self.field_str("description")
    }

    pub fn tags(&self) -> Vec<&str> {
        self.terms(TaxonomyKind::Tag)
    }

    pub fn categories(&self) -> Vec<&str> {
        self.terms(TaxonomyKind::Category)
    }

    /// Terms of one taxonomy kind in front-matter order.
    pub fn terms(&self, kind: TaxonomyKind) -> Vec<&str> {
        match self.fields.get(kind.field()) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn has_term(&self, kind: TaxonomyKind, term: &str) -> bool {
        self.terms(kind).contains(&term)
    }

    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.fields.get("published").and_then(dates::parse_timestamp)
    }

    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        self.fields.get("modified").and_then(dates::parse_timestamp)
    }

    /// A document is published when `published` parses and is not in the future.
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        dates::is_past(self.fields.get("published"), now)
    }

    /// Merge `defaults` underneath the parsed front-matter.
    ///
    /// Front-matter keys win; default keys the document does not set are
    /// added. The merge is shallow.
    pub fn apply_defaults(&mut self, defaults: &Fields) {
        if defaults.is_empty() {
            return;
        }
        let mut merged = defaults.clone();
        for (key, value) in std::mem::take(&mut self.fields) {
            merged.insert(key, value);
        }
        self.fields = merged;
    }

    /// The URL this document was resolved to, or an empty string before
    /// resolution.
    pub fn url(&self) -> &str {
        self.generated_url.as_deref().unwrap_or("")
    }
}

/// Sort newest-modified first. Undated documents sort last; ties keep their
/// relative order.
pub fn sort_newest_first<D: Borrow<Document>>(docs: &mut [D]) {
    docs.sort_by(|a, b| b.borrow().modified_at().cmp(&a.borrow().modified_at()));
}

/// Parse one source file.
pub fn parse_document(source_path: &str, content: &str) -> Result<Document, ParseError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some((yaml, body)) = split_front_matter(source_path, content)? else {
        return Ok(Document::new(source_path, Fields::new(), content));
    };

    let fields = parse_fields(source_path, yaml)?;
    for kind in [TaxonomyKind::Tag, TaxonomyKind::Category] {
        validate_terms(source_path, &fields, kind)?;
    }

    Ok(Document::new(source_path, fields, body))
}

/// Returns `(yaml, body)` when the content opens with a delimiter line.
fn split_front_matter<'a>(
    source_path: &str,
    content: &'a str,
) -> Result<Option<(&'a str, &'a str)>, ParseError> {
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return Ok(None);
    };
    if !is_delimiter(first) {
        return Ok(None);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        if is_delimiter(line) {
            let yaml = &content[yaml_start..offset];
            let body = content[offset + line.len()..].trim_start_matches(['\r', '\n']);
            return Ok(Some((yaml, body)));
        }
        offset += line.len();
    }

    Err(ParseError::Unterminated {
        path: source_path.to_string(),
    })
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "---"
}

fn parse_fields(source_path: &str, yaml: &str) -> Result<Fields, ParseError> {
    if yaml.trim().is_empty() {
        return Ok(Fields::new());
    }
    let value: Value = serde_yaml::from_str(yaml).map_err(|source| ParseError::Yaml {
        path: source_path.to_string(),
        source,
    })?;
    match value {
        Value::Object(fields) => Ok(fields),
        Value::Null => Ok(Fields::new()),
        _ => Err(ParseError::NotAMapping {
            path: source_path.to_string(),
        }),
    }
}

/// `tags` and `categories` must be lists of non-empty strings when set.
/// An explicit null is treated as unset.
fn validate_terms(source_path: &str, fields: &Fields, kind: TaxonomyKind) -> Result<(), ParseError> {
    let valid = match fields.get(kind.field()) {
        None | Some(Value::Null) => true,
        Some(Value::Array(items)) => items
            .iter()
            .all(|item| item.as_str().is_some_and(|s| !s.trim().is_empty())),
        Some(_) => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ParseError::InvalidTerms {
            path: source_path.to_string(),
            field: kind.field(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    // =========================================================================
    // Front-matter splitting
    // =========================================================================

    #[test]
    fn parses_fields_and_body() {
        let doc = parse_document(
            "blog/first.md",
            "---\ntitle: First Post\ntags: [rust, web]\n---\n# Hello\n",
        )
        .unwrap();

        assert_eq!(doc.source_path, "blog/first.md");
        assert_eq!(doc.title(), Some("First Post"));
        assert_eq!(doc.tags(), vec!["rust", "web"]);
        assert_eq!(doc.body, "# Hello\n");
        assert!(doc.rendered_content.is_none());
        assert!(doc.generated_url.is_none());
    }

    #[test]
    fn no_front_matter_means_empty_fields() {
        let doc = parse_document("notes.md", "Just text\n---\nmore").unwrap();
        assert!(doc.fields.is_empty());
        assert_eq!(doc.body, "Just text\n---\nmore");
    }

    #[test]
    fn empty_block_is_empty_fields() {
        let doc = parse_document("a.md", "---\n---\nbody").unwrap();
        assert!(doc.fields.is_empty());
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn crlf_and_bom_are_tolerated() {
        let doc = parse_document("a.md", "\u{feff}---\r\ntitle: Windows\r\n---\r\nbody").unwrap();
        assert_eq!(doc.title(), Some("Windows"));
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn unterminated_block_is_error() {
        let err = parse_document("broken.md", "---\ntitle: Oops\nbody").unwrap_err();
        assert!(matches!(err, ParseError::Unterminated { .. }));
        assert!(err.to_string().contains("broken.md"));
    }

    #[test]
    fn invalid_yaml_is_error() {
        let err = parse_document("bad.md", "---\ntitle: [unclosed\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::Yaml { .. }));
    }

    #[test]
    fn scalar_block_is_error() {
        let err = parse_document("bad.md", "---\njust a string\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::NotAMapping { .. }));
    }

    // =========================================================================
    // Field shapes
    // =========================================================================

    #[test]
    fn values_keep_their_shape_and_order() {
        let doc = parse_document(
            "a.md",
            "---\nzeta: 1\nalpha: text\nog:\n  type: article\nflags: [a, b]\n---\n",
        )
        .unwrap();

        let keys: Vec<&str> = doc.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "og", "flags"]);
        assert_eq!(doc.fields["zeta"], json!(1));
        assert_eq!(doc.fields["og"], json!({"type": "article"}));
        assert_eq!(doc.fields["flags"], json!(["a", "b"]));
    }

    #[test]
    fn tags_must_be_a_list() {
        let err = parse_document("a.md", "---\ntags: rust\n---\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidTerms { field: "tags", .. }));
    }

    #[test]
    fn categories_must_not_contain_empty_strings() {
        let err = parse_document("a.md", "---\ncategories: [Dev, '']\n---\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidTerms {
                field: "categories",
                ..
            }
        ));
    }

    #[test]
    fn null_tags_are_unset() {
        let doc = parse_document("a.md", "---\ntags:\n---\n").unwrap();
        assert!(doc.tags().is_empty());
    }

    // =========================================================================
    // Dates and defaults
    // =========================================================================

    #[test]
    fn publish_check_uses_published_field() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let past = parse_document("a.md", "---\npublished: 2024-01-01\n---\n").unwrap();
        let future = parse_document("b.md", "---\npublished: 2999-01-01\n---\n").unwrap();
        let missing = parse_document("c.md", "---\ntitle: x\n---\n").unwrap();

        assert!(past.is_published(now));
        assert!(!future.is_published(now));
        assert!(!missing.is_published(now));
    }

    #[test]
    fn defaults_sit_under_front_matter() {
        let mut doc = parse_document("a.md", "---\ntitle: Mine\n---\n").unwrap();
        let mut defaults = Fields::new();
        defaults.insert("title".into(), json!("Default"));
        defaults.insert("locale".into(), json!("en"));

        doc.apply_defaults(&defaults);

        assert_eq!(doc.title(), Some("Mine"));
        assert_eq!(doc.field_str("locale"), Some("en"));
    }

    #[test]
    fn sort_newest_first_is_stable_and_puts_undated_last() {
        let a = parse_document("a.md", "---\nmodified: 2024-01-01\n---\n").unwrap();
        let b = parse_document("b.md", "---\ntitle: undated\n---\n").unwrap();
        let c = parse_document("c.md", "---\nmodified: 2024-06-01\n---\n").unwrap();
        let d = parse_document("d.md", "---\nmodified: 2024-01-01\n---\n").unwrap();

        let mut docs = vec![&a, &b, &c, &d];
        sort_newest_first(&mut docs);

        let order: Vec<&str> = docs.iter().map(|d| d.source_path.as_str()).collect();
        assert_eq!(order, vec!["c.md", "a.md", "d.md", "b.md"]);
    }

    #[test]
    fn document_serializes_through_json() {
        let mut doc = parse_document("a.md", "---\ntitle: T\n---\nbody").unwrap();
        doc.generated_url = Some("a/".into());
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
