//! Shared test utilities for the quire test suite.
//!
//! Provides fixture setup, document constructors, lookup helpers, and a stub
//! template renderer for exercising template fallback chains.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let report = Builder::new(&config, tmp.path(), out, &CommonMarkRenderer, &BuiltinTemplates)
//!     .with_clock(fixed_now())
//!     .run()
//!     .unwrap();
//!
//! let post = find_doc(&report.documents, "blog/first-post.md");
//! assert_eq!(post.url(), "blog/first-post/");
//! ```

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

use crate::document::Document;
use crate::render::{RenderError, TemplateContext, TemplateRenderer};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate (embargo release renames
/// files) without affecting other tests or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Reference clock for publish and embargo checks: 2025-06-01T00:00:00Z.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

// =========================================================================
// Document construction
// =========================================================================

/// A document with the given front-matter and URL. An empty `url` leaves
/// the document unresolved.
pub fn doc(source_path: &str, url: &str, fields: Value) -> Document {
    let Value::Object(fields) = fields else {
        panic!("fields for '{source_path}' must be a JSON object, got {fields}");
    };
    let mut document = Document::new(source_path, fields, "");
    if !url.is_empty() {
        document.generated_url = Some(url.to_string());
    }
    document
}

/// A document with no front-matter, resolved to `url`.
pub fn doc_at(source_path: &str, url: &str) -> Document {
    doc(source_path, url, Value::Object(Default::default()))
}

// =========================================================================
// Lookups and extractors
// =========================================================================

/// Find a document by source path. Panics if not found.
pub fn find_doc<'a>(documents: &'a [Document], source_path: &str) -> &'a Document {
    documents
        .iter()
        .find(|d| d.source_path == source_path)
        .unwrap_or_else(|| {
            let paths: Vec<&str> = documents.iter().map(|d| d.source_path.as_str()).collect();
            panic!("document '{source_path}' not found. Available: {paths:?}")
        })
}

/// Source paths of a document list, in order.
pub fn source_paths<'a>(documents: &[&'a Document]) -> Vec<&'a str> {
    documents.iter().map(|d| d.source_path.as_str()).collect()
}

// =========================================================================
// Stub templates
// =========================================================================

/// Knows only the listed template ids and renders `"{id}:{title}"`.
pub struct StubTemplates {
    ids: Vec<String>,
}

impl StubTemplates {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            ids: ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}

impl TemplateRenderer for StubTemplates {
    fn has_template(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    fn render(&self, id: &str, context: &TemplateContext<'_>) -> Result<Vec<u8>, RenderError> {
        if !self.has_template(id) {
            return Err(RenderError::UnknownTemplate(id.to_string()));
        }
        Ok(format!("{id}:{}", context.title).into_bytes())
    }
}
