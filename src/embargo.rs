//! Embargoed draft release.
//!
//! A draft named `name.<n>.emb.md` stays out of the build until its
//! `modified` timestamp has passed. Releasing renames it to `name.md`, which
//! makes it an ordinary content file for discovery. Several numbered
//! variants of the same name may be queued; they are processed in reverse
//! path order so the lowest number is promoted last and ends up as `name.md`.
//!
//! Release never deletes anything. A variant whose date is missing, invalid,
//! or in the future is left untouched.

use crate::dates;
use crate::document::{self, ParseError};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

static EMBARGO_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.\d+\.emb\.md$").expect("embargo marker pattern is valid")
});

#[derive(Error, Debug)]
pub enum EmbargoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// True for file names like `post.2.emb.md`.
pub fn is_embargo_file(file_name: &str) -> bool {
    EMBARGO_MARKER.is_match(file_name)
}

/// File name with the embargo marker replaced by `.md`.
pub fn released_name(file_name: &str) -> String {
    EMBARGO_MARKER.replace(file_name, ".md").into_owned()
}

/// Promote every due embargo file under `root`, skipping hidden entries the
/// way discovery does. Returns each released path once (relative to `root`,
/// after renaming) in the order it was first written.
pub fn release_embargoed(root: &Path, now: DateTime<Utc>) -> Result<Vec<PathBuf>, EmbargoError> {
    let mut candidates = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_embargo_file(&entry.file_name().to_string_lossy()) {
            candidates.push(entry.into_path());
        }
    }

    let mut released = Vec::new();
    for path in candidates.into_iter().rev() {
        let relative = relative_display(root, &path);
        let content = fs::read_to_string(&path)?;
        let doc = document::parse_document(&relative, &content)?;

        if !dates::is_past(doc.fields.get("modified"), now) {
            debug!(file = %relative, "embargo still in effect");
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let target = path.with_file_name(released_name(&file_name));
        fs::rename(&path, &target)?;
        info!(from = %relative, to = %relative_display(root, &target), "released embargoed file");
        let target = target.strip_prefix(root).unwrap_or(&target).to_path_buf();
        if !released.contains(&target) {
            released.push(target);
        }
    }

    Ok(released)
}

fn relative_display(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
