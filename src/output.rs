//! CLI output formatting for builds and queries.
//!
//! # Line Shape
//!
//! A document line is `NNN Title → url/`. Build output adds the markdown
//! path on an indented `Source:` line below it; query output adds the
//! modified date and a shortened description instead.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Released
//!     blog/embargoed.md
//!
//! Documents
//! 001 First Post → blog/first-post/
//!     Source: blog/first-post.md
//! 002 About → about/
//!     Source: about.md
//!
//! Skipped (not yet published)
//!     blog/drafts-future.md
//!
//! Listings
//! 001 blog/ (4 documents, 1 page)
//!     Source: blog/index.md
//!
//! Tags → tags/
//! 001 rust (3) → tags/rust/
//!
//! Conflicts
//!     blog/same/ (2 documents)
//!
//! Built 5 documents, 2 listings, 2 taxonomies, 21 files
//! ```
//!
//! ## Query
//!
//! ```text
//! 001 First Post → blog/first-post/
//!     Modified: 2025-01-12
//!     Getting the site off the ground.
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::build::BuildReport;
use crate::document::Document;
use crate::query::PaginatedDocuments;

const DESCRIPTION_WIDTH: usize = 72;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Title shown for a document, or its source path in parens when it has no
/// title.
fn display_title(doc: &Document) -> String {
    match doc.title() {
        Some(t) => t.to_string(),
        None => format!("({})", doc.source_path),
    }
}

/// Document header line: index, title, and URL.
///
/// ```text
/// 001 First Post → blog/first-post/
/// ```
fn document_line(index: usize, doc: &Document) -> String {
    format!(
        "{} {} \u{2192} {}",
        format_index(index),
        display_title(doc),
        doc.url()
    )
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format the summary of a finished build.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.released.is_empty() {
        lines.push("Released".to_string());
        for path in &report.released {
            lines.push(format!("{}{}", indent(1), path.display()));
        }
        lines.push(String::new());
    }

    lines.push("Documents".to_string());
    for (i, doc) in report.documents.iter().enumerate() {
        lines.push(document_line(i + 1, doc));
        lines.push(format!("{}Source: {}", indent(1), doc.source_path));
    }

    if !report.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped (not yet published)".to_string());
        for source in &report.skipped {
            lines.push(format!("{}{}", indent(1), source));
        }
    }

    if !report.listings.is_empty() {
        lines.push(String::new());
        lines.push("Listings".to_string());
        for (i, listing) in report.listings.iter().enumerate() {
            lines.push(format!(
                "{} {} ({}, {})",
                format_index(i + 1),
                listing.base_url,
                plural(listing.documents, "document", "documents"),
                plural(listing.pages, "page", "pages"),
            ));
            lines.push(format!("{}Source: {}", indent(1), listing.source_path));
        }
    }

    for taxonomy in &report.taxonomies {
        lines.push(String::new());
        lines.push(format!(
            "{} \u{2192} {}",
            taxonomy.kind.label(),
            taxonomy.overview_url
        ));
        for (i, (term, url, count)) in taxonomy.archives.iter().enumerate() {
            lines.push(format!(
                "{} {} ({}) \u{2192} {}",
                format_index(i + 1),
                term,
                count,
                url
            ));
        }
    }

    if !report.conflicts.is_empty() {
        lines.push(String::new());
        lines.push("Conflicts".to_string());
        for (url, count) in &report.conflicts {
            lines.push(format!("{}{} ({} documents)", indent(1), url, count));
        }
    }

    if let Some(key) = &report.cached_as {
        lines.push(String::new());
        lines.push(format!("Cached snapshot as '{key}'"));
    }

    lines.push(String::new());
    lines.push(format!(
        "Built {}, {}, {}, {}",
        plural(report.documents.len(), "document", "documents"),
        plural(report.listings.len(), "listing", "listings"),
        plural(report.taxonomies.len(), "taxonomy", "taxonomies"),
        plural(report.files_written, "file", "files"),
    ));

    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Query output
// ============================================================================

/// Format a list of query results.
pub fn format_documents(documents: &[&Document]) -> Vec<String> {
    if documents.is_empty() {
        return vec!["No documents found".to_string()];
    }
    let mut lines = Vec::new();
    for (i, doc) in documents.iter().enumerate() {
        lines.push(document_line(i + 1, doc));
        if let Some(modified) = doc.modified_at() {
            lines.push(format!("{}Modified: {}", indent(1), modified.format("%Y-%m-%d")));
        }
        if let Some(description) = doc.description() {
            lines.push(format!(
                "{}{}",
                indent(1),
                truncate_desc(description, DESCRIPTION_WIDTH)
            ));
        }
    }
    lines
}

/// Format one page of the collection with a position footer.
pub fn format_page(page: &PaginatedDocuments<'_>) -> Vec<String> {
    let mut lines = format_documents(&page.documents);
    lines.push(String::new());
    lines.push(format!(
        "Page {} of {} ({} total)",
        page.current_page,
        page.total_pages,
        plural(page.total_count, "document", "documents"),
    ));
    lines
}

/// Format a term list, one term per line.
pub fn format_terms(terms: &[&str]) -> Vec<String> {
    if terms.is_empty() {
        return vec!["No terms found".to_string()];
    }
    terms
        .iter()
        .enumerate()
        .map(|(i, term)| format!("{} {}", format_index(i + 1), term))
        .collect()
}

/// Print lines produced by one of the query formatters.
pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
