//! Tag and category indexing, plus archive and overview page planning.
//!
//! The index is always rebuilt from the full document set. Terms are exact,
//! case-sensitive strings kept in order of first appearance; each term's
//! bucket lists documents in discovery order. Slugging only happens when
//! planning archive URLs.
//!
//! ```text
//! tags/                 overview of all tags
//! tags/rust/            archive of documents tagged "rust"
//! tags/web-dev/         archive of documents tagged "Web Dev"
//! ```

use crate::document::{self, Document};
use crate::slug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The two taxonomies a document can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxonomyKind {
    Tag,
    Category,
}

impl TaxonomyKind {
    pub const ALL: [TaxonomyKind; 2] = [TaxonomyKind::Tag, TaxonomyKind::Category];

    /// Front-matter field holding this taxonomy's terms.
    pub fn field(self) -> &'static str {
        match self {
            TaxonomyKind::Tag => "tags",
            TaxonomyKind::Category => "categories",
        }
    }

    pub fn default_route_prefix(self) -> &'static str {
        self.field()
    }

    /// Kind-specific overview template id.
    pub fn overview_template(self) -> &'static str {
        match self {
            TaxonomyKind::Tag => "tags-overview",
            TaxonomyKind::Category => "categories-overview",
        }
    }

    /// Capitalized plural, used in page titles.
    pub fn label(self) -> &'static str {
        match self {
            TaxonomyKind::Tag => "Tags",
            TaxonomyKind::Category => "Categories",
        }
    }
}

/// Documents carrying one term.
#[derive(Debug)]
pub struct TermBucket<'a> {
    pub term: &'a str,
    pub documents: Vec<&'a Document>,
}

/// Term → documents index for one taxonomy kind.
#[derive(Debug)]
pub struct TaxonomyIndex<'a> {
    kind: TaxonomyKind,
    buckets: Vec<TermBucket<'a>>,
    positions: HashMap<&'a str, usize>,
}

impl<'a> TaxonomyIndex<'a> {
    /// Index every document's terms of `kind`. A document that repeats a
    /// term appears once in that term's bucket.
    pub fn build(kind: TaxonomyKind, documents: &'a [Document]) -> Self {
        let mut buckets: Vec<TermBucket<'a>> = Vec::new();
        let mut positions: HashMap<&'a str, usize> = HashMap::new();

        for doc in documents {
            for term in doc.terms(kind) {
                let pos = *positions.entry(term).or_insert_with(|| {
                    buckets.push(TermBucket {
                        term,
                        documents: Vec::new(),
                    });
                    buckets.len() - 1
                });
                let bucket = &mut buckets[pos];
                if !bucket.documents.last().is_some_and(|d| std::ptr::eq(*d, doc)) {
                    bucket.documents.push(doc);
                }
            }
        }

        Self {
            kind,
            buckets,
            positions,
        }
    }

    pub fn kind(&self) -> TaxonomyKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Terms in order of first appearance.
    pub fn terms(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.buckets.iter().map(|b| b.term)
    }

    pub fn buckets(&self) -> &[TermBucket<'a>] {
        &self.buckets
    }

    /// Documents carrying `term`, in discovery order. Empty for unknown terms.
    pub fn documents_for(&self, term: &str) -> &[&'a Document] {
        self.positions
            .get(term)
            .map(|&pos| self.buckets[pos].documents.as_slice())
            .unwrap_or(&[])
    }
}

/// One term's archive page.
#[derive(Debug)]
pub struct ArchivePage<'a> {
    pub kind: TaxonomyKind,
    pub term: &'a str,
    pub slug: String,
    /// Relative URL, e.g. `tags/rust/`.
    pub url: String,
    /// Newest-modified first.
    pub documents: Vec<&'a Document>,
}

impl ArchivePage<'_> {
    pub fn title(&self) -> String {
        format!("{}: {}", self.kind.label(), self.term)
    }

    pub fn description(&self) -> String {
        format!("Articles tagged with {}", self.term)
    }
}

/// Overview row for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermSummary {
    pub name: String,
    pub slug: String,
    pub count: usize,
    pub url: String,
}

/// All terms of one kind, for the overview page.
#[derive(Debug, Clone)]
pub struct Overview {
    pub kind: TaxonomyKind,
    /// Relative URL, e.g. `tags/`.
    pub url: String,
    /// Most-used first; equal counts keep first-appearance order.
    pub by_count: Vec<TermSummary>,
    /// Case-insensitive alphabetical order.
    pub alphabetical: Vec<TermSummary>,
}

impl Overview {
    pub fn title(&self, site_name: &str) -> String {
        format!("{} - {}", self.kind.label(), site_name)
    }

    pub fn description(&self) -> String {
        format!(
            "Browse all {} and explore articles by topic.",
            self.kind.field()
        )
    }
}

/// Normalized prefix: no leading or trailing slashes.
fn prefix_root(route_prefix: &str) -> &str {
    route_prefix.trim_matches('/')
}

/// Relative URL of a term's archive page.
pub fn term_url(route_prefix: &str, term: &str) -> String {
    format!("{}/{}/", prefix_root(route_prefix), slug::term_slug(term))
}

/// Plan one archive page per term.
pub fn archive_pages<'a>(index: &TaxonomyIndex<'a>, route_prefix: &str) -> Vec<ArchivePage<'a>> {
    index
        .buckets()
        .iter()
        .map(|bucket| {
            let mut documents = bucket.documents.clone();
            document::sort_newest_first(&mut documents);
            ArchivePage {
                kind: index.kind(),
                term: bucket.term,
                slug: slug::term_slug(bucket.term),
                url: term_url(route_prefix, bucket.term),
                documents,
            }
        })
        .collect()
}

/// Plan the overview page, or `None` when the index has no terms.
pub fn overview(index: &TaxonomyIndex<'_>, route_prefix: &str) -> Option<Overview> {
    if index.is_empty() {
        return None;
    }

    let summaries: Vec<TermSummary> = index
        .buckets()
        .iter()
        .map(|bucket| TermSummary {
            name: bucket.term.to_string(),
            slug: slug::term_slug(bucket.term),
            count: bucket.documents.len(),
            url: term_url(route_prefix, bucket.term),
        })
        .collect();

    let mut by_count = summaries.clone();
    by_count.sort_by(|a, b| b.count.cmp(&a.count));

    let mut alphabetical = summaries;
    alphabetical.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    Some(Overview {
        kind: index.kind(),
        url: format!("{}/", prefix_root(route_prefix)),
        by_count,
        alphabetical,
    })
}

/// Template ids to try for a term archive, most specific first.
pub fn archive_template_chain<'c>(archive_template: &'c str, list_chain: &[&'c str]) -> Vec<&'c str> {
    dedup_chain(std::iter::once(archive_template).chain(list_chain.iter().copied()))
}

/// Template ids to try for an overview page, most specific first.
pub fn overview_template_chain<'c>(
    kind: TaxonomyKind,
    archive_template: &'c str,
    list_chain: &[&'c str],
) -> Vec<&'c str> {
    dedup_chain(
        [kind.overview_template(), archive_template]
            .into_iter()
            .chain(list_chain.iter().copied()),
    )
}

fn dedup_chain<'c>(ids: impl Iterator<Item = &'c str>) -> Vec<&'c str> {
    let mut chain: Vec<&str> = Vec::new();
    for id in ids {
        if !chain.contains(&id) {
            chain.push(id);
        }
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::doc;
    use serde_json::json;

    fn sample() -> Vec<Document> {
        vec![
            doc("a.md", "a/", json!({"tags": ["rust", "web"], "categories": ["Dev"], "modified": "2024-01-01"})),
            doc("b.md", "b/", json!({"tags": ["web"], "modified": "2024-03-01"})),
            doc("c.md", "c/", json!({"tags": ["Rust", "rust"], "modified": "2024-02-01"})),
            doc("d.md", "d/", json!({"title": "untagged"})),
        ]
    }

    fn paths<'a>(docs: &[&'a Document]) -> Vec<&'a str> {
        docs.iter().map(|d| d.source_path.as_str()).collect()
    }

    // =========================================================================
    // Indexing
    // =========================================================================

    #[test]
    fn terms_keep_first_appearance_order() {
        let docs = sample();
        let index = TaxonomyIndex::build(TaxonomyKind::Tag, &docs);
        let terms: Vec<&str> = index.terms().collect();
        assert_eq!(terms, vec!["rust", "web", "Rust"]);
    }

    #[test]
    fn buckets_keep_discovery_order() {
        let docs = sample();
        let index = TaxonomyIndex::build(TaxonomyKind::Tag, &docs);
        assert_eq!(paths(index.documents_for("rust")), vec!["a.md", "c.md"]);
        assert_eq!(paths(index.documents_for("web")), vec!["a.md", "b.md"]);
        assert!(index.documents_for("missing").is_empty());
    }

    #[test]
    fn terms_are_case_sensitive() {
        let docs = sample();
        let index = TaxonomyIndex::build(TaxonomyKind::Tag, &docs);
        assert_eq!(paths(index.documents_for("Rust")), vec!["c.md"]);
    }

    #[test]
    fn index_round_trips_with_document_terms() {
        let docs = sample();
        let index = TaxonomyIndex::build(TaxonomyKind::Tag, &docs);

        for bucket in index.buckets() {
            for d in &bucket.documents {
                assert!(d.tags().contains(&bucket.term));
            }
        }
        for d in &docs {
            for term in d.tags() {
                let hits = index
                    .documents_for(term)
                    .iter()
                    .filter(|x| std::ptr::eq(**x, d))
                    .count();
                assert_eq!(hits, 1, "{} under {term}", d.source_path);
            }
        }
    }

    #[test]
    fn categories_index_separately() {
        let docs = sample();
        let index = TaxonomyIndex::build(TaxonomyKind::Category, &docs);
        assert_eq!(index.len(), 1);
        assert_eq!(paths(index.documents_for("Dev")), vec!["a.md"]);
    }

    // =========================================================================
    // Archive planning
    // =========================================================================

    #[test]
    fn archive_pages_sort_newest_first() {
        let docs = sample();
        let index = TaxonomyIndex::build(TaxonomyKind::Tag, &docs);
        let pages = archive_pages(&index, "tags");

        let web = pages.iter().find(|p| p.term == "web").unwrap();
        assert_eq!(web.url, "tags/web/");
        assert_eq!(paths(&web.documents), vec!["b.md", "a.md"]);
        assert_eq!(web.title(), "Tags: web");
        assert_eq!(web.description(), "Articles tagged with web");
    }

    #[test]
    fn archive_urls_slug_the_term() {
        assert_eq!(term_url("/topics/", "Web Dev"), "topics/web-dev/");
    }

    #[test]
    fn overview_sorts_by_count_and_alphabetically() {
        let docs = sample();
        let index = TaxonomyIndex::build(TaxonomyKind::Tag, &docs);
        let overview = overview(&index, "tags").unwrap();

        assert_eq!(overview.url, "tags/");
        let by_count: Vec<(&str, usize)> = overview
            .by_count
            .iter()
            .map(|t| (t.name.as_str(), t.count))
            .collect();
        assert_eq!(by_count, vec![("rust", 2), ("web", 2), ("Rust", 1)]);

        let alpha: Vec<&str> = overview.alphabetical.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(alpha, vec!["Rust", "rust", "web"]);
        assert_eq!(overview.title("Blog"), "Tags - Blog");
    }

    #[test]
    fn empty_index_has_no_overview() {
        let docs = vec![doc("a.md", "a/", json!({"title": "plain"}))];
        let index = TaxonomyIndex::build(TaxonomyKind::Tag, &docs);
        assert!(index.is_empty());
        assert!(archive_pages(&index, "tags").is_empty());
        assert!(overview(&index, "tags").is_none());
    }

    #[test]
    fn template_chains_fall_back_to_list() {
        assert_eq!(
            overview_template_chain(TaxonomyKind::Category, "taxonomy-archive", &["list"]),
            vec!["categories-overview", "taxonomy-archive", "list"]
        );
        assert_eq!(
            archive_template_chain("taxonomy-archive", &["list", "taxonomy-archive"]),
            vec!["taxonomy-archive", "list"]
        );
    }
}
