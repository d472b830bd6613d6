//! Read-only queries over a built document collection.
//!
//! The engine owns a snapshot of documents, either handed in directly or
//! loaded from a [`CacheStore`](crate::cache::CacheStore). Nothing here
//! mutates the snapshot or the cache.
//!
//! ## Related content
//!
//! [`QueryEngine::related_to`] scores every other document by shared terms:
//! each shared tag is worth 2 and each shared category 3. Documents scoring
//! 0 are dropped; the rest are ordered by score, then newest-modified first.

use crate::cache::CacheStore;
use crate::document::{self, Document};
use crate::render::strip_html_tags;
use crate::taxonomy::TaxonomyKind;
use serde::Serialize;

const TAG_WEIGHT: usize = 2;
const CATEGORY_WEIGHT: usize = 3;

/// One page of the full collection.
#[derive(Debug, Serialize)]
pub struct PaginatedDocuments<'a> {
    pub documents: Vec<&'a Document>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    documents: Vec<Document>,
}

impl QueryEngine {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Engine over the snapshot under `key`; empty when the key is absent
    /// or expired.
    pub fn from_cache(store: &dyn CacheStore, key: &str) -> Self {
        Self::new(store.get_or(key, Vec::new()))
    }

    pub fn all(&self) -> &[Document] {
        &self.documents
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn find_by_url(&self, url: &str) -> Option<&Document> {
        let wanted = url.trim_matches('/');
        self.documents
            .iter()
            .find(|d| d.generated_url.as_deref().is_some_and(|u| u.trim_matches('/') == wanted))
    }

    pub fn by_tag(&self, tag: &str) -> Vec<&Document> {
        self.by_term(TaxonomyKind::Tag, tag)
    }

    pub fn by_category(&self, category: &str) -> Vec<&Document> {
        self.by_term(TaxonomyKind::Category, category)
    }

    fn by_term(&self, kind: TaxonomyKind, term: &str) -> Vec<&Document> {
        self.documents
            .iter()
            .filter(|d| d.has_term(kind, term))
            .collect()
    }

    pub fn all_tags(&self) -> Vec<&str> {
        self.all_terms(TaxonomyKind::Tag)
    }

    pub fn all_categories(&self) -> Vec<&str> {
        self.all_terms(TaxonomyKind::Category)
    }

    /// Distinct terms in first-seen order.
    fn all_terms(&self, kind: TaxonomyKind) -> Vec<&str> {
        let mut terms: Vec<&str> = Vec::new();
        for term in self.documents.iter().flat_map(|d| d.terms(kind)) {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        terms
    }

    /// Page `page_number` (1-based) of the collection, newest-modified first.
    /// Out-of-range pages, including page 0, have no documents.
    pub fn paginate(&self, page_size: usize, page_number: usize) -> PaginatedDocuments<'_> {
        let mut sorted: Vec<&Document> = self.documents.iter().collect();
        document::sort_newest_first(&mut sorted);

        let total_count = sorted.len();
        let total_pages = if page_size == 0 {
            0
        } else {
            total_count.div_ceil(page_size)
        };

        let documents = if page_size == 0 || page_number == 0 {
            Vec::new()
        } else {
            sorted
                .into_iter()
                .skip((page_number - 1).saturating_mul(page_size))
                .take(page_size)
                .collect()
        };

        PaginatedDocuments {
            documents,
            current_page: page_number,
            total_pages,
            total_count,
            page_size,
        }
    }

    /// Case-insensitive substring match over title, description, and the
    /// body text with markup removed.
    pub fn search(&self, query: &str) -> Vec<&Document> {
        let needle = query.to_lowercase();
        self.documents
            .iter()
            .filter(|d| searchable_text(d).contains(&needle))
            .collect()
    }

    /// Up to `limit` documents sharing terms with `target`, best first.
    /// `target` itself is excluded by URL.
    pub fn related_to(&self, target: &Document, limit: usize) -> Vec<&Document> {
        let mut scored: Vec<(usize, &Document)> = self
            .documents
            .iter()
            .filter(|d| d.url() != target.url())
            .map(|d| (relatedness(target, d), d))
            .filter(|(score, _)| *score > 0)
            .collect();

        scored.sort_by(|(sa, a), (sb, b)| {
            sb.cmp(sa)
                .then_with(|| b.modified_at().cmp(&a.modified_at()))
        });
        scored.into_iter().take(limit).map(|(_, d)| d).collect()
    }
}

/// Relatedness of `other` to `target`.
pub fn relatedness(target: &Document, other: &Document) -> usize {
    let shared = |kind: TaxonomyKind| {
        target
            .terms(kind)
            .iter()
            .filter(|term| other.has_term(kind, term))
            .count()
    };
    TAG_WEIGHT * shared(TaxonomyKind::Tag) + CATEGORY_WEIGHT * shared(TaxonomyKind::Category)
}

fn searchable_text(doc: &Document) -> String {
    let content = match &doc.rendered_content {
        Some(html) => strip_html_tags(html),
        None => doc.body.clone(),
    };
    format!(
        "{} {} {}",
        doc.title().unwrap_or_default(),
        doc.description().unwrap_or_default(),
        content
    )
    .to_lowercase()
}
