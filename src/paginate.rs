//! Listing pages: select the documents under a directory and chunk them.
//!
//! ```text
//! blog/        page 1 (also written at blog/1/)
//! blog/2/      page 2
//! blog/3/      page 3
//! ```

use crate::document::{self, Document};

/// One chunk of a listing.
#[derive(Debug, Clone)]
pub struct Page<'a> {
    pub documents: Vec<&'a Document>,
    /// 1-based.
    pub current_page: usize,
    pub total_pages: usize,
    /// URL of the listing's first page, with a trailing slash.
    pub base_url: String,
}

impl Page<'_> {
    /// URL of this page: the base for page 1, `{base}{n}/` otherwise.
    pub fn url(&self) -> String {
        page_url(&self.base_url, self.current_page)
    }

    /// The explicit `{base}1/` path the first page is also written to.
    pub fn alias_url(&self) -> Option<String> {
        (self.current_page == 1).then(|| format!("{}1/", self.base_url))
    }

    pub fn previous_url(&self) -> Option<String> {
        (self.current_page > 1).then(|| page_url(&self.base_url, self.current_page - 1))
    }

    pub fn next_url(&self) -> Option<String> {
        (self.current_page < self.total_pages)
            .then(|| page_url(&self.base_url, self.current_page + 1))
    }
}

fn page_url(base_url: &str, page: usize) -> String {
    if page <= 1 {
        base_url.to_string()
    } else {
        format!("{base_url}{page}/")
    }
}

/// Documents whose source path lies under `listing_dir` (`""` selects all),
/// newest-modified first.
pub fn select_for_listing<'a>(documents: &'a [Document], listing_dir: &str) -> Vec<&'a Document> {
    let prefix = format!("{}/", listing_dir.trim_matches('/'));
    let mut selected: Vec<&Document> = documents
        .iter()
        .filter(|d| listing_dir.is_empty() || d.source_path.starts_with(&prefix))
        .collect();
    document::sort_newest_first(&mut selected);
    selected
}

/// Split an ordered selection into pages of at most `page_size`.
///
/// Always yields at least one page, so an empty listing still renders.
pub fn paginate<'a>(documents: Vec<&'a Document>, page_size: usize, base_url: &str) -> Vec<Page<'a>> {
    let page_size = page_size.max(1);
    let total_pages = documents.len().div_ceil(page_size).max(1);

    if documents.is_empty() {
        return vec![Page {
            documents,
            current_page: 1,
            total_pages,
            base_url: base_url.to_string(),
        }];
    }

    documents
        .chunks(page_size)
        .enumerate()
        .map(|(i, chunk)| Page {
            documents: chunk.to_vec(),
            current_page: i + 1,
            total_pages,
            base_url: base_url.to_string(),
        })
        .collect()
}
