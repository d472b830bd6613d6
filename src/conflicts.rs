//! Duplicate output URL detection.

use crate::document::Document;
use std::collections::BTreeMap;

/// Map of URL → number of documents resolving to it, limited to URLs used
/// more than once. Documents without a resolved URL are ignored.
pub fn detect_conflicts(documents: &[Document]) -> BTreeMap<String, usize> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for url in documents.iter().filter_map(|d| d.generated_url.as_deref()) {
        *counts.entry(url.to_string()).or_default() += 1;
    }
    counts.retain(|_, count| *count > 1);
    counts
}
