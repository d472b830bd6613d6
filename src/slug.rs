//! Output URL resolution.
//!
//! Every document gets a relative URL ending in `/`. The default is derived
//! from the source path (`blog/my-post.md` → `blog/my-post/`), preserving the
//! file name as written. With [`SlugSource::Frontmatter`] a non-empty `slug`
//! field replaces the file name segment after sanitization, while the
//! directory prefix is always kept.
//!
//! | Source | `slug` | URL |
//! |--------|--------|-----|
//! | `index.md` | - | `/` |
//! | `blog/index.md` | - | `blog/` |
//! | `blog/my-post.md` | - | `blog/my-post/` |
//! | `blog/a/b.md` | `Simple Tutorial` | `blog/a/simple-tutorial/` |

use crate::document::Fields;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// File name that marks a directory listing.
pub const LIST_INDEX_FILENAME: &str = "index.md";

/// Where a document's URL segment comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugSource {
    /// File name without its extension.
    #[default]
    Filename,
    /// The `slug` front-matter field, falling back to the file name.
    Frontmatter,
}

/// Lowercase ASCII slug: transliterate, collapse non-alphanumeric runs into
/// a single `-`, trim leading and trailing `-`.
pub fn sanitize_slug(raw: &str) -> String {
    let ascii = deunicode::deunicode(raw).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Slug for a taxonomy term's archive URL. Terms with no alphanumeric
/// content get a short content hash so they still map to a distinct path.
pub fn term_slug(term: &str) -> String {
    let slug = sanitize_slug(term);
    if slug.is_empty() {
        let digest = format!("{:x}", Sha256::digest(term.as_bytes()));
        digest[..8].to_string()
    } else {
        slug
    }
}

/// Resolve the relative output URL of the source file at `relative_path`.
pub fn resolve_url(relative_path: &str, fields: &Fields, slug_source: SlugSource) -> String {
    let (dir, file_name) = match relative_path.rsplit_once('/') {
        Some((dir, file)) => (dir, file),
        None => ("", relative_path),
    };

    if slug_source == SlugSource::Frontmatter
        && let Some(Value::String(raw)) = fields.get("slug")
    {
        let slug = sanitize_slug(raw);
        if !slug.is_empty() {
            return join_dir(dir, &slug);
        }
    }

    if file_name == LIST_INDEX_FILENAME {
        return listing_url(dir);
    }
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    join_dir(dir, stem)
}

/// URL of the listing rooted at `dir` (`""` for the source root).
pub fn listing_url(dir: &str) -> String {
    if dir.is_empty() {
        "/".to_string()
    } else {
        format!("{dir}/")
    }
}

fn join_dir(dir: &str, segment: &str) -> String {
    if dir.is_empty() {
        format!("{segment}/")
    } else {
        format!("{dir}/{segment}/")
    }
}

/// Make `uri` absolute against `base_url`. URIs that already start with
/// `http` are returned unchanged.
pub fn absolute_url(base_url: &str, uri: &str) -> String {
    if uri.starts_with("http") {
        return uri.to_string();
    }
    let base = base_url.trim_end_matches('/');
    let path = uri.trim_start_matches('/');
    if path.is_empty() {
        format!("{base}/")
    } else {
        format!("{base}/{path}")
    }
}

/// Output path (relative to the output root) for a URL. The root URL `/`
/// maps to the empty path.
pub fn url_to_output_path(url: &str) -> &str {
    url.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn with_slug(slug: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("slug".into(), json!(slug));
        fields
    }

    // =========================================================================
    // sanitize_slug
    // =========================================================================

    #[test]
    fn sanitize_messy_slug() {
        assert_eq!(
            sanitize_slug("My Messy Slug with CAPS & Special Characters!"),
            "my-messy-slug-with-caps-special-characters"
        );
    }

    #[test]
    fn sanitize_trims_and_collapses() {
        assert_eq!(sanitize_slug("--Hello,,,  World--"), "hello-world");
        assert_eq!(sanitize_slug("!!!"), "");
    }

    #[test]
    fn sanitize_transliterates() {
        assert_eq!(sanitize_slug("Crème Brûlée"), "creme-brulee");
    }

    #[test]
    fn term_slug_never_empty() {
        assert_eq!(term_slug("Web Dev"), "web-dev");
        let odd = term_slug("++");
        assert_eq!(odd.len(), 8);
        assert_ne!(odd, term_slug("--"));
    }

    // =========================================================================
    // resolve_url
    // =========================================================================

    #[test]
    fn filename_mode_strips_extension() {
        let url = resolve_url("blog/my-test-post.md", &Fields::new(), SlugSource::Filename);
        assert_eq!(url, "blog/my-test-post/");
    }

    #[test]
    fn filename_mode_ignores_slug_field() {
        let url = resolve_url("blog/post.md", &with_slug("other"), SlugSource::Filename);
        assert_eq!(url, "blog/post/");
    }

    #[test]
    fn filename_mode_keeps_case() {
        let url = resolve_url("Blog/My_Post.md", &Fields::new(), SlugSource::Filename);
        assert_eq!(url, "Blog/My_Post/");
    }

    #[test]
    fn frontmatter_mode_falls_back_to_filename() {
        let fields = Fields::new();
        assert_eq!(
            resolve_url("blog/my-test-post.md", &fields, SlugSource::Frontmatter),
            "blog/my-test-post/"
        );
        assert_eq!(
            resolve_url("blog/my-test-post.md", &with_slug(""), SlugSource::Frontmatter),
            "blog/my-test-post/"
        );
        assert_eq!(
            resolve_url("blog/my-test-post.md", &with_slug("???"), SlugSource::Frontmatter),
            "blog/my-test-post/"
        );
    }

    #[test]
    fn frontmatter_mode_preserves_directories() {
        let url = resolve_url(
            "blog/tutorials/advanced/complex-topic.md",
            &with_slug("simple-tutorial"),
            SlugSource::Frontmatter,
        );
        assert_eq!(url, "blog/tutorials/advanced/simple-tutorial/");
    }

    #[test]
    fn frontmatter_mode_sanitizes() {
        let url = resolve_url(
            "post.md",
            &with_slug("My Messy Slug with CAPS & Special Characters!"),
            SlugSource::Frontmatter,
        );
        assert_eq!(url, "my-messy-slug-with-caps-special-characters/");
    }

    #[test]
    fn index_maps_to_directory() {
        assert_eq!(resolve_url("index.md", &Fields::new(), SlugSource::Filename), "/");
        assert_eq!(
            resolve_url("blog/index.md", &Fields::new(), SlugSource::Filename),
            "blog/"
        );
    }

    #[test]
    fn resolution_is_idempotent() {
        let fields = with_slug("Hello World");
        let first = resolve_url("a/b.md", &fields, SlugSource::Frontmatter);
        let second = resolve_url("a/b.md", &fields, SlugSource::Frontmatter);
        assert_eq!(first, second);
    }

    // =========================================================================
    // absolute_url
    // =========================================================================

    #[test]
    fn absolute_url_joins_with_single_slash() {
        assert_eq!(
            absolute_url("https://example.com/", "/blog/post/"),
            "https://example.com/blog/post/"
        );
        assert_eq!(
            absolute_url("https://example.com", "blog/post/"),
            "https://example.com/blog/post/"
        );
        assert_eq!(absolute_url("https://example.com", "/"), "https://example.com/");
    }

    #[test]
    fn absolute_url_keeps_http_uris() {
        assert_eq!(
            absolute_url("https://example.com", "http://cdn.test/img.png"),
            "http://cdn.test/img.png"
        );
    }
}
