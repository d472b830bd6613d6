//! Rendering capabilities: markdown to HTML, and page templates.
//!
//! The build talks to both through traits so sites can bring their own
//! template set. The defaults are:
//!
//! - [`CommonMarkRenderer`]: pulldown-cmark with tables, footnotes,
//!   strikethrough, and task lists enabled.
//! - [`BuiltinTemplates`]: a small set of [maud](https://maud.lambda.xyz/)
//!   layouts compiled into the binary.
//!
//! ## Built-in template ids
//!
//! | Id | Used for |
//! |----|----------|
//! | `article` | a single document |
//! | `list` | listing pages and the final fallback for taxonomy pages |
//! | `taxonomy-archive` | one term's archive |
//! | `tags-overview`, `categories-overview` | all terms of one kind |
//!
//! Every built-in layout renders whatever [`PageContent`] it is given, so a
//! fallback from an overview id to `list` still produces a usable page.

use crate::document::Document;
use crate::taxonomy::TermSummary;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
    #[error("markdown rendering failed: {0}")]
    Markdown(String),
}

/// Markdown → HTML.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// Template id + page variables → page bytes.
pub trait TemplateRenderer: Send + Sync {
    fn has_template(&self, id: &str) -> bool;
    fn render(&self, id: &str, context: &TemplateContext<'_>) -> Result<Vec<u8>, RenderError>;
}

/// First id in `chain` the renderer knows.
pub fn first_available<'c>(templates: &dyn TemplateRenderer, chain: &[&'c str]) -> Option<&'c str> {
    chain.iter().copied().find(|id| templates.has_template(id))
}

/// Variables handed to a template.
#[derive(Debug)]
pub struct TemplateContext<'a> {
    pub site_name: &'a str,
    /// Pre-rendered head tags (see [`crate::header::build_header`]).
    pub head: &'a str,
    pub title: &'a str,
    /// Description as HTML.
    pub description: Option<&'a str>,
    pub content: PageContent<'a>,
}

#[derive(Debug)]
pub enum PageContent<'a> {
    Article(&'a Document),
    Listing(ListingContent<'a>),
    Terms(TermsContent<'a>),
}

#[derive(Debug)]
pub struct ListingContent<'a> {
    pub documents: &'a [&'a Document],
    /// HTML of the listing's own `index.md` body, if any.
    pub intro: Option<&'a str>,
    pub current_page: usize,
    pub total_pages: usize,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
}

#[derive(Debug)]
pub struct TermsContent<'a> {
    pub by_count: &'a [TermSummary],
    pub alphabetical: &'a [TermSummary],
}

// ============================================================================
// Markdown
// ============================================================================

/// pulldown-cmark backed renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMarkRenderer;

impl MarkdownRenderer for CommonMarkRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(markdown, options);
        let mut html = String::with_capacity(markdown.len() * 3 / 2);
        md_html::push_html(&mut html, parser);
        Ok(html)
    }
}

/// Strip HTML tags (simple angle-bracket stripping).
pub fn strip_html_tags(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

// ============================================================================
// Built-in templates
// ============================================================================

const BUILTIN_IDS: &[&str] = &[
    "article",
    "list",
    "taxonomy-archive",
    "tags-overview",
    "categories-overview",
];

const CSS: &str = r#"
body { max-width: 44rem; margin: 0 auto; padding: 2rem 1rem; font-family: system-ui, sans-serif; line-height: 1.6; color: #1a1a1a; }
a { color: #1d4ed8; }
header.site-header { margin-bottom: 2rem; }
.meta { color: #666; font-size: 0.9rem; }
ul.entries { list-style: none; padding: 0; }
ul.entries li { margin-bottom: 1.5rem; }
nav.pagination { display: flex; justify-content: space-between; margin-top: 2rem; }
ul.terms { display: flex; flex-wrap: wrap; gap: 0.5rem 1rem; list-style: none; padding: 0; }
"#;

/// Maud layouts compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl TemplateRenderer for BuiltinTemplates {
    fn has_template(&self, id: &str) -> bool {
        BUILTIN_IDS.contains(&id)
    }

    fn render(&self, id: &str, context: &TemplateContext<'_>) -> Result<Vec<u8>, RenderError> {
        let body_class = match id {
            "article" => "article",
            "list" => "listing",
            "taxonomy-archive" => "archive",
            "tags-overview" | "categories-overview" => "overview",
            other => return Err(RenderError::UnknownTemplate(other.to_string())),
        };
        let page = base_document(context, body_class, page_content(context));
        Ok(page.into_string().into_bytes())
    }
}

/// Root-relative href for a relative URL.
fn site_href(url: &str) -> String {
    format!("/{}", url.trim_start_matches('/'))
}

fn base_document(context: &TemplateContext<'_>, body_class: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                (PreEscaped(context.head))
                style { (PreEscaped(CSS)) }
            }
            body class=(body_class) {
                header.site-header {
                    a href="/" { (context.site_name) }
                }
                main {
                    (content)
                }
            }
        }
    }
}

fn page_content(context: &TemplateContext<'_>) -> Markup {
    match &context.content {
        PageContent::Article(doc) => render_article(context, doc),
        PageContent::Listing(listing) => render_listing(context, listing),
        PageContent::Terms(terms) => render_terms(context, terms),
    }
}

fn render_article(context: &TemplateContext<'_>, doc: &Document) -> Markup {
    let tags = doc.tags();
    html! {
        article {
            h1 { (context.title) }
            @if let Some(published) = doc.published_at() {
                p.meta { time datetime=(published.to_rfc3339()) { (published.format("%B %-d, %Y").to_string()) } }
            }
            (PreEscaped(doc.rendered_content.as_deref().unwrap_or_default()))
            @if !tags.is_empty() {
                p.meta {
                    "Tagged: "
                    @for (i, tag) in tags.iter().enumerate() {
                        @if i > 0 { ", " }
                        (tag)
                    }
                }
            }
        }
    }
}

fn render_listing(context: &TemplateContext<'_>, listing: &ListingContent<'_>) -> Markup {
    html! {
        h1 { (context.title) }
        @if let Some(intro) = listing.intro {
            section.intro { (PreEscaped(intro)) }
        } @else if let Some(description) = context.description {
            section.intro { (PreEscaped(description)) }
        }
        ul.entries {
            @for doc in listing.documents {
                li {
                    a href=(site_href(doc.url())) {
                        (doc.title().unwrap_or(&doc.source_path))
                    }
                    @if let Some(modified) = doc.modified_at() {
                        " " span.meta { (modified.format("%Y-%m-%d").to_string()) }
                    }
                    @if let Some(description) = doc.description() {
                        p { (description) }
                    }
                }
            }
        }
        @if listing.total_pages > 1 {
            nav.pagination {
                @if let Some(prev) = &listing.previous_url {
                    a rel="prev" href=(site_href(prev)) { "Newer" }
                } @else {
                    span {}
                }
                span.meta { "Page " (listing.current_page) " of " (listing.total_pages) }
                @if let Some(next) = &listing.next_url {
                    a rel="next" href=(site_href(next)) { "Older" }
                } @else {
                    span {}
                }
            }
        }
    }
}

fn render_terms(context: &TemplateContext<'_>, terms: &TermsContent<'_>) -> Markup {
    html! {
        h1 { (context.title) }
        @if let Some(description) = context.description {
            section.intro { (PreEscaped(description)) }
        }
        h2 { "Most used" }
        ul.terms {
            @for term in terms.by_count {
                li { a href=(site_href(&term.url)) { (term.name) } " (" (term.count) ")" }
            }
        }
        h2 { "A to Z" }
        ul.terms {
            @for term in terms.alphabetical {
                li { a href=(site_href(&term.url)) { (term.name) } }
            }
        }
    }
}
