//! Head tag synthesis.
//!
//! [`build_header`] turns a document's field map into the `<head>` fragment
//! of its page: title and description, canonical and social tags, article
//! timestamps, keywords, hreflang alternates, and any extra tags listed under
//! `head`. It is a pure function; two calls with the same fields produce the
//! same string.
//!
//! ```yaml
//! title: First Post
//! canonical: /blog/first-post/
//! image: /img/cover.png          # og:image and twitter:image, made absolute
//! og:
//!   type: article
//! twitter:
//!   card: summary_large_image
//! meta:
//!   author: Jane
//! hreflang:
//!   de: /de/blog/erster-beitrag/
//! head:
//!   - tag: link
//!     rel: preconnect
//!     href: https://fonts.example.com
//! ```

use crate::dates;
use crate::document::Fields;
use crate::slug::absolute_url;
use maud::{Markup, PreEscaped, html};
use serde_json::Value;

const DEFAULT_CHARSET: &str = "utf-8";
const DEFAULT_VIEWPORT: &str = "width=device-width, initial-scale=1";

/// Site-level inputs to header synthesis.
#[derive(Debug, Clone, Copy)]
pub struct HeaderSettings<'a> {
    pub base_url: &'a str,
    /// Locale whose alternate is also announced as `x-default`.
    pub hreflang_default: Option<&'a str>,
}

/// Build the head fragment for one page.
pub fn build_header(fields: &Fields, settings: &HeaderSettings<'_>) -> String {
    let string = |key: &str| fields.get(key).and_then(Value::as_str).filter(|s| !s.is_empty());
    let absolute = |uri: &str| absolute_url(settings.base_url, uri);

    let canonical = string("canonical").map(absolute);
    let image = string("image").map(absolute);
    let keywords = keywords(fields);
    let published = fields.get("published").and_then(timestamp);
    let modified = fields.get("modified").and_then(timestamp);
    let og = scalar_entries(fields.get("og"), settings.base_url);
    let twitter = scalar_entries(fields.get("twitter"), settings.base_url);
    let meta = scalar_entries(fields.get("meta"), settings.base_url);
    let alternates = hreflang_links(fields, settings);
    let extra = extra_tags(fields.get("head"));

    let markup: Markup = html! {
        meta charset=(string("charset").unwrap_or(DEFAULT_CHARSET));
        meta name="viewport" content=(string("viewport").unwrap_or(DEFAULT_VIEWPORT));
        @if let Some(title) = string("title") {
            title { (title) }
        }
        @if let Some(description) = string("description") {
            meta name="description" content=(description);
        }
        @if let Some(keywords) = &keywords {
            meta name="keywords" content=(keywords);
        }
        @if let Some(canonical) = &canonical {
            link rel="canonical" href=(canonical);
            meta property="og:url" content=(canonical);
            meta name="twitter:url" content=(canonical);
        }
        @if let Some(image) = &image {
            meta property="og:image" content=(image);
            meta name="twitter:image" content=(image);
        }
        @if let Some(published) = &published {
            meta property="article:published_time" content=(published);
        }
        @if let Some(modified) = &modified {
            meta property="article:modified_time" content=(modified);
            meta property="og:updated_time" content=(modified);
        }
        @for (key, value) in &og {
            meta property={ "og:" (key) } content=(value);
        }
        @for (key, value) in &twitter {
            meta name={ "twitter:" (key) } content=(value);
        }
        @for (key, value) in &meta {
            meta name=(key) content=(value);
        }
        @for (lang, href) in &alternates {
            link rel="alternate" hreflang=(lang) href=(href);
        }
        (PreEscaped(extra))
    };
    markup.into_string()
}

/// `keywords` as given (string or list), else tags and categories joined.
fn keywords(fields: &Fields) -> Option<String> {
    match fields.get("keywords") {
        Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(Value::Array(items)) if !items.is_empty() => {
            return Some(
                items
                    .iter()
                    .filter_map(scalar_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        _ => {}
    }

    let terms: Vec<&str> = ["tags", "categories"]
        .iter()
        .filter_map(|key| fields.get(*key).and_then(Value::as_array))
        .flatten()
        .filter_map(Value::as_str)
        .collect();
    (!terms.is_empty()).then(|| terms.join(", "))
}

/// RFC 3339 rendering of a date field, or the raw string if it does not parse.
fn timestamp(value: &Value) -> Option<String> {
    match dates::parse_timestamp(value) {
        Some(ts) => Some(ts.to_rfc3339()),
        None => value.as_str().filter(|s| !s.is_empty()).map(str::to_string),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Flatten a `{key: value}` map into tag entries. List values yield one entry
/// per item; nested maps are ignored. `image` entries are made absolute.
fn scalar_entries(value: Option<&Value>, base_url: &str) -> Vec<(String, String)> {
    let Some(Value::Object(map)) = value else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    for (key, value) in map {
        let items: Vec<String> = match value {
            Value::Array(items) => items.iter().filter_map(scalar_string).collect(),
            other => scalar_string(other).into_iter().collect(),
        };
        for item in items {
            let item = if key == "image" {
                absolute_url(base_url, &item)
            } else {
                item
            };
            entries.push((key.clone(), item));
        }
    }
    entries
}

/// Alternate-language links: one per `hreflang` entry, a self reference for
/// the page's own `locale`, and `x-default` pointing at the default locale.
fn hreflang_links(fields: &Fields, settings: &HeaderSettings<'_>) -> Vec<(String, String)> {
    let Some(Value::Object(map)) = fields.get("hreflang") else {
        return Vec::new();
    };

    let mut links: Vec<(String, String)> = map
        .iter()
        .filter_map(|(lang, uri)| {
            uri.as_str()
                .map(|uri| (lang.clone(), absolute_url(settings.base_url, uri)))
        })
        .collect();

    let locale = fields.get("locale").and_then(Value::as_str);
    let canonical = fields.get("canonical").and_then(Value::as_str);
    if let (Some(locale), Some(canonical)) = (locale, canonical)
        && !links.iter().any(|(lang, _)| lang == locale)
    {
        links.push((
            locale.to_string(),
            absolute_url(settings.base_url, canonical),
        ));
    }

    if let Some(default) = settings.hreflang_default
        && let Some((_, href)) = links.iter().find(|(lang, _)| lang == default)
    {
        let href = href.clone();
        links.push(("x-default".to_string(), href));
    }

    links
}

/// Extra `head` entries: `{tag: meta|link|script, attr: value, ...}`.
fn extra_tags(value: Option<&Value>) -> String {
    let Some(Value::Array(entries)) = value else {
        return String::new();
    };
    let mut out = String::new();
    for entry in entries {
        let Some(map) = entry.as_object() else {
            continue;
        };
        let tag = match map.get("tag").and_then(Value::as_str) {
            Some(tag @ ("meta" | "link" | "script")) => tag,
            _ => continue,
        };
        let mut attributes = String::new();
        for (name, value) in map {
            if name == "tag" || !is_attribute_name(name) {
                continue;
            }
            if let Some(value) = scalar_string(value) {
                attributes.push_str(&format!(" {}=\"{}\"", name, escape(&value)));
            }
        }
        if tag == "script" {
            out.push_str(&format!("<script{attributes}></script>"));
        } else {
            out.push_str(&format!("<{tag}{attributes}>"));
        }
    }
    out
}

fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':'))
}

fn escape(value: &str) -> String {
    html! { (value) }.into_string()
}
