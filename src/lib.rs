//! # Quire
//!
//! A static blog generator. A directory of markdown files with YAML
//! front-matter becomes a tree of HTML pages, paginated listings, and
//! per-term taxonomy archives. The finished document set is cached as a
//! snapshot so the query layer can answer tag, category, search, and
//! related-content lookups without re-parsing the source tree.
//!
//! # Architecture: One Build, One Snapshot
//!
//! ```text
//! content/  →  Builder  →  public/            (HTML pages)
//!                  └─────→  .quire-cache/     (document snapshot)
//!                                 └──→ QueryEngine  (read-only lookups)
//! ```
//!
//! A build runs a fixed sequence of states (see [`build`]): discover sources,
//! release due embargo files, convert documents in parallel, write listings,
//! write taxonomy archives, report URL conflicts, and cache the snapshot.
//! The query layer only ever reads that snapshot.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`build`] | Build state machine: discovery, conversion, listings, taxonomies, caching |
//! | [`document`] | Front-matter parsing and the `Document` record |
//! | [`dates`] | Timestamp parsing for `published` and `modified` |
//! | [`embargo`] | Promotion of `name.N.emb.md` files whose date has passed |
//! | [`slug`] | Slug sanitizing and URL resolution |
//! | [`paginate`] | Listing selection and page splitting |
//! | [`taxonomy`] | Tag and category indexes, archive and overview planning |
//! | [`conflicts`] | Detection of URLs claimed by several documents |
//! | [`header`] | `<head>` synthesis from front-matter |
//! | [`render`] | Markdown and template renderer seams, plus the built-in Maud layouts |
//! | [`cache`] | Snapshot stores with expiry |
//! | [`query`] | Read-only queries over a snapshot |
//! | [`config`] | `quire.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting for builds and queries |
//!
//! # Design Decisions
//!
//! ## The Filesystem Is the URL Space
//!
//! A source file at `blog/tutorials/intro.md` is published at
//! `blog/tutorials/intro/`. With `slug_source = "frontmatter"` a `slug` field
//! replaces the last segment but never the directory. Every `index.md` is a
//! listing for its directory rather than a page of its own.
//!
//! ## Maud Over Template Engines
//!
//! The built-in layouts use [Maud](https://maud.lambda.xyz/), so malformed
//! HTML is a compile error and all interpolation is escaped. Template lookup
//! still goes through the [`render::TemplateRenderer`] trait by id, so a site
//! can plug in its own renderer and fall back to the stock ids for anything
//! it does not override.
//!
//! ## Embargo by File Name
//!
//! A file named `post.1.emb.md` is invisible to the build until its
//! `modified` date passes; the build then renames it to `post.md` and
//! converts it in the same run. The source tree records which posts are
//! released, with no separate state file.
//!
//! ## Conflicts Warn, Not Fail
//!
//! Two documents resolving to the same URL produce a warning and a report
//! entry. The document that comes later in discovery order owns the page,
//! and the rest of the site still builds.

pub mod build;
pub mod cache;
pub mod config;
pub mod conflicts;
pub mod dates;
pub mod document;
pub mod embargo;
pub mod header;
pub mod output;
pub mod paginate;
pub mod query;
pub mod render;
pub mod slug;
pub mod taxonomy;

#[cfg(test)]
pub(crate) mod test_helpers;
