//! Build orchestration.
//!
//! A build walks a fixed sequence of states:
//!
//! ```text
//! Idle → Discovering → Releasing → Converting → Listing
//!      → IndexingTaxonomies → DetectingConflicts → Caching → Done
//! ```
//!
//! There is no branching back; the first fatal error aborts the run and a
//! re-run starts over from discovery.
//!
//! - **Discovering** collects `*.md` files under the source root (hidden
//!   entries and embargo files skipped) and splits them into content files
//!   and `index.md` listings.
//! - **Releasing** promotes due embargo files once. When anything was
//!   released, discovery is repeated so those files are converted in this run. A file whose
//!   embargo ends later in the run waits for the next build.
//! - **Converting** runs on the rayon pool. Each file is parsed, merged with
//!   `[defaults]`, dropped if unpublished, resolved to a URL, and rendered.
//!   Results are joined in discovery order, then each page is written to
//!   `{output}/{url}/{index_filename}` in that order.
//! - **Listing** paginates the documents under each `index.md`.
//! - **IndexingTaxonomies** writes one archive per term and one overview per
//!   enabled kind that has terms.
//! - **DetectingConflicts** warns about URLs claimed by several documents.
//!   The build still completes; the document later in discovery order owns
//!   the page.
//! - **Caching** replaces the configured snapshot key with the final
//!   document set.
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── index.htm                  # root listing (content/index.md)
//! ├── 1/index.htm                # same page, explicit number
//! ├── about/index.htm
//! ├── blog/
//! │   ├── index.htm              # blog/index.md listing, page 1
//! │   ├── 1/index.htm
//! │   ├── 2/index.htm
//! │   └── first-post/index.htm
//! ├── tags/
//! │   ├── index.htm              # overview
//! │   └── rust/index.htm         # archive
//! └── categories/...
//! ```

use crate::cache::{CacheError, CacheStore};
use crate::config::{DEFAULT_SECTION, SiteConfig};
use crate::conflicts::detect_conflicts;
use crate::document::{self, Document, Fields, ParseError};
use crate::embargo::{self, EmbargoError};
use crate::header::{HeaderSettings, build_header};
use crate::paginate::{self, Page};
use crate::render::{
    ListingContent, MarkdownRenderer, PageContent, RenderError, TemplateContext, TemplateRenderer,
    TermsContent, first_available,
};
use crate::slug::{self, LIST_INDEX_FILENAME};
use crate::taxonomy::{self, TaxonomyIndex, TaxonomyKind};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("No source path defined: pass SOURCE or set source_path in the config")]
    NoSourcePath,
    #[error("source directory not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Embargo(#[from] EmbargoError),
    #[error("{page}: {source}")]
    Render {
        page: String,
        #[source]
        source: RenderError,
    },
    #[error("no template available for {page} (tried {tried:?})")]
    MissingTemplate { page: String, tried: Vec<String> },
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Pick the source root: the CLI argument wins, then `source_path` from the
/// config. Neither is fatal.
pub fn resolve_source(cli_source: Option<&Path>, config: &SiteConfig) -> Result<PathBuf, BuildError> {
    let source = cli_source
        .map(Path::to_path_buf)
        .or_else(|| config.source_path.as_ref().map(PathBuf::from))
        .ok_or(BuildError::NoSourcePath)?;
    if !source.is_dir() {
        return Err(BuildError::SourceNotFound(source));
    }
    Ok(source)
}

/// Position of a run in the build sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildState {
    Idle,
    Discovering,
    Releasing,
    Converting,
    Listing,
    IndexingTaxonomies,
    DetectingConflicts,
    Caching,
    Done,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildState::Idle => "idle",
            BuildState::Discovering => "discovering",
            BuildState::Releasing => "releasing",
            BuildState::Converting => "converting",
            BuildState::Listing => "listing",
            BuildState::IndexingTaxonomies => "indexing taxonomies",
            BuildState::DetectingConflicts => "detecting conflicts",
            BuildState::Caching => "caching",
            BuildState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Source files found by discovery, as `/`-separated paths relative to the
/// source root, in sorted order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceFiles {
    pub content: Vec<String>,
    pub listings: Vec<String>,
}

/// One generated listing.
#[derive(Debug, Clone)]
pub struct ListingReport {
    pub source_path: String,
    pub base_url: String,
    pub pages: usize,
    pub documents: usize,
}

/// Pages generated for one taxonomy kind.
#[derive(Debug, Clone)]
pub struct TaxonomyReport {
    pub kind: TaxonomyKind,
    pub overview_url: String,
    /// `(term, url, document count)` in first-appearance order.
    pub archives: Vec<(String, String, usize)>,
}

/// What a build did.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub released: Vec<PathBuf>,
    /// Converted documents in discovery order.
    pub documents: Vec<Document>,
    /// Source paths dropped because they are not published yet.
    pub skipped: Vec<String>,
    pub listings: Vec<ListingReport>,
    pub taxonomies: Vec<TaxonomyReport>,
    pub conflicts: BTreeMap<String, usize>,
    /// Cache key the snapshot was stored under, if any.
    pub cached_as: Option<String>,
    /// Number of files written to the output tree.
    pub files_written: usize,
}

/// Runs one build.
pub struct Builder<'a> {
    config: &'a SiteConfig,
    source: PathBuf,
    output: PathBuf,
    markdown: &'a dyn MarkdownRenderer,
    templates: &'a dyn TemplateRenderer,
    cache: Option<&'a dyn CacheStore>,
    now: DateTime<Utc>,
    state: BuildState,
}

impl<'a> Builder<'a> {
    pub fn new(
        config: &'a SiteConfig,
        source: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        markdown: &'a dyn MarkdownRenderer,
        templates: &'a dyn TemplateRenderer,
    ) -> Self {
        Self {
            config,
            source: source.into(),
            output: output.into(),
            markdown,
            templates,
            cache: None,
            now: Utc::now(),
            state: BuildState::Idle,
        }
    }

    /// Store the finished document set in `store` when `cache.key` is set.
    pub fn with_cache(mut self, store: &'a dyn CacheStore) -> Self {
        self.cache = Some(store);
        self
    }

    /// Reference time for publish and embargo checks.
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    fn advance(&mut self, next: BuildState) {
        debug!(from = %self.state, to = %next, "build state");
        self.state = next;
    }

    /// Run every state in order. On error the builder stays in the state
    /// that failed.
    pub fn run(&mut self) -> Result<BuildReport, BuildError> {
        let mut report = BuildReport::default();

        self.advance(BuildState::Discovering);
        let mut files = discover(&self.source)?;

        self.advance(BuildState::Releasing);
        report.released = embargo::release_embargoed(&self.source, self.now)?;
        if !report.released.is_empty() {
            info!(count = report.released.len(), "released embargoed files");
            files = discover(&self.source)?;
        }

        self.advance(BuildState::Converting);
        let converted = self.convert_all(&files.content)?;
        // Written here rather than on the pool so colliding URLs resolve in
        // discovery order.
        for outcome in converted {
            match outcome {
                Converted::Page { doc, html } => {
                    self.write_page(doc.url(), &html)?;
                    info!(source = %doc.source_path, url = %doc.url(), "converted");
                    report.documents.push(doc);
                    report.files_written += 1;
                }
                Converted::Unpublished(source) => {
                    debug!(source = %source, "skipped unpublished document");
                    report.skipped.push(source);
                }
            }
        }

        self.advance(BuildState::Listing);
        for listing in &files.listings {
            let (listing_report, written) = self.render_listing(listing, &report.documents)?;
            report.files_written += written;
            report.listings.push(listing_report);
        }

        self.advance(BuildState::IndexingTaxonomies);
        for kind in TaxonomyKind::ALL {
            if !self.config.taxonomies.get(kind).enabled {
                continue;
            }
            if let Some((taxonomy_report, written)) = self.render_taxonomy(kind, &report.documents)? {
                report.files_written += written;
                report.taxonomies.push(taxonomy_report);
            }
        }

        self.advance(BuildState::DetectingConflicts);
        report.conflicts = detect_conflicts(&report.documents);
        for (url, count) in &report.conflicts {
            warn!(url = %url, count, "URL '{url}' is used by {count} documents");
        }

        self.advance(BuildState::Caching);
        if let (Some(key), Some(store)) = (&self.config.cache.key, self.cache) {
            store.put(key, &report.documents, self.config.cache.expiry)?;
            info!(key = %key, documents = report.documents.len(), "cached document snapshot");
            report.cached_as = Some(key.clone());
        }

        self.advance(BuildState::Done);
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Converting
    // ------------------------------------------------------------------

    fn convert_all(&self, content: &[String]) -> Result<Vec<Converted>, BuildError> {
        content
            .par_iter()
            .map(|source_path| self.convert(source_path))
            .collect()
    }

    fn convert(&self, source_path: &str) -> Result<Converted, BuildError> {
        let raw = fs::read_to_string(self.source.join(source_path))?;
        let mut doc = document::parse_document(source_path, &raw)?;
        doc.apply_defaults(&self.config.default_fields());

        if !doc.is_published(self.now) {
            return Ok(Converted::Unpublished(source_path.to_string()));
        }

        let url = slug::resolve_url(source_path, &doc.fields, self.config.slug_source);
        doc.absolute_url = Some(slug::absolute_url(&self.config.base_url, &url));
        doc.generated_url = Some(url);
        doc.rendered_content = Some(self.render_markdown(source_path, &doc.body)?);

        let description = doc
            .description()
            .map(|d| self.render_markdown(source_path, d))
            .transpose()?;

        let mut header_fields = doc.fields.clone();
        if !header_fields.contains_key("canonical")
            && let Some(absolute) = &doc.absolute_url
        {
            header_fields.insert("canonical".into(), Value::String(absolute.clone()));
        }
        let head = build_header(&header_fields, &self.header_settings());

        let templates = self.config.templates_for(section_of(source_path));
        let template = self.pick_template(source_path, &templates.article)?;
        let title = doc
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| file_stem(source_path));

        let context = TemplateContext {
            site_name: &self.config.site_name,
            head: &head,
            title: &title,
            description: description.as_deref(),
            content: PageContent::Article(&doc),
        };
        let html = self.render_template(source_path, template, &context)?;

        Ok(Converted::Page { doc, html })
    }

    // ------------------------------------------------------------------
    // Listing
    // ------------------------------------------------------------------

    fn render_listing(
        &self,
        source_path: &str,
        documents: &[Document],
    ) -> Result<(ListingReport, usize), BuildError> {
        let raw = fs::read_to_string(self.source.join(source_path))?;
        let mut index = document::parse_document(source_path, &raw)?;
        index.apply_defaults(&self.config.default_fields());

        let dir = source_path
            .strip_suffix(LIST_INDEX_FILENAME)
            .unwrap_or(source_path)
            .trim_end_matches('/');
        let base_url = slug::listing_url(dir);
        let templates = self.config.templates_for(section_of(source_path));
        let template = self.pick_template(source_path, &templates.list)?;

        let intro = if index.body.trim().is_empty() {
            None
        } else {
            Some(self.render_markdown(source_path, &index.body)?)
        };
        let description = index
            .description()
            .map(|d| self.render_markdown(source_path, d))
            .transpose()?;
        let title = index
            .title()
            .unwrap_or(&self.config.site_name)
            .to_string();

        let selected = paginate::select_for_listing(documents, dir);
        let document_count = selected.len();
        let pages = paginate::paginate(selected, templates.per_page, &base_url);

        let mut written = 0;
        for page in &pages {
            let head = self.listing_header(&index.fields, page);
            let context = TemplateContext {
                site_name: &self.config.site_name,
                head: &head,
                title: &title,
                description: description.as_deref(),
                content: PageContent::Listing(ListingContent {
                    documents: &page.documents,
                    intro: intro.as_deref(),
                    current_page: page.current_page,
                    total_pages: page.total_pages,
                    previous_url: page.previous_url(),
                    next_url: page.next_url(),
                }),
            };
            let bytes = self.render_template(source_path, template, &context)?;
            self.write_page(&page.url(), &bytes)?;
            written += 1;
            if let Some(alias) = page.alias_url() {
                self.write_page(&alias, &bytes)?;
                written += 1;
            }
        }

        info!(source = %source_path, url = %base_url, pages = pages.len(), "listed");
        Ok((
            ListingReport {
                source_path: source_path.to_string(),
                base_url,
                pages: pages.len(),
                documents: document_count,
            },
            written,
        ))
    }

    /// Head for one listing page. Pages after the first drop `hreflang`,
    /// since translations only map to the first page.
    fn listing_header(&self, fields: &Fields, page: &Page<'_>) -> String {
        let mut fields = fields.clone();
        if page.current_page > 1 {
            fields.remove("hreflang");
        }
        fields.insert(
            "canonical".into(),
            Value::String(slug::absolute_url(&self.config.base_url, &page.url())),
        );
        build_header(&fields, &self.header_settings())
    }

    // ------------------------------------------------------------------
    // Taxonomies
    // ------------------------------------------------------------------

    fn render_taxonomy(
        &self,
        kind: TaxonomyKind,
        documents: &[Document],
    ) -> Result<Option<(TaxonomyReport, usize)>, BuildError> {
        let index = TaxonomyIndex::build(kind, documents);
        if index.is_empty() {
            debug!(taxonomy = kind.field(), "no terms, skipping archives");
            return Ok(None);
        }

        let settings = self.config.taxonomies.get(kind);
        let prefix = settings.route_prefix(kind);
        let list_chain = self.config.templates_for(DEFAULT_SECTION).list;
        let mut written = 0;

        let archive_chain = taxonomy::archive_template_chain(&settings.archive_template, &list_chain);
        let archives = taxonomy::archive_pages(&index, prefix);
        for archive in &archives {
            let template = self.pick_template(&archive.url, &archive_chain)?;
            let title = archive.title();
            let description = archive.description();
            let head = self.generated_page_header(&title, &description, &archive.url);
            let context = TemplateContext {
                site_name: &self.config.site_name,
                head: &head,
                title: &title,
                description: Some(&description),
                content: PageContent::Listing(ListingContent {
                    documents: &archive.documents,
                    intro: None,
                    current_page: 1,
                    total_pages: 1,
                    previous_url: None,
                    next_url: None,
                }),
            };
            let bytes = self.render_template(&archive.url, template, &context)?;
            self.write_page(&archive.url, &bytes)?;
            written += 1;
        }

        let Some(overview) = taxonomy::overview(&index, prefix) else {
            return Ok(None);
        };
        let overview_chain =
            taxonomy::overview_template_chain(kind, &settings.archive_template, &list_chain);
        let template = self.pick_template(&overview.url, &overview_chain)?;
        let title = overview.title(&self.config.site_name);
        let description = overview.description();
        let head = self.generated_page_header(&title, &description, &overview.url);
        let context = TemplateContext {
            site_name: &self.config.site_name,
            head: &head,
            title: &title,
            description: Some(&description),
            content: PageContent::Terms(TermsContent {
                by_count: &overview.by_count,
                alphabetical: &overview.alphabetical,
            }),
        };
        let bytes = self.render_template(&overview.url, template, &context)?;
        self.write_page(&overview.url, &bytes)?;
        written += 1;

        info!(
            taxonomy = kind.field(),
            terms = archives.len(),
            url = %overview.url,
            "generated taxonomy pages"
        );
        let report = TaxonomyReport {
            kind,
            overview_url: overview.url.clone(),
            archives: archives
                .iter()
                .map(|a| (a.term.to_string(), a.url.clone(), a.documents.len()))
                .collect(),
        };
        Ok(Some((report, written)))
    }

    fn generated_page_header(&self, title: &str, description: &str, url: &str) -> String {
        let mut fields = self.config.default_fields();
        fields.insert("title".into(), Value::String(title.to_string()));
        fields.insert("description".into(), Value::String(description.to_string()));
        fields.insert(
            "canonical".into(),
            Value::String(slug::absolute_url(&self.config.base_url, url)),
        );
        build_header(&fields, &self.header_settings())
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    fn header_settings(&self) -> HeaderSettings<'_> {
        HeaderSettings {
            base_url: &self.config.base_url,
            hreflang_default: self.config.hreflang_default.as_deref(),
        }
    }

    fn pick_template<'c>(&self, page: &str, chain: &[&'c str]) -> Result<&'c str, BuildError> {
        first_available(self.templates, chain).ok_or_else(|| BuildError::MissingTemplate {
            page: page.to_string(),
            tried: chain.iter().map(|id| id.to_string()).collect(),
        })
    }

    fn render_markdown(&self, page: &str, markdown: &str) -> Result<String, BuildError> {
        self.markdown
            .render(markdown)
            .map_err(|source| BuildError::Render {
                page: page.to_string(),
                source,
            })
    }

    fn render_template(
        &self,
        page: &str,
        template: &str,
        context: &TemplateContext<'_>,
    ) -> Result<Vec<u8>, BuildError> {
        self.templates
            .render(template, context)
            .map_err(|source| BuildError::Render {
                page: page.to_string(),
                source,
            })
    }

    /// Write `bytes` as `{output}/{url}/{index_filename}`.
    fn write_page(&self, url: &str, bytes: &[u8]) -> Result<PathBuf, BuildError> {
        let dir = self.output.join(slug::url_to_output_path(url));
        fs::create_dir_all(&dir)?;
        let path = dir.join(&self.config.index_filename);
        fs::write(&path, bytes)?;
        Ok(path)
    }
}

enum Converted {
    Page { doc: Document, html: Vec<u8> },
    Unpublished(String),
}

/// Template section of a source path: its first directory, or the default
/// section for files at the root.
pub fn section_of(source_path: &str) -> &str {
    source_path
        .split_once('/')
        .map(|(section, _)| section)
        .unwrap_or(DEFAULT_SECTION)
}

fn file_stem(source_path: &str) -> String {
    let name = source_path.rsplit('/').next().unwrap_or(source_path);
    name.strip_suffix(".md").unwrap_or(name).to_string()
}

/// Collect markdown sources under `root`, sorted, skipping hidden entries
/// and embargo files.
pub fn discover(root: &Path) -> Result<SourceFiles, BuildError> {
    let mut files = SourceFiles::default();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if !name.ends_with(".md") || embargo::is_embargo_file(&name) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        if name == LIST_INDEX_FILENAME {
            files.listings.push(relative);
        } else {
            files.content.push(relative);
        }
    }
    Ok(files)
}
