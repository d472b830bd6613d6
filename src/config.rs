//! Site configuration module.
//!
//! Handles loading, validating, and merging `quire.toml`. Stock defaults are
//! the base layer; the user file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! # source_path = "content"      # Used when `quire build` gets no SOURCE
//! output_dir = "public"
//! base_url = "http://localhost"
//! site_name = "Blog"
//! slug_source = "filename"       # or "frontmatter"
//! index_filename = "index.htm"
//! # hreflang_default = "en"
//!
//! [defaults]                     # Merged under every document's front-matter
//! # locale = "en"
//!
//! [cache]
//! # key = "blog"                 # Unset = no snapshot
//! expiry = 86400                 # Seconds
//! dir = ".quire-cache"
//!
//! [taxonomies.tags]
//! enabled = true
//! route_prefix = "tags"
//! archive_template = "taxonomy-archive"
//!
//! [taxonomies.categories]
//! enabled = true
//! route_prefix = "categories"
//! archive_template = "taxonomy-archive"
//!
//! [templates.default]            # Per-section overrides: [templates.<dir>]
//! article = "article"
//! list = "list"
//! per_page = 12
//!
//! [processing]
//! max_processes = 4              # Omit for auto = CPU cores
//! ```
//!
//! Unknown keys are rejected to catch typos early, except under
//! `[defaults]`, which is free-form.

use crate::document::Fields;
use crate::slug::SlugSource;
use crate::taxonomy::TaxonomyKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "quire.toml";

/// Template section used for files at the source root and as the fallback
/// for every other section.
pub const DEFAULT_SECTION: &str = "default";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `quire.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Source root used when the CLI gets none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
    /// Output root for generated pages.
    pub output_dir: String,
    /// Absolute site URL; canonical, image, and hreflang URLs are joined to it.
    pub base_url: String,
    /// Used in overview page titles and the built-in layouts.
    pub site_name: String,
    pub slug_source: SlugSource,
    /// File name each page is written as inside its URL directory.
    pub index_filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hreflang_default: Option<String>,
    /// Fields merged under every document's front-matter.
    pub defaults: toml::Table,
    pub cache: CacheConfig,
    pub taxonomies: TaxonomiesConfig,
    /// Template ids per top-level source directory.
    pub templates: BTreeMap<String, TemplateConfig>,
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(
            DEFAULT_SECTION.to_string(),
            TemplateConfig {
                article: Some("article".to_string()),
                list: Some("list".to_string()),
                per_page: Some(12),
            },
        );
        Self {
            source_path: None,
            output_dir: "public".to_string(),
            base_url: "http://localhost".to_string(),
            site_name: "Blog".to_string(),
            slug_source: SlugSource::Filename,
            index_filename: "index.htm".to_string(),
            hreflang_default: None,
            defaults: toml::Table::new(),
            cache: CacheConfig::default(),
            taxonomies: TaxonomiesConfig::default(),
            templates,
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "base_url must start with http:// or https://".into(),
            ));
        }
        if self.index_filename.is_empty() || self.index_filename.contains('/') {
            return Err(ConfigError::Validation(
                "index_filename must be a plain file name".into(),
            ));
        }
        for (section, templates) in &self.templates {
            if templates.per_page == Some(0) {
                return Err(ConfigError::Validation(format!(
                    "templates.{section}.per_page must be at least 1"
                )));
            }
        }
        if self.cache.key.is_some() && self.cache.expiry == 0 {
            return Err(ConfigError::Validation(
                "cache.expiry must be greater than 0 when cache.key is set".into(),
            ));
        }
        for kind in TaxonomyKind::ALL {
            let taxonomy = self.taxonomies.get(kind);
            if taxonomy.enabled && taxonomy.route_prefix(kind).trim_matches('/').is_empty() {
                return Err(ConfigError::Validation(format!(
                    "taxonomies.{}.route_prefix must not be empty",
                    kind.field()
                )));
            }
        }
        Ok(())
    }

    /// `[defaults]` as a front-matter field map.
    pub fn default_fields(&self) -> Fields {
        self.defaults
            .iter()
            .map(|(key, value)| (key.clone(), toml_to_json(value)))
            .collect()
    }

    /// Template chains and page size for a section, falling back to
    /// `[templates.default]` and then the stock ids.
    pub fn templates_for(&self, section: &str) -> SectionTemplates<'_> {
        let own = self.templates.get(section);
        let fallback = self.templates.get(DEFAULT_SECTION);
        let chain = |pick: fn(&TemplateConfig) -> Option<&String>, stock: &'static str| {
            let mut ids: Vec<&str> = Vec::new();
            for id in [own.and_then(pick), fallback.and_then(pick)]
                .into_iter()
                .flatten()
            {
                if !ids.contains(&id.as_str()) {
                    ids.push(id.as_str());
                }
            }
            if ids.is_empty() {
                ids.push(stock);
            }
            ids
        };

        SectionTemplates {
            article: chain(|t| t.article.as_ref(), "article"),
            list: chain(|t| t.list.as_ref(), "list"),
            per_page: own
                .and_then(|t| t.per_page)
                .or_else(|| fallback.and_then(|t| t.per_page))
                .unwrap_or(12),
        }
    }
}

/// Convert a TOML value into the JSON shape documents use. Datetimes become
/// their string form so date parsing treats them like front-matter dates.
pub fn toml_to_json(value: &toml::Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        toml::Value::String(s) => Json::String(s.clone()),
        toml::Value::Integer(i) => Json::from(*i),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        toml::Value::Boolean(b) => Json::Bool(*b),
        toml::Value::Datetime(dt) => Json::String(dt.to_string()),
        toml::Value::Array(items) => Json::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Json::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Resolved template settings for one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTemplates<'a> {
    /// Article template ids, most specific first.
    pub article: Vec<&'a str>,
    /// Listing template ids, most specific first.
    pub list: Vec<&'a str>,
    pub per_page: usize,
}

/// Template ids for one section. Unset keys fall back to `[templates.default]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<String>,
    /// Documents per listing page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<usize>,
}

/// Snapshot cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Key the finalized documents are stored under. Unset disables caching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Time-to-live in seconds.
    pub expiry: u64,
    /// Directory of the file-backed store.
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key: None,
            expiry: 86_400,
            dir: ".quire-cache".to_string(),
        }
    }
}

/// Per-kind taxonomy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxonomiesConfig {
    pub tags: TaxonomyConfig,
    pub categories: TaxonomyConfig,
}

impl Default for TaxonomiesConfig {
    fn default() -> Self {
        Self {
            tags: TaxonomyConfig::for_kind(TaxonomyKind::Tag),
            categories: TaxonomyConfig::for_kind(TaxonomyKind::Category),
        }
    }
}

impl TaxonomiesConfig {
    pub fn get(&self, kind: TaxonomyKind) -> &TaxonomyConfig {
        match kind {
            TaxonomyKind::Tag => &self.tags,
            TaxonomyKind::Category => &self.categories,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaxonomyConfig {
    pub enabled: bool,
    /// URL prefix of archive and overview pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_prefix: Option<String>,
    /// Template id tried first for term archives.
    pub archive_template: String,
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            route_prefix: None,
            archive_template: "taxonomy-archive".to_string(),
        }
    }
}

impl TaxonomyConfig {
    fn for_kind(kind: TaxonomyKind) -> Self {
        Self {
            route_prefix: Some(kind.default_route_prefix().to_string()),
            ..Self::default()
        }
    }

    /// Configured prefix, or the kind's stock prefix.
    pub fn route_prefix(&self, kind: TaxonomyKind) -> &str {
        self.route_prefix
            .as_deref()
            .unwrap_or(kind.default_route_prefix())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel conversion workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, merging user values on top of stock defaults.
/// A missing file yields the stock configuration.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `quire.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Quire Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error (except under [defaults]).

# Source directory used when `quire build` is run without a SOURCE argument.
# source_path = "content"

# Where generated pages are written.
output_dir = "public"

# Absolute site URL. Canonical, image, and hreflang URLs are joined to it.
base_url = "http://localhost"

# Shown in overview titles ("Tags - Blog") and the built-in layouts.
site_name = "Blog"

# "filename": URLs come from file names (blog/my-post.md -> blog/my-post/).
# "frontmatter": a `slug` field replaces the file name when present.
slug_source = "filename"

# File written inside each URL directory.
index_filename = "index.htm"

# Locale whose alternate link is also announced as x-default.
# hreflang_default = "en"

# ---------------------------------------------------------------------------
# Front-matter defaults
# ---------------------------------------------------------------------------
# Any key here is merged under every document's own front-matter.
[defaults]
# locale = "en"

# ---------------------------------------------------------------------------
# Document snapshot cache (read by `quire query`)
# ---------------------------------------------------------------------------
[cache]
# Key the snapshot is stored under. Leave unset to skip caching.
# key = "blog"

# Snapshot lifetime in seconds.
expiry = 86400

# Directory of the cache files.
dir = ".quire-cache"

# ---------------------------------------------------------------------------
# Taxonomies
# ---------------------------------------------------------------------------
[taxonomies.tags]
enabled = true
route_prefix = "tags"
# Tried before the section's list template for each term archive.
archive_template = "taxonomy-archive"

[taxonomies.categories]
enabled = true
route_prefix = "categories"
archive_template = "taxonomy-archive"

# ---------------------------------------------------------------------------
# Templates
# ---------------------------------------------------------------------------
# Per top-level source directory, e.g. [templates.blog]. Unset keys fall
# back to [templates.default].
[templates.default]
article = "article"
list = "list"
per_page = 12

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel conversion workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = SiteConfig::default();
        assert_eq!(config.output_dir, "public");
        assert_eq!(config.index_filename, "index.htm");
        assert_eq!(config.slug_source, SlugSource::Filename);
        assert_eq!(config.cache.expiry, 86_400);
        assert!(config.cache.key.is_none());
        assert!(config.taxonomies.tags.enabled);
        assert_eq!(config.taxonomies.categories.route_prefix(TaxonomyKind::Category), "categories");
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
slug_source = "frontmatter"

[cache]
key = "blog"
"#;
        let config = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap())).unwrap();
        assert_eq!(config.slug_source, SlugSource::Frontmatter);
        assert_eq!(config.cache.key.as_deref(), Some("blog"));
        // Defaults preserved
        assert_eq!(config.cache.expiry, 86_400);
        assert_eq!(config.templates_for("blog").per_page, 12);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config.output_dir, "public");
        assert_eq!(config.site_name, "Blog");
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            r#"
base_url = "https://example.com"
site_name = "Notes"

[taxonomies.categories]
enabled = false

[templates.blog]
per_page = 5
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.base_url, "https://example.com");
        assert_eq!(config.site_name, "Notes");
        assert!(!config.taxonomies.categories.enabled);
        // Unspecified values should be defaults
        assert!(config.taxonomies.tags.enabled);
        assert_eq!(config.taxonomies.tags.route_prefix(TaxonomyKind::Tag), "tags");
        assert_eq!(config.templates_for("blog").per_page, 5);
        assert_eq!(config.templates_for("about").per_page, 12);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "this is not valid toml [[[").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    // =========================================================================
    // Defaults and templates
    // =========================================================================

    #[test]
    fn default_fields_convert_toml_values() {
        let toml = r#"
[defaults]
locale = "en"
draft = false
published = 2024-01-15
og = { type = "article" }
"#;
        let config = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap())).unwrap();
        let fields = config.default_fields();
        assert_eq!(fields["locale"], serde_json::json!("en"));
        assert_eq!(fields["draft"], serde_json::json!(false));
        assert_eq!(fields["published"], serde_json::json!("2024-01-15"));
        assert_eq!(fields["og"], serde_json::json!({"type": "article"}));
    }

    #[test]
    fn section_templates_fall_back_to_default() {
        let toml = r#"
[templates.blog]
article = "post"
"#;
        let config = resolve_config(stock_defaults_value(), Some(toml::from_str(toml).unwrap())).unwrap();
        let blog = config.templates_for("blog");
        assert_eq!(blog.article, vec!["post", "article"]);
        assert_eq!(blog.list, vec!["list"]);

        let root = config.templates_for(DEFAULT_SECTION);
        assert_eq!(root.article, vec!["article"]);
    }

    #[test]
    fn section_templates_without_any_config_use_stock_ids() {
        let mut config = SiteConfig::default();
        config.templates.clear();
        let templates = config.templates_for("blog");
        assert_eq!(templates.article, vec!["article"]);
        assert_eq!(templates.list, vec!["list"]);
        assert_eq!(templates.per_page, 12);
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let config = ProcessingConfig {
            max_processes: Some(100_000),
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[cache]
expiry = 60
dir = "x"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[cache]
expiry = 120
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let cache = merged.get("cache").unwrap();
        assert_eq!(cache.get("expiry").unwrap().as_integer(), Some(120));
        // dir preserved from base
        assert_eq!(cache.get("dir").unwrap().as_str(), Some("x"));
    }

    #[test]
    fn merge_toml_keeps_default_template_section() {
        let overlay: toml::Value = toml::from_str(
            r#"
[templates.blog]
per_page = 3
"#,
        )
        .unwrap();
        let merged = merge_toml(stock_defaults_value(), overlay);
        let templates = merged.get("templates").unwrap();
        assert!(templates.get("default").is_some());
        assert!(templates.get("blog").is_some());
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[cache]
expiri = 90
"#;
        let result = resolve_config(stock_defaults_value(), Some(toml::from_str(toml_str).unwrap()));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_section_rejected() {
        let toml_str = r#"
[taxonomiez.tags]
enabled = true
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn defaults_table_accepts_any_key() {
        let toml_str = r#"
[defaults]
anything_goes = "yes"
"#;
        let result = resolve_config(stock_defaults_value(), Some(toml::from_str(toml_str).unwrap()));
        assert!(result.is_ok());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_per_page_zero() {
        let toml_str = r#"
[templates.blog]
per_page = 0
"#;
        let result = resolve_config(stock_defaults_value(), Some(toml::from_str(toml_str).unwrap()));
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_cache_expiry_zero_with_key() {
        let mut config = SiteConfig::default();
        config.cache.key = Some("blog".into());
        config.cache.expiry = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_empty_route_prefix() {
        let mut config = SiteConfig::default();
        config.taxonomies.tags.route_prefix = Some("/".into());
        assert!(config.validate().is_err());
        config.taxonomies.tags.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_base_url_scheme() {
        let mut config = SiteConfig::default();
        config.base_url = "example.com".into();
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let content = stock_config_toml();
        let _: toml::Value = toml::from_str(content).expect("stock config must be valid TOML");
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.output_dir, defaults.output_dir);
        assert_eq!(config.base_url, defaults.base_url);
        assert_eq!(config.index_filename, defaults.index_filename);
        assert_eq!(config.cache.expiry, defaults.cache.expiry);
        assert_eq!(config.templates_for("blog"), defaults.templates_for("blog"));
        assert_eq!(
            config.taxonomies.categories.route_prefix(TaxonomyKind::Category),
            "categories"
        );
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        assert!(val.get("cache").is_some());
        assert!(val.get("taxonomies").is_some());
        assert!(val.get("templates").is_some());
        assert!(val.get("processing").is_some());
    }
}
