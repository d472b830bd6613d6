use clap::{Parser, Subcommand, ValueEnum};
use quire::build::{self, Builder};
use quire::cache::FileCacheStore;
use quire::config::{self, DEFAULT_CONFIG_FILE};
use quire::output;
use quire::query::QueryEngine;
use quire::render::{BuiltinTemplates, CommonMarkRenderer};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Static blog generator with taxonomy archives and a queryable snapshot")]
#[command(long_about = "\
Static blog generator with taxonomy archives and a queryable snapshot

Markdown files with YAML front-matter become pages. The directory layout is
the URL layout, and every index.md becomes a paginated listing of the
documents below it.

Content structure:

  content/
  ├── index.md                     # Root listing (intro text + all documents)
  ├── about.md                     # → about/
  └── blog/
      ├── index.md                 # Listing of blog/ → blog/, blog/2/, ...
      ├── first-post.md            # → blog/first-post/
      ├── launch.1.emb.md          # Embargoed until its `modified` date passes
      └── tutorials/
          └── intro.md             # → blog/tutorials/intro/

Front-matter (all optional):
  title, description   Page title and summary (description is markdown)
  published            Unpublished until this date; missing = never published
  modified             Sort key for listings; release date for embargo files
  slug                 URL segment when slug_source = \"frontmatter\"
  tags, categories     Lists of terms; each term gets an archive page

Run 'quire gen-config' to generate a documented quire.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Output directory (overrides output_dir from the config)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Convert the source tree into a static site
    Build {
        /// Content directory (overrides source_path from the config)
        source: Option<PathBuf>,
    },
    /// Query the cached document snapshot
    Query {
        /// Cache key (overrides cache.key from the config)
        #[arg(long)]
        key: Option<String>,

        #[command(subcommand)]
        query: QueryCommand,
    },
    /// Print a stock quire.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum QueryCommand {
    /// List every tag in use
    Tags,
    /// List every category in use
    Categories,
    /// Documents carrying a tag
    Tag { name: String },
    /// Documents in a category
    Category { name: String },
    /// Case-insensitive full-text search
    Search { text: String },
    /// One page of all documents, newest first
    Page {
        #[arg(default_value_t = 1)]
        number: usize,
        #[arg(long, default_value_t = 12)]
        per_page: usize,
    },
    /// Documents related to the one at URL
    Related {
        url: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    match cli.command {
        Command::Build { source } => {
            let site_config = config::load_config(&cli.config)?;
            init_thread_pool(&site_config.processing);
            let source = build::resolve_source(source.as_deref(), &site_config)?;
            let output_dir = cli
                .output
                .unwrap_or_else(|| PathBuf::from(&site_config.output_dir));
            let store = FileCacheStore::new(&site_config.cache.dir);

            println!("==> Building {} → {}", source.display(), output_dir.display());
            let report = Builder::new(
                &site_config,
                &source,
                &output_dir,
                &CommonMarkRenderer,
                &BuiltinTemplates,
            )
            .with_cache(&store)
            .run()?;
            output::print_build_output(&report);
            println!("==> Build complete: {}", output_dir.display());
        }
        Command::Query { key, query } => {
            let site_config = config::load_config(&cli.config)?;
            let key = key
                .or_else(|| site_config.cache.key.clone())
                .ok_or("no cache key: pass --key or set cache.key in the config")?;
            let store = FileCacheStore::new(&site_config.cache.dir);
            let engine = QueryEngine::from_cache(&store, &key);
            run_query(&engine, query)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_query(engine: &QueryEngine, query: QueryCommand) -> Result<(), Box<dyn std::error::Error>> {
    let lines = match query {
        QueryCommand::Tags => output::format_terms(&engine.all_tags()),
        QueryCommand::Categories => output::format_terms(&engine.all_categories()),
        QueryCommand::Tag { name } => output::format_documents(&engine.by_tag(&name)),
        QueryCommand::Category { name } => output::format_documents(&engine.by_category(&name)),
        QueryCommand::Search { text } => output::format_documents(&engine.search(&text)),
        QueryCommand::Page { number, per_page } => {
            output::format_page(&engine.paginate(per_page, number))
        }
        QueryCommand::Related { url, limit } => {
            let target = engine
                .find_by_url(&url)
                .ok_or_else(|| format!("no document at URL '{url}'"))?;
            output::format_documents(&engine.related_to(target, limit))
        }
    };
    output::print_lines(&lines);
    Ok(())
}

/// Initialize tracing. `RUST_LOG` wins over the verbosity flag. Logs go to
/// stderr so stdout carries only the report.
fn init_tracing(verbose: u8, format: LogFormat) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match verbose {
        0 => "quire=warn",
        1 => "quire=info",
        2 => "quire=debug",
        _ => "quire=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
