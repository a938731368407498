//! CLI smoke tool over a content database.
//!
//! # Responsibility
//! - Exercise `scribble_core` entities against a configured connection.
//! - Keep output line-oriented and deterministic for quick inspection.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use scribble_core::config::find_config_file;
use scribble_core::text::DEFAULT_EXCERPT_LIMIT;
use scribble_core::{
    default_log_level, init_logging, open_connection, Post, PostQuery, Scribble, ScribbleConfig,
    SqliteContentRepository, TaxonomyKind, TaxonomyQuery, DEFAULT_SELECTION_LIMIT,
};

/// scribble - inspect WordPress-compatible content
#[derive(Parser, Debug)]
#[command(name = "scribble")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to the nearest scribble.yaml)
    #[arg(long, global = true, env = "SCRIBBLE_CONFIG")]
    config: Option<PathBuf>,

    /// Absolute directory for rotating log files; logging is off without it
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the most recent published items
    Recent {
        /// Maximum number of items to show
        #[arg(short, long, default_value = "10")]
        limit: u32,

        /// Post type to list
        #[arg(short = 't', long = "type", default_value = "post")]
        post_type: String,
    },

    /// Show derived fields of one item
    Show {
        /// Item ID
        id: i64,

        /// Featured image size variant (e.g. "thumbnail", "medium")
        #[arg(short, long)]
        size: Option<String>,

        /// Suffix appended to the SEO title
        #[arg(long)]
        suffix: Option<String>,
    },

    /// Count published items per calendar month
    Months {
        #[arg(short = 't', long = "type", default_value = "post")]
        post_type: String,
    },

    /// List recent posts of a category or tag
    Taxonomy {
        /// Taxonomy kind: category, tag, or a custom taxonomy name
        kind: String,

        /// Term slug
        slug: String,

        /// Maximum number of posts to show
        #[arg(short, long, default_value_t = DEFAULT_SELECTION_LIMIT)]
        limit: u32,
    },

    /// Fetch the share count of one item
    Shares {
        /// Item ID
        id: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
        init_logging(level, log_dir).map_err(|err| anyhow!("Failed to initialize logging: {err}"))?;
    }

    let config = load_config(cli.config.as_ref())?;
    let conn = open_connection(&config)
        .with_context(|| format!("Failed to open connection `{}`", config.connection))?;
    let repo = SqliteContentRepository::try_new(&conn).context("Content schema is not ready")?;
    let scribble = Scribble::new(repo, config).context("Failed to build share client")?;

    info!("event=cli_command module=cli status=start command={:?}", cli.command);
    match cli.command {
        Commands::Recent { limit, post_type } => {
            let query = PostQuery::new().recent(Some(limit), &post_type);
            for post in scribble.posts(&query)? {
                print_summary(&post);
            }
        }
        Commands::Show { id, size, suffix } => {
            let Some(post) = scribble.post(id)? else {
                bail!("No item with ID {id}");
            };
            show(&post, size.as_deref(), suffix.as_deref())?;
        }
        Commands::Months { post_type } => {
            for month in scribble.month_counts(&post_type)? {
                println!("{:<10} {}", month.month, month.count);
            }
        }
        Commands::Taxonomy { kind, slug, limit } => {
            let query = TaxonomyQuery::new().of_kind(parse_kind(&kind)).slug(&slug);
            let Some(taxonomy) = scribble.taxonomies(&query)?.into_iter().next() else {
                bail!("No {kind} with slug `{slug}`");
            };
            println!("{} ({})", taxonomy.name(), taxonomy.kind());
            for post in taxonomy.post_selection(limit)? {
                print_summary(&post);
            }
        }
        Commands::Shares { id } => {
            let Some(post) = scribble.post(id)? else {
                bail!("No item with ID {id}");
            };
            println!("{} {}", post.permalink(), post.shares());
        }
    }

    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<ScribbleConfig> {
    match path.cloned().or_else(find_config_file) {
        Some(path) => ScribbleConfig::load(&path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ScribbleConfig::from_env()),
    }
}

fn parse_kind(value: &str) -> TaxonomyKind {
    match value.trim() {
        "tag" | "tags" => TaxonomyKind::Tag,
        "categories" => TaxonomyKind::Category,
        other => TaxonomyKind::parse(other),
    }
}

fn print_summary(post: &Post<'_>) {
    println!(
        "{:>6}  {}  {}",
        post.id(),
        post.published_at().format("%Y-%m-%d"),
        post.title()
    );
}

fn show(post: &Post<'_>, size: Option<&str>, suffix: Option<&str>) -> Result<()> {
    println!("id:        {}", post.id());
    println!("title:     {}", post.title());
    println!("type:      {} ({})", post.post_type(), post.kind().name());
    println!("published: {}", post.published_date());
    println!("url:       {}", post.permalink());
    println!("excerpt:   {}", post.excerpt(DEFAULT_EXCERPT_LIMIT));

    let categories = post
        .categories()?
        .iter()
        .map(|term| term.name.as_str())
        .collect::<Vec<_>>();
    let tags = post
        .tags()?
        .iter()
        .map(|term| term.name.as_str())
        .collect::<Vec<_>>();
    println!("categories: {}", categories.join(", "));
    println!("tags:      {}", tags.join(", "));

    match post.featured_url(size)? {
        Some(url) => println!("image:     {url}"),
        None => println!("image:     -"),
    }
    if let Some(alt) = post.featured_alt()? {
        println!("image alt: {alt}");
    }

    for (label, neighbour) in [("previous", post.previous(true)?), ("next", post.next(true)?)] {
        match neighbour {
            Some(neighbour) => println!("{label:<10} {} {}", neighbour.id(), neighbour.title()),
            None => println!("{label:<10} -"),
        }
    }

    println!();
    println!("{}", post.seo_meta(suffix)?);
    Ok(())
}
