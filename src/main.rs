//! seogen drafts SEO content for a website from its sitemap.xml.
//!
//! The tool has one long-running command and three one-shot stages:
//! 1. `serve` - Serves the stages below as a JSON API
//! 2. `titles` - Generates a title for every page of a sitemap
//! 3. `outlines` - Generates an outline for every given title
//! 4. `content` - Generates an article from an outline

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Builder;
use log::{LevelFilter, info};
use serde_json::json;

use seogen::{
    LlmProviderSource,
    constants::{DEFAULT_BACKEND, DEFAULT_BIND_ADDRESS, DEFAULT_MODEL, MODEL_API_KEY_ENV_NAME},
    content_from_outline, outlines_from_titles, serve, titles_from_sitemap,
};

/// A service to draft SEO titles, outlines and articles from sitemap.xml
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The command to execute
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    llm: LlmArgs,

    #[arg(long, short, action = clap::ArgAction::Count, help = "Output v(v...)erbosity: error (0), warn (1), info (2), debug (3), trace (4)", global = true, default_value_t = 2)]
    verbose: u8,
}

#[derive(Args)]
struct LlmArgs {
    /// LLM backend to send prompts to (openai, anthropic, ollama, ...)
    #[arg(long, global = true, default_value = DEFAULT_BACKEND)]
    backend: String,
    /// Model name passed to the backend
    #[arg(long, global = true, default_value = DEFAULT_MODEL)]
    model: String,
    /// Override of the backend API endpoint
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the generation stages over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, short, default_value = DEFAULT_BIND_ADDRESS)]
        bind: String,
    },
    /// Generate a title for every page listed in a sitemap
    Titles {
        /// The sitemap URL to read pages from
        sitemap_url: String,
    },
    /// Generate an outline for every title
    Outlines {
        /// Titles to outline
        #[arg(required = true)]
        titles: Vec<String>,
    },
    /// Generate an article from an outline
    Content {
        /// The outline to expand
        outline: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            3 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .init();

    let source = build_provider_source(cli.llm)?;

    match cli.command {
        Command::Serve { bind } => serve(&bind, Arc::new(source)).await,
        Command::Titles { sitemap_url } => {
            let titles = titles_from_sitemap(&sitemap_url, &source)
                .await
                .context(format!("Failed to read sitemap: {sitemap_url}"))?;
            print_json(&json!({ "titles": titles }))
        }
        Command::Outlines { titles } => {
            let outlines = outlines_from_titles(&titles, &source).await;
            print_json(&json!({ "outlines": outlines }))
        }
        Command::Content { outline } => {
            let content = content_from_outline(&outline, &source).await;
            print_json(&json!({ "content": content }))
        }
    }
}

fn build_provider_source(args: LlmArgs) -> Result<LlmProviderSource> {
    let api_key = match std::env::var(MODEL_API_KEY_ENV_NAME) {
        Ok(api_key) => {
            info!("API key is provided via {MODEL_API_KEY_ENV_NAME}");
            Some(api_key)
        }
        Err(err) => {
            info!("{err} while providing api key");
            None
        }
    };

    let source = LlmProviderSource::new(&args.backend, Some(args.model))?
        .with_api_key(api_key)
        .with_base_url(args.base_url);
    info!("Using model {} via {}", source.model(), args.backend);
    Ok(source)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
