//! joblens - multi-strategy job posting extraction CLI

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use joblens::cli::{Cli, Commands};
use joblens::config::Config;
use joblens::error::{JoblensError, Result};
use joblens::llm;
use joblens::pipeline::Extractor;
use joblens::site::SiteProfile;
use joblens::{cards, fetch};

fn main() {
    setup_logging();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("\n{}", hint);
        }
        std::process::exit(1);
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            site,
            file,
            url,
            source_url,
            report,
            pretty,
        } => cmd_extract(&site, file, url, source_url, report, pretty),

        Commands::Cards {
            site,
            file,
            url,
            pretty,
        } => cmd_cards(&site, file, url, pretty),

        Commands::SearchUrl {
            site,
            query,
            location,
        } => {
            let profile = SiteProfile::by_name(&site)?;
            println!("{}", profile.search_url(&query, &location)?);
            Ok(())
        }

        Commands::Config { set_api_key } => cmd_config(set_api_key),

        Commands::Sites => {
            for profile in SiteProfile::all() {
                println!("{:<14} {}", profile.name, profile.base_url);
            }
            Ok(())
        }
    }
}

/// Resolve --file/--url to page HTML plus the URL the posting came from.
fn load_input(
    file: Option<PathBuf>,
    url: Option<String>,
    source_url: Option<String>,
) -> Result<(String, String)> {
    match (file, url) {
        (Some(path), None) => {
            let html = std::fs::read_to_string(&path)?;
            let source = source_url.unwrap_or_else(|| format!("file://{}", path.display()));
            Ok((html, source))
        }
        (None, Some(url)) => {
            let page = fetch::fetch_page(&url)?;
            Ok((page.html, source_url.unwrap_or(page.url)))
        }
        _ => Err(JoblensError::InputUnavailable(
            "expected exactly one of --file or --url".to_string(),
        )),
    }
}

fn cmd_extract(
    site: &str,
    file: Option<PathBuf>,
    url: Option<String>,
    source_url: Option<String>,
    with_report: bool,
    pretty: bool,
) -> Result<()> {
    let profile = SiteProfile::by_name(site)?;
    let (html, source) = load_input(file, url, source_url)?;

    let config = Config::load()?;
    let backend = llm::backend_from_config(&config);
    let extractor = Extractor::new(profile, backend);

    let extraction = extractor.extract(&html, &source);
    if !extraction.record.is_valid() {
        tracing::warn!(site, "no job title found; page may not be a posting");
    }

    let mut envelope = serde_json::json!({
        "scrapedJobs": [extraction.record],
        "scrapedCount": 1,
        "site": profile.name,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    if with_report {
        envelope["report"] = serde_json::to_value(&extraction.report)?;
    }

    print_json(&envelope, pretty)
}

fn cmd_cards(site: &str, file: Option<PathBuf>, url: Option<String>, pretty: bool) -> Result<()> {
    let profile = SiteProfile::by_name(site)?;
    let (html, _source) = load_input(file, url, None)?;

    let cards = cards::extract_cards(&html, profile);
    let count = cards.len();
    let envelope = serde_json::json!({
        "jobs": cards,
        "count": count,
        "site": profile.name,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    print_json(&envelope, pretty)
}

fn cmd_config(set_api_key: Option<String>) -> Result<()> {
    let mut config = Config::load()?;
    let path = Config::config_path()?;

    match set_api_key {
        Some(key) => {
            config.groq_api_key = Some(key);
            config.save()?;
            println!("Saved {}", path.display());
        }
        None => {
            println!("# {}", path.display());
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| JoblensError::ConfigError(e.to_string()))?;
            print!("{}", rendered);
        }
    }
    Ok(())
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    if pretty {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", serde_json::to_string(value)?);
    }
    Ok(())
}
