use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "joblens")]
#[command(author, version, about = "Multi-strategy job posting extraction", long_about = None)]
#[command(after_help = r#"Examples:
  joblens extract --site simplyhired --file saved-posting.html
  joblens extract --site glassdoor --url "https://www.glassdoor.co.in/job-listing/...?jl=100951"
  joblens cards --site foundit --file results.html --pretty
  joblens search-url --site foundit --query "data analyst" --location bangalore
  joblens sites

The generative fallback activates when GROQ_API_KEY is set (or groq_api_key
is present in the config file); without it, extraction still runs with the
structured, section and regex passes.
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract one job posting from a saved page or a URL
    Extract {
        /// Site profile to use (see `joblens sites`)
        #[arg(long)]
        site: String,

        /// Saved HTML file to extract from
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// URL to fetch and extract from
        #[arg(long)]
        url: Option<String>,

        /// Original posting URL, for job-id recovery when reading from a file
        #[arg(long)]
        source_url: Option<String>,

        /// Include the per-field strategy report in the output
        #[arg(long)]
        report: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Extract search-result cards from a listings page
    Cards {
        /// Site profile to use (see `joblens sites`)
        #[arg(long)]
        site: String,

        /// Saved HTML file to extract from
        #[arg(long, conflicts_with = "url")]
        file: Option<PathBuf>,

        /// URL to fetch and extract from
        #[arg(long)]
        url: Option<String>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the search-results URL for a query and location
    #[command(name = "search-url")]
    SearchUrl {
        /// Site profile to use (see `joblens sites`)
        #[arg(long)]
        site: String,

        /// Search keywords
        #[arg(long)]
        query: String,

        /// Location to search in
        #[arg(long)]
        location: String,
    },

    /// Show the config file, or store the API key in it
    Config {
        /// Store the Groq API key in the config file
        #[arg(long, value_name = "KEY")]
        set_api_key: Option<String>,
    },

    /// List the built-in site profiles
    Sites,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract_with_file() {
        let cli = Cli::try_parse_from([
            "joblens", "extract", "--site", "simplyhired", "--file", "page.html", "--pretty",
        ])
        .unwrap();
        match cli.command {
            Commands::Extract {
                site, file, url, ..
            } => {
                assert_eq!(site, "simplyhired");
                assert!(file.is_some());
                assert!(url.is_none());
            }
            _ => panic!("expected extract subcommand"),
        }
    }

    #[test]
    fn test_file_and_url_conflict() {
        let result = Cli::try_parse_from([
            "joblens", "extract", "--site", "glassdoor", "--file", "a.html", "--url",
            "https://example.com",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_config_set_api_key() {
        let cli =
            Cli::try_parse_from(["joblens", "config", "--set-api-key", "gsk_test"]).unwrap();
        match cli.command {
            Commands::Config { set_api_key } => {
                assert_eq!(set_api_key.as_deref(), Some("gsk_test"));
            }
            _ => panic!("expected config subcommand"),
        }
    }
}
