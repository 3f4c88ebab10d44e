//! Command-line interface parsing for citysearch
//!
//! This module handles parsing of CLI arguments using clap, merging flag
//! overrides into the configuration, and formatting command output.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::{parse_count, Config};
use crate::data::{City, CityId, RecentSearch};

/// Error types for CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// The requested result count is outside 1-100
    #[error("Invalid count: '{0}'. Expected a number between 1 and 100")]
    InvalidCount(String),

    /// A selection was made before any search was recorded
    #[error("No recent search to select from. Run `citysearch search <QUERY>` first")]
    NoRecentSearch,

    /// The selected id is not among the latest search's cities
    #[error("City {0} is not in the results of the latest search")]
    UnknownCity(CityId),
}

/// citysearch - Look up cities by name with a local cache and recent searches
#[derive(Parser, Debug)]
#[command(name = "citysearch")]
#[command(about = "City search with a local result cache and recent searches")]
#[command(version)]
pub struct Cli {
    /// Directory holding cached results and recent searches
    #[arg(long, value_name = "DIR", global = true)]
    pub store_dir: Option<PathBuf>,

    /// Number of matches requested per query (1-100)
    #[arg(long, value_name = "N", global = true, value_parser = parse_count_arg)]
    pub count: Option<u8>,

    /// Language of returned city names, e.g. "en" or "pt"
    #[arg(long, value_name = "LANG", global = true)]
    pub language: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Search cities by name, serving repeated queries from the cache
    ///
    /// Examples:
    ///   citysearch search Paris
    ///   citysearch search "New York"
    Search {
        /// City name, used exactly as given
        query: String,
    },

    /// Select a city from the latest search's results by its id
    Select {
        /// Id printed next to the city by `search` or `recent`
        city_id: CityId,
    },

    /// Show recent searches, most recent first
    Recent,
}

/// Parses the `--count` argument
pub fn parse_count_arg(s: &str) -> Result<u8, CliError> {
    parse_count("--count", s).map_err(|_| CliError::InvalidCount(s.to_string()))
}

impl Cli {
    /// Applies flag overrides on top of `config`
    pub fn override_config(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.store_dir {
            config.store_dir = dir.clone();
        }
        if let Some(count) = self.count {
            config.result_count = count;
        }
        if let Some(language) = &self.language {
            config.language = language.clone();
        }
        config
    }
}

/// One output line for a city: right-aligned id, then qualified name
pub fn format_city(city: &City) -> String {
    format!("{:>10}  {}", city.id, city.display_name())
}

/// Output for the `recent` command
pub fn format_recent(searches: &[RecentSearch]) -> String {
    if searches.is_empty() {
        return "No recent searches\n".to_string();
    }

    let mut out = String::new();
    for (index, search) in searches.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", index + 1, search.query));
        for city in &search.cities {
            out.push_str(&format!("   {}\n", format_city(city)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_arg_valid() {
        assert_eq!(parse_count_arg("1").unwrap(), 1);
        assert_eq!(parse_count_arg("25").unwrap(), 25);
    }

    #[test]
    fn test_parse_count_arg_invalid() {
        let err = parse_count_arg("0").unwrap_err();
        assert!(err.to_string().contains("Invalid count"));
        assert!(err.to_string().contains("'0'"));
        assert!(parse_count_arg("lots").is_err());
    }

    #[test]
    fn test_cli_parse_search() {
        let cli = Cli::parse_from(["citysearch", "search", "New York"]);
        assert_eq!(
            cli.command,
            Command::Search {
                query: "New York".to_string()
            }
        );
        assert!(cli.store_dir.is_none());
    }

    #[test]
    fn test_cli_parse_select() {
        let cli = Cli::parse_from(["citysearch", "select", "2988507"]);
        assert_eq!(cli.command, Command::Select { city_id: 2988507 });
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["citysearch", "recent", "--store-dir", "/tmp/cs", "--count", "3"]);
        assert_eq!(cli.command, Command::Recent);
        assert_eq!(cli.store_dir, Some(PathBuf::from("/tmp/cs")));
        assert_eq!(cli.count, Some(3));
    }

    #[test]
    fn test_cli_rejects_invalid_count() {
        let result = Cli::try_parse_from(["citysearch", "--count", "500", "recent"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["citysearch"]).is_err());
    }

    #[test]
    fn test_override_config() {
        let cli = Cli::parse_from([
            "citysearch",
            "--store-dir",
            "/tmp/cs",
            "--language",
            "fr",
            "search",
            "Paris",
        ]);

        let config = cli.override_config(Config::default());

        assert_eq!(config.store_dir, PathBuf::from("/tmp/cs"));
        assert_eq!(config.language, "fr");
        assert_eq!(config.result_count, Config::default().result_count);
    }

    #[test]
    fn test_format_city() {
        let city = City {
            country: Some("France".to_string()),
            ..City::new(2988507, "Paris")
        };
        assert_eq!(format_city(&city), "   2988507  Paris, France");
    }

    #[test]
    fn test_format_recent_empty() {
        assert_eq!(format_recent(&[]), "No recent searches\n");
    }

    #[test]
    fn test_format_recent_lists_searches_in_order() {
        let searches = vec![
            RecentSearch::new("London", vec![City::new(2643743, "London")]),
            RecentSearch::new("Paris", vec![City::new(2988507, "Paris")]),
        ];

        let out = format_recent(&searches);

        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "1. London");
        assert!(lines[1].contains("2643743  London"));
        assert_eq!(lines[2], "2. Paris");
    }
}
