use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tui_dispatch_debug::DebugCliArgs;

use crate::api::DEFAULT_API_BASE;
use crate::state::CatalogSettings;

const DEFAULT_LOG_FILTER: &str = "pokecatalog=info";

#[derive(Parser, Debug)]
#[command(name = "pokecatalog")]
#[command(about = "Browse and compare Pokemon base stats in the terminal")]
pub struct Config {
    /// Base URL of the PokeAPI instance
    #[arg(long, env = "POKECATALOG_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Creatures fetched per catalog page
    #[arg(long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: u32,

    /// Quiet period before a search query is expanded remotely
    #[arg(long, default_value = "300")]
    pub search_debounce_ms: u64,

    /// Shortest query that triggers a remote search
    #[arg(long, default_value = "3")]
    pub search_min_chars: usize,

    /// Write logs to this file (logging is off otherwise)
    #[arg(long, env = "POKECATALOG_LOG")]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub debug: DebugCliArgs,
}

impl Config {
    pub fn settings(&self) -> CatalogSettings {
        CatalogSettings {
            page_size: self.page_size,
            search_debounce_ms: self.search_debounce_ms,
            search_min_chars: self.search_min_chars.max(1),
        }
    }
}

/// Installs a file-backed subscriber. The terminal belongs to the UI, so
/// nothing is written to stdout or stderr.
pub fn init_tracing(path: Option<&Path>) -> io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_catalog_settings() {
        let config = Config::try_parse_from(["pokecatalog"]).unwrap();
        assert_eq!(config.settings(), CatalogSettings::default());
        assert!(config.log_file.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::try_parse_from([
            "pokecatalog",
            "--page-size",
            "50",
            "--search-debounce-ms",
            "120",
            "--search-min-chars",
            "0",
        ])
        .unwrap();
        let settings = config.settings();
        assert_eq!(settings.page_size, 50);
        assert_eq!(settings.search_debounce_ms, 120);
        assert_eq!(settings.search_min_chars, 1);
    }

    #[test]
    fn page_size_is_bounded() {
        assert!(Config::try_parse_from(["pokecatalog", "--page-size", "0"]).is_err());
        assert!(Config::try_parse_from(["pokecatalog", "--page-size", "101"]).is_err());
    }
}
