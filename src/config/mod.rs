//! Configuration module for the donation tracker.
//!
//! All configuration is loaded from environment variables with sensible
//! defaults. The extraction knobs (selectors, anchor tokens, currency code)
//! live here so new page template variants are a config change, not a code
//! change.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// What to do with a roster entry whose figure could not be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingFigurePolicy {
    /// Leave the entry out of the snapshot.
    Drop,
    /// Carry forward the entry from the previous snapshot, if any.
    Backfill,
}

impl MissingFigurePolicy {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "drop" => MissingFigurePolicy::Drop,
            _ => MissingFigurePolicy::Backfill,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Campaign identifier snapshots are recorded under
    pub campaign: String,
    /// Roster page to discover fundraiser targets from
    pub roster_url: String,
    /// Selector matching the roster page's name+link anchors
    pub roster_selector: String,
    /// JSON file with a static roster; takes precedence over discovery
    pub roster_file: Option<PathBuf>,
    /// Progress fragment selectors, tried in order
    pub fragment_selectors: Vec<String>,
    /// Token preceding the amount inside the fragment text
    pub amount_anchor: String,
    /// Token preceding the target inside the fragment text
    pub target_anchor: String,
    /// Currency code marking a fragment as already canonical
    pub canonical_currency: String,
    /// Fixed source-to-canonical exchange rate
    pub exchange_rate: f64,
    /// Per-request fetch timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Minutes between scheduled scrapes; 0 disables the scheduler
    pub scrape_interval_mins: u64,
    /// Policy for entries whose figure could not be extracted
    pub missing_figure_policy: MissingFigurePolicy,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("TRACKER_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid TRACKER_BIND_ADDR format");

        let db_path = env::var("TRACKER_DB_PATH")
            .unwrap_or_else(|_| "./data/donations.sqlite".to_string())
            .into();

        let log_level = env::var("TRACKER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let campaign = env::var("TRACKER_CAMPAIGN").unwrap_or_else(|_| "40-hour-jammin".to_string());

        let roster_url = env::var("TRACKER_ROSTER_URL")
            .unwrap_or_else(|_| "https://www.the40hourjammin.com/artists".to_string());

        let roster_selector =
            env::var("TRACKER_ROSTER_SELECTOR").unwrap_or_else(|_| "#comp-jsfy9kn4 h3 a".to_string());

        let roster_file = env::var("TRACKER_ROSTER_FILE").ok().map(PathBuf::from);

        let fragment_selectors = env::var("TRACKER_FRAGMENT_SELECTORS")
            .unwrap_or_else(|_| "#progress_card ._1r05,#progress_card ._1r08".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let amount_anchor = env::var("TRACKER_AMOUNT_ANCHOR").unwrap_or_else(|_| "$".to_string());

        let target_anchor = env::var("TRACKER_TARGET_ANCHOR").unwrap_or_else(|_| "of $".to_string());

        let canonical_currency =
            env::var("TRACKER_CANONICAL_CURRENCY").unwrap_or_else(|_| "AUD".to_string());

        let exchange_rate = env::var("TRACKER_EXCHANGE_RATE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1.4446691708);

        let fetch_timeout_secs = env::var("TRACKER_FETCH_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);

        let scrape_interval_mins = env::var("TRACKER_SCRAPE_INTERVAL_MINS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(15);

        let missing_figure_policy = MissingFigurePolicy::parse(
            &env::var("TRACKER_MISSING_FIGURE_POLICY").unwrap_or_else(|_| "backfill".to_string()),
        );

        Self {
            bind_addr,
            db_path,
            log_level,
            campaign,
            roster_url,
            roster_selector,
            roster_file,
            fragment_selectors,
            amount_anchor,
            target_anchor,
            canonical_currency,
            exchange_rate,
            fetch_timeout_secs,
            scrape_interval_mins,
            missing_figure_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("TRACKER_BIND_ADDR");
        env::remove_var("TRACKER_DB_PATH");
        env::remove_var("TRACKER_LOG_LEVEL");
        env::remove_var("TRACKER_CAMPAIGN");
        env::remove_var("TRACKER_ROSTER_URL");
        env::remove_var("TRACKER_ROSTER_SELECTOR");
        env::remove_var("TRACKER_ROSTER_FILE");
        env::remove_var("TRACKER_FRAGMENT_SELECTORS");
        env::remove_var("TRACKER_AMOUNT_ANCHOR");
        env::remove_var("TRACKER_TARGET_ANCHOR");
        env::remove_var("TRACKER_CANONICAL_CURRENCY");
        env::remove_var("TRACKER_FETCH_TIMEOUT_SECS");
        env::remove_var("TRACKER_EXCHANGE_RATE");
        env::remove_var("TRACKER_SCRAPE_INTERVAL_MINS");
        env::remove_var("TRACKER_MISSING_FIGURE_POLICY");

        let config = Config::from_env();

        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.db_path, PathBuf::from("./data/donations.sqlite"));
        assert_eq!(config.campaign, "40-hour-jammin");
        assert_eq!(
            config.fragment_selectors,
            vec!["#progress_card ._1r05", "#progress_card ._1r08"]
        );
        assert_eq!(config.canonical_currency, "AUD");
        assert_eq!(config.scrape_interval_mins, 15);
        assert_eq!(config.missing_figure_policy, MissingFigurePolicy::Backfill);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(MissingFigurePolicy::parse("drop"), MissingFigurePolicy::Drop);
        assert_eq!(MissingFigurePolicy::parse("DROP"), MissingFigurePolicy::Drop);
        assert_eq!(
            MissingFigurePolicy::parse("anything-else"),
            MissingFigurePolicy::Backfill
        );
    }
}
