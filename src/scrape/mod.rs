//! The scrape-extract-normalize-dedupe pipeline.
//!
//! One call to [`ScrapePipeline::run_cycle`] performs a full cycle: resolve
//! the roster, fetch and parse every fundraiser page concurrently, assemble
//! a dated snapshot, and persist it only when its data differs from the most
//! recently stored snapshot for the campaign.

mod extract;
mod fetch;
mod normalize;
mod roster;

pub use extract::{extract, AnchorRules, RawFigure};
pub use fetch::{FetchError, HttpFetcher, PageFetcher};
pub use normalize::normalize;
pub use roster::RosterSource;

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;

use crate::config::{Config, MissingFigurePolicy};
use crate::db::SnapshotStore;
use crate::errors::AppError;
use crate::models::{DonationEntry, DonationFigure, FundraiserTarget, Snapshot};

/// Result of one scrape cycle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CycleOutcome {
    /// Whether a new snapshot was written; `false` means "old news".
    pub persisted: bool,
    /// Number of entries in the assembled snapshot.
    pub entries: usize,
}

/// The whole pipeline, wired once at startup and shared across callers.
pub struct ScrapePipeline {
    fetcher: Arc<dyn PageFetcher>,
    roster: RosterSource,
    rules: AnchorRules,
    rate: f64,
    policy: MissingFigurePolicy,
    store: Arc<SnapshotStore>,
}

impl ScrapePipeline {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        roster: RosterSource,
        rules: AnchorRules,
        rate: f64,
        policy: MissingFigurePolicy,
        store: Arc<SnapshotStore>,
    ) -> Self {
        Self {
            fetcher,
            roster,
            rules,
            rate,
            policy,
            store,
        }
    }

    /// Build the pipeline from configuration. A configured roster file wins
    /// over page discovery.
    pub fn from_config(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<SnapshotStore>,
    ) -> Result<Self, AppError> {
        let roster = match &config.roster_file {
            Some(path) => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Internal(format!("Cannot read roster file {:?}: {}", path, e))
                })?;
                RosterSource::Static(serde_json::from_str(&contents)?)
            }
            None => RosterSource::discovered(&config.roster_url, &config.roster_selector)?,
        };

        let rules = AnchorRules::new(
            &config.fragment_selectors,
            &config.amount_anchor,
            &config.target_anchor,
            &config.canonical_currency,
        )?;

        Ok(Self::new(
            fetcher,
            roster,
            rules,
            config.exchange_rate,
            config.missing_figure_policy,
            store,
        ))
    }

    /// Run one scrape cycle for `campaign`.
    ///
    /// Per-page failures degrade that page's entry and never abort the
    /// cycle; only snapshot store failures are terminal.
    pub async fn run_cycle(&self, campaign: &str) -> Result<CycleOutcome, AppError> {
        let roster = self.roster.resolve(self.fetcher.as_ref()).await;
        tracing::info!(campaign, "Found {} donation pages to scrape", roster.len());

        let previous = self.store.find_latest(campaign).await?;

        let figures = join_all(roster.iter().map(|target| self.scrape_target(target))).await;

        let candidate = self.assemble(campaign, &roster, figures, previous.as_ref());
        if candidate.donation_data.is_empty() {
            tracing::warn!(campaign, "Assembled snapshot has no valid entries");
        }

        let persisted = self.maybe_persist(&candidate, previous.as_ref()).await?;

        Ok(CycleOutcome {
            persisted,
            entries: candidate.donation_data.len(),
        })
    }

    /// Fetch one page and extract its figure. Failures yield an empty
    /// figure, logged, never an error.
    async fn scrape_target(&self, target: &FundraiserTarget) -> DonationFigure {
        let markup = match self.fetcher.fetch(&target.url).await {
            Ok(markup) => markup,
            Err(err) => {
                tracing::warn!(name = %target.name, "{}", err);
                return DonationFigure::EMPTY;
            }
        };

        match extract(&markup, &self.rules) {
            Some(raw) => normalize(raw, self.rate),
            None => {
                tracing::warn!(name = %target.name, url = %target.url, "Unable to find donation figure on page");
                DonationFigure::EMPTY
            }
        }
    }

    /// Zip figures back with their roster names in roster order, keep at
    /// most one entry per name (last write wins), and apply the
    /// missing-figure policy.
    fn assemble(
        &self,
        campaign: &str,
        roster: &[FundraiserTarget],
        figures: Vec<DonationFigure>,
        previous: Option<&Snapshot>,
    ) -> Snapshot {
        let mut entries: Vec<DonationEntry> = Vec::new();

        for (target, figure) in roster.iter().zip(figures) {
            let figure = if figure.is_valid() {
                figure
            } else {
                match self.policy {
                    MissingFigurePolicy::Drop => continue,
                    MissingFigurePolicy::Backfill => match backfill(previous, &target.name) {
                        Some(carried) => carried,
                        None => continue,
                    },
                }
            };

            let entry = DonationEntry::new(target.name.clone(), figure);
            match entries.iter().position(|e| e.name == target.name) {
                Some(i) => entries[i] = entry,
                None => entries.push(entry),
            }
        }

        Snapshot::new(campaign, entries)
    }

    /// Append the candidate unless it is old news: structurally equal data
    /// to the latest stored snapshot. First-ever snapshots always persist.
    async fn maybe_persist(
        &self,
        candidate: &Snapshot,
        previous: Option<&Snapshot>,
    ) -> Result<bool, AppError> {
        if let Some(prev) = previous {
            if candidate.same_data_as(prev) {
                tracing::info!(campaign = %candidate.campaign, "Successful scrape, no new donations");
                return Ok(false);
            }
        }

        self.store.append(candidate).await?;
        tracing::info!(
            campaign = %candidate.campaign,
            entries = candidate.donation_data.len(),
            "New donations found and saved"
        );
        Ok(true)
    }
}

fn backfill(previous: Option<&Snapshot>, name: &str) -> Option<DonationFigure> {
    previous?
        .donation_data
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.figure())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, amount: i64, target: i64) -> DonationEntry {
        DonationEntry {
            name: name.to_string(),
            amount: Some(amount),
            target: Some(target),
        }
    }

    #[test]
    fn test_backfill_carries_previous_figure() {
        let previous = Snapshot::new("camp", vec![entry("A", 50, 100)]);
        let figure = backfill(Some(&previous), "A").unwrap();
        assert_eq!(figure.amount, Some(50));
        assert_eq!(figure.target, Some(100));
    }

    #[test]
    fn test_backfill_without_history() {
        assert!(backfill(None, "A").is_none());

        let previous = Snapshot::new("camp", vec![entry("B", 1, 2)]);
        assert!(backfill(Some(&previous), "A").is_none());
    }
}
