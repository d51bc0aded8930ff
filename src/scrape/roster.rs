//! Roster resolution: which fundraiser pages to scrape this cycle.

use scraper::{ElementRef, Html, Selector};

use crate::errors::AppError;
use crate::models::FundraiserTarget;

use super::fetch::PageFetcher;

/// Where the roster comes from.
pub enum RosterSource {
    /// Fixed, configured list of targets.
    Static(Vec<FundraiserTarget>),
    /// Roster page parsed for repeating name+link elements.
    Discovered {
        url: String,
        anchors: Selector,
        wrappers: Selector,
    },
}

impl RosterSource {
    pub fn discovered(url: impl Into<String>, anchor_selector: &str) -> Result<Self, AppError> {
        let anchors = Selector::parse(anchor_selector).map_err(|e| {
            AppError::Internal(format!("Invalid roster selector {:?}: {}", anchor_selector, e))
        })?;
        let wrappers = Selector::parse("span")
            .map_err(|e| AppError::Internal(format!("Invalid wrapper selector: {}", e)))?;

        Ok(RosterSource::Discovered {
            url: url.into(),
            anchors,
            wrappers,
        })
    }

    /// Resolve the current roster.
    ///
    /// A discovery fetch failure degrades to an empty roster; downstream
    /// tolerates short or empty rosters.
    pub async fn resolve(&self, fetcher: &dyn PageFetcher) -> Vec<FundraiserTarget> {
        match self {
            RosterSource::Static(targets) => targets.clone(),
            RosterSource::Discovered {
                url,
                anchors,
                wrappers,
            } => match fetcher.fetch(url).await {
                Ok(markup) => parse_roster_page(&markup, anchors, wrappers),
                Err(err) => {
                    tracing::warn!("Roster discovery failed: {}", err);
                    Vec::new()
                }
            },
        }
    }
}

/// Pull {name, url} pairs out of the roster page.
///
/// Names hide inside nested wrapper spans; the innermost text wins.
/// Entries without a link or a name are skipped, never an error.
fn parse_roster_page(markup: &str, anchors: &Selector, wrappers: &Selector) -> Vec<FundraiserTarget> {
    let document = Html::parse_document(markup);
    let mut targets = Vec::new();

    for anchor in document.select(anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let name = innermost_text(anchor, wrappers);
        if name.is_empty() || href.is_empty() {
            continue;
        }
        targets.push(FundraiserTarget {
            name,
            url: href.to_string(),
        });
    }

    targets
}

fn innermost_text(element: ElementRef<'_>, wrappers: &Selector) -> String {
    let mut node = element;
    while let Some(inner) = node.select(wrappers).next() {
        node = inner;
    }
    node.text().collect::<String>().trim().to_string()
}
