//! Snapshot models matching the persisted document schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fundraiser's figures in canonical currency.
///
/// `None` means the value could not be extracted this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationFigure {
    pub amount: Option<i64>,
    pub target: Option<i64>,
}

impl DonationFigure {
    pub const EMPTY: Self = Self {
        amount: None,
        target: None,
    };

    /// A figure without an amount carries no information and never enters a
    /// snapshot.
    pub fn is_valid(&self) -> bool {
        self.amount.is_some()
    }
}

/// One resolved figure for one roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationEntry {
    pub name: String,
    pub amount: Option<i64>,
    pub target: Option<i64>,
}

impl DonationEntry {
    pub fn new(name: impl Into<String>, figure: DonationFigure) -> Self {
        Self {
            name: name.into(),
            amount: figure.amount,
            target: figure.target,
        }
    }

    pub fn figure(&self) -> DonationFigure {
        DonationFigure {
            amount: self.amount,
            target: self.target,
        }
    }
}

/// One timestamped set of donation figures for a campaign.
///
/// Immutable once persisted; history per campaign is append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub date: DateTime<Utc>,
    pub campaign: String,
    pub donation_data: Vec<DonationEntry>,
}

impl Snapshot {
    pub fn new(campaign: impl Into<String>, donation_data: Vec<DonationEntry>) -> Self {
        Self {
            date: Utc::now(),
            campaign: campaign.into(),
            donation_data,
        }
    }

    /// Structural equality of the donation data, canonicalized by sorting
    /// entries on `name` so that permutations of equal entries compare as
    /// "old news".
    pub fn same_data_as(&self, other: &Snapshot) -> bool {
        sorted_by_name(&self.donation_data) == sorted_by_name(&other.donation_data)
    }
}

fn sorted_by_name(entries: &[DonationEntry]) -> Vec<&DonationEntry> {
    let mut sorted: Vec<&DonationEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}
