//! Roster model: which fundraiser pages exist.

use serde::{Deserialize, Serialize};

/// One fundraiser page to scrape.
///
/// Unique by `name` within a roster. Several names may share one URL when
/// participants point at a shared donation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundraiserTarget {
    pub name: String,
    pub url: String,
}
