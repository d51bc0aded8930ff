//! Figure extraction from fundraiser page markup.
//!
//! Pages render the progress text inside a card whose class differs between
//! live and ended fundraisers; selectors are tried in priority order, first
//! match wins. Inside the fragment, numeric runs sit between fixed anchor
//! tokens. Any anchor miss or failed parse fails the whole figure closed —
//! partial figures are never produced.

use scraper::{Html, Selector};

use crate::errors::AppError;

/// Fragment selectors and anchor tokens for one family of page templates.
pub struct AnchorRules {
    fragment_selectors: Vec<Selector>,
    amount_anchor: String,
    target_anchor: String,
    canonical_currency: String,
}

impl AnchorRules {
    pub fn new(
        fragment_selectors: &[String],
        amount_anchor: &str,
        target_anchor: &str,
        canonical_currency: &str,
    ) -> Result<Self, AppError> {
        let fragment_selectors = fragment_selectors
            .iter()
            .map(|s| {
                Selector::parse(s)
                    .map_err(|e| AppError::Internal(format!("Invalid fragment selector {:?}: {}", s, e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if fragment_selectors.is_empty() {
            return Err(AppError::Internal(
                "At least one fragment selector is required".to_string(),
            ));
        }

        Ok(Self {
            fragment_selectors,
            amount_anchor: amount_anchor.to_string(),
            target_anchor: target_anchor.to_string(),
            canonical_currency: canonical_currency.to_string(),
        })
    }
}

/// An amount/target pair as read off the page, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFigure {
    pub amount: i64,
    pub target: i64,
    /// Whether the fragment carried the canonical currency code.
    pub in_canonical_currency: bool,
}

/// Locate the progress fragment and pull the amount/target pair out of its
/// text. `None` is a soft failure: no fragment, a missed anchor, or
/// non-numeric content.
pub fn extract(markup: &str, rules: &AnchorRules) -> Option<RawFigure> {
    let document = Html::parse_document(markup);

    let fragment = rules
        .fragment_selectors
        .iter()
        .find_map(|selector| document.select(selector).next())?;

    let text: String = fragment.text().collect();
    parse_fragment_text(&text, rules)
}

fn parse_fragment_text(text: &str, rules: &AnchorRules) -> Option<RawFigure> {
    // The amount anchor must occur strictly before the target anchor, or a
    // fragment with no leading amount would reuse the `$` inside `of $` and
    // produce a fabricated pair.
    let target_pos = text.find(&rules.target_anchor)?;
    let amount_pos = text[..target_pos].find(&rules.amount_anchor)?;

    let (amount, after_amount) = leading_number(&text[amount_pos + rules.amount_anchor.len()..])?;
    let (target, after_target) = leading_number(&text[target_pos + rules.target_anchor.len()..])?;

    let in_canonical_currency = follows_currency_code(after_amount, &rules.canonical_currency)
        || follows_currency_code(after_target, &rules.canonical_currency);

    Some(RawFigure {
        amount,
        target,
        in_canonical_currency,
    })
}

/// Parse the numeric run at the start of `s`: digits with grouping commas,
/// truncated at a decimal point. Returns the value and the text after the
/// run.
fn leading_number(s: &str) -> Option<(i64, &str)> {
    let s = s.trim_start();
    let end = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .count();

    let digits = s[..end].replace(',', "");
    if digits.is_empty() {
        return None;
    }
    Some((digits.parse().ok()?, &s[end..]))
}

/// The currency code only counts when it sits right after a parsed number;
/// the code appearing elsewhere in the fragment (say, inside a fundraiser
/// name) does not mark the figure canonical.
fn follows_currency_code(rest: &str, code: &str) -> bool {
    rest.trim_start().starts_with(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> AnchorRules {
        AnchorRules::new(
            &[
                "#progress_card ._1r05".to_string(),
                "#progress_card ._1r08".to_string(),
            ],
            "$",
            "of $",
            "AUD",
        )
        .unwrap()
    }

    fn page(class: &str, fragment: &str) -> String {
        format!(
            "<html><body><div id=\"progress_card\"><span class=\"{}\">{}</span></div></body></html>",
            class, fragment
        )
    }

    #[test]
    fn test_extracts_canonical_fragment() {
        let markup = page("_1r05", "$100\u{a0}AUD of $1,000\u{a0}AUD raised");
        let raw = extract(&markup, &rules()).unwrap();
        assert_eq!(raw.amount, 100);
        assert_eq!(raw.target, 1000);
        assert!(raw.in_canonical_currency);
    }

    #[test]
    fn test_extracts_source_currency_fragment() {
        let markup = page("_1r05", "$1,234 of $5,000 raised");
        let raw = extract(&markup, &rules()).unwrap();
        assert_eq!(raw.amount, 1234);
        assert_eq!(raw.target, 5000);
        assert!(!raw.in_canonical_currency);
    }

    #[test]
    fn test_truncates_decimal_suffix() {
        let markup = page("_1r05", "$1,234.56 of $5,000.00 raised");
        let raw = extract(&markup, &rules()).unwrap();
        assert_eq!(raw.amount, 1234);
        assert_eq!(raw.target, 5000);
    }

    #[test]
    fn test_falls_back_to_ended_fundraiser_class() {
        let markup = page("_1r08", "$176 of $160 raised");
        let raw = extract(&markup, &rules()).unwrap();
        assert_eq!(raw.amount, 176);
        assert_eq!(raw.target, 160);
    }

    #[test]
    fn test_primary_selector_wins() {
        let markup = "<div id=\"progress_card\"><span class=\"_1r08\">$1 of $2 raised</span>\
             <span class=\"_1r05\">$3 of $4 raised</span></div>";
        let raw = extract(markup, &rules()).unwrap();
        assert_eq!(raw.amount, 3);
    }

    #[test]
    fn test_missing_fragment_is_soft_failure() {
        let markup = "<html><body><p>Nothing here</p></body></html>";
        assert_eq!(extract(markup, &rules()), None);
    }

    #[test]
    fn test_fragment_without_amount_fails_closed() {
        // No amount before the target anchor; the `$` inside "of $" must
        // not be borrowed as the amount anchor.
        let markup = page("_1r05", "of $100 raised");
        assert_eq!(extract(&markup, &rules()), None);

        let markup = page("_1r05", "Donate now! of $2,000 raised");
        assert_eq!(extract(&markup, &rules()), None);
    }

    #[test]
    fn test_currency_code_must_follow_a_number() {
        let markup = page("_1r05", "$100 of $200 raised for AUDrey");
        let raw = extract(&markup, &rules()).unwrap();
        assert!(!raw.in_canonical_currency);
    }

    #[test]
    fn test_currency_code_after_target_only() {
        let markup = page("_1r05", "$100 of $200\u{a0}AUD raised");
        let raw = extract(&markup, &rules()).unwrap();
        assert!(raw.in_canonical_currency);
    }

    #[test]
    fn test_missed_target_anchor_fails_whole_figure() {
        let markup = page("_1r05", "$100 raised so far");
        assert_eq!(extract(&markup, &rules()), None);
    }

    #[test]
    fn test_non_numeric_content_fails_whole_figure() {
        let markup = page("_1r05", "$lots of $money raised");
        assert_eq!(extract(&markup, &rules()), None);
    }
}
