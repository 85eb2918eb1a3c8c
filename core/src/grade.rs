//! Grade label normalization.
//!
//! Registration forms collect grades as free text in mixed languages and
//! notations ("Grade 7", "K1-3", "4至6", "TK", "<3 岁"). Downstream reports
//! group students by a small fixed taxonomy, so every label is mapped to a
//! [`GradeBand`] when a rule matches and passed through trimmed otherwise.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Range separators seen in the wild: ASCII hyphen, tilde, full-width
/// hyphen, and the character for "to".
static FOUR_TO_SIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"4[-~－至]6").expect("static regex must compile"));
static ONE_TO_THREE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"1[-~－至]3").expect("static regex must compile"));

/// Canonical grade groupings used for reporting.
///
/// # Examples
///
/// ```
/// use checkin_roster_core::GradeBand;
///
/// assert_eq!(GradeBand::classify("Grade 7"), Some(GradeBand::SevenPlus));
/// assert_eq!(GradeBand::SevenPlus.as_str(), "7+");
/// assert_eq!(GradeBand::classify("Kindergarten"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradeBand {
    /// Grade 7 and above.
    #[serde(rename = "7+")]
    SevenPlus,
    /// Grades 4 through 6.
    #[serde(rename = "4-6")]
    FourToSix,
    /// Kindergarten through grade 3.
    #[serde(rename = "K-3")]
    KToThree,
    /// Pre-kindergarten and transitional kindergarten.
    PreK,
    /// Nursery (under three years old).
    Nursery,
}

impl GradeBand {
    /// All bands, oldest first.
    pub const ALL: [GradeBand; 5] = [
        GradeBand::SevenPlus,
        GradeBand::FourToSix,
        GradeBand::KToThree,
        GradeBand::PreK,
        GradeBand::Nursery,
    ];

    /// Returns the canonical label stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            GradeBand::SevenPlus => "7+",
            GradeBand::FourToSix => "4-6",
            GradeBand::KToThree => "K-3",
            GradeBand::PreK => "PreK",
            GradeBand::Nursery => "Nursery",
        }
    }

    /// Classifies a raw grade label, returning `None` if no rule matches.
    ///
    /// Rules are evaluated in order and the first match wins.
    pub fn classify(raw: &str) -> Option<GradeBand> {
        if raw.contains('7') {
            return Some(GradeBand::SevenPlus);
        }
        if FOUR_TO_SIX_RE.is_match(raw) {
            return Some(GradeBand::FourToSix);
        }
        if ONE_TO_THREE_RE.is_match(raw) {
            return Some(GradeBand::KToThree);
        }

        let lower = raw.to_lowercase();
        if lower.contains("prek") || lower.contains("tk") {
            return Some(GradeBand::PreK);
        }
        if lower.contains("nursery") || raw.contains("<3") {
            return Some(GradeBand::Nursery);
        }
        None
    }
}

impl fmt::Display for GradeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalizes a raw grade label into its canonical form.
///
/// Returns `None` for absent or blank input, the canonical [`GradeBand`]
/// label when a rule matches, and the trimmed input otherwise.
///
/// # Examples
///
/// ```
/// use checkin_roster_core::normalize_grade;
///
/// assert_eq!(normalize_grade(Some("K1-3")).as_deref(), Some("K-3"));
/// assert_eq!(normalize_grade(Some("  Kindergarten ")).as_deref(), Some("Kindergarten"));
/// assert_eq!(normalize_grade(Some("   ")), None);
/// assert_eq!(normalize_grade(None), None);
/// ```
pub fn normalize_grade(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match GradeBand::classify(trimmed) {
        Some(band) => band.as_str().to_string(),
        None => trimmed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(raw: &str) -> Option<String> {
        normalize_grade(Some(raw))
    }

    #[test]
    fn test_seven_anywhere_wins() {
        assert_eq!(norm("Grade 7").as_deref(), Some("7+"));
        assert_eq!(norm("7年级").as_deref(), Some("7+"));
        assert_eq!(norm("17").as_deref(), Some("7+"));
        // Rule 1 is checked before the 4-6 range.
        assert_eq!(norm("4-7").as_deref(), Some("7+"));
        assert_eq!(norm("prek 7").as_deref(), Some("7+"));
    }

    #[test]
    fn test_four_to_six_separators() {
        for raw in ["4-6", "G4~6", "4－6年级", "4至6", "Grade 4-6 "] {
            assert_eq!(norm(raw).as_deref(), Some("4-6"), "input: {raw}");
        }
    }

    #[test]
    fn test_one_to_three_separators() {
        for raw in ["K1-3", "1~3", "1－3", "1至3年级"] {
            assert_eq!(norm(raw).as_deref(), Some("K-3"), "input: {raw}");
        }
    }

    #[test]
    fn test_range_requires_adjacent_separator() {
        assert_eq!(norm("4 - 6").as_deref(), Some("4 - 6"));
        assert_eq!(norm("4/6").as_deref(), Some("4/6"));
    }

    #[test]
    fn test_prek_and_tk_case_insensitive() {
        assert_eq!(norm("PreK").as_deref(), Some("PreK"));
        assert_eq!(norm("PREK class").as_deref(), Some("PreK"));
        assert_eq!(norm("TK").as_deref(), Some("PreK"));
        assert_eq!(norm("tk班").as_deref(), Some("PreK"));
    }

    #[test]
    fn test_nursery() {
        assert_eq!(norm("Nursery").as_deref(), Some("Nursery"));
        assert_eq!(norm("NURSERY room").as_deref(), Some("Nursery"));
        assert_eq!(norm("<3岁").as_deref(), Some("Nursery"));
    }

    #[test]
    fn test_unmatched_passes_through_trimmed() {
        assert_eq!(norm("  Kindergarten  ").as_deref(), Some("Kindergarten"));
        assert_eq!(norm("幼儿园大班").as_deref(), Some("幼儿园大班"));
        assert_eq!(norm("5").as_deref(), Some("5"));
    }

    #[test]
    fn test_blank_and_absent_are_none() {
        assert_eq!(normalize_grade(None), None);
        assert_eq!(norm(""), None);
        assert_eq!(norm(" \t "), None);
    }

    #[test]
    fn test_canonical_labels_are_fixed_points() {
        for band in GradeBand::ALL {
            assert_eq!(norm(band.as_str()).as_deref(), Some(band.as_str()));
        }
    }

    #[test]
    fn test_classify_returns_none_for_unmatched() {
        assert_eq!(GradeBand::classify("Kindergarten"), None);
        assert_eq!(GradeBand::classify("K-3"), None);
    }

    #[test]
    fn test_display_matches_label() {
        assert_eq!(GradeBand::FourToSix.to_string(), "4-6");
        assert_eq!(GradeBand::PreK.to_string(), "PreK");
    }
}
