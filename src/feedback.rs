//! User selections and the admin dashboard summary.
//!
//! A [`Selection`] is the ad a user picked (plus an optional 1–5 rating). Storage is
//! the caller's business; this module only aggregates.

use std::collections::BTreeMap;

use crate::error::{BanditError, Result};
use crate::prompt::{AdLength, Tone};

/// Highest accepted rating. `0` means "not rated".
pub const MAX_RATING: u8 = 5;

/// One ad a user chose.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    pub product: String,
    pub organization: Option<String>,
    pub keywords: Vec<String>,
    pub length: AdLength,
    pub tone: Tone,
    pub text: String,
    pub rating: u8,
}

impl Selection {
    /// Record a rating in `1..=MAX_RATING`.
    pub fn rate(&mut self, rating: u8) -> Result<()> {
        if !(1..=MAX_RATING).contains(&rating) {
            return Err(BanditError::precondition(format!(
                "rating must be in 1..={MAX_RATING}, got {rating}"
            )));
        }
        self.rating = rating;
        Ok(())
    }

    pub fn is_rated(&self) -> bool {
        self.rating != 0
    }
}

/// Aggregate view over stored selections.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DashboardSummary {
    pub total: usize,
    /// Picks per tone; every tone in [`Tone::DEFAULT_SET`] is present even at zero.
    pub tone_counts: BTreeMap<Tone, u64>,
    /// Mean keyword count, floored.
    pub mean_keyword_count: usize,
    pub most_popular_length: AdLength,
    pub most_common_keyword: Option<String>,
    /// Mean over rated selections only.
    pub mean_rating: Option<f64>,
}

impl DashboardSummary {
    /// `None` when there are no selections.
    pub fn from_selections(selections: &[Selection]) -> Option<Self> {
        if selections.is_empty() {
            return None;
        }

        let mut tone_counts: BTreeMap<Tone, u64> =
            Tone::DEFAULT_SET.iter().map(|&t| (t, 0)).collect();
        // (count, first-seen order) so ties resolve to the earliest entry.
        let mut keywords: BTreeMap<&str, (u64, usize)> = BTreeMap::new();
        let mut lengths: BTreeMap<AdLength, (u64, usize)> = BTreeMap::new();
        let mut next_keyword = 0usize;
        let mut keyword_total = 0usize;
        let mut rating_sum = 0u64;
        let mut rated = 0u64;

        for (i, s) in selections.iter().enumerate() {
            *tone_counts.entry(s.tone).or_insert(0) += 1;
            keyword_total += s.keywords.len();
            for kw in &s.keywords {
                let e = keywords.entry(kw.as_str()).or_insert_with(|| {
                    next_keyword += 1;
                    (0, next_keyword)
                });
                e.0 += 1;
            }
            lengths.entry(s.length).or_insert((0, i)).0 += 1;
            if s.is_rated() {
                rating_sum += u64::from(s.rating);
                rated += 1;
            }
        }

        Some(Self {
            total: selections.len(),
            tone_counts,
            mean_keyword_count: keyword_total / selections.len(),
            most_popular_length: argmax_first_seen(&lengths).unwrap_or_default(),
            most_common_keyword: argmax_first_seen(&keywords).map(|k| k.to_string()),
            mean_rating: (rated > 0).then(|| rating_sum as f64 / rated as f64),
        })
    }
}

fn argmax_first_seen<K: Copy>(m: &BTreeMap<K, (u64, usize)>) -> Option<K> {
    m.iter()
        .max_by(|(_, (ca, oa)), (_, (cb, ob))| ca.cmp(cb).then(ob.cmp(oa)))
        .map(|(k, _)| *k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::parse_keywords;

    fn sel(tone: Tone, kws: &str, length: AdLength, rating: u8) -> Selection {
        Selection {
            product: "Acme Boots".to_string(),
            organization: None,
            keywords: parse_keywords(kws),
            length,
            tone,
            text: "Stay dry.".to_string(),
            rating,
        }
    }

    #[test]
    fn empty_has_no_summary() {
        assert!(DashboardSummary::from_selections(&[]).is_none());
    }

    #[test]
    fn summary_aggregates_counts() {
        let rows = vec![
            sel(Tone::Funny, "warm, dry, light", AdLength::Short, 4),
            sel(Tone::Funny, "warm, cheap, light, fast", AdLength::Long, 0),
            sel(Tone::Persuasive, "warm, dry, cozy", AdLength::Long, 2),
        ];
        let s = DashboardSummary::from_selections(&rows).unwrap();
        assert_eq!(s.total, 3);
        assert_eq!(s.tone_counts[&Tone::Funny], 2);
        assert_eq!(s.tone_counts[&Tone::Persuasive], 1);
        assert_eq!(s.tone_counts[&Tone::Exciting], 0);
        assert_eq!(s.mean_keyword_count, 3);
        assert_eq!(s.most_popular_length, AdLength::Long);
        assert_eq!(s.most_common_keyword.as_deref(), Some("warm"));
        assert_eq!(s.mean_rating, Some(3.0));
    }

    #[test]
    fn keyword_ties_go_to_first_seen() {
        let rows = vec![
            sel(Tone::Exciting, "zeta, alpha, mid", AdLength::Medium, 0),
            sel(Tone::Exciting, "alpha, zeta, other", AdLength::Short, 0),
        ];
        let s = DashboardSummary::from_selections(&rows).unwrap();
        assert_eq!(s.most_common_keyword.as_deref(), Some("zeta"));
        assert_eq!(s.most_popular_length, AdLength::Medium);
        assert_eq!(s.mean_rating, None);
    }

    #[test]
    fn rate_validates_range() {
        let mut s = sel(Tone::Funny, "a, b, c", AdLength::Short, 0);
        assert!(!s.is_rated());
        assert!(s.rate(0).is_err());
        assert!(s.rate(6).is_err());
        s.rate(5).unwrap();
        assert!(s.is_rated());
    }
}
