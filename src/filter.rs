//! Explicit report filter over the unified record set.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::UnifiedRecord;

/// Explicit filter selection applied before tab-level aggregation.
///
/// An empty list leaves that dimension unconstrained; date bounds are
/// inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub priorities: Vec<String>,
    pub carriers: Vec<String>,
    pub categories: Vec<String>,
}

impl FilterConfig {
    pub fn matches(&self, record: &UnifiedRecord) -> bool {
        if self.date_from.map_or(false, |from| record.order_date < from) {
            return false;
        }
        if self.date_to.map_or(false, |to| record.order_date > to) {
            return false;
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&record.priority) {
            return false;
        }
        if !self.carriers.is_empty() {
            match &record.carrier {
                Some(carrier) if self.carriers.contains(carrier) => {}
                _ => return false,
            }
        }
        if !self.categories.is_empty() && !self.categories.contains(&record.product_category) {
            return false;
        }
        true
    }

    /// Borrowed subset of `records`, input order preserved
    pub fn apply<'a>(&self, records: &'a [UnifiedRecord]) -> Vec<&'a UnifiedRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    pub fn is_unconstrained(&self) -> bool {
        self == &FilterConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::record;

    fn order(
        id: &str,
        day: u32,
        priority: &str,
        carrier: Option<&str>,
        category: &str,
    ) -> UnifiedRecord {
        let mut r = record(id);
        r.order_date = NaiveDate::from_ymd_opt(2024, 9, day).unwrap();
        r.priority = priority.to_string();
        r.carrier = carrier.map(str::to_string);
        r.product_category = category.to_string();
        r
    }

    fn sample() -> Vec<UnifiedRecord> {
        vec![
            order("O1", 1, "Express", Some("BlueDart"), "Electronics"),
            order("O2", 5, "Standard", Some("Delhivery"), "Books"),
            order("O3", 10, "Economy", None, "Electronics"),
            order("O4", 15, "Express", Some("Delhivery"), "Fashion"),
        ]
    }

    fn ids(view: &[&UnifiedRecord]) -> Vec<String> {
        view.iter().map(|r| r.order_id.clone()).collect()
    }

    #[test]
    fn test_default_keeps_everything() {
        let records = sample();
        let filter = FilterConfig::default();
        assert!(filter.is_unconstrained());
        assert_eq!(filter.apply(&records).len(), 4);
    }

    #[test]
    fn test_priority_and_category() {
        let records = sample();
        let filter = FilterConfig {
            priorities: vec!["Express".to_string()],
            categories: vec!["Electronics".to_string(), "Fashion".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&records)), vec!["O1", "O4"]);
    }

    #[test]
    fn test_carrier_filter_drops_unknown_carrier() {
        let records = sample();
        let filter = FilterConfig {
            carriers: vec!["Delhivery".to_string()],
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&records)), vec!["O2", "O4"]);
    }

    #[test]
    fn test_date_range_inclusive() {
        let records = sample();
        let filter = FilterConfig {
            date_from: NaiveDate::from_ymd_opt(2024, 9, 5),
            date_to: NaiveDate::from_ymd_opt(2024, 9, 10),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&records)), vec!["O2", "O3"]);
    }
}
