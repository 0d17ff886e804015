//! Saved comparison list: a small, file-backed set of recent calculations.

use std::fs;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tax::costs::CostBreakdown;

/// Most recent entries kept in the list.
pub const MAX_ENTRIES: usize = 6;

/// Tag for results produced by the private-purchase/business-use method.
pub const METHOD_PRIVATE_PURCHASE: &str = "prive-kopen-zakelijk-gebruiken";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonEntry {
    pub id: String,
    pub vehicle_summary: String,
    /// Normalized plate when the entry came from a registry lookup.
    #[serde(default)]
    pub plate: Option<String>,
    pub method: String,
    pub breakdown: CostBreakdown,
    /// RFC 3339 timestamp of when the entry was saved.
    pub saved_at: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ComparisonList {
    pub entries: Vec<ComparisonEntry>,
}

impl ComparisonList {
    /// Insert newest-first. An existing entry for the same (plate, method)
    /// key is replaced; manual entries (no plate) never collide. The list is
    /// then truncated to [`MAX_ENTRIES`].
    pub fn add(&mut self, entry: ComparisonEntry) {
        if entry.plate.is_some() {
            self.entries
                .retain(|e| !(e.plate == entry.plate && e.method == entry.method));
        }
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);
    }

    /// Remove an entry by id; returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn load(path: &Path) -> anyhow::Result<ComparisonList> {
        if !path.exists() {
            return Ok(ComparisonList::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::costs::{CostInputs, InsuranceTier};
    use rust_decimal_macros::dec;

    fn breakdown() -> CostBreakdown {
        let inputs = CostInputs {
            purchase_price: dec!(25000),
            residual_value: dec!(10000),
            ownership_years: 5,
            annual_distance: dec!(15000),
            business_share_percent: dec!(60),
            fuel_unit_price: dec!(1.85),
            insurance_tier: InsuranceTier::Comprehensive,
            marginal_tax_rate_percent: dec!(37),
        };
        crate::tax::costs::calculate(None, &inputs, "2025-06-01".parse().unwrap()).unwrap()
    }

    fn entry(id: &str, plate: Option<&str>) -> ComparisonEntry {
        ComparisonEntry {
            id: id.to_string(),
            vehicle_summary: "VOLKSWAGEN GOLF".to_string(),
            plate: plate.map(str::to_string),
            method: METHOD_PRIVATE_PURCHASE.to_string(),
            breakdown: breakdown(),
            saved_at: "2025-06-01T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn newest_entry_first() {
        let mut list = ComparisonList::default();
        list.add(entry("1", Some("AA11BB")));
        list.add(entry("2", Some("CC22DD")));
        assert_eq!(list.entries.len(), 2);
        assert_eq!(list.entries[0].id, "2");
    }

    #[test]
    fn same_plate_and_method_replaced() {
        let mut list = ComparisonList::default();
        list.add(entry("1", Some("AA11BB")));
        list.add(entry("2", Some("AA11BB")));
        assert_eq!(list.entries.len(), 1);
        assert_eq!(list.entries[0].id, "2");
    }

    #[test]
    fn manual_entries_never_collide() {
        let mut list = ComparisonList::default();
        list.add(entry("1", None));
        list.add(entry("2", None));
        assert_eq!(list.entries.len(), 2);
    }

    #[test]
    fn capped_at_six_most_recent() {
        let mut list = ComparisonList::default();
        for i in 0..8 {
            list.add(entry(&i.to_string(), None));
        }
        assert_eq!(list.entries.len(), MAX_ENTRIES);
        // The oldest two were dropped
        assert_eq!(list.entries[0].id, "7");
        assert_eq!(list.entries[MAX_ENTRIES - 1].id, "2");
    }

    #[test]
    fn remove_by_id() {
        let mut list = ComparisonList::default();
        list.add(entry("1", None));
        assert!(list.remove("1"));
        assert!(!list.remove("1"));
        assert!(list.entries.is_empty());
    }

    #[test]
    fn load_missing_file_is_empty() {
        let list = ComparisonList::load(Path::new("/nonexistent/comparisons.json")).unwrap();
        assert!(list.entries.is_empty());
    }

    #[test]
    fn round_trips_through_json() {
        let mut list = ComparisonList::default();
        list.add(entry("1", Some("AA11BB")));
        let json = serde_json::to_string(&list).unwrap();
        let loaded: ComparisonList = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries[0].id, "1");
        assert_eq!(
            loaded.entries[0].breakdown.totals.net_annual,
            list.entries[0].breakdown.totals.net_annual
        );
    }
}
