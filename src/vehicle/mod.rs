pub mod fuel;
pub mod plate;

pub use fuel::FuelCategory;

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Vehicle fact record, produced once per registry lookup (or loaded from a
/// saved file). Immutable after creation; age and classification are always
/// derived from the admission date so they can never drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VehicleFacts {
    /// Normalized plate identifier (no dashes, uppercase)
    pub plate: String,
    pub make: String,
    pub model: String,
    /// Date of first admission (DET). Anchors the bijtelling rate year.
    pub first_registration: NaiveDate,
    /// Catalog (list) price in euros
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub catalog_price: Option<Decimal>,
    /// Empty vehicle mass in kg
    #[serde(default)]
    pub weight_kg: Option<u32>,
    pub fuel: FuelCategory,
    /// Combined consumption per 100 km (litres, or kWh for electric)
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub combined_consumption: Option<Decimal>,
    /// Estimated monthly road tax
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub mrb_monthly: Option<Decimal>,
    /// Open recall count reported by the registry
    #[serde(default)]
    pub open_recalls: usize,
}

impl VehicleFacts {
    /// Vehicle age in calendar years, as used by the age-scaled cost
    /// estimates.
    pub fn age_years(&self, on: NaiveDate) -> i32 {
        on.year() - self.first_registration.year()
    }

    pub fn classification(&self, on: NaiveDate) -> Classification {
        Classification::on(self.first_registration, on)
    }

    pub fn is_zero_emission(&self) -> bool {
        matches!(self.fuel, FuelCategory::Electric | FuelCategory::Hydrogen)
    }

    /// One-line summary for display and comparison entries.
    pub fn summary(&self) -> String {
        format!("{} {} ({})", self.make, self.model, plate::format(&self.plate))
    }
}

/// Age-based tax classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Standard,
    Youngtimer,
    Oldtimer,
}

impl Classification {
    /// Classification on a given date, with day precision: oldtimer strictly
    /// after the 30th admission anniversary, youngtimer from the 15th
    /// anniversary (inclusive) through the 30th (inclusive).
    pub fn on(first_registration: NaiveDate, on: NaiveDate) -> Classification {
        let fifteenth = first_registration
            .checked_add_months(Months::new(15 * 12))
            .unwrap();
        let thirtieth = first_registration
            .checked_add_months(Months::new(30 * 12))
            .unwrap();
        if on > thirtieth {
            Classification::Oldtimer
        } else if on >= fifteenth {
            Classification::Youngtimer
        } else {
            Classification::Standard
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Classification::Standard => "Standard",
            Classification::Youngtimer => "Youngtimer",
            Classification::Oldtimer => "Oldtimer",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}
