use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Statutory deduction per business kilometre driven with a private vehicle.
/// Changes periodically by law; €0.23 since 2024.
pub const KILOMETER_ALLOWANCE: Decimal = dec!(0.23);

/// Bijtelling rate lock: 60 months plus 1 month grace after first admission.
pub const RATE_LOCK_MONTHS: u32 = 61;

/// Youngtimer addition: 35% over the estimated current market value.
pub const YOUNGTIMER_RATE: Decimal = dec!(35);
/// Market value estimate absent a better source: catalog price x 0.6.
pub const YOUNGTIMER_VALUE_FACTOR: Decimal = dec!(0.6);

/// MRB estimate: euros per 100 kg vehicle mass per month.
pub const MRB_RATE_PER_100KG: Decimal = dec!(8);
/// Zero-emission vehicles get a 25% MRB discount.
pub const MRB_ZERO_EMISSION_DISCOUNT: Decimal = dec!(0.25);
/// Mass assumed when no vehicle data is available.
pub const DEFAULT_WEIGHT_KG: u32 = 1500;

/// Annual periodic-inspection (APK) fee once a vehicle is due.
pub const APK_FEE: Decimal = dec!(50);
/// Vehicles up to this age are exempt from the periodic inspection.
pub const APK_EXEMPT_AGE_YEARS: i32 = 3;

pub const MAINTENANCE_BASE: Decimal = dec!(800);
/// Maintenance grows 10% per year of vehicle age.
pub const MAINTENANCE_AGE_STEP: Decimal = dec!(0.10);
/// Usage baseline the maintenance estimate scales against.
pub const MAINTENANCE_BASELINE_KM: Decimal = dec!(15000);

/// Age assumed for age-scaled estimates when no vehicle data is available.
pub const DEFAULT_VEHICLE_AGE_YEARS: i32 = 5;

/// Combined consumption default when the registry has no figure, l/100km.
pub const DEFAULT_CONSUMPTION: Decimal = dec!(7.0);
/// Electric default, kWh/100km. Electric and combustion units differ, so the
/// general default would be far off.
pub const DEFAULT_CONSUMPTION_ELECTRIC: Decimal = dec!(18);

/// One tire set, amortized over its lifespan.
pub const TIRE_SET_COST: Decimal = dec!(800);
pub const TIRE_LIFESPAN_KM: Decimal = dec!(50000);

pub const REPAIR_BASE: Decimal = dec!(300);
/// Repair incidence compounds 20% per year once a vehicle is past the
/// repair-free age.
pub const REPAIR_GROWTH: Decimal = dec!(1.2);
pub const REPAIR_FREE_AGE_YEARS: i32 = 5;

/// Insurance value factor: purchase price relative to this baseline.
pub const INSURANCE_VALUE_BASELINE: Decimal = dec!(25000);
/// Cap so very expensive vehicles don't scale without bound.
pub const INSURANCE_VALUE_CAP: Decimal = dec!(2.0);

/// A bijtelling percentage as scheduled: either flat, or banded with a lower
/// rate up to a catalog-price threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rate {
    Flat(Decimal),
    Banded {
        low: Decimal,
        high: Decimal,
        threshold: Decimal,
    },
}

impl Rate {
    /// Single effective percentage for this rate. Banded rates blend over the
    /// catalog price; without a usable price the low band is reported (the
    /// monetary effect is computed as zero elsewhere).
    pub fn effective(&self, catalog_price: Option<Decimal>) -> Decimal {
        match *self {
            Rate::Flat(pct) => pct,
            Rate::Banded {
                low,
                high,
                threshold,
            } => match catalog_price {
                Some(price) if !price.is_zero() => {
                    let below = price.min(threshold) * low;
                    let above = (price - threshold).max(Decimal::ZERO) * high;
                    (below + above) / price
                }
                _ => low,
            },
        }
    }

    /// Human-readable schedule text, e.g. "16% up to €30000, 22% above".
    pub fn describe(&self) -> String {
        match *self {
            Rate::Flat(pct) => format!("{}%", pct),
            Rate::Banded {
                low,
                high,
                threshold,
            } => format!("{}% up to €{}, {}% above", low, threshold, high),
        }
    }
}

impl std::fmt::Display for Rate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.describe())
    }
}

/// One row of the bijtelling schedule, keyed by the year a vehicle was first
/// admitted. Applies from `from_year` until the next row.
#[derive(Debug, Clone, Copy)]
pub struct RateSchedule {
    pub from_year: i32,
    pub standard: Rate,
    pub zero_emission: Rate,
    pub hydrogen: Rate,
}

/// Bijtelling schedule by first-admission year. Dutch law anchors the rate to
/// the admission year, not the current year; re-anchoring after the rate lock
/// expires is handled by the rule engine, not here.
pub static BIJTELLING_SCHEDULE: &[RateSchedule] = &[
    // Through 2016: 25% standard, full exemption for zero-emission
    RateSchedule {
        from_year: i32::MIN,
        standard: Rate::Flat(dec!(25)),
        zero_emission: Rate::Flat(dec!(0)),
        hydrogen: Rate::Flat(dec!(0)),
    },
    RateSchedule {
        from_year: 2017,
        standard: Rate::Flat(dec!(22)),
        zero_emission: Rate::Flat(dec!(4)),
        hydrogen: Rate::Flat(dec!(4)),
    },
    RateSchedule {
        from_year: 2019,
        standard: Rate::Flat(dec!(22)),
        zero_emission: Rate::Banded {
            low: dec!(4),
            high: dec!(22),
            threshold: dec!(50000),
        },
        hydrogen: Rate::Banded {
            low: dec!(4),
            high: dec!(22),
            threshold: dec!(50000),
        },
    },
    RateSchedule {
        from_year: 2020,
        standard: Rate::Flat(dec!(22)),
        zero_emission: Rate::Banded {
            low: dec!(8),
            high: dec!(22),
            threshold: dec!(45000),
        },
        hydrogen: Rate::Banded {
            low: dec!(8),
            high: dec!(22),
            threshold: dec!(45000),
        },
    },
    RateSchedule {
        from_year: 2021,
        standard: Rate::Flat(dec!(22)),
        zero_emission: Rate::Banded {
            low: dec!(12),
            high: dec!(22),
            threshold: dec!(40000),
        },
        hydrogen: Rate::Banded {
            low: dec!(12),
            high: dec!(22),
            threshold: dec!(40000),
        },
    },
    RateSchedule {
        from_year: 2022,
        standard: Rate::Flat(dec!(22)),
        zero_emission: Rate::Banded {
            low: dec!(16),
            high: dec!(22),
            threshold: dec!(35000),
        },
        hydrogen: Rate::Banded {
            low: dec!(16),
            high: dec!(22),
            threshold: dec!(35000),
        },
    },
    RateSchedule {
        from_year: 2023,
        standard: Rate::Flat(dec!(22)),
        zero_emission: Rate::Banded {
            low: dec!(16),
            high: dec!(22),
            threshold: dec!(30000),
        },
        hydrogen: Rate::Banded {
            low: dec!(16),
            high: dec!(22),
            threshold: dec!(30000),
        },
    },
    RateSchedule {
        from_year: 2025,
        standard: Rate::Flat(dec!(22)),
        zero_emission: Rate::Banded {
            low: dec!(17),
            high: dec!(22),
            threshold: dec!(30000),
        },
        hydrogen: Rate::Banded {
            low: dec!(17),
            high: dec!(22),
            threshold: dec!(30000),
        },
    },
    // From 2026 the zero-emission advantage lapses; hydrogen keeps 17% flat
    // as a standing exception
    RateSchedule {
        from_year: 2026,
        standard: Rate::Flat(dec!(22)),
        zero_emission: Rate::Flat(dec!(22)),
        hydrogen: Rate::Flat(dec!(17)),
    },
];

/// Schedule row applying to the given first-admission year.
pub fn schedule_for(year: i32) -> &'static RateSchedule {
    BIJTELLING_SCHEDULE
        .iter()
        .rev()
        .find(|row| row.from_year <= year)
        .expect("schedule covers all years")
}

/// Sanity-check the static schedule. Run once at startup so a bad edit to the
/// table fails loudly instead of producing wrong percentages.
pub fn validate_schedule() -> anyhow::Result<()> {
    let valid_rate = |rate: &Rate| match *rate {
        Rate::Flat(pct) => pct >= Decimal::ZERO && pct <= dec!(100),
        Rate::Banded {
            low,
            high,
            threshold,
        } => low >= Decimal::ZERO && low < high && high <= dec!(100) && threshold > Decimal::ZERO,
    };

    for window in BIJTELLING_SCHEDULE.windows(2) {
        if window[0].from_year >= window[1].from_year {
            anyhow::bail!(
                "bijtelling schedule out of order at year {}",
                window[1].from_year
            );
        }
    }
    for row in BIJTELLING_SCHEDULE {
        if !valid_rate(&row.standard) || !valid_rate(&row.zero_emission) || !valid_rate(&row.hydrogen)
        {
            anyhow::bail!("bijtelling schedule has an invalid rate for {}", row.from_year);
        }
    }
    Ok(())
}

/// Monthly MRB estimate from vehicle mass. A zero-emission vehicle gets the
/// statutory discount; both steps round to whole euros like the tax tables.
pub fn mrb_monthly_estimate(weight_kg: u32, zero_emission: bool) -> Decimal {
    let base = (Decimal::from(weight_kg) / dec!(100) * MRB_RATE_PER_100KG).round_eur();
    if zero_emission {
        (base * (Decimal::ONE - MRB_ZERO_EMISSION_DISCOUNT)).round_eur()
    } else {
        base
    }
}

/// Half-up rounding to whole euros, matching the published tax tables.
trait RoundEur {
    fn round_eur(&self) -> Decimal;
}

impl RoundEur for Decimal {
    fn round_eur(&self) -> Decimal {
        self.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_is_valid() {
        validate_schedule().unwrap();
    }

    #[test]
    fn schedule_by_admission_year() {
        assert_eq!(schedule_for(2015).standard, Rate::Flat(dec!(25)));
        assert_eq!(schedule_for(2015).zero_emission, Rate::Flat(dec!(0)));
        assert_eq!(schedule_for(2016).standard, Rate::Flat(dec!(25)));
        assert_eq!(schedule_for(2017).zero_emission, Rate::Flat(dec!(4)));
        assert_eq!(schedule_for(2018).zero_emission, Rate::Flat(dec!(4)));
        assert_eq!(
            schedule_for(2019).zero_emission,
            Rate::Banded {
                low: dec!(4),
                high: dec!(22),
                threshold: dec!(50000)
            }
        );
        assert_eq!(
            schedule_for(2021).zero_emission,
            Rate::Banded {
                low: dec!(12),
                high: dec!(22),
                threshold: dec!(40000)
            }
        );
        assert_eq!(
            schedule_for(2024).zero_emission,
            Rate::Banded {
                low: dec!(16),
                high: dec!(22),
                threshold: dec!(30000)
            }
        );
        assert_eq!(
            schedule_for(2025).zero_emission,
            Rate::Banded {
                low: dec!(17),
                high: dec!(22),
                threshold: dec!(30000)
            }
        );
        assert_eq!(schedule_for(2026).zero_emission, Rate::Flat(dec!(22)));
        assert_eq!(schedule_for(2030).zero_emission, Rate::Flat(dec!(22)));
    }

    #[test]
    fn standard_rate_is_flat_22_from_2017() {
        for year in [2017, 2020, 2024, 2026, 2031] {
            assert_eq!(schedule_for(year).standard, Rate::Flat(dec!(22)));
        }
    }

    #[test]
    fn hydrogen_keeps_reduced_rate_from_2026() {
        assert_eq!(schedule_for(2026).hydrogen, Rate::Flat(dec!(17)));
        assert_eq!(schedule_for(2028).hydrogen, Rate::Flat(dec!(17)));
        // Before 2026 hydrogen follows the zero-emission column
        assert_eq!(
            schedule_for(2023).hydrogen,
            schedule_for(2023).zero_emission
        );
    }

    #[test]
    fn flat_rate_effective_ignores_price() {
        assert_eq!(Rate::Flat(dec!(22)).effective(Some(dec!(90000))), dec!(22));
        assert_eq!(Rate::Flat(dec!(22)).effective(None), dec!(22));
    }

    #[test]
    fn banded_rate_blends_over_threshold() {
        let rate = Rate::Banded {
            low: dec!(16),
            high: dec!(22),
            threshold: dec!(30000),
        };
        // (30000 x 16% + 15000 x 22%) / 45000 = 18%
        assert_eq!(rate.effective(Some(dec!(45000))), dec!(18));
        // At or below the threshold only the low band applies
        assert_eq!(rate.effective(Some(dec!(30000))), dec!(16));
        assert_eq!(rate.effective(Some(dec!(20000))), dec!(16));
    }

    #[test]
    fn banded_rate_without_price_reports_low_band() {
        let rate = Rate::Banded {
            low: dec!(12),
            high: dec!(22),
            threshold: dec!(40000),
        };
        assert_eq!(rate.effective(None), dec!(12));
        assert_eq!(rate.effective(Some(dec!(0))), dec!(12));
    }

    #[test]
    fn rate_descriptions() {
        assert_eq!(Rate::Flat(dec!(22)).describe(), "22%");
        let rate = Rate::Banded {
            low: dec!(16),
            high: dec!(22),
            threshold: dec!(30000),
        };
        assert_eq!(rate.describe(), "16% up to €30000, 22% above");
    }

    #[test]
    fn mrb_estimate_from_mass() {
        // 1500 kg -> 15 x 8 = 120/month
        assert_eq!(mrb_monthly_estimate(1500, false), dec!(120));
        // 2000 kg electric -> 160 x 0.75 = 120/month
        assert_eq!(mrb_monthly_estimate(2000, true), dec!(120));
        // 1250 kg -> 100/month
        assert_eq!(mrb_monthly_estimate(1250, false), dec!(100));
    }
}
