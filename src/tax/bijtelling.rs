use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::tax::nl::{self, Rate};
use crate::tax::CalcError;
use crate::vehicle::{Classification, FuelCategory};

/// Outcome of a bijtelling assessment. Exposes both the schedule as applied
/// (`rate`) and a single blended number (`effective_percent`): display needs
/// the human-readable rule, aggregation needs one percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub rate: Rate,
    pub effective_percent: Decimal,
    /// The rule that produced the rate, for display and auditability.
    pub rule_applied: String,
    /// Gross addition to annual taxable income.
    pub annual_benefit: Decimal,
    pub monthly_benefit: Decimal,
    /// End of the 60-month rate lock; `None` for old-/youngtimers, whose
    /// status is re-evaluated every year instead.
    pub protection_end: Option<NaiveDate>,
}

/// Determine the benefit-in-kind percentage and its monetary effect.
///
/// The admission date must be explicit and in the past; the engine never
/// substitutes "today" for a missing date. A missing catalog price still
/// yields the percentage, with the monetary effect reported as zero.
pub fn assess(
    first_registration: NaiveDate,
    fuel: FuelCategory,
    catalog_price: Option<Decimal>,
    on: NaiveDate,
) -> Result<Assessment, CalcError> {
    if first_registration > on {
        return Err(CalcError::InvalidVehicleData(format!(
            "first admission date {} is in the future",
            first_registration
        )));
    }

    match Classification::on(first_registration, on) {
        Classification::Oldtimer => Ok(Assessment {
            rate: Rate::Flat(Decimal::ZERO),
            effective_percent: Decimal::ZERO,
            rule_applied: "oldtimer (older than 30 years): no addition".to_string(),
            annual_benefit: Decimal::ZERO,
            monthly_benefit: Decimal::ZERO,
            protection_end: None,
        }),
        Classification::Youngtimer => {
            // 35% over the estimated current market value rather than the
            // catalog price. Not covered by the rate lock: the classification
            // itself shifts as the vehicle ages.
            let market_value =
                catalog_price.unwrap_or(Decimal::ZERO) * nl::YOUNGTIMER_VALUE_FACTOR;
            let annual = market_value * nl::YOUNGTIMER_RATE / dec!(100);
            Ok(Assessment {
                rate: Rate::Flat(nl::YOUNGTIMER_RATE),
                effective_percent: nl::YOUNGTIMER_RATE,
                rule_applied: format!(
                    "youngtimer (15-30 years): {}% over estimated market value",
                    nl::YOUNGTIMER_RATE
                ),
                annual_benefit: annual,
                monthly_benefit: annual / dec!(12),
                protection_end: None,
            })
        }
        Classification::Standard => assess_standard(first_registration, fuel, catalog_price, on),
    }
}

fn assess_standard(
    first_registration: NaiveDate,
    fuel: FuelCategory,
    catalog_price: Option<Decimal>,
    on: NaiveDate,
) -> Result<Assessment, CalcError> {
    let protection_end = first_registration
        .checked_add_months(Months::new(nl::RATE_LOCK_MONTHS))
        .ok_or_else(|| {
            CalcError::InvalidVehicleData(format!(
                "first admission date {} out of range",
                first_registration
            ))
        })?;

    // The rate is anchored to the admission year for 60 months (plus one
    // month grace). After that it reverts to the prevailing schedule.
    let locked = on < protection_end;
    let rule_year = if locked {
        first_registration.year()
    } else {
        on.year()
    };
    let schedule = nl::schedule_for(rule_year);

    let rate = match fuel {
        FuelCategory::Electric => schedule.zero_emission,
        FuelCategory::Hydrogen => schedule.hydrogen,
        FuelCategory::Unknown => {
            // Degrade to the higher-tax column: misreading a rare fuel type
            // as fossil overstates tax slightly, misreading it as electric
            // would understate it.
            log::warn!("unknown fuel category, applying the standard rate column");
            schedule.standard
        }
        _ => schedule.standard,
    };

    let effective = rate.effective(catalog_price);
    let annual = match catalog_price {
        Some(price) => price * effective / dec!(100),
        None => Decimal::ZERO,
    };

    let anchor = if locked {
        format!("{} schedule, rate locked until {}", rule_year, protection_end)
    } else {
        format!(
            "{} prevailing schedule, lock expired {}",
            rule_year, protection_end
        )
    };
    log::debug!(
        "bijtelling for {} ({}): {} -> {}%",
        first_registration,
        fuel,
        anchor,
        effective
    );

    Ok(Assessment {
        rate,
        effective_percent: effective,
        rule_applied: format!("{}: {}", anchor, rate.describe()),
        annual_benefit: annual,
        monthly_benefit: annual / dec!(12),
        protection_end: Some(protection_end),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn oldtimer_has_no_addition() {
        let a = assess(
            date("1990-05-01"),
            FuelCategory::Petrol,
            Some(dec!(80000)),
            date("2025-06-01"),
        )
        .unwrap();
        assert_eq!(a.effective_percent, Decimal::ZERO);
        assert_eq!(a.annual_benefit, Decimal::ZERO);
        assert_eq!(a.protection_end, None);
        assert!(a.rule_applied.contains("oldtimer"));
    }

    #[test]
    fn youngtimer_35_percent_over_market_value() {
        // 2008 admission, evaluated 2025: 17 years old
        let a = assess(
            date("2008-03-01"),
            FuelCategory::Petrol,
            Some(dec!(40000)),
            date("2025-06-01"),
        )
        .unwrap();
        assert_eq!(a.effective_percent, dec!(35));
        // 35% of 40000 x 0.6 = 8400
        assert_eq!(a.annual_benefit, dec!(8400));
        assert_eq!(a.monthly_benefit, dec!(700));
        // Re-evaluated yearly, never locked
        assert_eq!(a.protection_end, None);
    }

    #[test]
    fn youngtimer_boundary_is_day_precise() {
        let reg = date("2010-08-05");
        // 14 years 364 days: still the standard rules (lock long expired, so
        // the prevailing 22% applies)
        let standard = assess(reg, FuelCategory::Petrol, Some(dec!(30000)), date("2025-08-04"))
            .unwrap();
        assert_eq!(standard.effective_percent, dec!(22));
        // Exactly 15 years: youngtimer
        let young = assess(reg, FuelCategory::Petrol, Some(dec!(30000)), date("2025-08-05"))
            .unwrap();
        assert_eq!(young.effective_percent, dec!(35));
    }

    #[test]
    fn oldtimer_boundary_is_day_precise() {
        let reg = date("1995-06-15");
        let on_anniversary =
            assess(reg, FuelCategory::Petrol, Some(dec!(20000)), date("2025-06-15")).unwrap();
        assert_eq!(on_anniversary.effective_percent, dec!(35));
        let day_after =
            assess(reg, FuelCategory::Petrol, Some(dec!(20000)), date("2025-06-16")).unwrap();
        assert_eq!(day_after.effective_percent, Decimal::ZERO);
    }

    #[test]
    fn rate_locked_to_admission_year_within_61_months() {
        // Electric, admitted 2021-03-15, €38,000: the 2021 band (12% to
        // €40,000) applies while the lock holds
        let a = assess(
            date("2021-03-15"),
            FuelCategory::Electric,
            Some(dec!(38000)),
            date("2026-03-14"),
        )
        .unwrap();
        assert_eq!(a.effective_percent, dec!(12));
        assert_eq!(a.annual_benefit, dec!(4560));
        assert_eq!(a.protection_end, Some(date("2026-04-15")));
    }

    #[test]
    fn lock_boundary_both_sides() {
        let reg = date("2021-03-15");
        let price = Some(dec!(38000));
        // Last day of protection: still the 2021 schedule
        let locked = assess(reg, FuelCategory::Electric, price, date("2026-04-14")).unwrap();
        assert_eq!(locked.effective_percent, dec!(12));
        // On the boundary the lock has expired; the 2026 schedule applies
        let expired = assess(reg, FuelCategory::Electric, price, date("2026-04-15")).unwrap();
        assert_eq!(expired.effective_percent, dec!(22));
        assert!(expired.rule_applied.contains("lock expired"));
        let later = assess(reg, FuelCategory::Electric, price, date("2026-05-01")).unwrap();
        assert_eq!(later.effective_percent, dec!(22));
    }

    #[test]
    fn threshold_blending() {
        // 2023 admission, €45,000 electric: (30000 x 16% + 15000 x 22%) /
        // 45000 = 18%
        let a = assess(
            date("2023-06-01"),
            FuelCategory::Electric,
            Some(dec!(45000)),
            date("2024-06-01"),
        )
        .unwrap();
        assert_eq!(a.effective_percent, dec!(18));
        assert_eq!(a.annual_benefit, dec!(8100));
        assert_eq!(a.monthly_benefit, dec!(675));
        assert!(a.rule_applied.contains("16% up to €30000, 22% above"));
    }

    #[test]
    fn pre_2017_keeps_25_percent_only_while_locked() {
        let reg = date("2016-01-10");
        // Within the lock (until 2021-02-10) the 2016 schedule holds
        let locked = assess(reg, FuelCategory::Petrol, Some(dec!(30000)), date("2018-06-01"))
            .unwrap();
        assert_eq!(locked.effective_percent, dec!(25));
        // After expiry the prevailing 22% applies
        let expired = assess(reg, FuelCategory::Petrol, Some(dec!(30000)), date("2022-01-01"))
            .unwrap();
        assert_eq!(expired.effective_percent, dec!(22));
    }

    #[test]
    fn early_electric_fully_exempt_while_locked() {
        let a = assess(
            date("2015-05-01"),
            FuelCategory::Electric,
            Some(dec!(90000)),
            date("2016-08-01"),
        )
        .unwrap();
        assert_eq!(a.effective_percent, Decimal::ZERO);
        assert_eq!(a.annual_benefit, Decimal::ZERO);
    }

    #[test]
    fn hydrogen_keeps_reduced_rate_from_2026() {
        let a = assess(
            date("2026-02-01"),
            FuelCategory::Hydrogen,
            Some(dec!(80000)),
            date("2026-06-01"),
        )
        .unwrap();
        assert_eq!(a.effective_percent, dec!(17));
        assert_eq!(a.annual_benefit, dec!(13600));
    }

    #[test]
    fn hydrogen_banded_like_electric_before_2026() {
        let a = assess(
            date("2024-02-01"),
            FuelCategory::Hydrogen,
            Some(dec!(45000)),
            date("2024-06-01"),
        )
        .unwrap();
        assert_eq!(a.effective_percent, dec!(18));
    }

    #[test]
    fn unknown_fuel_takes_standard_column() {
        let a = assess(
            date("2021-06-01"),
            FuelCategory::Unknown,
            Some(dec!(38000)),
            date("2022-06-01"),
        )
        .unwrap();
        // Not the favorable 12% electric band
        assert_eq!(a.effective_percent, dec!(22));
    }

    #[test]
    fn hybrids_take_standard_column() {
        for fuel in [FuelCategory::Hybrid, FuelCategory::PlugInHybrid, FuelCategory::Lpg] {
            let a = assess(date("2022-06-01"), fuel, Some(dec!(38000)), date("2023-06-01"))
                .unwrap();
            assert_eq!(a.effective_percent, dec!(22));
        }
    }

    #[test]
    fn missing_catalog_price_still_reports_percentage() {
        let a = assess(
            date("2021-03-15"),
            FuelCategory::Electric,
            None,
            date("2022-06-01"),
        )
        .unwrap();
        // Banded schedule is reported with the low band as the single number
        assert_eq!(a.effective_percent, dec!(12));
        assert_eq!(a.annual_benefit, Decimal::ZERO);
        assert_eq!(a.monthly_benefit, Decimal::ZERO);
        assert!(matches!(a.rate, Rate::Banded { .. }));
    }

    #[test]
    fn zero_catalog_price_has_no_monetary_effect() {
        let a = assess(
            date("2021-03-15"),
            FuelCategory::Electric,
            Some(Decimal::ZERO),
            date("2022-06-01"),
        )
        .unwrap();
        assert_eq!(a.annual_benefit, Decimal::ZERO);
    }

    #[test]
    fn future_admission_date_rejected() {
        let err = assess(
            date("2030-01-01"),
            FuelCategory::Petrol,
            Some(dec!(30000)),
            date("2025-01-01"),
        )
        .unwrap_err();
        assert!(matches!(err, CalcError::InvalidVehicleData(_)));
    }

    #[test]
    fn assessment_is_deterministic() {
        let run = || {
            assess(
                date("2021-03-15"),
                FuelCategory::Electric,
                Some(dec!(38000)),
                date("2025-06-01"),
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }
}
