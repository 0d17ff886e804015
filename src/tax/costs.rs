use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tax::nl;
use crate::tax::CalcError;
use crate::vehicle::{FuelCategory, VehicleFacts};

/// Insurance coverage tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum InsuranceTier {
    Liability,
    LiabilityPlus,
    Comprehensive,
}

impl InsuranceTier {
    pub fn base_annual(&self) -> Decimal {
        match self {
            InsuranceTier::Liability => dec!(600),
            InsuranceTier::LiabilityPlus => dec!(800),
            InsuranceTier::Comprehensive => dec!(1200),
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            InsuranceTier::Liability => "WA",
            InsuranceTier::LiabilityPlus => "WA+",
            InsuranceTier::Comprehensive => "All-risk",
        }
    }
}

/// User-supplied parameters for one calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct CostInputs {
    pub purchase_price: Decimal,
    pub residual_value: Decimal,
    pub ownership_years: u32,
    /// Distance driven per year, km
    pub annual_distance: Decimal,
    /// Share of distance driven for business, 0-100
    pub business_share_percent: Decimal,
    /// Price per litre (or kWh for electric)
    pub fuel_unit_price: Decimal,
    pub insurance_tier: InsuranceTier,
    /// Marginal income-tax rate used to monetize the deduction, 0-100
    pub marginal_tax_rate_percent: Decimal,
}

impl CostInputs {
    /// Reject invalid inputs before any formula runs.
    fn validate(&self) -> Result<(), CalcError> {
        if self.ownership_years == 0 {
            return Err(CalcError::InvalidInput(
                "ownership duration must be at least one year".to_string(),
            ));
        }
        if self.annual_distance <= Decimal::ZERO {
            return Err(CalcError::InvalidInput(
                "annual distance must be greater than zero".to_string(),
            ));
        }
        if self.purchase_price < Decimal::ZERO
            || self.residual_value < Decimal::ZERO
            || self.fuel_unit_price < Decimal::ZERO
        {
            return Err(CalcError::InvalidInput(
                "prices must not be negative".to_string(),
            ));
        }
        if self.business_share_percent < Decimal::ZERO
            || self.business_share_percent > dec!(100)
        {
            return Err(CalcError::InvalidInput(
                "business share must be between 0 and 100 percent".to_string(),
            ));
        }
        if self.marginal_tax_rate_percent < Decimal::ZERO
            || self.marginal_tax_rate_percent > dec!(100)
        {
            return Err(CalcError::InvalidInput(
                "marginal tax rate must be between 0 and 100 percent".to_string(),
            ));
        }
        Ok(())
    }
}

/// Annual fixed costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FixedCosts {
    #[schemars(with = "f64")]
    pub depreciation: Decimal,
    #[schemars(with = "f64")]
    pub insurance: Decimal,
    #[schemars(with = "f64")]
    pub road_tax: Decimal,
    #[schemars(with = "f64")]
    pub inspection: Decimal,
    #[schemars(with = "f64")]
    pub maintenance: Decimal,
    #[schemars(with = "f64")]
    pub total: Decimal,
}

/// Annual variable costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VariableCosts {
    #[schemars(with = "f64")]
    pub fuel: Decimal,
    #[schemars(with = "f64")]
    pub tires: Decimal,
    #[schemars(with = "f64")]
    pub repairs: Decimal,
    #[schemars(with = "f64")]
    pub total: Decimal,
}

/// Business-mileage deduction, monetized at the marginal rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaxRelief {
    #[schemars(with = "f64")]
    pub business_distance_km: Decimal,
    /// Deductible amount at the statutory per-km rate
    #[schemars(with = "f64")]
    pub allowance: Decimal,
    /// Actual tax saved
    #[schemars(with = "f64")]
    pub relief: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Totals {
    #[schemars(with = "f64")]
    pub gross_annual: Decimal,
    #[schemars(with = "f64")]
    pub gross_monthly: Decimal,
    #[schemars(with = "f64")]
    pub net_annual: Decimal,
    #[schemars(with = "f64")]
    pub net_monthly: Decimal,
    #[schemars(with = "f64")]
    pub net_per_km: Decimal,
}

/// Full cost breakdown for one calculation. Amounts are unrounded; rounding
/// happens at presentation boundaries only, so intermediate error cannot
/// compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CostBreakdown {
    pub fixed: FixedCosts,
    pub variable: VariableCosts,
    pub relief: TaxRelief,
    pub totals: Totals,
}

/// Combine optional vehicle facts and user inputs into a cost breakdown.
///
/// Pure and deterministic: no I/O, no shared state, identical inputs give an
/// identical breakdown. Every vehicle-dependent estimate has a documented
/// default so the calculation also works without registry data.
pub fn calculate(
    vehicle: Option<&VehicleFacts>,
    inputs: &CostInputs,
    on: NaiveDate,
) -> Result<CostBreakdown, CalcError> {
    inputs.validate()?;
    if let Some(v) = vehicle {
        if v.first_registration > on {
            return Err(CalcError::InvalidVehicleData(format!(
                "first admission date {} is in the future",
                v.first_registration
            )));
        }
    }

    let age = vehicle
        .map(|v| v.age_years(on))
        .unwrap_or(nl::DEFAULT_VEHICLE_AGE_YEARS);

    let depreciation =
        (inputs.purchase_price - inputs.residual_value) / Decimal::from(inputs.ownership_years);

    let value_factor =
        (inputs.purchase_price / nl::INSURANCE_VALUE_BASELINE).min(nl::INSURANCE_VALUE_CAP);
    let insurance = inputs.insurance_tier.base_annual() * value_factor;

    // Prefer the vehicle-reported monthly rate; it already reflects the
    // vehicle's tax class. The weight estimate gets the zero-emission
    // discount itself.
    let road_tax = match vehicle.and_then(|v| v.mrb_monthly) {
        Some(monthly) => monthly * dec!(12),
        None => {
            let weight = vehicle
                .and_then(|v| v.weight_kg)
                .unwrap_or(nl::DEFAULT_WEIGHT_KG);
            let zero_emission = vehicle.map(|v| v.is_zero_emission()).unwrap_or(false);
            nl::mrb_monthly_estimate(weight, zero_emission) * dec!(12)
        }
    };

    // Periodic inspection applies from the fourth year; without vehicle data
    // it is assumed not yet due.
    let inspection = match vehicle {
        Some(v) if v.age_years(on) > nl::APK_EXEMPT_AGE_YEARS => nl::APK_FEE,
        _ => Decimal::ZERO,
    };

    let maintenance = nl::MAINTENANCE_BASE
        * (Decimal::ONE + Decimal::from(age) * nl::MAINTENANCE_AGE_STEP)
        * (inputs.annual_distance / nl::MAINTENANCE_BASELINE_KM);

    let consumption = vehicle
        .and_then(|v| v.combined_consumption)
        .unwrap_or_else(|| match vehicle.map(|v| v.fuel) {
            Some(FuelCategory::Electric) => nl::DEFAULT_CONSUMPTION_ELECTRIC,
            _ => nl::DEFAULT_CONSUMPTION,
        });
    let fuel = consumption * (inputs.annual_distance / dec!(100)) * inputs.fuel_unit_price;

    let tires = round_eur(inputs.annual_distance / nl::TIRE_LIFESPAN_KM * nl::TIRE_SET_COST);

    let repairs = nl::REPAIR_BASE * repair_growth(age);

    let fixed_total = depreciation + insurance + road_tax + inspection + maintenance;
    let variable_total = fuel + tires + repairs;
    let gross_annual = fixed_total + variable_total;

    let business_distance_km =
        inputs.annual_distance * inputs.business_share_percent / dec!(100);
    let allowance = business_distance_km * nl::KILOMETER_ALLOWANCE;
    let relief = allowance * inputs.marginal_tax_rate_percent / dec!(100);

    let net_annual = gross_annual - relief;
    log::debug!(
        "cost breakdown: gross {} - relief {} = net {}",
        gross_annual,
        relief,
        net_annual
    );

    Ok(CostBreakdown {
        fixed: FixedCosts {
            depreciation,
            insurance,
            road_tax,
            inspection,
            maintenance,
            total: fixed_total,
        },
        variable: VariableCosts {
            fuel,
            tires,
            repairs,
            total: variable_total,
        },
        relief: TaxRelief {
            business_distance_km,
            allowance,
            relief,
        },
        totals: Totals {
            gross_annual,
            gross_monthly: gross_annual / dec!(12),
            net_annual,
            net_monthly: net_annual / dec!(12),
            net_per_km: net_annual / inputs.annual_distance,
        },
    })
}

/// 1.2^n growth once the vehicle is past the repair-free age.
fn repair_growth(age: i32) -> Decimal {
    let over = (age - nl::REPAIR_FREE_AGE_YEARS).max(0);
    let mut factor = Decimal::ONE;
    for _ in 0..over {
        factor *= nl::REPAIR_GROWTH;
    }
    factor
}

fn round_eur(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
