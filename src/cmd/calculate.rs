//! Calculate command - annual/monthly cost breakdown

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cmd::{format_eur, format_km};
use crate::comparison::{ComparisonEntry, ComparisonList, METHOD_PRIVATE_PURCHASE};
use crate::rdw::{LookupError, RdwClient};
use crate::tax::costs::{calculate, CostBreakdown, CostInputs, InsuranceTier};
use crate::tax::nl;
use crate::vehicle::VehicleFacts;

#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// License plate to resolve via the RDW registry
    #[arg(short, long)]
    plate: Option<String>,

    /// JSON file with previously saved vehicle facts
    #[arg(long, conflicts_with = "plate")]
    vehicle_file: Option<PathBuf>,

    /// Purchase price in euros
    #[arg(long, default_value = "25000")]
    purchase_price: Decimal,

    /// Expected residual value at the end of ownership
    #[arg(long, default_value = "10000")]
    residual_value: Decimal,

    /// Ownership duration in years
    #[arg(long, default_value_t = 5)]
    ownership_years: u32,

    /// Distance driven per year in km
    #[arg(long, default_value = "15000")]
    annual_distance: Decimal,

    /// Share of distance driven for business, percent
    #[arg(long, default_value = "60")]
    business_share: Decimal,

    /// Fuel price per litre (or kWh for electric)
    #[arg(long, default_value = "1.85")]
    fuel_price: Decimal,

    /// Insurance coverage tier
    #[arg(long, value_enum, default_value_t = InsuranceArg::Comprehensive)]
    insurance: InsuranceArg,

    /// Marginal income-tax rate used to monetize the deduction, percent
    #[arg(long, default_value = "37")]
    tax_rate: Decimal,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Save the result to the comparison list
    #[arg(long)]
    save: bool,

    /// Comparison list file
    #[arg(long, default_value = "comparisons.json")]
    file: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum InsuranceArg {
    /// Liability only (WA)
    Liability,
    /// Liability plus limited casco (WA+)
    LiabilityPlus,
    /// Full casco (all-risk)
    #[default]
    Comprehensive,
}

impl From<InsuranceArg> for InsuranceTier {
    fn from(arg: InsuranceArg) -> Self {
        match arg {
            InsuranceArg::Liability => InsuranceTier::Liability,
            InsuranceArg::LiabilityPlus => InsuranceTier::LiabilityPlus,
            InsuranceArg::Comprehensive => InsuranceTier::Comprehensive,
        }
    }
}

/// JSON view with presentation rounding applied.
#[derive(Debug, Serialize)]
struct BreakdownView {
    #[serde(skip_serializing_if = "Option::is_none")]
    vehicle: Option<String>,
    fixed: FixedView,
    variable: VariableView,
    relief: ReliefView,
    totals: TotalsView,
}

#[derive(Debug, Serialize)]
struct FixedView {
    depreciation: String,
    insurance: String,
    road_tax: String,
    inspection: String,
    maintenance: String,
    total: String,
}

#[derive(Debug, Serialize)]
struct VariableView {
    fuel: String,
    tires: String,
    repairs: String,
    total: String,
}

#[derive(Debug, Serialize)]
struct ReliefView {
    business_distance_km: String,
    allowance: String,
    relief: String,
}

#[derive(Debug, Serialize)]
struct TotalsView {
    gross_annual: String,
    gross_monthly: String,
    net_annual: String,
    net_monthly: String,
    net_per_km: String,
}

fn eur(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

impl From<&CostBreakdown> for BreakdownView {
    fn from(b: &CostBreakdown) -> Self {
        BreakdownView {
            vehicle: None,
            fixed: FixedView {
                depreciation: eur(b.fixed.depreciation),
                insurance: eur(b.fixed.insurance),
                road_tax: eur(b.fixed.road_tax),
                inspection: eur(b.fixed.inspection),
                maintenance: eur(b.fixed.maintenance),
                total: eur(b.fixed.total),
            },
            variable: VariableView {
                fuel: eur(b.variable.fuel),
                tires: eur(b.variable.tires),
                repairs: eur(b.variable.repairs),
                total: eur(b.variable.total),
            },
            relief: ReliefView {
                business_distance_km: format!("{:.0}", b.relief.business_distance_km.round_dp(0)),
                allowance: eur(b.relief.allowance),
                relief: eur(b.relief.relief),
            },
            totals: TotalsView {
                gross_annual: eur(b.totals.gross_annual),
                gross_monthly: eur(b.totals.gross_monthly),
                net_annual: eur(b.totals.net_annual),
                net_monthly: eur(b.totals.net_monthly),
                net_per_km: eur(b.totals.net_per_km),
            },
        }
    }
}

impl CalculateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let vehicle = self.resolve_vehicle()?;
        let inputs = CostInputs {
            purchase_price: self.purchase_price,
            residual_value: self.residual_value,
            ownership_years: self.ownership_years,
            annual_distance: self.annual_distance,
            business_share_percent: self.business_share,
            fuel_unit_price: self.fuel_price,
            insurance_tier: self.insurance.into(),
            marginal_tax_rate_percent: self.tax_rate,
        };
        let on = chrono::Local::now().date_naive();
        let breakdown = calculate(vehicle.as_ref(), &inputs, on)?;

        if self.json {
            let mut view = BreakdownView::from(&breakdown);
            view.vehicle = vehicle.as_ref().map(|v| v.summary());
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            self.print_text(vehicle.as_ref(), &breakdown);
        }

        if self.save {
            self.save_entry(vehicle.as_ref(), breakdown)?;
        }
        Ok(())
    }

    /// Vehicle facts from a saved file, the registry, or nothing. A plate
    /// that is not found falls back to the no-vehicle defaults instead of
    /// failing the calculation.
    fn resolve_vehicle(&self) -> anyhow::Result<Option<VehicleFacts>> {
        if let Some(path) = &self.vehicle_file {
            let file = File::open(path)?;
            return Ok(Some(serde_json::from_reader(BufReader::new(file))?));
        }
        let Some(plate) = &self.plate else {
            return Ok(None);
        };
        let client = RdwClient::new();
        match client.lookup(plate) {
            Ok(facts) => Ok(Some(facts)),
            Err(LookupError::NotFound(plate)) => {
                log::warn!("vehicle {} not found, calculating with defaults", plate);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn print_text(&self, vehicle: Option<&VehicleFacts>, b: &CostBreakdown) {
        println!();
        println!("COST BREAKDOWN (private purchase, business use)");
        println!();
        match vehicle {
            Some(v) => println!("  Vehicle: {}", v.summary()),
            None => println!("  Vehicle: no registry data, using defaults"),
        }
        println!();

        println!("FIXED COSTS ({}/year)", format_eur(b.fixed.total));
        println!("  Depreciation: {}", format_eur(b.fixed.depreciation));
        println!(
            "  Insurance ({}): {}",
            InsuranceTier::from(self.insurance).display(),
            format_eur(b.fixed.insurance)
        );
        println!("  Road tax (MRB): {}", format_eur(b.fixed.road_tax));
        println!("  Inspection (APK): {}", format_eur(b.fixed.inspection));
        println!("  Maintenance: {}", format_eur(b.fixed.maintenance));
        println!();

        println!("VARIABLE COSTS ({}/year)", format_eur(b.variable.total));
        println!("  Fuel: {}", format_eur(b.variable.fuel));
        println!("  Tires: {}", format_eur(b.variable.tires));
        println!("  Repairs: {}", format_eur(b.variable.repairs));
        println!();

        println!("TAX RELIEF");
        println!(
            "  Business distance: {}",
            format_km(b.relief.business_distance_km)
        );
        println!(
            "  Allowance (€{}/km): {}",
            nl::KILOMETER_ALLOWANCE,
            format_eur(b.relief.allowance)
        );
        println!(
            "  Relief at {}% marginal rate: {}",
            self.tax_rate,
            format_eur(b.relief.relief)
        );
        println!();

        println!(
            "GROSS: {}/year ({}/month)",
            format_eur(b.totals.gross_annual),
            format_eur(b.totals.gross_monthly)
        );
        println!(
            "NET:   {}/year ({}/month, {}/km)",
            format_eur(b.totals.net_annual),
            format_eur(b.totals.net_monthly),
            format_eur(b.totals.net_per_km)
        );
        println!();
    }

    fn save_entry(
        &self,
        vehicle: Option<&VehicleFacts>,
        breakdown: CostBreakdown,
    ) -> anyhow::Result<()> {
        let now = chrono::Utc::now();
        let entry = ComparisonEntry {
            id: format!("{}", now.timestamp_millis()),
            vehicle_summary: vehicle
                .map(|v| v.summary())
                .unwrap_or_else(|| "manual entry".to_string()),
            plate: vehicle.map(|v| v.plate.clone()),
            method: METHOD_PRIVATE_PURCHASE.to_string(),
            breakdown,
            saved_at: now.to_rfc3339(),
        };

        let mut list = ComparisonList::load(&self.file)?;
        list.add(entry);
        list.save(&self.file)?;
        println!("Saved to comparison list ({})", self.file.display());
        Ok(())
    }
}
