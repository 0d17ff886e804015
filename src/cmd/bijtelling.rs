//! Bijtelling command - benefit-in-kind percentage for a vehicle

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cmd::{format_eur, format_pct};
use crate::tax::bijtelling::{assess, Assessment};
use crate::vehicle::FuelCategory;

#[derive(Args, Debug)]
pub struct BijtellingCommand {
    /// First-admission date (DET), e.g. 2021-03-15
    #[arg(short, long)]
    registration_date: NaiveDate,

    /// Fuel category
    #[arg(short, long, value_enum)]
    fuel: FuelArg,

    /// Catalog (list) price in euros
    #[arg(short, long)]
    catalog_price: Option<Decimal>,

    /// Evaluation date (defaults to today)
    #[arg(long)]
    on: Option<NaiveDate>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FuelArg {
    Petrol,
    Diesel,
    Electric,
    Hydrogen,
    Lpg,
    Cng,
    Hybrid,
    PlugInHybrid,
}

impl From<FuelArg> for FuelCategory {
    fn from(arg: FuelArg) -> Self {
        match arg {
            FuelArg::Petrol => FuelCategory::Petrol,
            FuelArg::Diesel => FuelCategory::Diesel,
            FuelArg::Electric => FuelCategory::Electric,
            FuelArg::Hydrogen => FuelCategory::Hydrogen,
            FuelArg::Lpg => FuelCategory::Lpg,
            FuelArg::Cng => FuelCategory::Cng,
            FuelArg::Hybrid => FuelCategory::Hybrid,
            FuelArg::PlugInHybrid => FuelCategory::PlugInHybrid,
        }
    }
}

/// JSON view with presentation rounding applied.
#[derive(Debug, Serialize)]
struct AssessmentView {
    effective_percent: String,
    rule_applied: String,
    annual_benefit: String,
    monthly_benefit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    protection_end: Option<String>,
}

impl From<&Assessment> for AssessmentView {
    fn from(a: &Assessment) -> Self {
        AssessmentView {
            effective_percent: format!("{:.2}", a.effective_percent.round_dp(2)),
            rule_applied: a.rule_applied.clone(),
            annual_benefit: format!("{:.2}", a.annual_benefit.round_dp(2)),
            monthly_benefit: format!("{:.2}", a.monthly_benefit.round_dp(2)),
            protection_end: a.protection_end.map(|d| d.to_string()),
        }
    }
}

impl BijtellingCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let on = self.on.unwrap_or_else(|| chrono::Local::now().date_naive());
        let assessment = assess(
            self.registration_date,
            self.fuel.into(),
            self.catalog_price,
            on,
        )?;

        if self.json {
            let view = AssessmentView::from(&assessment);
            println!("{}", serde_json::to_string_pretty(&view)?);
        } else {
            self.print_text(&assessment, on);
        }
        Ok(())
    }

    fn print_text(&self, assessment: &Assessment, on: NaiveDate) {
        println!();
        println!("BIJTELLING ({})", on);
        println!();
        println!("  Rule: {}", assessment.rule_applied);
        println!(
            "  Effective rate: {}",
            format_pct(assessment.effective_percent)
        );
        println!(
            "  Annual addition: {} ({}/month)",
            format_eur(assessment.annual_benefit),
            format_eur(assessment.monthly_benefit)
        );
        if let Some(end) = assessment.protection_end {
            println!("  Rate locked until: {}", end);
        }
        println!();
    }
}
