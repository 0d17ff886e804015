//! Lookup command - resolve a plate against the RDW registry

use clap::Args;
use serde::Serialize;

use crate::cmd::{format_eur, format_pct};
use crate::rdw::{LookupError, RdwClient};
use crate::tax::bijtelling::assess;
use crate::vehicle::{plate, VehicleFacts};

#[derive(Args, Debug)]
pub struct LookupCommand {
    /// License plate, with or without dashes
    plate: String,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct LookupView<'a> {
    vehicle: &'a VehicleFacts,
    classification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    bijtelling: Option<BijtellingView>,
}

#[derive(Debug, Serialize)]
struct BijtellingView {
    effective_percent: String,
    rule_applied: String,
    annual_benefit: String,
}

impl LookupCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let client = RdwClient::new();
        let facts = match client.lookup(&self.plate) {
            Ok(facts) => facts,
            Err(LookupError::NotFound(plate)) => {
                eprintln!(
                    "Vehicle {} not found in the RDW registry. Enter the data manually.",
                    plate::format(&plate)
                );
                std::process::exit(1);
            }
            Err(err) => return Err(err.into()),
        };

        let on = chrono::Local::now().date_naive();
        let assessment = assess(facts.first_registration, facts.fuel, facts.catalog_price, on).ok();

        if self.json {
            let view = LookupView {
                vehicle: &facts,
                classification: facts.classification(on).to_string(),
                bijtelling: assessment.as_ref().map(|a| BijtellingView {
                    effective_percent: format!("{:.2}", a.effective_percent.round_dp(2)),
                    rule_applied: a.rule_applied.clone(),
                    annual_benefit: format!("{:.2}", a.annual_benefit.round_dp(2)),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
            return Ok(());
        }

        println!();
        println!("VEHICLE {}", plate::format(&facts.plate));
        println!();
        println!("  Make/model: {} {}", facts.make, facts.model);
        println!(
            "  First admission: {} ({}, {} years)",
            facts.first_registration,
            facts.classification(on),
            facts.age_years(on)
        );
        println!("  Fuel: {}", facts.fuel);
        match facts.catalog_price {
            Some(price) => println!("  Catalog price: {}", format_eur(price)),
            None => println!("  Catalog price: unknown"),
        }
        if let Some(weight) = facts.weight_kg {
            println!("  Empty mass: {} kg", weight);
        }
        if let Some(consumption) = facts.combined_consumption {
            println!("  Combined consumption: {}/100km", consumption);
        }
        if let Some(mrb) = facts.mrb_monthly {
            println!("  Road tax (est.): {}/month", format_eur(mrb));
        }
        if facts.open_recalls > 0 {
            println!("  Open recalls: {}", facts.open_recalls);
        }

        if let Some(a) = assessment {
            println!();
            println!("BIJTELLING");
            println!();
            println!("  Rule: {}", a.rule_applied);
            println!("  Effective rate: {}", format_pct(a.effective_percent));
            println!(
                "  Annual addition: {} ({}/month)",
                format_eur(a.annual_benefit),
                format_eur(a.monthly_benefit)
            );
        }
        println!();
        Ok(())
    }
}
