//! Compare command - saved comparison list management

use std::io;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::comparison::ComparisonList;

#[derive(Args, Debug)]
pub struct CompareCommand {
    /// Comparison list file
    #[arg(long, default_value = "comparisons.json")]
    file: PathBuf,

    #[command(subcommand)]
    action: CompareAction,
}

#[derive(Subcommand, Debug)]
enum CompareAction {
    /// List saved comparisons, cheapest first
    List {
        /// Output as JSON instead of a formatted table
        #[arg(long)]
        json: bool,
    },
    /// Remove one entry by id
    Remove { id: String },
    /// Remove all entries
    Clear,
    /// Export the list as CSV to stdout
    Export,
}

#[derive(Debug, Clone, Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Vehicle")]
    vehicle: String,
    #[tabled(rename = "Net/month")]
    net_monthly: String,
    #[tabled(rename = "Net/year")]
    net_annual: String,
    #[tabled(rename = "Gross/year")]
    gross_annual: String,
    #[tabled(rename = "Saved")]
    saved_at: String,
}

#[derive(Debug, Serialize)]
struct CsvRow {
    id: String,
    vehicle: String,
    method: String,
    gross_annual: String,
    net_annual: String,
    net_monthly: String,
    saved_at: String,
}

impl CompareCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match &self.action {
            CompareAction::List { json } => self.list(*json),
            CompareAction::Remove { id } => self.remove(id),
            CompareAction::Clear => self.clear(),
            CompareAction::Export => self.export(),
        }
    }

    fn sorted_entries(&self) -> anyhow::Result<ComparisonList> {
        let mut list = ComparisonList::load(&self.file)?;
        list.entries
            .sort_by(|a, b| a.breakdown.totals.net_monthly.cmp(&b.breakdown.totals.net_monthly));
        Ok(list)
    }

    fn list(&self, json: bool) -> anyhow::Result<()> {
        let list = self.sorted_entries()?;

        if json {
            println!("{}", serde_json::to_string_pretty(&list)?);
            return Ok(());
        }

        if list.entries.is_empty() {
            println!("No saved comparisons ({})", self.file.display());
            return Ok(());
        }

        let rows: Vec<ComparisonRow> = list
            .entries
            .iter()
            .map(|e| ComparisonRow {
                id: e.id.clone(),
                vehicle: e.vehicle_summary.clone(),
                net_monthly: format!("€{:.2}", e.breakdown.totals.net_monthly.round_dp(2)),
                net_annual: format!("€{:.2}", e.breakdown.totals.net_annual.round_dp(2)),
                gross_annual: format!("€{:.2}", e.breakdown.totals.gross_annual.round_dp(2)),
                saved_at: e.saved_at.clone(),
            })
            .collect();

        println!();
        println!("SAVED COMPARISONS (cheapest first)");
        println!();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!();
        Ok(())
    }

    fn remove(&self, id: &str) -> anyhow::Result<()> {
        let mut list = ComparisonList::load(&self.file)?;
        if list.remove(id) {
            list.save(&self.file)?;
            println!("Removed entry {}", id);
        } else {
            println!("No entry with id {}", id);
        }
        Ok(())
    }

    fn clear(&self) -> anyhow::Result<()> {
        let mut list = ComparisonList::load(&self.file)?;
        let count = list.entries.len();
        list.clear();
        list.save(&self.file)?;
        println!("Removed {} entries", count);
        Ok(())
    }

    fn export(&self) -> anyhow::Result<()> {
        let list = self.sorted_entries()?;
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for e in &list.entries {
            wtr.serialize(CsvRow {
                id: e.id.clone(),
                vehicle: e.vehicle_summary.clone(),
                method: e.method.clone(),
                gross_annual: format!("{:.2}", e.breakdown.totals.gross_annual.round_dp(2)),
                net_annual: format!("{:.2}", e.breakdown.totals.net_annual.round_dp(2)),
                net_monthly: format!("{:.2}", e.breakdown.totals.net_monthly.round_dp(2)),
                saved_at: e.saved_at.clone(),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}
