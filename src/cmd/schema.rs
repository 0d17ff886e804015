//! Schema command - print expected input/output formats

use clap::Args;
use schemars::schema_for;

use crate::tax::costs::CostBreakdown;
use crate::vehicle::VehicleFacts;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Which schema to print
    #[arg(value_enum, default_value = "vehicle-facts")]
    target: SchemaTarget,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaTarget {
    /// JSON Schema for a saved vehicle-facts file (--vehicle-file input)
    VehicleFacts,
    /// JSON Schema for the cost breakdown embedded in comparison entries
    CostBreakdown,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schema = match self.target {
            SchemaTarget::VehicleFacts => schema_for!(VehicleFacts),
            SchemaTarget::CostBreakdown => schema_for!(CostBreakdown),
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}
