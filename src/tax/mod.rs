pub mod bijtelling;
pub mod costs;
pub mod nl;

pub use bijtelling::{assess, Assessment};
pub use costs::{calculate, CostBreakdown, CostInputs, InsuranceTier};

/// Errors from the cost & tax engine. These are deterministic input
/// problems: terminal for the calculation and surfaced verbatim, never
/// retried.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CalcError {
    /// Rejected at the input boundary, before any formula runs.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Vehicle data present but unusable (e.g. a first-admission date in the
    /// future).
    #[error("invalid vehicle data: {0}")]
    InvalidVehicleData(String),
}
