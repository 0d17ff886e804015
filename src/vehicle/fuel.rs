use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fuel category as used by the tax rules and cost formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FuelCategory {
    Petrol,
    Diesel,
    Electric,
    Hydrogen,
    Lpg,
    Cng,
    Hybrid,
    PlugInHybrid,
    Unknown,
}

impl FuelCategory {
    pub fn display(&self) -> &'static str {
        match self {
            FuelCategory::Petrol => "Benzine",
            FuelCategory::Diesel => "Diesel",
            FuelCategory::Electric => "Elektrisch",
            FuelCategory::Hydrogen => "Waterstof",
            FuelCategory::Lpg => "LPG",
            FuelCategory::Cng => "CNG",
            FuelCategory::Hybrid => "Hybride",
            FuelCategory::PlugInHybrid => "Plug-in hybride",
            FuelCategory::Unknown => "Onbekend",
        }
    }
}

impl std::fmt::Display for FuelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Electric-only model lines, matched case-insensitively against make and
/// model. The registry's fuel text is frequently blank or wrong for these
/// manufacturers, so a match here forces `Electric` regardless of what the
/// upstream record says. `None` matches every model of the make.
/// Kept separate from the classifier so new lines can be added without
/// touching it.
const ELECTRIC_MODEL_OVERRIDES: &[(&str, Option<&str>)] = &[
    ("TESLA", None),
    ("NISSAN", Some("LEAF")),
    ("BMW", Some("I3")),
    ("VOLKSWAGEN", Some("ID.")),
    ("AUDI", Some("E-TRON")),
];

/// Resolve the fuel category from the registry's description plus make/model
/// fallback. Override table first, then text normalization.
pub fn resolve(description: Option<&str>, make: &str, model: &str) -> FuelCategory {
    if is_electric_model(make, model) {
        log::debug!("{} {} matched electric-only model line", make, model);
        return FuelCategory::Electric;
    }
    match description {
        Some(text) => parse(text),
        None => FuelCategory::Unknown,
    }
}

fn is_electric_model(make: &str, model: &str) -> bool {
    let make = make.to_uppercase();
    let model = model.to_uppercase();
    ELECTRIC_MODEL_OVERRIDES
        .iter()
        .any(|(m, line)| make.contains(m) && line.map_or(true, |l| model.contains(l)))
}

/// Normalize a Dutch registry fuel description. Exact matches first (the
/// registry uses a fixed vocabulary for most records), then substring
/// families for the free-text variants. Unrecognized text degrades to
/// `Unknown` with a warning rather than failing the lookup.
pub fn parse(description: &str) -> FuelCategory {
    let text = description.trim().to_lowercase();
    if text.is_empty() {
        return FuelCategory::Unknown;
    }

    match text.as_str() {
        "benzine" | "euro 95 benzine" | "super benzine" => return FuelCategory::Petrol,
        "diesel" | "gasolie" => return FuelCategory::Diesel,
        "elektriciteit" | "elektrisch" | "electric" => return FuelCategory::Electric,
        "waterstof" | "hydrogen" => return FuelCategory::Hydrogen,
        "lpg" | "autogas" => return FuelCategory::Lpg,
        "cng" | "aardgas" => return FuelCategory::Cng,
        _ => {}
    }

    // Plug-in check must come before the plain hybrid family
    if text.contains("hybride") || text.contains("hybrid") {
        return if text.contains("plug") {
            FuelCategory::PlugInHybrid
        } else {
            FuelCategory::Hybrid
        };
    }
    if text.contains("benzine") || text.contains("euro 95") || text.contains("super") {
        return FuelCategory::Petrol;
    }
    if text.contains("diesel") || text.contains("gasolie") || text.contains("tdi") {
        return FuelCategory::Diesel;
    }
    if text.contains("elektr") || text.contains("battery") || text.contains("accu")
        || text.contains("stroom")
    {
        return FuelCategory::Electric;
    }
    if text.contains("lpg") || text.contains("autogas") {
        return FuelCategory::Lpg;
    }
    if text.contains("cng") || text.contains("aardgas") || text.contains("methaan") {
        return FuelCategory::Cng;
    }
    if text.contains("waterstof") || text.contains("hydrogen") {
        return FuelCategory::Hydrogen;
    }

    log::warn!("unrecognized fuel description: {:?}", description);
    FuelCategory::Unknown
}
