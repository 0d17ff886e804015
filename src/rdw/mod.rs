//! RDW open-data registry client.
//!
//! Resolves a license plate against the public RDW datasets (no API key
//! required), merges the results into a single [`VehicleFacts`] record and
//! caches it briefly. The datasets are fetched in parallel with independent
//! success/failure: only the registrations dataset is required, everything
//! else degrades to absent data.

pub mod cache;

use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::rdw::cache::TtlCache;
use crate::tax::nl;
use crate::vehicle::{fuel, plate, FuelCategory, VehicleFacts};

const BASE_URL: &str = "https://opendata.rdw.nl";

/// Registrations: make, model, admission date, mass, catalog price.
const REGISTRATIONS_DATASET: &str = "m9d7-ebf2";
/// Fuel/emissions: fuel description and WLTP consumption.
const EMISSIONS_DATASET: &str = "8ys7-d773";
/// NEDC consumption figures; the statutory deduction basis, so these outrank
/// the newer WLTP figures when both exist.
const NEDC_DATASET: &str = "dqbz-ecw7";
/// Open recalls.
const RECALLS_DATASET: &str = "t3br-gjjw";

/// Minimum delay before issuing a new request batch.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(100);
/// How long a resolved vehicle stays cached.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("invalid plate: {0:?}")]
    InvalidPlate(String),
    /// Plate absent from the registry. Callers performing a calculation
    /// should treat this as "no vehicle data" and fall back to defaults.
    #[error("vehicle {0} not found in the RDW registry")]
    NotFound(String),
    /// The registry returned a record that cannot be used.
    #[error("invalid vehicle data for {plate}: {reason}")]
    InvalidVehicleData { plate: String, reason: String },
    /// The required base dataset could not be fetched at all.
    #[error("RDW registry unavailable: {0}")]
    Upstream(String),
}

pub struct RdwClient {
    base_url: String,
    last_request: Mutex<Option<Instant>>,
    cache: Mutex<TtlCache<VehicleFacts>>,
}

impl RdwClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        RdwClient {
            base_url,
            last_request: Mutex::new(None),
            cache: Mutex::new(TtlCache::new(CACHE_TTL)),
        }
    }

    /// Resolve a plate to vehicle facts, hitting the cache first.
    pub fn lookup(&self, raw_plate: &str) -> Result<VehicleFacts, LookupError> {
        let plate = plate::normalize(raw_plate);
        if !plate::is_valid(&plate) {
            return Err(LookupError::InvalidPlate(raw_plate.to_string()));
        }

        if let Some(hit) = self.cache.lock().unwrap().get(&plate) {
            log::debug!("cache hit for {}", plate);
            return Ok(hit.clone());
        }

        self.pace();
        log::info!("RDW lookup for {}", plate);

        let (registration, emissions, nedc, recalls) = thread::scope(|s| {
            let registration =
                s.spawn(|| self.fetch_one::<RegistrationRecord>(REGISTRATIONS_DATASET, &plate));
            let emissions =
                s.spawn(|| self.fetch_optional::<EmissionsRecord>(EMISSIONS_DATASET, &plate));
            let nedc = s.spawn(|| self.fetch_optional::<NedcRecord>(NEDC_DATASET, &plate));
            let recalls = s.spawn(|| self.fetch_all::<RecallRecord>(RECALLS_DATASET, &plate));
            (
                registration.join().expect("registration fetch panicked"),
                emissions.join().expect("emissions fetch panicked"),
                nedc.join().expect("nedc fetch panicked"),
                recalls.join().expect("recalls fetch panicked"),
            )
        });

        let registration = registration?.ok_or_else(|| LookupError::NotFound(plate.clone()))?;
        let facts = merge_records(&plate, &registration, &emissions, &nedc, recalls.len())?;

        self.cache.lock().unwrap().set(plate, facts.clone());
        Ok(facts)
    }

    /// Drop all cached lookups.
    #[allow(dead_code)]
    pub fn clear_cache(&self) {
        self.cache.lock().unwrap().clear();
    }

    /// Enforce the minimum inter-batch delay.
    fn pace(&self) {
        let mut last = self.last_request.lock().unwrap();
        if let Some(at) = *last {
            let since = at.elapsed();
            if since < MIN_REQUEST_INTERVAL {
                thread::sleep(MIN_REQUEST_INTERVAL - since);
            }
        }
        *last = Some(Instant::now());
    }

    fn dataset_url(&self, dataset: &str, plate: &str) -> String {
        format!("{}/resource/{}.json?kenteken={}", self.base_url, dataset, plate)
    }

    fn fetch_one<T: DeserializeOwned>(
        &self,
        dataset: &str,
        plate: &str,
    ) -> Result<Option<T>, LookupError> {
        let url = self.dataset_url(dataset, plate);
        let records: Vec<T> = ureq::get(&url)
            .call()
            .map_err(|err| LookupError::Upstream(err.to_string()))?
            .into_json()
            .map_err(|err| LookupError::Upstream(err.to_string()))?;
        Ok(records.into_iter().next())
    }

    /// Optional dataset: failures are absorbed, the merge sees `None`.
    fn fetch_optional<T: DeserializeOwned>(&self, dataset: &str, plate: &str) -> Option<T> {
        match self.fetch_one(dataset, plate) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("optional dataset {} unavailable: {}", dataset, err);
                None
            }
        }
    }

    fn fetch_all<T: DeserializeOwned>(&self, dataset: &str, plate: &str) -> Vec<T> {
        let url = self.dataset_url(dataset, plate);
        let response = match ureq::get(&url).call() {
            Ok(response) => response,
            Err(err) => {
                log::warn!("optional dataset {} unavailable: {}", dataset, err);
                return Vec::new();
            }
        };
        match response.into_json() {
            Ok(records) => records,
            Err(err) => {
                log::warn!("optional dataset {} returned bad data: {}", dataset, err);
                Vec::new()
            }
        }
    }
}

impl Default for RdwClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Subset of the registrations dataset consumed by the resolver.
#[derive(Debug, Default, Deserialize)]
struct RegistrationRecord {
    merk: Option<String>,
    handelsbenaming: Option<String>,
    datum_eerste_toelating: Option<String>,
    catalogusprijs: Option<String>,
    massa_ledig_voertuig: Option<String>,
    brandstof_omschrijving: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct EmissionsRecord {
    brandstof_omschrijving: Option<String>,
    brandstofverbruik_gecombineerd: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NedcRecord {
    brandstofverbruik_gecombineerd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecallRecord {
    #[serde(default)]
    #[allow(dead_code)]
    referentiecode_rdw: Option<String>,
}

/// Merge the fetched records into one fact record. Pure, so the precedence
/// rules are testable without a network.
fn merge_records(
    plate: &str,
    registration: &RegistrationRecord,
    emissions: &Option<EmissionsRecord>,
    nedc: &Option<NedcRecord>,
    open_recalls: usize,
) -> Result<VehicleFacts, LookupError> {
    let first_registration = registration
        .datum_eerste_toelating
        .as_deref()
        .and_then(parse_det)
        .ok_or_else(|| LookupError::InvalidVehicleData {
            plate: plate.to_string(),
            reason: "missing or unparseable first-admission date".to_string(),
        })?;

    let make = registration
        .merk
        .clone()
        .unwrap_or_else(|| "Onbekend".to_string());
    let model = registration.handelsbenaming.clone().unwrap_or_default();

    // The emissions dataset carries the maintained fuel description; the
    // registration record's copy is a fallback.
    let description = emissions
        .as_ref()
        .and_then(|e| e.brandstof_omschrijving.as_deref())
        .or(registration.brandstof_omschrijving.as_deref());
    let fuel = fuel::resolve(description, &make, &model);

    let nedc_consumption = nedc
        .as_ref()
        .and_then(|n| parse_decimal(n.brandstofverbruik_gecombineerd.as_deref()));
    if nedc_consumption.is_some() {
        log::debug!("{}: using NEDC consumption figure", plate);
    }
    let combined_consumption = nedc_consumption.or_else(|| {
        emissions
            .as_ref()
            .and_then(|e| parse_decimal(e.brandstofverbruik_gecombineerd.as_deref()))
    });

    let weight_kg = parse_u32(registration.massa_ledig_voertuig.as_deref());
    let catalog_price = parse_decimal(registration.catalogusprijs.as_deref());
    let zero_emission = matches!(fuel, FuelCategory::Electric | FuelCategory::Hydrogen);
    let mrb_monthly = weight_kg.map(|w| nl::mrb_monthly_estimate(w, zero_emission));

    Ok(VehicleFacts {
        plate: plate.to_string(),
        make,
        model,
        first_registration,
        catalog_price,
        weight_kg,
        fuel,
        combined_consumption,
        mrb_monthly,
        open_recalls,
    })
}

/// Admission dates arrive as `YYYYMMDD`, occasionally as an ISO timestamp.
fn parse_det(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d") {
        return Some(date);
    }
    value
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Registry numerics arrive as strings; blank and literal zero mean absent.
fn parse_decimal(value: Option<&str>) -> Option<Decimal> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }
    let parsed = value.parse::<Decimal>().ok()?;
    if parsed.is_zero() {
        None
    } else {
        Some(parsed)
    }
}

fn parse_u32(value: Option<&str>) -> Option<u32> {
    let parsed = value?.trim().parse::<u32>().ok()?;
    if parsed == 0 {
        None
    } else {
        Some(parsed)
    }
}
