//! E2E tests for the calculate and bijtelling commands

use std::process::Command;

/// The documented no-vehicle scenario: all defaults, formatted output
#[test]
fn calculate_default_scenario() {
    let output = Command::new("cargo")
        .args(["run", "--", "calculate"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("COST BREAKDOWN"));
    assert!(stdout.contains("no registry data"));
    // Gross 9322.50/year, net 8556.60/year = 713.05/month
    assert!(stdout.contains("€9322.50"));
    assert!(stdout.contains("€8556.60"));
    assert!(stdout.contains("€713.05"));
    // Relief: 9000 business km x 0.23 x 37%
    assert!(stdout.contains("9000 km"));
    assert!(stdout.contains("€765.90"));
}

/// JSON output carries the same numbers as strings
#[test]
fn calculate_json_output() {
    let output = Command::new("cargo")
        .args(["run", "--", "calculate", "--json"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("\"gross_annual\": \"9322.50\""));
    assert!(stdout.contains("\"net_annual\": \"8556.60\""));
    assert!(stdout.contains("\"net_monthly\": \"713.05\""));
    assert!(stdout.contains("\"depreciation\": \"3000.00\""));
    assert!(stdout.contains("\"road_tax\": \"1440.00\""));
}

/// Banded electric rate blends over the threshold
#[test]
fn bijtelling_threshold_blending() {
    let output = Command::new("cargo")
        .args([
            "run",
            "--",
            "bijtelling",
            "--registration-date",
            "2023-06-01",
            "--fuel",
            "electric",
            "--catalog-price",
            "45000",
            "--on",
            "2024-06-01",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("16% up to €30000, 22% above"));
    assert!(stdout.contains("18.00%"));
    assert!(stdout.contains("€8100.00"));
    assert!(stdout.contains("2028-07-01"));
}

/// The 60-month lock anchors an early electric to its admission-year rate
#[test]
fn bijtelling_rate_lock() {
    let output = Command::new("cargo")
        .args([
            "run",
            "--",
            "bijtelling",
            "--registration-date",
            "2021-03-15",
            "--fuel",
            "electric",
            "--catalog-price",
            "38000",
            "--on",
            "2026-03-14",
        ])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("12.00%"));
    assert!(stdout.contains("locked until: 2026-04-15"));
}

/// Zero annual distance is rejected at the input boundary
#[test]
fn calculate_zero_distance_rejected() {
    let output = Command::new("cargo")
        .args(["run", "--", "calculate", "--annual-distance", "0"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("annual distance must be greater than zero"));
}

/// Schema command prints a JSON schema
#[test]
fn schema_output() {
    let output = Command::new("cargo")
        .args(["run", "--", "schema", "vehicle-facts"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"title\": \"VehicleFacts\""));
    assert!(stdout.contains("first_registration"));
}
