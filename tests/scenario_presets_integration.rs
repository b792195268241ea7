use std::process::Command;

#[derive(Debug)]
struct Totals {
    fuel_liters: f64,
    solar_kwh: f64,
}

#[test]
fn scenario_files_run_via_cli_and_produce_distinct_dynamics() {
    let baseline = run_and_parse_totals("scenarios/baseline.toml");
    let solar_heavy = run_and_parse_totals("scenarios/solar_heavy.toml");
    let night_shift = run_and_parse_totals("scenarios/night_shift.toml");

    assert!(
        solar_heavy.solar_kwh > baseline.solar_kwh * 1.3,
        "expected solar_heavy to produce well above baseline solar: baseline={:.1}, solar_heavy={:.1}",
        baseline.solar_kwh,
        solar_heavy.solar_kwh
    );

    assert!(
        solar_heavy.fuel_liters < baseline.fuel_liters,
        "expected solar_heavy to burn less fuel: baseline={:.1}, solar_heavy={:.1}",
        baseline.fuel_liters,
        solar_heavy.fuel_liters
    );

    // A week of elevated demand dwarfs a single baseline day.
    assert!(
        night_shift.fuel_liters > baseline.fuel_liters * 3.0,
        "expected night_shift week to burn far more fuel: baseline={:.1}, night_shift={:.1}",
        baseline.fuel_liters,
        night_shift.fuel_liters
    );
}

#[test]
fn unknown_preset_fails_with_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(["--preset", "nonexistent"])
        .output()
        .expect("microgrid-sim process should run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown preset"), "stderr: {stderr}");
}

fn run_and_parse_totals(path: &str) -> Totals {
    let output = Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(["--scenario", path])
        .output()
        .expect("microgrid-sim process should run");

    assert!(
        output.status.success(),
        "scenario run failed for {path}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8(output.stdout).expect("stdout should be valid UTF-8");
    Totals {
        fuel_liters: parse_metric(&stdout, "Fuel burned:", "L"),
        solar_kwh: parse_metric(&stdout, "Solar production:", "kWh"),
    }
}

fn parse_metric(stdout: &str, label: &str, unit: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing report line `{label}` in output: {stdout}"));

    let raw = line
        .split_once(':')
        .map(|(_, right)| right.trim())
        .unwrap_or_else(|| panic!("invalid report format for line `{line}`"));

    let numeric = raw.strip_suffix(unit).unwrap_or(raw).trim();
    numeric
        .parse::<f64>()
        .unwrap_or_else(|_| panic!("failed parsing `{numeric}` from report line `{line}`"))
}
