//! Microgrid simulator entry point — CLI wiring and scenario-driven runs.

use std::path::Path;
use std::process;

use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::io::export::export_csv;
use microgrid_sim::runner::{RunReport, Runner};

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    hours_override: Option<u32>,
    telemetry_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("microgrid-sim — diesel/solar microgrid optimization simulator");
    eprintln!();
    eprintln!("Usage: microgrid-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, solar_heavy, night_shift)");
    eprintln!("  --seed <u64>             Override profile seed");
    eprintln!("  --hours <u32>            Override simulated hours");
    eprintln!("  --telemetry-out <path>   Export hour records to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server after the run");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        hours_override: None,
        telemetry_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--hours" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --hours requires a u32 argument");
                    process::exit(1);
                }
                if let Ok(h) = args[i].parse::<u32>() {
                    cli.hours_override = Some(h);
                } else {
                    eprintln!("error: --hours value \"{}\" is not a valid u32", args[i]);
                    process::exit(1);
                }
            }
            "--telemetry-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --telemetry-out requires a path argument");
                    process::exit(1);
                }
                cli.telemetry_out = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then baseline default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // Apply overrides
    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = seed;
    }
    if let Some(hours) = cli.hours_override {
        scenario.simulation.hours = hours;
    }

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Build and run
    let mut runner = Runner::new(&scenario);
    let records = runner.run(scenario.simulation.hours);
    let report = RunReport::from_records(
        &records,
        runner.avg_engine_efficiency(),
        scenario.fuel.price_per_liter,
    );

    // Print hourly records and the summary
    for r in &records {
        println!("{r}");
    }
    println!("\n{report}");

    // Export CSV if requested
    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&records, Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Telemetry written to {path}");
    }

    // Start API server if requested
    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(microgrid_sim::api::AppState::new(
            runner.into_store(),
            scenario.fuel.price_per_liter,
        ));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(microgrid_sim::api::serve(state, addr));
    }
}
