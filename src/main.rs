//! Battery-swap station network simulator — CLI entry point.

use std::path::Path;
use std::process;

use swap_sim::config::ScenarioConfig;
use swap_sim::io::export::{export_events_csv, export_station_kpis_csv};
use swap_sim::orchestrator::{compare, run};

struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    events_out: Option<String>,
    kpis_out: Option<String>,
    compare_path: Option<String>,
}

fn print_help() {
    eprintln!("swap-sim — battery-swap station network simulator");
    eprintln!();
    eprintln!("Usage: swap-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>     Load scenario from a TOML config file");
    eprintln!("  --preset <name>       Use a built-in preset (baseline, high_demand)");
    eprintln!("  --seed <u64>          Override the random seed");
    eprintln!("  --events-out <path>   Export the event trace to CSV");
    eprintln!("  --kpis-out <path>     Export per-station KPIs to CSV");
    eprintln!("  --compare <path>      Also run this scenario file and report deltas");
    eprintln!("  --help                Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        events_out: None,
        kpis_out: None,
        compare_path: None,
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
                cli.scenario_path = Some(require_value(&args, i, "--scenario"));
            }
            "--preset" => {
                i += 1;
                cli.preset = Some(require_value(&args, i, "--preset"));
            }
            "--seed" => {
                i += 1;
                let raw = require_value(&args, i, "--seed");
                cli.seed_override = Some(raw.parse::<u64>().unwrap_or_else(|_| {
                    eprintln!("error: --seed value \"{raw}\" is not a valid u64");
                    process::exit(1);
                }));
            }
            "--events-out" => {
                i += 1;
                cli.events_out = Some(require_value(&args, i, "--events-out"));
            }
            "--kpis-out" => {
                i += 1;
                cli.kpis_out = Some(require_value(&args, i, "--kpis-out"));
            }
            "--compare" => {
                i += 1;
                cli.compare_path = Some(require_value(&args, i, "--compare"));
            }
            other => {
                eprintln!("error: unrecognized argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }
    cli
}

fn require_value(args: &[String], index: usize, flag: &str) -> String {
    match args.get(index) {
        Some(v) => v.clone(),
        None => {
            eprintln!("error: {flag} requires a value");
            process::exit(1);
        }
    }
}

fn load_scenario(scenario_path: &Option<String>, preset: &Option<String>) -> ScenarioConfig {
    match (scenario_path, preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("error: failed to load scenario from {path}: {e}");
            process::exit(1);
        }),
        (None, Some(name)) => ScenarioConfig::from_preset(name).unwrap_or_else(|| {
            eprintln!(
                "error: unknown preset \"{name}\" (available: {})",
                ScenarioConfig::PRESETS.join(", ")
            );
            process::exit(1);
        }),
        (None, None) => ScenarioConfig::baseline(),
    }
}

fn main() {
    let cli = parse_args();
    let mut config = load_scenario(&cli.scenario_path, &cli.preset);
    if let Some(seed) = cli.seed_override {
        config.simulation.seed = seed;
    }

    let result = run(&config).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    println!("{}", result.city);

    if let Some(path) = &cli.events_out {
        if let Err(e) = export_events_csv(&result.events, Path::new(path)) {
            eprintln!("error: failed to write events to {path}: {e}");
            process::exit(1);
        }
        println!("wrote {} events to {path}", result.events.len());
    }

    if let Some(path) = &cli.kpis_out {
        if let Err(e) = export_station_kpis_csv(&result.station_kpis, Path::new(path)) {
            eprintln!("error: failed to write KPIs to {path}: {e}");
            process::exit(1);
        }
        println!("wrote {} station KPI rows to {path}", result.station_kpis.len());
    }

    if let Some(path) = &cli.compare_path {
        let scenario_config = ScenarioConfig::from_toml_file(Path::new(path)).unwrap_or_else(|e| {
            eprintln!("error: failed to load comparison scenario from {path}: {e}");
            process::exit(1);
        });
        let (_, scenario_result, comparison) =
            compare(&config, &scenario_config).unwrap_or_else(|e| {
                eprintln!("error: {e}");
                process::exit(1);
            });
        println!("\n--- comparison vs {path} ---");
        println!("{}", scenario_result.city);
        println!(
            "wait_time_delta_pct={:.2} throughput_delta_pct={:.2} utilization_delta_pct={:.2} lost_swaps_delta={} opex_delta={:.2}",
            comparison.wait_time_delta_pct,
            comparison.throughput_delta_pct,
            comparison.utilization_delta_pct,
            comparison.lost_swaps_delta,
            comparison.opex_delta,
        );
    }
}
