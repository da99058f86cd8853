//! bode - fit and simulate filter Bode measurements

use anyhow::{Context, Result};
use bode_core::frequency::{FrequencySweep, FrequencyUnit, SweepType};
use bode_core::{BodeDataset, FilterKind, Simulator};
use clap::Parser;
use log::{info, warn};

mod cli;
mod report;

use cli::{Cli, Command, FitArgs, SimulateArgs};
use report::FitReport;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Fit(args) => {
            let report = run_fit(&args)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
        }
        Command::Simulate(args) => run_simulate(&args)?,
    }
    Ok(())
}

fn run_fit(args: &FitArgs) -> Result<FitReport> {
    let kind: FilterKind = args.system.into();
    let (mut dataset, ingest) = BodeDataset::from_file(kind, &args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    info!(
        "read {} points from {}",
        ingest.accepted(),
        args.file.display()
    );

    if let Some(label) = &args.label {
        dataset.set_label(label.as_str());
    }
    if let (Some(gain), Some(cutoff)) = (args.gain, args.cutoff) {
        dataset.set_gain_params(gain, cutoff, args.q)?;
    }

    let gain_fit = dataset
        .fit_gain(args.min, args.max)
        .context("gain fit failed")?;

    let phase_fit = if args.phase && !kind.has_phase() {
        warn!("--phase ignored: the {} model has no phase response", kind);
        None
    } else if args.phase {
        // start the phase fit from the fitted gain parameters
        let p = &gain_fit.params;
        dataset.set_phase_params(p[0], p[1], p.get(2).copied())?;
        Some(
            dataset
                .fit_phase(args.min, args.max)
                .context("phase fit failed")?,
        )
    } else {
        None
    };

    Ok(FitReport::new(&dataset, &ingest, &gain_fit, phase_fit.as_ref()))
}

fn run_simulate(args: &SimulateArgs) -> Result<()> {
    let sweep_type = if args.log {
        SweepType::Log
    } else {
        SweepType::Linear
    };
    let sweep = FrequencySweep::new(args.start, args.stop, args.points, FrequencyUnit::Hz, sweep_type);

    let mut sim = Simulator::new(args.seed);
    sim.set_kind(args.system.into());
    sim.set_cutoff(args.cutoff);
    sim.set_gain(args.gain);
    if let Some(q) = args.q {
        sim.set_q(q);
    }
    sim.set_noise(args.noise.into());
    sim.set_amplitude(args.amplitude)?;

    sim.write_records(&args.output, sweep.f())
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    println!("{}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_then_fit() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("sim.txt");
        let output_arg = output.to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "bode", "simulate", "-s", "bandpass", "--cutoff", "1000", "--gain", "1.5", "--q", "2",
            "--start", "100", "--stop", "10000", "--points", "30", "--log", "-o", &output_arg,
        ])
        .unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate subcommand");
        };
        run_simulate(&args).unwrap();

        let cli = Cli::try_parse_from(["bode", "fit", "-s", "bandpass", &output_arg, "--phase"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        let report = run_fit(&args).unwrap();
        assert_eq!(report.points, 30);
        let published = report.published.unwrap();
        assert!((published.cutoff.value - 1000.0).abs() < 1e-3);
        assert!((published.q.unwrap().value - 2.0).abs() < 1e-6);
        assert!(report.phase_fit.is_some());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["system"], "bandpass");
        assert_eq!(json["gain_fit"]["params"][1]["name"], "peak");
    }

    #[test]
    fn test_phase_flag_on_lowpass_keeps_gain_fit() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("lowpass.txt");
        let output_arg = output.to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "bode", "simulate", "-s", "lowpass", "--cutoff", "1000", "--gain", "2", "--start", "10",
            "--stop", "10000", "--points", "20", "--log", "-o", &output_arg,
        ])
        .unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate subcommand");
        };
        run_simulate(&args).unwrap();

        let cli = Cli::try_parse_from(["bode", "fit", "-s", "lowpass", &output_arg, "--phase"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        let report = run_fit(&args).unwrap();
        assert!(report.phase_fit.is_none());
        assert!((report.published.unwrap().cutoff.value - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn test_fit_missing_file() {
        let cli = Cli::try_parse_from(["bode", "fit", "-s", "lowpass", "/nonexistent/bode.txt"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        assert!(run_fit(&args).is_err());
    }
}
