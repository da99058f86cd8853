//! Command-line arguments

use std::path::PathBuf;

use bode_core::constants::DEFAULT_SIMULATION_FILE;
use bode_core::{FilterKind, NoiseLevel};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Bode analysis of filter measurements
#[derive(Parser, Debug)]
#[command(name = "bode", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fit a filter model to a measurement file
    Fit(FitArgs),
    /// Write a simulated measurement file
    Simulate(SimulateArgs),
}

/// Filter model
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SystemArg {
    Lowpass,
    Highpass,
    Bandpass,
}

impl From<SystemArg> for FilterKind {
    fn from(arg: SystemArg) -> Self {
        match arg {
            SystemArg::Lowpass => FilterKind::Lowpass,
            SystemArg::Highpass => FilterKind::Highpass,
            SystemArg::Bandpass => FilterKind::Bandpass,
        }
    }
}

/// Noise added to simulated readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NoiseArg {
    None,
    Low,
    High,
}

impl From<NoiseArg> for NoiseLevel {
    fn from(arg: NoiseArg) -> Self {
        match arg {
            NoiseArg::None => NoiseLevel::None,
            NoiseArg::Low => NoiseLevel::Low,
            NoiseArg::High => NoiseLevel::High,
        }
    }
}

#[derive(Args, Debug)]
pub struct FitArgs {
    /// Filter model to fit
    #[arg(short, long, value_enum)]
    pub system: SystemArg,

    /// Eight-column measurement file
    pub file: PathBuf,

    /// Lower bound of the fit range (Hz)
    #[arg(long)]
    pub min: Option<f64>,

    /// Upper bound of the fit range (Hz)
    #[arg(long)]
    pub max: Option<f64>,

    /// Initial gain
    #[arg(long, requires = "cutoff")]
    pub gain: Option<f64>,

    /// Initial cutoff or peak frequency (Hz)
    #[arg(long, requires = "gain")]
    pub cutoff: Option<f64>,

    /// Initial quality factor (bandpass)
    #[arg(long)]
    pub q: Option<f64>,

    /// Also fit the phase response (bandpass only)
    #[arg(long)]
    pub phase: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Label stored with the dataset
    #[arg(long)]
    pub label: Option<String>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Filter model to simulate
    #[arg(short, long, value_enum)]
    pub system: SystemArg,

    /// Cutoff or peak frequency (Hz)
    #[arg(long)]
    pub cutoff: f64,

    /// Gain at the passband
    #[arg(long)]
    pub gain: f64,

    /// Quality factor (required for bandpass)
    #[arg(long)]
    pub q: Option<f64>,

    /// Random seed for the noise
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    #[arg(long, value_enum, default_value_t = NoiseArg::None)]
    pub noise: NoiseArg,

    /// Peak input voltage
    #[arg(long, default_value_t = 1.0)]
    pub amplitude: f64,

    /// First frequency of the sweep (Hz)
    #[arg(long, default_value_t = 10.0)]
    pub start: f64,

    /// Last frequency of the sweep (Hz)
    #[arg(long, default_value_t = 100000.0)]
    pub stop: f64,

    /// Number of sweep points
    #[arg(long, default_value_t = 50)]
    pub points: usize,

    /// Logarithmic instead of linear spacing
    #[arg(long)]
    pub log: bool,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_SIMULATION_FILE)]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fit() {
        let cli = Cli::try_parse_from([
            "bode", "fit", "--system", "bandpass", "data.txt", "--min", "100", "--gain", "1", "--cutoff",
            "1590", "--q", "3", "--phase", "--json",
        ])
        .unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit subcommand");
        };
        assert_eq!(FilterKind::from(args.system), FilterKind::Bandpass);
        assert_eq!(args.file, PathBuf::from("data.txt"));
        assert_eq!(args.min, Some(100.0));
        assert_eq!(args.max, None);
        assert_eq!(args.q, Some(3.0));
        assert!(args.phase && args.json);
    }

    #[test]
    fn test_gain_requires_cutoff() {
        assert!(Cli::try_parse_from(["bode", "fit", "-s", "lowpass", "d.txt", "--gain", "2"]).is_err());
        assert!(Cli::try_parse_from(["bode", "fit", "-s", "notch", "d.txt"]).is_err());
    }

    #[test]
    fn test_parse_simulate_defaults() {
        let cli = Cli::try_parse_from([
            "bode", "simulate", "-s", "lowpass", "--cutoff", "1000", "--gain", "2",
        ])
        .unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate subcommand");
        };
        assert_eq!(args.output, PathBuf::from(DEFAULT_SIMULATION_FILE));
        assert_eq!(NoiseLevel::from(args.noise), NoiseLevel::None);
        assert_eq!(args.points, 50);
        assert!(!args.log);
    }
}
