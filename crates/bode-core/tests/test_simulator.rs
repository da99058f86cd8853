//! Simulator output read back through the dataset

use approx::assert_relative_eq;
use bode_core::constants::DEFAULT_SIMULATION_FILE;
use bode_core::frequency::{FrequencySweep, FrequencyUnit, SweepType};
use bode_core::records::read_records;
use bode_core::{BodeDataset, FilterKind, NoiseLevel, Simulator};

fn bandpass(seed: u64, noise: NoiseLevel) -> Simulator {
    let mut sim = Simulator::new(seed);
    sim.set_filter_type("bandpass").unwrap();
    sim.set_gain(1.0);
    sim.set_cutoff(10.0);
    sim.set_q(5.0);
    sim.set_noise(noise);
    sim
}

#[test]
fn test_written_file_round_trips_through_fit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_SIMULATION_FILE);
    let sweep = FrequencySweep::new(1.0, 100.0, 30, FrequencyUnit::KHz, SweepType::Log);
    let freqs: Vec<f64> = sweep.f().iter().map(|f| f / 1e3).collect();

    let written = bandpass(3, NoiseLevel::None).write_records(&path, &freqs).unwrap();
    assert_eq!(read_records(&path).unwrap(), written);

    let (mut ds, report) = BodeDataset::from_file(FilterKind::Bandpass, &path).unwrap();
    assert_eq!(report.accepted(), 30);
    ds.fit_gain(None, None).unwrap();
    assert_relative_eq!(ds.cutoff().unwrap().value, 10.0, max_relative = 1e-6);
    assert_relative_eq!(ds.quality_factor().unwrap().value, 5.0, max_relative = 1e-6);
    assert_relative_eq!(ds.bandwidth().unwrap().value, 2.0, max_relative = 1e-6);
}

#[test]
fn test_same_seed_same_noise() {
    let freqs = [2.0, 5.0, 10.0, 20.0, 50.0];
    let a = bandpass(42, NoiseLevel::High).generate(&freqs).unwrap();
    let b = bandpass(42, NoiseLevel::High).generate(&freqs).unwrap();
    let c = bandpass(43, NoiseLevel::High).generate(&freqs).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_noisy_fit_stays_near_truth() {
    let sweep = FrequencySweep::new(1.0, 100.0, 40, FrequencyUnit::Hz, SweepType::Log);
    let points = bandpass(5, NoiseLevel::Low).generate(sweep.f()).unwrap();

    let set: bode_core::dataset::SeriesSet = points.into_iter().collect();
    let mut ds = BodeDataset::new(FilterKind::Bandpass);
    ds.set_frequency_series(set.frequency.values, set.frequency.errors).unwrap();
    ds.set_phase_series(set.phase.values, set.phase.errors).unwrap();
    ds.set_gain_series(set.gain.values, set.gain.errors).unwrap();
    ds.set_functions().unwrap();

    ds.fit_gain(None, None).unwrap();
    assert_relative_eq!(ds.cutoff().unwrap().value, 10.0, max_relative = 0.05);
    let phase = ds.fit_phase(None, None).unwrap();
    assert_relative_eq!(phase.params[1], 10.0, max_relative = 0.05);
}

#[test]
fn test_lowpass_records_have_no_time_shift() {
    let mut sim = Simulator::new(0);
    sim.set_filter_type("lowpass").unwrap();
    sim.set_gain(3.0);
    sim.set_cutoff(50.0);
    let records = sim.generate_records(&[5.0, 50.0, 500.0]).unwrap();
    assert!(records.iter().all(|r| r.time_shift == 0.0));
    assert_relative_eq!(records[1].vout / records[1].vin, 3.0 / 2f64.sqrt(), max_relative = 1e-12);
}
