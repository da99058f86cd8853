//! Fit report printed by `bode fit`

use std::fmt;

use bode_core::{BodeDataset, FilterKind, FitResult, GainSummary, IngestReport};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct NamedParam {
    pub name: &'static str,
    pub value: f64,
    pub error: f64,
}

#[derive(Debug, Serialize)]
pub struct FitSummary {
    pub params: Vec<NamedParam>,
    pub chi2: f64,
    pub ndf: usize,
    pub reduced_chi2: f64,
    pub iterations: usize,
    pub n_points: usize,
}

impl FitSummary {
    fn new(kind: FilterKind, fit: &FitResult) -> Self {
        let params = kind
            .param_names()
            .iter()
            .zip(fit.params.iter().zip(fit.errors.iter()))
            .map(|(&name, (&value, &error))| NamedParam { name, value, error })
            .collect();
        Self {
            params,
            chi2: fit.chi2,
            ndf: fit.ndf,
            reduced_chi2: fit.reduced_chi2(),
            iterations: fit.iterations,
            n_points: fit.n_points,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RejectedEntry {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct FitReport {
    pub system: FilterKind,
    pub label: String,
    pub records_read: usize,
    pub points: usize,
    pub rejected: Vec<RejectedEntry>,
    pub gain_fit: FitSummary,
    pub published: Option<GainSummary>,
    pub phase_fit: Option<FitSummary>,
}

impl FitReport {
    pub fn new(
        dataset: &BodeDataset,
        ingest: &IngestReport,
        gain_fit: &FitResult,
        phase_fit: Option<&FitResult>,
    ) -> Self {
        let kind = dataset.kind();
        Self {
            system: kind,
            label: dataset.label().to_string(),
            records_read: ingest.records_read,
            points: ingest.accepted(),
            rejected: ingest
                .rejected
                .iter()
                .map(|r| RejectedEntry {
                    index: r.index,
                    reason: r.error.to_string(),
                })
                .collect(),
            gain_fit: FitSummary::new(kind, gain_fit),
            published: dataset.gain_summary().copied(),
            phase_fit: phase_fit.map(|fit| FitSummary::new(kind, fit)),
        }
    }
}

fn write_fit(f: &mut fmt::Formatter<'_>, title: &str, fit: &FitSummary) -> fmt::Result {
    writeln!(
        f,
        "{} fit: chi2/ndf = {:.4}/{} ({} points, {} iterations)",
        title, fit.chi2, fit.ndf, fit.n_points, fit.iterations
    )?;
    for p in &fit.params {
        writeln!(f, "  {:<8} = {:.6e} +/- {:.3e}", p.name, p.value, p.error)?;
    }
    Ok(())
}

impl fmt::Display for FitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] {} model", self.label, self.system)?;
        writeln!(
            f,
            "records: {} read, {} used, {} rejected",
            self.records_read,
            self.points,
            self.rejected.len()
        )?;
        for r in &self.rejected {
            writeln!(f, "  record {}: {}", r.index, r.reason)?;
        }

        write_fit(f, "gain", &self.gain_fit)?;
        if let Some(s) = &self.published {
            writeln!(f, "cutoff   = {:.6e} +/- {:.3e} Hz", s.cutoff.value, s.cutoff.error)?;
            writeln!(f, "gain     = {:.6e} +/- {:.3e}", s.gain.value, s.gain.error)?;
            writeln!(
                f,
                "GBW      = {:.6e} +/- {:.3e} Hz",
                s.gain_bandwidth.value, s.gain_bandwidth.error
            )?;
            if let Some(q) = s.q {
                writeln!(f, "Q        = {:.6e} +/- {:.3e}", q.value, q.error)?;
            }
            if let Some(bw) = s.bandwidth {
                writeln!(f, "BW       = {:.6e} +/- {:.3e} Hz", bw.value, bw.error)?;
            }
        }

        if let Some(phase) = &self.phase_fit {
            write_fit(f, "phase", phase)?;
        }
        Ok(())
    }
}
