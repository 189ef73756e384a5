//! Result tables: flat rows for plotting tools, TSV and JSON export.
//!
//! Nothing here computes statistics; every number comes from a
//! [`TestResult`], a [`MotifCount`] or a [`NullModel`].
//!
//! ```text
//! motif  pathway  observed  tested  expected  p_value    method  significance
//! con    ii       4         120     1.9200    1.234e-1   exact   n.s.
//! ```

use std::io::Write;

use serde::Serialize;

use crate::model::Pathway;
use crate::motif::{CensusMode, MotifCount};
use crate::stats::binomial::normal_interval;
use crate::stats::{NullModel, Outcome, TestResult};
use crate::Result;

/// Two-tailed 95% interval.
const CI_QUANTILE: f64 = 0.975;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub motif: String,
    pub pathway: String,
    pub observed: u64,
    pub tested: u64,
    pub expected: Option<f64>,
    pub p_value: Option<f64>,
    pub method: Option<String>,
    pub significance: &'static str,
}

/// Significance marker of one result.
pub fn marker(result: &TestResult) -> &'static str {
    match result.outcome {
        Outcome::Undefined { .. } => "undefined",
        Outcome::Tested { reject: false, .. } => "n.s.",
        Outcome::Tested { p_value, .. } if p_value < 0.001 => "***",
        Outcome::Tested { p_value, .. } if p_value < 0.01 => "**",
        Outcome::Tested { .. } => "*",
    }
}

pub fn rows(results: &[TestResult]) -> Vec<ReportRow> {
    results
        .iter()
        .map(|r| ReportRow {
            motif: r.motif.name().to_string(),
            pathway: r.pathway.short_name().to_string(),
            observed: r.observed,
            tested: r.trials,
            expected: r.expected,
            p_value: r.p_value(),
            method: r.method().map(|m| m.name().to_string()),
            significance: marker(r),
        })
        .collect()
}

/// Write results as tab-separated values with a header line. Missing
/// values are written as `NA`.
pub fn write_tsv(results: &[TestResult], writer: &mut dyn Write) -> Result<()> {
    writeln!(writer, "motif\tpathway\tobserved\ttested\texpected\tp_value\tmethod\tsignificance")?;
    for row in rows(results) {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            row.motif,
            row.pathway,
            row.observed,
            row.tested,
            row.expected.map_or_else(|| "NA".to_string(), |e| format!("{e:.4}")),
            row.p_value.map_or_else(|| "NA".to_string(), |p| format!("{p:.3e}")),
            row.method.as_deref().unwrap_or("NA"),
            row.significance,
        )?;
    }
    Ok(())
}

pub fn to_json(results: &[TestResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&rows(results))?)
}

// ============================================================================
// Census and probability tables
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CensusRow {
    pub pathway: String,
    pub class: &'static str,
    pub count: u64,
}

/// Pair census per pathway, in pathway order.
pub fn census_rows(count: &MotifCount, mode: CensusMode) -> Vec<CensusRow> {
    let mut out = Vec::new();
    for pathway in Pathway::ALL {
        let census = count.census(pathway);
        if census.total() == 0 {
            continue;
        }
        for (class, n) in census.entries(mode) {
            out.push(CensusRow {
                pathway: pathway.short_name().to_string(),
                class,
                count: n,
            });
        }
    }
    out
}

/// Connection probability of one channel in one pathway.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityRow {
    pub edge_type: &'static str,
    pub pathway: String,
    pub found: u64,
    pub tested: u64,
    pub probability: Option<f64>,
    /// Half-width of the 95% normal-approximation interval.
    pub ci_half_width: Option<f64>,
}

pub fn probability_rows(null: &NullModel) -> Vec<ProbabilityRow> {
    null.estimates()
        .into_iter()
        .map(|(edge_type, pathway, est)| {
            let probability = est.probability();
            ProbabilityRow {
                edge_type: edge_type.name(),
                pathway: pathway.short_name().to_string(),
                found: est.found,
                tested: est.tested,
                probability,
                ci_half_width: probability
                    .and_then(|p| normal_interval(est.tested, p, CI_QUANTILE).ok()),
            }
        })
        .collect()
}
