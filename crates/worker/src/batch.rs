use anyhow::Context;
use chrono::{DateTime, Utc};
use fundwise_core::{AdvisoryReport, Advisor, FundUniverse, ProfileInput};
use serde_json::Value;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub profiles: usize,
    pub unreadable: usize,
    pub fallbacks: usize,
    pub warnings: usize,
}

/// Read a JSON array of profile records. Records are kept as raw JSON so that
/// one malformed record cannot fail the whole file.
pub fn load_profiles(path: &Path) -> anyhow::Result<Vec<Value>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read profiles {} failed", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("profiles {} is not a valid JSON array", path.display()))
}

/// Advise every record against the same universe. A record that is not a
/// profile object, or a profile that cannot be scored, yields a fallback
/// report and never stops the batch.
pub fn run_batch(
    advisor: &Advisor,
    records: &[Value],
    universe: &FundUniverse,
    generated_at: DateTime<Utc>,
) -> (Vec<AdvisoryReport>, BatchSummary) {
    let mut summary = BatchSummary {
        profiles: records.len(),
        ..BatchSummary::default()
    };

    let reports = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let report = match serde_json::from_value::<ProfileInput>(record.clone()) {
                Ok(profile) => advisor.advise(&profile, universe, generated_at),
                Err(e) => {
                    summary.unreadable += 1;
                    advisor.advise_unreadable(
                        format!("profile record {index} is unreadable: {e}"),
                        universe,
                        generated_at,
                    )
                }
            };
            summary.warnings += report.warnings.len();
            if let Some(error) = &report.error {
                summary.fallbacks += 1;
                tracing::error!(index, error = %error, "profile used conservative fallback");
            }
            report
        })
        .collect();

    (reports, summary)
}

/// Pretty JSON array to `output`, or stdout when none is given.
pub fn write_reports(reports: &[AdvisoryReport], output: Option<&Path>) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(reports).context("serialize reports failed")?;
    match output {
        Some(path) => std::fs::write(path, body)
            .with_context(|| format!("write reports to {} failed", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{body}").context("write reports to stdout failed")
        }
    }
}
