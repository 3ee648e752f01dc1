//! # Dashboard Commands
//!
//! Metrics over the current ledger snapshot, and the report export.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, info};

use reserva_core::metrics::{self, AgentStats, MonthlyStats, SummaryReport, Totals};

use crate::commands::write_json_file;
use crate::error::ApiError;
use crate::state::{ConfigState, LedgerState};

/// Headline totals over every sale.
pub fn dashboard_totals(ledger: &LedgerState) -> Totals {
    debug!("dashboard_totals command");
    ledger.with_ledger(|l| metrics::totals(l.list()))
}

/// Totals for sales dated within `[start, end]`.
pub fn period_totals(
    ledger: &LedgerState,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Totals, ApiError> {
    debug!(%start, %end, "period_totals command");

    if start > end {
        return Err(ApiError::validation(format!(
            "Start date {} is after end date {}",
            start, end
        )));
    }
    Ok(ledger.with_ledger(|l| metrics::metrics_by_period(l.list(), start, end)))
}

/// Totals for one registering agent (case-insensitive).
pub fn agent_totals(ledger: &LedgerState, agent: &str) -> Totals {
    debug!(%agent, "agent_totals command");
    ledger.with_ledger(|l| metrics::metrics_by_agent(l.list(), agent))
}

/// Agents ranked by amount sold.
pub fn top_agents(ledger: &LedgerState, limit: usize) -> Vec<AgentStats> {
    debug!(limit, "top_agents command");
    ledger.with_ledger(|l| metrics::top_agents(l.list(), limit))
}

/// Per-month totals, oldest first.
pub fn monthly_breakdown(ledger: &LedgerState) -> Vec<MonthlyStats> {
    debug!("monthly_breakdown command");
    ledger.with_ledger(|l| metrics::monthly_breakdown(l.list()))
}

/// The dashboard report document.
pub fn summary_report(ledger: &LedgerState) -> SummaryReport {
    debug!("summary_report command");
    ledger.with_ledger(|l| metrics::summary_report(l.list()))
}

/// Default report file name: `dashboard-report-YYYY-MM-DD.json`.
pub fn report_file_name(date: NaiveDate) -> String {
    format!("dashboard-report-{}.json", date.format("%Y-%m-%d"))
}

/// Writes the summary report as JSON and returns the path written.
///
/// Without `output`, the file goes to the export directory under
/// [`report_file_name`] for the report's generation date.
pub fn export_report(
    ledger: &LedgerState,
    config: &ConfigState,
    output: Option<PathBuf>,
) -> Result<PathBuf, ApiError> {
    let report = summary_report(ledger);
    let path = output.unwrap_or_else(|| {
        config.export_path(&report_file_name(report.generated_at.date_naive()))
    });

    write_json_file(&path, &report)?;

    info!(
        path = %path.display(),
        sales = report.summary.count,
        "Dashboard report exported"
    );
    Ok(path)
}
