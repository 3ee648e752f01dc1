//! # Metrics Engine
//!
//! Aggregate statistics derived from a snapshot of sale records.
//!
//! Everything here is a free function over `&[SaleRecord]` (or any iterator of
//! borrowed records). Nothing mutates the ledger.
//!
//! ```text
//! records ──┬── totals ───────────────────► Totals
//! │         ├── filter_by_date_range ─► totals   (metrics_by_period)
//! │         ├── filter_by_agent ──────► totals   (metrics_by_agent)
//! │         ├── top_agents(limit) ────────► Vec<AgentStats>
//! │         └── monthly_breakdown ────────► Vec<MonthlyStats>
//! │
//! └── summary_report = totals + top 3 agents + months + timestamp
//! ```

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::SaleRecord;

/// Agents listed by [`top_agents`] when no limit is given.
pub const DEFAULT_TOP_AGENTS: usize = 5;

/// Agents included in a [`SummaryReport`].
pub const REPORT_TOP_AGENTS: usize = 3;

// =============================================================================
// Result Types
// =============================================================================

/// Sums over a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Totals {
    #[ts(type = "number")]
    pub total_amount: Money,
    /// Half-up to the cent; zero for an empty set.
    #[ts(type = "number")]
    pub average_amount: Money,
    #[ts(type = "number")]
    pub total_commission: Money,
    pub count: usize,
}

/// Totals for a single registering agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AgentStats {
    pub agent: String,
    #[ts(type = "number")]
    pub total_amount: Money,
    pub count: usize,
    #[ts(type = "number")]
    pub total_commission: Money,
}

/// Totals for one calendar month of sale dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MonthlyStats {
    /// `YYYY-MM`
    pub month: String,
    #[ts(type = "number")]
    pub total_amount: Money,
    pub count: usize,
    #[ts(type = "number")]
    pub total_commission: Money,
}

/// The dashboard report document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SummaryReport {
    pub summary: Totals,
    pub top_agents: Vec<AgentStats>,
    pub monthly: Vec<MonthlyStats>,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
}

// =============================================================================
// Totals
// =============================================================================

/// Total amount, total commission, count and average amount.
///
/// ## Example
/// ```rust
/// use reserva_core::metrics::totals;
/// use reserva_core::types::SaleRecord;
///
/// let empty: &[SaleRecord] = &[];
/// let t = totals(empty);
/// assert_eq!(t.count, 0);
/// assert!(t.average_amount.is_zero());
/// ```
pub fn totals<I>(records: I) -> Totals
where
    I: IntoIterator,
    I::Item: Borrow<SaleRecord>,
{
    let mut total_amount = Money::zero();
    let mut total_commission = Money::zero();
    let mut count = 0;

    for record in records {
        let record = record.borrow();
        total_amount += record.total_amount;
        total_commission += record.commission;
        count += 1;
    }

    Totals {
        total_amount,
        average_amount: total_amount.average_over(count),
        total_commission,
        count,
    }
}

/// Records whose sale date falls within `[start, end]`, inclusive.
pub fn filter_by_date_range(
    records: &[SaleRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<&SaleRecord> {
    records
        .iter()
        .filter(|r| r.sale_date >= start && r.sale_date <= end)
        .collect()
}

/// Records registered by `agent`, compared case-insensitively.
pub fn filter_by_agent<'a>(records: &'a [SaleRecord], agent: &str) -> Vec<&'a SaleRecord> {
    let wanted = agent.to_lowercase();
    records
        .iter()
        .filter(|r| r.registering_agent.to_lowercase() == wanted)
        .collect()
}

/// [`totals`] over the sales dated within `[start, end]`.
pub fn metrics_by_period(records: &[SaleRecord], start: NaiveDate, end: NaiveDate) -> Totals {
    totals(filter_by_date_range(records, start, end))
}

/// [`totals`] over one agent's sales.
pub fn metrics_by_agent(records: &[SaleRecord], agent: &str) -> Totals {
    totals(filter_by_agent(records, agent))
}

// =============================================================================
// Rollups
// =============================================================================

/// Agents ranked by total sold, highest first.
///
/// Grouping uses the agent name exactly as stored. Agents with equal totals
/// keep the order in which they first appear.
pub fn top_agents(records: &[SaleRecord], limit: usize) -> Vec<AgentStats> {
    let mut stats: Vec<AgentStats> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let slot = *index
            .entry(record.registering_agent.as_str())
            .or_insert_with(|| {
                stats.push(AgentStats {
                    agent: record.registering_agent.clone(),
                    total_amount: Money::zero(),
                    count: 0,
                    total_commission: Money::zero(),
                });
                stats.len() - 1
            });

        let entry = &mut stats[slot];
        entry.total_amount += record.total_amount;
        entry.total_commission += record.commission;
        entry.count += 1;
    }

    // sort_by is stable
    stats.sort_by(|a, b| b.total_amount.cmp(&a.total_amount));
    stats.truncate(limit);
    stats
}

/// Per-month totals keyed by the sale date's `YYYY-MM`, oldest first.
pub fn monthly_breakdown(records: &[SaleRecord]) -> Vec<MonthlyStats> {
    let mut months: BTreeMap<(i32, u32), MonthlyStats> = BTreeMap::new();

    for record in records {
        let (year, month) = (record.sale_date.year(), record.sale_date.month());
        let entry = months.entry((year, month)).or_insert_with(|| MonthlyStats {
            month: format!("{year:04}-{month:02}"),
            total_amount: Money::zero(),
            count: 0,
            total_commission: Money::zero(),
        });
        entry.total_amount += record.total_amount;
        entry.total_commission += record.commission;
        entry.count += 1;
    }

    months.into_values().collect()
}

// =============================================================================
// Report
// =============================================================================

/// Builds the dashboard report stamped with the current time.
pub fn summary_report(records: &[SaleRecord]) -> SummaryReport {
    summary_report_at(records, Utc::now())
}

/// Builds the dashboard report with an explicit generation time.
pub fn summary_report_at(records: &[SaleRecord], generated_at: DateTime<Utc>) -> SummaryReport {
    SummaryReport {
        summary: totals(records),
        top_agents: top_agents(records, REPORT_TOP_AGENTS),
        monthly: monthly_breakdown(records),
        generated_at,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
