//! # Terminal Rendering
//!
//! Turns ledger and metrics data into `comfy-table` tables. Nothing here
//! reads or changes state; callers print the returned tables.

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};

use reserva_core::format::{calculate_percentage, format_date, round_to_decimals};
use reserva_core::{AgentStats, Money, MonthlyStats, SaleRecord, Totals};

use crate::error::ApiError;
use crate::state::ConfigState;

const GREEN: Color = Color::Rgb { r: 4, g: 120, b: 87 };

fn money_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
        .collect()
}

/// The sales table: one row per sale, in the order given.
pub fn sales_table(sales: &[SaleRecord], config: &ConfigState) -> Table {
    let mut table = Table::new();
    table.set_header(header(&[
        "ID",
        "Sale date",
        "Registered",
        "Code",
        "Client",
        "Total",
        "Commission",
        "Agent",
    ]));

    for sale in sales {
        table.add_row(vec![
            Cell::new(sale.id).set_alignment(CellAlignment::Right),
            Cell::new(format_date(sale.sale_date)),
            Cell::new(format_date(sale.registered_date)),
            Cell::new(&sale.reservation_code),
            Cell::new(&sale.client),
            money_cell(config.format_currency(sale.total_amount)),
            money_cell(config.format_currency(sale.commission)).fg(GREEN),
            Cell::new(&sale.registering_agent),
        ]);
    }

    table
}

/// The four dashboard figures.
pub fn totals_table(totals: &Totals, config: &ConfigState) -> Table {
    let mut table = Table::new();
    table.set_header(header(&["Total sales", "Average sale", "Total commission", "Sales"]));
    table.add_row(vec![
        money_cell(config.format_currency(totals.total_amount)).add_attribute(Attribute::Bold),
        money_cell(config.format_currency(totals.average_amount)),
        money_cell(config.format_currency(totals.total_commission)).fg(GREEN),
        Cell::new(totals.count).set_alignment(CellAlignment::Right),
    ]);
    table
}

/// Ranked agents, each with its share of `grand_total`.
pub fn agents_table(agents: &[AgentStats], grand_total: Money, config: &ConfigState) -> Table {
    let mut table = Table::new();
    table.set_header(header(&["#", "Agent", "Total sales", "Share", "Sales", "Commission"]));

    for (rank, agent) in agents.iter().enumerate() {
        let share = calculate_percentage(agent.total_amount.as_major(), grand_total.as_major());
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&agent.agent),
            money_cell(config.format_currency(agent.total_amount)),
            Cell::new(format!("{}%", round_to_decimals(share, 1)))
                .set_alignment(CellAlignment::Right),
            Cell::new(agent.count).set_alignment(CellAlignment::Right),
            money_cell(config.format_currency(agent.total_commission)).fg(GREEN),
        ]);
    }
    table
}

/// Per-month rollup with a bold total row.
pub fn monthly_table(months: &[MonthlyStats], config: &ConfigState) -> Table {
    let mut table = Table::new();
    table.set_header(header(&["Month", "Total sales", "Sales", "Commission"]));

    for month in months {
        table.add_row(vec![
            Cell::new(&month.month),
            money_cell(config.format_currency(month.total_amount)),
            Cell::new(month.count).set_alignment(CellAlignment::Right),
            money_cell(config.format_currency(month.total_commission)),
        ]);
    }

    if !months.is_empty() {
        let total_amount = months.iter().map(|m| m.total_amount).sum();
        let total_commission = months.iter().map(|m| m.total_commission).sum();
        let count: usize = months.iter().map(|m| m.count).sum();
        table.add_row(vec![
            Cell::new("All months").add_attribute(Attribute::Bold),
            money_cell(config.format_currency(total_amount)).add_attribute(Attribute::Bold),
            Cell::new(count)
                .set_alignment(CellAlignment::Right)
                .add_attribute(Attribute::Bold),
            money_cell(config.format_currency(total_commission)).add_attribute(Attribute::Bold),
        ]);
    }
    table
}

/// A two-column key/value table.
pub fn details_table(rows: &[(&str, String)]) -> Table {
    let mut table = Table::new();
    for (key, value) in rows {
        table.add_row(vec![Cell::new(key).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table
}

/// One sale as a key/value table.
pub fn sale_details(sale: &SaleRecord, config: &ConfigState) -> Table {
    details_table(&[
        ("ID", sale.id.to_string()),
        ("Sale date", format_date(sale.sale_date)),
        ("Registered", format_date(sale.registered_date)),
        ("Reservation code", sale.reservation_code.clone()),
        ("Client", sale.client.clone()),
        ("Total", config.format_currency(sale.total_amount)),
        ("Commission", config.format_currency(sale.commission)),
        ("Registering agent", sale.registering_agent.clone()),
    ])
}

/// Error text for the terminal: the message, then one line per field.
pub fn error_lines(err: &ApiError) -> Vec<String> {
    if err.fields.is_empty() {
        return vec![err.message.clone()];
    }
    err.fields
        .iter()
        .map(|f| format!("{}: {}", f.field.label(), f.message))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use reserva_core::{metrics, CoreError, Ledger};

    fn demo() -> Ledger {
        Ledger::with_demo_data(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())
    }

    #[test]
    fn test_sales_table_contents() {
        let config = ConfigState::default();
        let rendered = sales_table(demo().list(), &config).to_string();
        assert!(rendered.contains("RES002"));
        assert!(rendered.contains("$2.200.000"));
        assert!(rendered.contains("$660.000"));
        assert!(rendered.contains("2/6/2024"));
        assert!(rendered.contains("10/6/2024"));
    }

    #[test]
    fn test_totals_table() {
        let config = ConfigState::default();
        let totals = metrics::totals(demo().list());
        let rendered = totals_table(&totals, &config).to_string();
        assert!(rendered.contains("$5.500.000"));
        assert!(rendered.contains("$1.833.333,33"));
    }

    #[test]
    fn test_agents_table_shares() {
        let config = ConfigState::default();
        let ledger = demo();
        let totals = metrics::totals(ledger.list());
        let agents = metrics::top_agents(ledger.list(), 3);
        let rendered = agents_table(&agents, totals.total_amount, &config).to_string();
        assert!(rendered.contains("Share"));
        assert!(rendered.contains("60%"));
        assert!(rendered.contains("40%"));

        let rendered = agents_table(&agents, Money::zero(), &config).to_string();
        assert!(rendered.contains("0%"));
    }

    #[test]
    fn test_monthly_table_total_row() {
        let config = ConfigState::default();
        let months = metrics::monthly_breakdown(demo().list());
        let rendered = monthly_table(&months, &config).to_string();
        assert!(rendered.contains("2024-06"));
        assert!(rendered.contains("All months"));
        assert!(!monthly_table(&[], &config).to_string().contains("All months"));
    }

    #[test]
    fn test_error_lines() {
        let err = ApiError::from(CoreError::SaleNotFound(4));
        assert_eq!(error_lines(&err), vec!["Sale not found: 4".to_string()]);

        let mut ledger = Ledger::new();
        let err: ApiError = ledger
            .create(&reserva_core::SaleInput {
                total_amount: "0".into(),
                ..Default::default()
            })
            .unwrap_err()
            .into();
        let lines = error_lines(&err);
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().any(|l| l.starts_with("Sale total:")));
    }
}
