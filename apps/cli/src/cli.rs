//! # Command Line
//!
//! `clap` definitions and the one-shot command dispatcher.
//!
//! ```text
//! reserva [--config FILE] [--db FILE | --memory] <command>
//!
//!   list [--search TERM] [--json]     show                 add / edit / delete
//!   dashboard [--from --to | --agent]  top-agents [--limit]  monthly
//!   report [--output]  export [--output]  import FILE  info  shell (default)
//! ```
//!
//! Every command runs inside a [`Shell`], so stored data is loaded first and
//! changes are saved on the way out.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use reserva_core::metrics::DEFAULT_TOP_AGENTS;
use reserva_core::SaleInput;

use crate::commands::{dashboard, data, sale};
use crate::error::ApiError;
use crate::notify::{ConsoleNotifier, Level, Notifier};
use crate::render;
use crate::session;
use crate::shell::Shell;
use crate::state::{ConfigState, StorageState};

#[derive(Debug, Parser)]
#[command(name = "reserva", version, about = "Reserva TRIP sales tracker")]
pub struct Cli {
    /// Config file (default: reserva.toml in the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Keep everything in memory; nothing is saved
    #[arg(long, global = true, conflicts_with = "db")]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List sales
    List {
        /// Only sales with a cell containing this text
        #[arg(short, long)]
        search: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one sale
    Show { id: u64 },

    /// Register a sale
    Add(SaleArgs),

    /// Edit a sale; omitted fields keep their current value
    Edit {
        id: u64,

        #[command(flatten)]
        fields: EditArgs,
    },

    /// Delete a sale
    Delete {
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Headline totals, optionally for a period or one agent
    Dashboard {
        #[arg(long, value_name = "YYYY-MM-DD", requires = "to")]
        from: Option<NaiveDate>,

        #[arg(long, value_name = "YYYY-MM-DD", requires = "from")]
        to: Option<NaiveDate>,

        #[arg(long, conflicts_with_all = ["from", "to"])]
        agent: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Agents ranked by amount sold
    TopAgents {
        #[arg(short, long, default_value_t = DEFAULT_TOP_AGENTS)]
        limit: usize,
    },

    /// Totals per month
    Monthly,

    /// Write the dashboard report as JSON
    Report {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Write every sale as a JSON array
    Export {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Replace all sales with the contents of a JSON export
    Import { file: PathBuf },

    /// Version, section, storage and timestamp
    Info {
        #[arg(long)]
        json: bool,
    },

    /// Interactive session
    Shell,
}

/// Fields for a new sale.
#[derive(Debug, Args)]
pub struct SaleArgs {
    /// Sale date (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<String>,

    #[arg(long)]
    pub code: String,

    #[arg(long)]
    pub client: String,

    #[arg(long)]
    pub total: String,

    #[arg(long)]
    pub agent: String,
}

impl SaleArgs {
    fn into_input(self, today: NaiveDate) -> SaleInput {
        SaleInput {
            sale_date: self
                .date
                .unwrap_or_else(|| today.format("%Y-%m-%d").to_string()),
            reservation_code: self.code,
            client: self.client,
            total_amount: self.total,
            registering_agent: self.agent,
        }
    }
}

/// Optional replacements for an existing sale.
#[derive(Debug, Args)]
pub struct EditArgs {
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<String>,

    #[arg(long)]
    pub code: Option<String>,

    #[arg(long)]
    pub client: Option<String>,

    #[arg(long)]
    pub total: Option<String>,

    #[arg(long)]
    pub agent: Option<String>,
}

impl EditArgs {
    fn apply(self, mut form: SaleInput) -> SaleInput {
        if let Some(date) = self.date {
            form.sale_date = date;
        }
        if let Some(code) = self.code {
            form.reservation_code = code;
        }
        if let Some(client) = self.client {
            form.client = client;
        }
        if let Some(total) = self.total {
            form.total_amount = total;
        }
        if let Some(agent) = self.agent {
            form.registering_agent = agent;
        }
        form
    }
}

/// Loads configuration and opens storage for `cli`.
pub async fn build_shell(cli: &Cli) -> Result<Shell, ApiError> {
    let mut config = match &cli.config {
        Some(path) => ConfigState::load(Some(path.clone()))?,
        None => ConfigState::load_or_default(None),
    };
    if let Some(db) = &cli.db {
        config.database_path = Some(db.clone());
    }

    let storage = if cli.memory {
        StorageState::in_memory(config.storage_key.clone())
    } else {
        StorageState::open(&config).await?
    };

    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    Ok(Shell::new(config, storage, Some(notifier)))
}

/// Runs the parsed command line to completion.
pub async fn execute(cli: Cli) -> Result<(), ApiError> {
    let mut shell = build_shell(&cli).await?;
    shell.init().await;

    let command = cli.command.unwrap_or(Command::Shell);
    debug!(?command, "Dispatching");

    let result = dispatch(&mut shell, command).await;
    let closed = shell.shutdown().await;

    result.and(closed)
}

async fn dispatch(shell: &mut Shell, command: Command) -> Result<(), ApiError> {
    let config = shell.config().clone();
    let ledger = shell.ledger().clone();

    match command {
        Command::List { search, json } => {
            let sales = sale::list_sales(&ledger, search.as_deref());
            if json {
                print_json(&sales)?;
            } else {
                println!("{}", render::sales_table(&sales, &config));
                println!("{} sale(s)", sales.len());
            }
        }

        Command::Show { id } => {
            let sale = sale::get_sale(&ledger, id)?;
            println!("{}", render::sale_details(&sale, &config));
        }

        Command::Add(args) => {
            let input = args.into_input(Utc::now().date_naive());
            let created = sale::create_sale(&ledger, &input)?;
            shell.notify(
                Level::Success,
                &format!("Sale {} registered", created.reservation_code),
            );
            println!("{}", render::sale_details(&created, &config));
        }

        Command::Edit { id, fields } => {
            let form = fields.apply(sale::edit_form(&ledger, id)?);
            let updated = sale::update_sale(&ledger, id, &form)?;
            shell.notify(
                Level::Success,
                &format!("Sale {} updated", updated.reservation_code),
            );
            println!("{}", render::sale_details(&updated, &config));
        }

        Command::Delete { id, yes } => {
            let target = sale::get_sale(&ledger, id)?;
            if !yes && !session::confirm_delete(&target)? {
                shell.notify(Level::Info, "Nothing deleted");
                return Ok(());
            }
            let removed = sale::delete_sale(&ledger, id)?;
            shell.notify(
                Level::Success,
                &format!("Sale {} deleted", removed.reservation_code),
            );
        }

        Command::Dashboard {
            from,
            to,
            agent,
            json,
        } => {
            let totals = match (from, to, agent) {
                (Some(from), Some(to), _) => dashboard::period_totals(&ledger, from, to)?,
                (_, _, Some(agent)) => dashboard::agent_totals(&ledger, &agent),
                _ => dashboard::dashboard_totals(&ledger),
            };
            if json {
                print_json(&totals)?;
            } else {
                println!("{}", render::totals_table(&totals, &config));
            }
        }

        Command::TopAgents { limit } => {
            let agents = dashboard::top_agents(&ledger, limit);
            let grand_total = dashboard::dashboard_totals(&ledger).total_amount;
            println!("{}", render::agents_table(&agents, grand_total, &config));
        }

        Command::Monthly => {
            let months = dashboard::monthly_breakdown(&ledger);
            println!("{}", render::monthly_table(&months, &config));
        }

        Command::Report { output } => {
            let path = dashboard::export_report(&ledger, &config, output)?;
            shell.notify(
                Level::Success,
                &format!("Report written to {}", path.display()),
            );
        }

        Command::Export { output } => {
            let path = data::export_sales(&ledger, &config, output)?;
            shell.notify(
                Level::Success,
                &format!("Sales exported to {}", path.display()),
            );
        }

        Command::Import { file } => {
            let count = data::import_sales(&ledger, &file)?;
            shell.notify(Level::Success, &format!("{} sale(s) imported", count));
        }

        Command::Info { json } => {
            let info = shell.system_info();
            if json {
                print_json(&info)?;
            } else {
                println!(
                    "{}",
                    render::details_table(&[
                        ("App", info.app_name.clone()),
                        ("Version", info.version.clone()),
                        ("Section", info.section.to_string()),
                        ("Initialized", info.initialized.to_string()),
                        ("Storage", info.storage.clone()),
                        ("Sales", info.sales.to_string()),
                        ("Unsaved changes", info.unsaved_changes.to_string()),
                        ("Timestamp", info.timestamp.to_rfc3339()),
                    ])
                );
            }
        }

        Command::Shell => session::run(shell).await?,
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), ApiError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
