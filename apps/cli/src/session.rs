//! # Interactive Session
//!
//! A prompt loop over the same commands the one-shot CLI uses. The auto-save
//! task runs for as long as the session does.
//!
//! | Input              | Action                                  |
//! |--------------------|-----------------------------------------|
//! | `help`             | list commands                           |
//! | `dashboard`        | dashboard section                       |
//! | `sales`, `ventas`  | sales section                           |
//! | `list [term]`      | sales table, optionally searched        |
//! | `new`              | sale form                               |
//! | `edit <id>`        | sale form prefilled with the sale       |
//! | `delete <id>`      | delete after confirmation               |
//! | `save`             | save now                                |
//! | `report`, `export` | write JSON files                        |
//! | `import <file>`    | replace all sales                       |
//! | `info`             | system info                             |
//! | `quit`, `exit`     | save pending changes and leave          |

use std::path::PathBuf;

use inquire::{Confirm, InquireError, Text};
use tracing::{debug, info};

use reserva_core::metrics::DEFAULT_TOP_AGENTS;
use reserva_core::{SaleField, SaleInput, SaleRecord};

use crate::commands::{dashboard, data, sale};
use crate::error::{ApiError, ErrorCode};
use crate::notify::Level;
use crate::render;
use crate::shell::{Section, Shell};

/// One line of session input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Show(Section),
    List(Option<String>),
    New,
    Edit(u64),
    Delete(u64),
    Save,
    Report,
    Export,
    Import(PathBuf),
    Info,
    Quit,
    Nothing,
}

impl ShellCommand {
    /// Parses a line. `Err` carries a usage message.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "" => ShellCommand::Nothing,
            "help" | "?" => ShellCommand::Help,
            "dashboard" => ShellCommand::Show(Section::Dashboard),
            "sales" | "ventas" => ShellCommand::Show(Section::Ventas),
            "list" | "search" => {
                ShellCommand::List((!rest.is_empty()).then(|| rest.to_string()))
            }
            "new" | "add" => ShellCommand::New,
            "edit" => ShellCommand::Edit(parse_id(rest, "edit")?),
            "delete" => ShellCommand::Delete(parse_id(rest, "delete")?),
            "save" => ShellCommand::Save,
            "report" => ShellCommand::Report,
            "export" => ShellCommand::Export,
            "import" if rest.is_empty() => return Err("Usage: import <file>".to_string()),
            "import" => ShellCommand::Import(PathBuf::from(rest)),
            "info" => ShellCommand::Info,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("Unknown command '{}'. Type 'help'.", other)),
        };
        Ok(command)
    }
}

fn parse_id(value: &str, command: &str) -> Result<u64, String> {
    value
        .parse()
        .map_err(|_| format!("Usage: {} <id>", command))
}

const HELP: &str = "\
Commands:
  dashboard          totals, top agents and months
  sales | ventas     the sales table
  list [term]        sales, optionally filtered
  new                register a sale
  edit <id>          edit a sale
  delete <id>        delete a sale
  save               save now
  report             write the dashboard report
  export             export sales to JSON
  import <file>      replace all sales from a JSON export
  info               system info
  quit               save and leave";

/// Runs blocking prompt code without stalling the runtime's other tasks.
fn blocking<T>(f: impl FnOnce() -> Result<T, InquireError>) -> Result<T, InquireError> {
    tokio::task::block_in_place(f)
}

/// Asks before deleting `sale`.
pub fn confirm_delete(sale: &SaleRecord) -> Result<bool, ApiError> {
    let question = format!(
        "Delete sale {} ({})?",
        sale.reservation_code, sale.client
    );
    let answer = blocking(|| Confirm::new(&question).with_default(false).prompt())?;
    Ok(answer)
}

/// Runs the session until the user quits or interrupts it.
pub async fn run(shell: &mut Shell) -> Result<(), ApiError> {
    shell.start_auto_save();
    println!(
        "{} {} (type 'help' for commands)",
        shell.config().app_name,
        shell.config().version
    );
    show_section(shell);

    loop {
        let prompt = format!("{}>", shell.section());
        let line = match blocking(|| Text::new(&prompt).prompt()) {
            Ok(line) => line,
            Err(InquireError::OperationCanceled) => continue,
            Err(InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(usage) => {
                println!("{}", usage);
                continue;
            }
        };
        debug!(?command, "Session command");

        if command == ShellCommand::Quit {
            break;
        }
        if let Err(e) = execute(shell, command).await {
            report(shell, &e);
        }
    }

    if shell.ledger().is_dirty() {
        shell.notify(Level::Info, "Saving pending changes");
    }
    info!("Session ended");
    Ok(())
}

async fn execute(shell: &mut Shell, command: ShellCommand) -> Result<(), ApiError> {
    let config = shell.config().clone();
    let ledger = shell.ledger().clone();

    match command {
        ShellCommand::Nothing | ShellCommand::Quit => {}
        ShellCommand::Help => println!("{}", HELP),
        ShellCommand::Show(section) => {
            shell.show_section(section.name());
            show_section(shell);
        }
        ShellCommand::List(term) => {
            let sales = sale::list_sales(&ledger, term.as_deref());
            println!("{}", render::sales_table(&sales, &config));
            println!("{} sale(s)", sales.len());
        }
        ShellCommand::New => {
            if let Some(created) = sale_form(shell, None, SaleInput::default())? {
                shell.notify(
                    Level::Success,
                    &format!("Sale {} registered", created.reservation_code),
                );
            }
        }
        ShellCommand::Edit(id) => {
            let form = sale::edit_form(&ledger, id)?;
            if let Some(updated) = sale_form(shell, Some(id), form)? {
                shell.notify(
                    Level::Success,
                    &format!("Sale {} updated", updated.reservation_code),
                );
            }
        }
        ShellCommand::Delete(id) => {
            let target = sale::get_sale(&ledger, id)?;
            if confirm_delete(&target)? {
                sale::delete_sale(&ledger, id)?;
                shell.notify(
                    Level::Success,
                    &format!("Sale {} deleted", target.reservation_code),
                );
            }
        }
        ShellCommand::Save => shell.save_data().await?,
        ShellCommand::Report => {
            let path = dashboard::export_report(&ledger, &config, None)?;
            shell.notify(
                Level::Success,
                &format!("Report written to {}", path.display()),
            );
        }
        ShellCommand::Export => {
            let path = data::export_sales(&ledger, &config, None)?;
            shell.notify(
                Level::Success,
                &format!("Sales exported to {}", path.display()),
            );
        }
        ShellCommand::Import(path) => {
            let count = data::import_sales(&ledger, &path)?;
            shell.notify(Level::Success, &format!("{} sale(s) imported", count));
        }
        ShellCommand::Info => {
            let info = shell.system_info();
            println!(
                "{}",
                render::details_table(&[
                    ("Version", info.version),
                    ("Section", info.section.to_string()),
                    ("Initialized", info.initialized.to_string()),
                    ("Storage", info.storage),
                    ("Sales", info.sales.to_string()),
                    ("Unsaved changes", info.unsaved_changes.to_string()),
                    ("Timestamp", info.timestamp.to_rfc3339()),
                ])
            );
        }
    }
    Ok(())
}

fn show_section(shell: &Shell) {
    let config = shell.config();
    let ledger = shell.ledger();

    match shell.section() {
        Section::Dashboard => {
            let totals = dashboard::dashboard_totals(ledger);
            let agents = dashboard::top_agents(ledger, DEFAULT_TOP_AGENTS);
            println!("{}", render::totals_table(&totals, config));
            println!("{}", render::agents_table(&agents, totals.total_amount, config));
            println!(
                "{}",
                render::monthly_table(&dashboard::monthly_breakdown(ledger), config)
            );
        }
        Section::Ventas => {
            let sales = sale::list_sales(ledger, None);
            println!("{}", render::sales_table(&sales, config));
        }
    }
}

/// Prompts for every field, re-asking with the typed values while the ledger
/// rejects them. `None` means the user cancelled the form.
fn sale_form(
    shell: &Shell,
    id: Option<u64>,
    mut form: SaleInput,
) -> Result<Option<SaleRecord>, ApiError> {
    let ledger = shell.ledger();
    let mut errors: Option<ApiError> = None;

    loop {
        match ask_fields(&form, errors.as_ref()) {
            Ok(filled) => form = filled,
            Err(InquireError::OperationCanceled) => {
                shell.notify(Level::Info, "Form cancelled");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let result = match id {
            Some(id) => sale::update_sale(ledger, id, &form),
            None => sale::create_sale(ledger, &form),
        };

        match result {
            Ok(record) => return Ok(Some(record)),
            Err(e) if e.is_user_correctable() => {
                for line in render::error_lines(&e) {
                    println!("  {}", line);
                }
                errors = Some(e);
            }
            Err(e) => return Err(e),
        }
    }
}

fn ask_fields(form: &SaleInput, errors: Option<&ApiError>) -> Result<SaleInput, InquireError> {
    let ask = |field: SaleField, current: &str| -> Result<String, InquireError> {
        let label = format!("{}:", field.label());
        let hint = errors.and_then(|e| e.field_message(field));
        blocking(|| {
            let mut prompt = Text::new(&label).with_initial_value(current);
            if let Some(hint) = hint {
                prompt = prompt.with_help_message(hint);
            }
            prompt.prompt()
        })
    };

    Ok(SaleInput {
        sale_date: ask(SaleField::SaleDate, &form.sale_date)?,
        reservation_code: ask(SaleField::ReservationCode, &form.reservation_code)?,
        client: ask(SaleField::Client, &form.client)?,
        total_amount: ask(SaleField::TotalAmount, &form.total_amount)?,
        registering_agent: ask(SaleField::RegisteringAgent, &form.registering_agent)?,
    })
}

/// Shows a command failure the way its kind calls for.
fn report(shell: &Shell, err: &ApiError) {
    match err.code {
        ErrorCode::ValidationError | ErrorCode::DuplicateKey | ErrorCode::NotFound => {
            for line in render::error_lines(err) {
                println!("{}", line);
            }
        }
        ErrorCode::FormatError | ErrorCode::PersistenceError | ErrorCode::ConfigError => {
            shell.notify(Level::Error, &err.message);
        }
        ErrorCode::Interrupted => shell.notify(Level::Info, "Cancelled"),
        ErrorCode::Internal => shell.handle_global_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use reserva_db::MemoryStore;

    use crate::notify::{Notifier, RecordingNotifier};
    use crate::state::{ConfigState, StorageState};

    fn shell() -> (Shell, Arc<RecordingNotifier>) {
        let recorder = Arc::new(RecordingNotifier::new());
        let notifier: Arc<dyn Notifier> = recorder.clone();
        let storage = StorageState::with_store(Arc::new(MemoryStore::new()), "k");
        (
            Shell::new(ConfigState::default(), storage, Some(notifier)),
            recorder,
        )
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse("  help "), Ok(ShellCommand::Help));
        assert_eq!(ShellCommand::parse(""), Ok(ShellCommand::Nothing));
        assert_eq!(
            ShellCommand::parse("VENTAS"),
            Ok(ShellCommand::Show(Section::Ventas))
        );
        assert_eq!(ShellCommand::parse("edit 3"), Ok(ShellCommand::Edit(3)));
        assert_eq!(ShellCommand::parse("delete 12"), Ok(ShellCommand::Delete(12)));
        assert_eq!(
            ShellCommand::parse("search ana garcía"),
            Ok(ShellCommand::List(Some("ana garcía".to_string())))
        );
        assert_eq!(ShellCommand::parse("list"), Ok(ShellCommand::List(None)));
        assert_eq!(
            ShellCommand::parse("import backup.json"),
            Ok(ShellCommand::Import(PathBuf::from("backup.json")))
        );
        assert_eq!(ShellCommand::parse("exit"), Ok(ShellCommand::Quit));
    }

    #[test]
    fn test_parse_usage_errors() {
        assert_eq!(
            ShellCommand::parse("edit"),
            Err("Usage: edit <id>".to_string())
        );
        assert!(ShellCommand::parse("delete abc").is_err());
        assert!(ShellCommand::parse("import").is_err());
        assert!(ShellCommand::parse("settings").is_err());
    }

    #[tokio::test]
    async fn test_execute_navigation_and_save() {
        let (mut shell, recorder) = shell();
        shell.init().await;

        execute(&mut shell, ShellCommand::Show(Section::Ventas))
            .await
            .unwrap();
        assert_eq!(shell.section(), Section::Ventas);

        execute(&mut shell, ShellCommand::Save).await.unwrap();
        assert_eq!(
            recorder.messages().last(),
            Some(&(Level::Success, "Data saved".to_string()))
        );
    }

    #[tokio::test]
    async fn test_execute_missing_sale_is_not_found() {
        let (mut shell, _) = shell();
        let err = execute(&mut shell, ShellCommand::Edit(42)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_report_routes_by_kind() {
        let (shell, recorder) = shell();

        report(&shell, &ApiError::validation("bad"));
        assert!(recorder.messages().is_empty());

        report(&shell, &ApiError::persistence("disk full"));
        report(&shell, &ApiError::internal("boom"));
        let levels: Vec<Level> = recorder.messages().into_iter().map(|(l, _)| l).collect();
        assert_eq!(levels, vec![Level::Error, Level::Error]);
    }
}
