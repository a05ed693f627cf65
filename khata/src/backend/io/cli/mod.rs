//! # CLI Handlers
//!
//! Each subcommand calls into the domain services, maps the result to a
//! `shared` DTO and renders it either as pretty JSON (`--json`) or as a short
//! text report. Handlers return the rendered output instead of printing so
//! they can be tested directly.

use anyhow::{anyhow, Result};
use chrono::{Local, SecondsFormat};
use log::info;
use serde::Serialize;

use crate::backend::domain::commands::customer::{
    CreateCustomerCommand, DeleteCustomerCommand, UpdateCustomerCommand,
};
use crate::backend::domain::commands::entry::{AddSaleCommand, EntryListQuery, SettleCommand};
use crate::backend::domain::commands::export::ExportToPathCommand;
use crate::backend::domain::commands::settings::UpdateSettingsCommand;
use crate::backend::domain::BalanceService;
use crate::backend::io::mappers::{CustomerMapper, EntryMapper, SettingsMapper};
use crate::backend::Backend;

pub mod args;

pub use args::{Cli, Command, CustomerAction, PinAction, SettingsAction};

/// Open the ledger named on the command line and run the command
pub fn run(cli: Cli) -> Result<String> {
    let backend = Backend::open(cli.data_dir.as_deref())?;
    execute(&backend, cli.command, cli.pin.as_deref(), cli.json)
}

/// Check the PIN gate, then dispatch a single command
pub fn execute(backend: &Backend, command: Command, pin: Option<&str>, json: bool) -> Result<String> {
    backend.pin_service.unlock(pin)?;
    info!("Running command: {:?}", command);

    match command {
        Command::Customers { action } => customers(backend, action, json),
        Command::Sale {
            customer_id,
            qty,
            note,
        } => {
            let result = backend.entry_service.add_sale(AddSaleCommand {
                customer_id,
                qty,
                note,
            })?;
            let dto = EntryMapper::to_entry_response_dto(result);
            render(json, &dto, |r| {
                format!("{}\n{} कप बाकी", r.success_message, r.balance.cups)
            })
        }
        Command::Settle { customer_id } => {
            let result = backend.entry_service.settle(SettleCommand { customer_id })?;
            let dto = EntryMapper::to_entry_response_dto(result);
            render(json, &dto, |r| r.success_message.clone())
        }
        Command::History { customer_id } => history(backend, customer_id, json),
        Command::Summary => summary(backend, json),
        Command::Export { out_dir, stdout } => export(backend, out_dir, stdout, json),
        Command::Settings { action } => settings(backend, action, json),
        Command::Pin {
            action: PinAction::Attempts { limit },
        } => pin_attempts(backend, limit, json),
    }
}

fn render<T: Serialize>(json: bool, dto: &T, text: impl FnOnce(&T) -> String) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(dto)?)
    } else {
        Ok(text(dto))
    }
}

fn customers(backend: &Backend, action: CustomerAction, json: bool) -> Result<String> {
    let table = &backend.customer_table_service;

    match action {
        CustomerAction::List => {
            let customers = backend.customer_service.list_customers()?.customers;
            let dtos: Vec<shared::Customer> = customers.into_iter().map(CustomerMapper::to_dto).collect();

            render(json, &dtos, |customers| {
                if customers.is_empty() {
                    return "कोई ग्राहक नहीं".to_string();
                }
                customers
                    .iter()
                    .map(|c| {
                        let price = c
                            .price_per_cup
                            .map(|p| format!("{}/कप", table.format_rupees(p)))
                            .unwrap_or_default();
                        format!("{}  {}  {}", c.id, c.name, price).trim_end().to_string()
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        CustomerAction::Add { name, price } => {
            let result = backend.customer_service.create_customer(CreateCustomerCommand {
                name,
                price_per_cup: price,
            })?;
            let message = format!("Customer '{}' added", result.customer.name);
            let dto = CustomerMapper::to_customer_response_dto(result.customer, &message);
            render(json, &dto, |r| format!("{}\n{}", r.success_message, r.customer.id))
        }
        CustomerAction::Show { id } => {
            let customer = backend.customer_service.require_customer(&id)?;
            let summary = backend.balance_service.summarize_customer(&customer)?;
            let entries = backend
                .entry_service
                .list_entries(EntryListQuery {
                    customer_id: customer.id.clone(),
                })?
                .entries;

            let last_visit_label = table.last_visit_label(summary.balance.last_visit, &Local::now());
            let dto = shared::CustomerDetailResponse {
                entries: table.format_entries(&entries, summary.price_per_cup, &Local),
                customer: CustomerMapper::to_dto(summary.customer),
                balance: CustomerMapper::to_balance_dto(summary.balance),
                price_per_cup: summary.price_per_cup,
                amount_due: summary.amount_due,
            };

            render(json, &dto, |d| {
                let mut lines = vec![
                    d.customer.name.clone(),
                    format!("{} कप बाकी", d.balance.cups),
                    format!(
                        "कुल: {} ({}/कप)",
                        table.format_rupees(d.amount_due),
                        table.format_rupees(d.price_per_cup)
                    ),
                    format!("आखिरी विज़िट: {}", last_visit_label),
                ];
                if d.entries.is_empty() {
                    lines.push("कोई एंट्री नहीं".to_string());
                }
                for entry in &d.entries {
                    lines.push(format!(
                        "{}  {}  {}",
                        entry.label, entry.formatted_value, entry.formatted_date
                    ));
                    if let Some(note) = &entry.note {
                        lines.push(format!("    {}", note));
                    }
                }
                lines.join("\n")
            })
        }
        CustomerAction::Update { id, name, price } => {
            let result = backend.customer_service.update_customer(UpdateCustomerCommand {
                customer_id: id,
                name,
                price_per_cup: price,
            })?;
            let message = format!("Customer '{}' updated", result.customer.name);
            let dto = CustomerMapper::to_customer_response_dto(result.customer, &message);
            render(json, &dto, |r| r.success_message.clone())
        }
        CustomerAction::Delete { id } => {
            let result = backend
                .customer_service
                .delete_customer(DeleteCustomerCommand { customer_id: id })?;
            let dto = shared::DeleteCustomerResponse {
                deleted_entries: result.deleted_entries,
                success_message: result.success_message,
            };
            render(json, &dto, |r| {
                format!("{} ({} entries removed)", r.success_message, r.deleted_entries)
            })
        }
    }
}

fn history(backend: &Backend, customer_id: String, json: bool) -> Result<String> {
    let customer = backend.customer_service.require_customer(&customer_id)?;
    let entries = backend
        .entry_service
        .list_entries(EntryListQuery {
            customer_id: customer.id,
        })?
        .entries;

    let table = &backend.customer_table_service;
    let text_lines: Vec<String> = entries
        .iter()
        .map(|e| {
            format!(
                "{}  {}  {}",
                e.timestamp.with_timezone(&Local).to_rfc3339_opts(SecondsFormat::Secs, false),
                table.entry_label(e),
                e.note.as_deref().unwrap_or("")
            )
            .trim_end()
            .to_string()
        })
        .collect();

    let dtos: Vec<shared::Entry> = entries.into_iter().map(EntryMapper::to_dto).collect();
    render(json, &dtos, |_| {
        if text_lines.is_empty() {
            "कोई एंट्री नहीं".to_string()
        } else {
            text_lines.join("\n")
        }
    })
}

fn summary(backend: &Backend, json: bool) -> Result<String> {
    let table = &backend.customer_table_service;
    let now = Local::now();

    let summaries = backend.balance_service.summaries()?;
    let totals = BalanceService::totals(&summaries);

    let customers: Vec<shared::CustomerSummary> = summaries
        .into_iter()
        .map(|s| {
            let label = table.last_visit_label(s.balance.last_visit, &now);
            CustomerMapper::to_summary_dto(s, label)
        })
        .collect();
    let dto = CustomerMapper::to_customer_list_dto(customers, totals);

    render(json, &dto, |list| {
        let mut lines: Vec<String> = list
            .customers
            .iter()
            .map(|s| {
                format!(
                    "{}  {} कप  {}  ({})",
                    s.customer.name,
                    s.balance.cups,
                    table.format_rupees(s.amount_due),
                    s.last_visit_label
                )
            })
            .collect();
        lines.push(format!(
            "कुल कप: {}  कुल बकाया: {}",
            list.total_cups,
            table.format_rupees(list.total_amount_due)
        ));
        lines.join("\n")
    })
}

fn export(backend: &Backend, out_dir: Option<String>, stdout: bool, json: bool) -> Result<String> {
    if stdout {
        let result = backend
            .export_service
            .export_csv(&backend.customer_service, &backend.entry_service)?;
        let dto = shared::ExportDataResponse {
            csv_content: result.csv_content,
            filename: result.filename,
            row_count: result.row_count,
            customer_count: result.customer_count,
        };
        return render(json, &dto, |d| d.csv_content.trim_end().to_string());
    }

    let result = backend.export_service.export_to_path(
        ExportToPathCommand { custom_path: out_dir },
        &backend.customer_service,
        &backend.entry_service,
    )?;
    if !result.success {
        return Err(anyhow!(result.message));
    }

    let dto = shared::ExportToPathResponse {
        success: result.success,
        message: result.message,
        file_path: result.file_path,
        row_count: result.row_count,
        customer_count: result.customer_count,
    };
    render(json, &dto, |d| {
        format!(
            "{}\n{} rows, {} customers",
            d.message, d.row_count, d.customer_count
        )
    })
}

fn settings(backend: &Backend, action: SettingsAction, json: bool) -> Result<String> {
    let table = &backend.customer_table_service;
    let describe = |s: &shared::Settings| {
        format!(
            "Default price: {}/कप\nPIN: {}",
            table.format_rupees(s.default_price),
            if s.pin_enabled { "on" } else { "off" }
        )
    };

    match action {
        SettingsAction::Show => {
            let dto = SettingsMapper::to_dto(&backend.settings_service.get_settings()?);
            render(json, &dto, describe)
        }
        SettingsAction::Set {
            default_price,
            new_pin,
            disable_pin,
        } => {
            let pin = if disable_pin { Some(None) } else { new_pin.map(Some) };
            if default_price.is_none() && pin.is_none() {
                return Err(anyhow!(
                    "Nothing to change; pass --default-price, --new-pin or --disable-pin"
                ));
            }

            let result = backend
                .settings_service
                .update_settings(UpdateSettingsCommand { default_price, pin })?;
            let dto = shared::SettingsResponse {
                settings: SettingsMapper::to_dto(&result.settings),
                success_message: result.success_message,
            };
            render(json, &dto, |r| {
                format!("{}\n{}", r.success_message, describe(&r.settings))
            })
        }
    }
}

fn pin_attempts(backend: &Backend, limit: u32, json: bool) -> Result<String> {
    let attempts = backend.pin_service.recent_attempts(Some(limit))?;
    let stats = backend.pin_service.attempt_stats()?;
    let dto = SettingsMapper::to_pin_attempts_dto(attempts, &stats);

    render(json, &dto, |r| {
        let mut lines: Vec<String> = r
            .attempts
            .iter()
            .map(|a| format!("#{}  {}  {}", a.id, a.timestamp, if a.success { "ok" } else { "failed" }))
            .collect();
        lines.push(format!(
            "{} attempts, {} failed",
            r.total_attempts, r.failed_attempts
        ));
        lines.join("\n")
    })
}
