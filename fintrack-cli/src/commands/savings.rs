//! Savings commands

use anyhow::Result;
use clap::Subcommand;

use fintrack_core::{OperationResult, Savings, SavingsInput, SavingsUpdate};

use super::{current_user, get_context, print_json, GlobalArgs};
use crate::output;

#[derive(Subcommand)]
pub enum SavingsCommands {
    /// Record a savings deposit
    Add {
        amount: i64,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List your savings
    List,
    /// Show one savings record
    Get { id: i64 },
    /// Change the amount or notes of a savings record
    Update {
        id: i64,
        #[arg(long)]
        amount: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a savings record
    Delete { id: i64 },
    /// Total of all your savings
    Total,
}

impl SavingsCommands {
    pub fn name(&self) -> &'static str {
        match self {
            SavingsCommands::Add { .. } => "savings add",
            SavingsCommands::List => "savings list",
            SavingsCommands::Get { .. } => "savings get",
            SavingsCommands::Update { .. } => "savings update",
            SavingsCommands::Delete { .. } => "savings delete",
            SavingsCommands::Total => "savings total",
        }
    }
}

fn print_savings(rows: &[Savings]) {
    let mut table = output::create_table();
    table.set_header(vec!["Id", "Date", "Amount", "Notes"]);
    for row in rows {
        table.add_row(vec![
            row.id.to_string(),
            row.created_at.to_string(),
            row.amount.to_string(),
            row.optional_notes.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);
}

pub async fn run(args: &GlobalArgs, command: SavingsCommands) -> Result<()> {
    let ctx = get_context()?;
    let user = current_user(&ctx, args).await?;

    match command {
        SavingsCommands::Add { amount, notes } => {
            let input = SavingsInput {
                amount,
                optional_notes: notes,
            };
            let savings = ctx.savings_service.add(&user, &input).await?;
            if args.json {
                return print_json(&OperationResult::created(savings));
            }
            output::success(&format!("Saved {} (id {})", savings.amount, savings.id));
        }
        SavingsCommands::List => {
            let rows = ctx.savings_service.list(&user).await?;
            if args.json {
                return print_json(&OperationResult::ok(rows));
            }
            if rows.is_empty() {
                output::info("No savings yet.");
                return Ok(());
            }
            print_savings(&rows);
        }
        SavingsCommands::Get { id } => {
            let savings = ctx.savings_service.get(&user, id).await?;
            if args.json {
                return print_json(&OperationResult::ok(savings));
            }
            print_savings(std::slice::from_ref(&savings));
        }
        SavingsCommands::Update { id, amount, notes } => {
            let update = SavingsUpdate {
                amount,
                optional_notes: notes,
            };
            let savings = ctx.savings_service.update(&user, id, &update).await?;
            if args.json {
                return print_json(&OperationResult::ok(savings));
            }
            output::success(&format!("Updated savings {}", savings.id));
        }
        SavingsCommands::Delete { id } => {
            ctx.savings_service.delete(&user, id).await?;
            if args.json {
                return print_json(&OperationResult::ok(serde_json::json!({ "deleted": id })));
            }
            output::success(&format!("Deleted savings {}", id));
        }
        SavingsCommands::Total => {
            let total = ctx.report_service.savings_total(&user).await?;
            if args.json {
                return print_json(&OperationResult::ok(total));
            }
            println!("Total savings for {}: {}", total.user, total.savings);
        }
    }

    Ok(())
}
