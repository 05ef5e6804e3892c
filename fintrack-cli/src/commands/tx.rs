//! Transaction commands

use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use fintrack_core::{OperationResult, TransactionInput, TransactionType};

use super::{current_user, get_context, print_json, GlobalArgs};
use crate::output;

#[derive(Subcommand)]
pub enum TxCommands {
    /// Record a transaction
    Add {
        title: String,
        /// Non-negative amount
        amount: i64,
        /// income or expense
        #[arg(long = "type", default_value = "expense")]
        kind: TransactionType,
        /// Category id (must be one of yours)
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
        /// Date as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List your transactions
    History,
    /// Delete a transaction
    Delete { id: i64 },
}

impl TxCommands {
    pub fn name(&self) -> &'static str {
        match self {
            TxCommands::Add { .. } => "tx add",
            TxCommands::History => "tx history",
            TxCommands::Delete { .. } => "tx delete",
        }
    }
}

pub async fn run(args: &GlobalArgs, command: TxCommands) -> Result<()> {
    let ctx = get_context()?;
    let user = current_user(&ctx, args).await?;

    match command {
        TxCommands::Add {
            title,
            amount,
            kind,
            category,
            notes,
            date,
        } => {
            let mut input = TransactionInput::new(title, amount, kind);
            if let Some(category_id) = category {
                input = input.with_category(category_id);
            }
            if let Some(notes) = notes {
                input = input.with_notes(notes);
            }
            if let Some(date) = date {
                input = input.on(date);
            }

            let tx = ctx.transaction_service.add(&user, &input).await?;
            if args.json {
                return print_json(&OperationResult::created(tx));
            }
            output::success(&format!("Recorded {} '{}' (id {})", tx.kind, tx.title, tx.id));
        }
        TxCommands::History => {
            let transactions = ctx.transaction_service.history(&user).await?;
            if args.json {
                return print_json(&OperationResult::ok(transactions));
            }
            if transactions.is_empty() {
                output::info("No transactions yet.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Id", "Date", "Title", "Amount", "Category", "Notes"]);
            for tx in &transactions {
                table.add_row(vec![
                    tx.id.to_string(),
                    tx.date_added.to_string(),
                    tx.title.clone(),
                    output::format_amount(tx.amount, tx.kind == TransactionType::Income),
                    tx.category_name().to_string(),
                    tx.optional_notes.clone().unwrap_or_default(),
                ]);
            }
            println!("{}", table);
        }
        TxCommands::Delete { id } => {
            ctx.transaction_service.delete(&user, id).await?;
            if args.json {
                return print_json(&OperationResult::ok(serde_json::json!({ "deleted": id })));
            }
            output::success(&format!("Deleted transaction {}", id));
        }
    }

    Ok(())
}
