//! Report command - monthly summary with optional HTML statement

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use fintrack_core::services::render_html;
use fintrack_core::OperationResult;

use super::{current_user, get_context, print_json, GlobalArgs};
use crate::output;

pub async fn run(args: &GlobalArgs, month: u32, html: Option<PathBuf>) -> Result<()> {
    let ctx = get_context()?;
    let user = current_user(&ctx, args).await?;

    let (report, transactions) = ctx.report_service.monthly_statement(&user, month).await?;

    if let Some(path) = &html {
        std::fs::write(path, render_html(&report, &transactions)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if args.json {
        return print_json(&OperationResult::ok(report));
    }

    println!("{}", format!("{} - {}", report.user, report.month_name).bold());
    println!("  Income:        {}", report.income.to_string().green());
    println!("  Expense:       {}", report.expense.to_string().red());
    println!("  Net:           {}", report.net);
    println!("  Total savings: {}", report.total_savings);

    if !report.categories.is_empty() {
        let mut table = output::create_table();
        table.set_header(vec!["Category", "Expense"]);
        for (name, amount) in &report.categories {
            table.add_row(vec![name.clone(), amount.to_string()]);
        }
        println!("{}", table);
    }

    if let Some(path) = html {
        output::success(&format!("Statement written to {}", path.display()));
    }
    Ok(())
}
