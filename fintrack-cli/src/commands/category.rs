//! Category commands

use anyhow::Result;
use clap::Subcommand;

use fintrack_core::OperationResult;

use super::{current_user, get_context, print_json, GlobalArgs};
use crate::output;

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a category
    Add { name: String },
    /// List your categories
    List,
    /// Delete a category; its transactions become uncategorized
    Delete { id: i64 },
}

impl CategoryCommands {
    pub fn name(&self) -> &'static str {
        match self {
            CategoryCommands::Add { .. } => "category add",
            CategoryCommands::List => "category list",
            CategoryCommands::Delete { .. } => "category delete",
        }
    }
}

pub async fn run(args: &GlobalArgs, command: CategoryCommands) -> Result<()> {
    let ctx = get_context()?;
    let user = current_user(&ctx, args).await?;

    match command {
        CategoryCommands::Add { name } => {
            let category = ctx.category_service.add(&user, &name).await?;
            if args.json {
                return print_json(&OperationResult::created(category));
            }
            output::success(&format!("Created category '{}' (id {})", category.name, category.id));
        }
        CategoryCommands::List => {
            let categories = ctx.category_service.list(&user).await?;
            if args.json {
                return print_json(&OperationResult::ok(categories));
            }
            if categories.is_empty() {
                output::info("No categories yet.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Id", "Name"]);
            for category in categories {
                table.add_row(vec![category.id.to_string(), category.name]);
            }
            println!("{}", table);
        }
        CategoryCommands::Delete { id } => {
            ctx.category_service.delete(&user, id).await?;
            if args.json {
                return print_json(&OperationResult::ok(serde_json::json!({ "deleted": id })));
            }
            output::success(&format!("Deleted category {}", id));
        }
    }

    Ok(())
}
