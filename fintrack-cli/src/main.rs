//! Fintrack CLI - personal finance tracking in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{auth, category, logs, report, savings, tx, GlobalArgs};
use fintrack_core::LogEvent;

/// Fintrack - personal finance tracking in your terminal
#[derive(Parser)]
#[command(name = "ft", version, about, long_about = None)]
struct Cli {
    /// Bearer token to use instead of the one saved by `ft login`
    #[arg(long, global = true, env = "FT_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Print the result envelope as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new account
    Register {
        username: String,
        email: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in and save the access token
    Login {
        username: String,
        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the saved access token
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage categories
    Category {
        #[command(subcommand)]
        command: category::CategoryCommands,
    },

    /// Record and list transactions
    Tx {
        #[command(subcommand)]
        command: tx::TxCommands,
    },

    /// Manage savings deposits
    Savings {
        #[command(subcommand)]
        command: savings::SavingsCommands,
    },

    /// Monthly income, expense and category summary
    Report {
        /// Month number, 1-12 (matches that month in every year)
        month: u32,
        /// Also write a printable HTML statement to this file
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Register { .. } => "register",
            Commands::Login { .. } => "login",
            Commands::Logout => "logout",
            Commands::Whoami => "whoami",
            Commands::Category { command } => command.name(),
            Commands::Tx { command } => command.name(),
            Commands::Savings { command } => command.name(),
            Commands::Report { .. } => "report",
            Commands::Logs { .. } => "logs",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let command_name = cli.command.name();
    let args = GlobalArgs {
        token: cli.token,
        json: cli.json,
    };

    // `ft logs` opens logs.duckdb itself
    let logger = match cli.command {
        Commands::Logs { .. } => None,
        _ => commands::get_logger(),
    };
    commands::log_event(&logger, LogEvent::new("command_executed").with_command(command_name));

    match run(cli.command, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_event(
                &logger,
                LogEvent::new("command_failed")
                    .with_command(command_name)
                    .with_error(e.to_string()),
            );
            commands::report_error(&e, args.json);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, args: &GlobalArgs) -> Result<()> {
    match command {
        Commands::Register {
            username,
            email,
            password,
        } => auth::register(args, &username, &email, password).await,
        Commands::Login { username, password } => auth::login(args, &username, password).await,
        Commands::Logout => auth::logout(args),
        Commands::Whoami => auth::whoami(args).await,
        Commands::Category { command } => category::run(args, command).await,
        Commands::Tx { command } => tx::run(args, command).await,
        Commands::Savings { command } => savings::run(args, command).await,
        Commands::Report { month, html } => report::run(args, month, html).await,
        Commands::Logs { command } => logs::run(args, command),
    }
}
