//! CLI command implementations

pub mod auth;
pub mod category;
pub mod logs;
pub mod report;
pub mod savings;
pub mod tx;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dialoguer::Password;
use serde::Serialize;

use fintrack_core::domain::User;
use fintrack_core::services::{parse_bearer, EntryPoint, LogEvent, LoggingService};
use fintrack_core::{Error, FintrackContext, OperationResult};

use crate::output;

const TOKEN_FILE: &str = "token";

/// Options shared by every command
pub struct GlobalArgs {
    pub token: Option<String>,
    pub json: bool,
}

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (it never blocks a command)
pub fn get_logger() -> Option<LoggingService> {
    let dir = get_fintrack_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;
    LoggingService::new(&dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Data directory from FINTRACK_DIR, or ~/.fintrack
pub fn get_fintrack_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FINTRACK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".fintrack"))
        .context("Could not find home directory")
}

pub fn get_context() -> Result<FintrackContext> {
    let dir = get_fintrack_dir()?;
    FintrackContext::new(&dir).context("Failed to initialize fintrack context")
}

fn token_path(dir: &Path) -> PathBuf {
    dir.join(TOKEN_FILE)
}

pub fn save_token(token: &str) -> Result<()> {
    let dir = get_fintrack_dir()?;
    std::fs::create_dir_all(&dir)?;
    write_token(&token_path(&dir), token)
        .with_context(|| format!("Failed to save token in {}", dir.display()))
}

/// Write the token readable by the owner only
fn write_token(path: &Path, token: &str) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
        options.mode(0o600);
        // mode() only applies on creation
        if path.exists() {
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
    }
    let mut file = options.open(path)?;
    file.write_all(token.as_bytes())
}

/// Remove the saved token, returning whether one existed
pub fn clear_token() -> Result<bool> {
    let path = token_path(&get_fintrack_dir()?);
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(&path)?;
    Ok(true)
}

/// The `--token` value, else the token saved by `ft login`
///
/// Accepts a bare token or an `Authorization` style `Bearer <token>` value.
fn load_token(args: &GlobalArgs) -> Result<String> {
    let raw = match &args.token {
        Some(token) => token.clone(),
        None => {
            let path = token_path(&get_fintrack_dir()?);
            std::fs::read_to_string(&path).map_err(|_| Error::Unauthorized)?
        }
    };
    let token = parse_bearer(&raw).unwrap_or_else(|| raw.trim());
    if token.is_empty() {
        return Err(Error::Unauthorized.into());
    }
    Ok(token.to_string())
}

/// Resolve the caller from their token
pub async fn current_user(ctx: &FintrackContext, args: &GlobalArgs) -> Result<User> {
    let token = load_token(args)?;
    Ok(ctx.identity.authenticate(&token).await?)
}

/// Use the given password, else read one line from piped stdin, else prompt
pub fn read_password(given: Option<String>, prompt: &str) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    if atty::isnt(atty::Stream::Stdin) {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }
    Ok(Password::new().with_prompt(prompt).interact()?)
}

pub fn print_json<T: Serialize>(result: &OperationResult<T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

/// Print a failed command, as an envelope in JSON mode
pub fn report_error(err: &anyhow::Error, json: bool) {
    let status = err
        .downcast_ref::<Error>()
        .map(Error::status_code)
        .unwrap_or(500);

    if json {
        let envelope = OperationResult::<()>::fail(status, format!("{:#}", err));
        if print_json(&envelope).is_ok() {
            return;
        }
    }

    if status == 401 {
        output::error("Unauthorized. Run `ft login` or pass --token.");
    } else {
        output::error(&format!("Error: {:#}", err));
    }
}
