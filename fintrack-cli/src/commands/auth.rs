//! Account commands - register, login, logout, whoami

use anyhow::Result;
use colored::Colorize;

use fintrack_core::{NewUser, OperationResult};

use super::{clear_token, current_user, get_context, print_json, read_password, save_token, GlobalArgs};
use crate::output;

pub async fn register(
    args: &GlobalArgs,
    username: &str,
    email: &str,
    password: Option<String>,
) -> Result<()> {
    let password = read_password(password, "Password")?;
    let ctx = get_context()?;
    let user = ctx
        .auth_service
        .register(&NewUser::new(username, email, &password))
        .await?;

    if args.json {
        return print_json(&OperationResult::created(user));
    }
    output::success(&format!("Registered {} (id {})", user.username, user.id));
    Ok(())
}

pub async fn login(args: &GlobalArgs, username: &str, password: Option<String>) -> Result<()> {
    let password = read_password(password, "Password")?;
    let ctx = get_context()?;
    let token = ctx.auth_service.login(username, &password).await?;
    save_token(&token.access_token)?;

    if args.json {
        return print_json(&OperationResult::ok(token));
    }
    output::success(&format!("Logged in as {}", username));
    Ok(())
}

pub fn logout(args: &GlobalArgs) -> Result<()> {
    let removed = clear_token()?;

    if args.json {
        return print_json(&OperationResult::ok(serde_json::json!({ "logged_out": removed })));
    }
    if removed {
        output::success("Logged out");
    } else {
        output::warning("Not logged in");
    }
    Ok(())
}

pub async fn whoami(args: &GlobalArgs) -> Result<()> {
    let ctx = get_context()?;
    let user = current_user(&ctx, args).await?.view();

    if args.json {
        return print_json(&OperationResult::ok(user));
    }
    println!("{}", user.username.bold());
    println!("  Email:   {}", user.email);
    println!("  Id:      {}", user.id);
    println!("  Joined:  {}", user.created_at);
    Ok(())
}
