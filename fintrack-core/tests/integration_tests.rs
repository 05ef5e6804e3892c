//! Integration tests for fintrack-core services
//!
//! Everything runs against a real DuckDB file in a temp directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, Utc};
use tempfile::TempDir;

use fintrack_core::adapters::duckdb::DuckDbRepository;
use fintrack_core::domain::{
    NewUser, SavingsInput, SavingsUpdate, TransactionInput, TransactionType, User, UNCATEGORIZED,
};
use fintrack_core::services::{CredentialStore, HashCost, TokenSettings};
use fintrack_core::{Error, FintrackContext};

// ============================================================================
// Test Helpers
// ============================================================================

/// Context over a fresh database with cheap password hashing
fn create_test_context(temp_dir: &TempDir) -> FintrackContext {
    let repo = DuckDbRepository::new(&temp_dir.path().join("test.duckdb"))
        .expect("Failed to create repository");
    repo.ensure_schema().expect("Failed to initialize schema");

    let credentials = CredentialStore::with_cost(HashCost {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    })
    .expect("Failed to build credential store");

    FintrackContext::assemble(
        TokenSettings::new(b"integration-secret".to_vec(), Duration::minutes(30)),
        Arc::new(repo),
        credentials,
    )
    .expect("Failed to assemble context")
}

/// Register a user and resolve it through a fresh login
async fn register_and_login(ctx: &FintrackContext, username: &str) -> (User, String) {
    ctx.auth_service
        .register(&NewUser::new(username, &format!("{}@example.com", username), "pw"))
        .await
        .expect("Failed to register");
    let token = ctx
        .auth_service
        .login(username, "pw")
        .await
        .expect("Failed to login")
        .access_token;
    let user = ctx.identity.authenticate(&token).await.expect("Failed to authenticate");
    (user, token)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_register_login_whoami() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    let view = ctx
        .auth_service
        .register(&NewUser::new("alice", "alice@example.com", "s3cret"))
        .await
        .unwrap();
    assert_eq!(view.username, "alice");

    let token = ctx.auth_service.login("alice", "s3cret").await.unwrap();
    assert_eq!(token.token_type, "bearer");

    let me = ctx.auth_service.current_user(&token.access_token).await.unwrap();
    assert_eq!(me, view);
    assert_eq!(me.username, "alice");
    assert_eq!(me.email, "alice@example.com");
    assert_eq!(me.created_at, Local::now().date_naive());
}

#[tokio::test]
async fn test_padded_username_logs_in_as_registered() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    let view = ctx
        .auth_service
        .register(&NewUser::new(" alice ", " alice@example.com ", "pw"))
        .await
        .unwrap();
    assert_eq!(view.username, "alice");
    assert_eq!(view.email, "alice@example.com");

    let token = ctx.auth_service.login(" alice ", "pw").await.unwrap();
    let me = ctx.auth_service.current_user(&token.access_token).await.unwrap();
    assert_eq!(me.username, "alice");
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    register_and_login(&ctx, "alice").await;
    let again = ctx
        .auth_service
        .register(&NewUser::new("alice", "other@example.com", "pw"))
        .await;
    assert!(matches!(again, Err(Error::Validation(_))));
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    register_and_login(&ctx, "alice").await;

    assert!(matches!(
        ctx.auth_service.login("alice", "wrong").await,
        Err(Error::Unauthorized)
    ));
    assert!(matches!(
        ctx.auth_service.login("nobody", "pw").await,
        Err(Error::Unauthorized)
    ));
    assert!(ctx.auth_service.authenticate("alice", "wrong").await.unwrap().is_none());
}

#[tokio::test]
async fn test_token_expires() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    register_and_login(&ctx, "alice").await;

    let issued_at = Utc::now();
    let tokens = fintrack_core::services::TokenService::new(TokenSettings::new(
        b"integration-secret".to_vec(),
        Duration::minutes(30),
    ))
    .unwrap();
    let token = tokens.issue_at("alice", Duration::seconds(30), issued_at).unwrap();

    let user = ctx
        .identity
        .authenticate_at(&token, issued_at + Duration::seconds(29))
        .await
        .unwrap();
    assert_eq!(user.username, "alice");

    assert!(matches!(
        ctx.identity.authenticate_at(&token, issued_at + Duration::seconds(31)).await,
        Err(Error::Unauthorized)
    ));
}

#[tokio::test]
async fn test_token_for_unknown_user_is_unauthorized() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    let tokens = fintrack_core::services::TokenService::new(TokenSettings::new(
        b"integration-secret".to_vec(),
        Duration::minutes(30),
    ))
    .unwrap();
    let token = tokens.issue("ghost").unwrap();

    assert!(matches!(
        ctx.auth_service.current_user(&token).await,
        Err(Error::Unauthorized)
    ));
}

// ============================================================================
// Ownership
// ============================================================================

#[tokio::test]
async fn test_foreign_records_are_forbidden() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let (alice, _) = register_and_login(&ctx, "alice").await;
    let (bob, _) = register_and_login(&ctx, "bob").await;

    let category = ctx.category_service.add(&alice, "Food").await.unwrap();
    let tx = ctx
        .transaction_service
        .add(&alice, &TransactionInput::new("Lunch", 12, TransactionType::Expense))
        .await
        .unwrap();
    let savings = ctx
        .savings_service
        .add(&alice, &SavingsInput { amount: 100, optional_notes: None })
        .await
        .unwrap();

    assert!(matches!(ctx.category_service.get(&bob, category.id).await, Err(Error::Forbidden)));
    assert!(matches!(ctx.category_service.delete(&bob, category.id).await, Err(Error::Forbidden)));
    assert!(matches!(ctx.transaction_service.get(&bob, tx.id).await, Err(Error::Forbidden)));
    assert!(matches!(ctx.transaction_service.delete(&bob, tx.id).await, Err(Error::Forbidden)));
    assert!(matches!(ctx.savings_service.get(&bob, savings.id).await, Err(Error::Forbidden)));
    assert!(matches!(ctx.savings_service.delete(&bob, savings.id).await, Err(Error::Forbidden)));

    let update = SavingsUpdate { amount: Some(1), optional_notes: None };
    assert!(matches!(
        ctx.savings_service.update(&bob, savings.id, &update).await,
        Err(Error::Forbidden)
    ));

    // Bob cannot file a transaction under Alice's category
    let input = TransactionInput::new("Sneaky", 5, TransactionType::Expense).with_category(category.id);
    assert!(matches!(ctx.transaction_service.add(&bob, &input).await, Err(Error::Forbidden)));

    // Alice's records are untouched
    assert_eq!(ctx.savings_service.get(&alice, savings.id).await.unwrap().amount, 100);
    assert_eq!(ctx.transaction_service.history(&alice).await.unwrap().len(), 1);
    assert!(ctx.transaction_service.history(&bob).await.unwrap().is_empty());
    assert!(ctx.category_service.list(&bob).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_records_are_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let (alice, _) = register_and_login(&ctx, "alice").await;

    let savings = ctx
        .savings_service
        .add(&alice, &SavingsInput { amount: 50, optional_notes: None })
        .await
        .unwrap();

    ctx.savings_service.delete(&alice, savings.id).await.unwrap();
    assert!(matches!(
        ctx.savings_service.delete(&alice, savings.id).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(ctx.transaction_service.get(&alice, 9999).await, Err(Error::NotFound(_))));
    assert!(matches!(ctx.category_service.delete(&alice, 9999).await, Err(Error::NotFound(_))));
}

// ============================================================================
// Savings
// ============================================================================

#[tokio::test]
async fn test_savings_update_and_total() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let (alice, _) = register_and_login(&ctx, "alice").await;

    assert_eq!(ctx.report_service.total_savings(&alice).await.unwrap(), 0);

    let first = ctx
        .savings_service
        .add(&alice, &SavingsInput { amount: 100, optional_notes: Some("bonus".to_string()) })
        .await
        .unwrap();
    ctx.savings_service
        .add(&alice, &SavingsInput { amount: 50, optional_notes: None })
        .await
        .unwrap();

    let updated = ctx
        .savings_service
        .update(&alice, first.id, &SavingsUpdate { amount: Some(120), optional_notes: None })
        .await
        .unwrap();
    assert_eq!(updated.amount, 120);
    assert_eq!(updated.optional_notes.as_deref(), Some("bonus"));

    let total = ctx.report_service.savings_total(&alice).await.unwrap();
    assert_eq!(total.user, "alice");
    assert_eq!(total.savings, 170);
}

// ============================================================================
// Categories and reports
// ============================================================================

#[tokio::test]
async fn test_deleting_category_uncategorizes_transactions() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let (alice, _) = register_and_login(&ctx, "alice").await;

    let food = ctx.category_service.add(&alice, "Food").await.unwrap();
    let tx = ctx
        .transaction_service
        .add(
            &alice,
            &TransactionInput::new("Groceries", 30, TransactionType::Expense).with_category(food.id),
        )
        .await
        .unwrap();
    assert_eq!(tx.category_name(), "Food");

    ctx.category_service.delete(&alice, food.id).await.unwrap();

    let after = ctx.transaction_service.get(&alice, tx.id).await.unwrap();
    assert!(after.category.is_none());
    assert_eq!(after.category_name(), UNCATEGORIZED);
}

#[tokio::test]
async fn test_monthly_report() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);
    let (alice, _) = register_and_login(&ctx, "alice").await;

    let food = ctx.category_service.add(&alice, "Food").await.unwrap();
    let entries = [
        TransactionInput::new("Salary", 1000, TransactionType::Income).on(date(2024, 6, 1)),
        TransactionInput::new("Groceries", 200, TransactionType::Expense)
            .with_category(food.id)
            .on(date(2024, 6, 3)),
        TransactionInput::new("Bus", 50, TransactionType::Expense).on(date(2024, 6, 20)),
        // Same month, earlier year: still counted
        TransactionInput::new("Old dinner", 25, TransactionType::Expense)
            .with_category(food.id)
            .on(date(2023, 6, 15)),
        // Different month: excluded
        TransactionInput::new("July rent", 500, TransactionType::Expense).on(date(2024, 7, 1)),
    ];
    for input in &entries {
        ctx.transaction_service.add(&alice, input).await.unwrap();
    }
    ctx.savings_service
        .add(&alice, &SavingsInput { amount: 300, optional_notes: None })
        .await
        .unwrap();

    let report = ctx.report_service.monthly_report(&alice, 6).await.unwrap();
    assert_eq!(report.month_name, "June");
    assert_eq!(report.income, 1000);
    assert_eq!(report.expense, 275);
    assert_eq!(report.net, 725);
    assert_eq!(report.total_savings, 300);
    assert_eq!(report.categories.get("Food"), Some(&225));
    assert_eq!(report.categories.get(UNCATEGORIZED), Some(&50));
    assert_eq!(report.categories.len(), 2);

    let html = ctx.report_service.monthly_statement_html(&alice, 6).await.unwrap();
    assert!(html.contains("Groceries"));
    assert!(html.contains("Old dinner"));
    assert!(!html.contains("July rent"));

    assert!(matches!(
        ctx.report_service.monthly_report(&alice, 13).await,
        Err(Error::Validation(_))
    ));
}

#[tokio::test]
async fn test_reopen_keeps_data() {
    let temp_dir = TempDir::new().unwrap();
    {
        let ctx = FintrackContext::new(temp_dir.path()).unwrap();
        ctx.auth_service
            .register(&NewUser::new("alice", "alice@example.com", "pw"))
            .await
            .unwrap();
    }

    let ctx = FintrackContext::new(temp_dir.path()).unwrap();
    let token = ctx.auth_service.login("alice", "pw").await.unwrap();
    assert_eq!(
        ctx.auth_service.current_user(&token.access_token).await.unwrap().username,
        "alice"
    );
    assert!(temp_dir.path().join("settings.json").exists());
}
