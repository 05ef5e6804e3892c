//! Concurrent access tests
//!
//! Many tasks share one repository. Every operation takes the connection
//! guard for its own scope, so concurrent writers must all land and
//! per-user totals must stay exact.
//!
//! Run with: cargo test --test concurrent_access_test -- --nocapture

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use fintrack_core::adapters::duckdb::DuckDbRepository;
use fintrack_core::domain::{SavingsInput, TransactionInput, TransactionType};
use fintrack_core::ports::Repository;

/// Number of concurrent tasks per user
const TASK_COUNT: usize = 6;

/// Number of writes per task
const ITERATIONS_PER_TASK: usize = 5;

fn create_test_repo(temp_dir: &TempDir) -> Arc<DuckDbRepository> {
    let repo = DuckDbRepository::new(&temp_dir.path().join("test_concurrent.duckdb"))
        .expect("Failed to create repository");
    repo.ensure_schema().expect("Failed to initialize schema");
    Arc::new(repo)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_savings_writes_keep_totals_exact() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);

    let alice = repo.create_user("alice", "a@example.com", "hash", today()).await.unwrap();
    let bob = repo.create_user("bob", "b@example.com", "hash", today()).await.unwrap();

    let mut handles = Vec::new();
    for task_id in 0..TASK_COUNT {
        for user_id in [alice.id, bob.id] {
            let repo = Arc::clone(&repo);
            handles.push(tokio::spawn(async move {
                for i in 0..ITERATIONS_PER_TASK {
                    let input = SavingsInput {
                        amount: (task_id * 10 + i) as i64,
                        optional_notes: None,
                    };
                    repo.add_savings(user_id, &input, today()).await?;
                }
                Ok::<_, fintrack_core::Error>(())
            }));
        }
    }

    for handle in handles {
        handle.await.expect("task panicked").expect("write failed");
    }

    let expected: i64 = (0..TASK_COUNT)
        .flat_map(|t| (0..ITERATIONS_PER_TASK).map(move |i| (t * 10 + i) as i64))
        .sum();

    assert_eq!(repo.total_savings(alice.id).await.unwrap(), expected);
    assert_eq!(repo.total_savings(bob.id).await.unwrap(), expected);
    assert_eq!(
        repo.get_savings(alice.id).await.unwrap().len(),
        TASK_COUNT * ITERATIONS_PER_TASK
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_transaction_ids_are_unique() {
    let temp_dir = TempDir::new().unwrap();
    let repo = create_test_repo(&temp_dir);
    let user_id = repo
        .create_user("alice", "a@example.com", "hash", today())
        .await
        .unwrap()
        .id;

    let mut handles = Vec::new();
    for task_id in 0..TASK_COUNT {
        let repo = Arc::clone(&repo);
        handles.push(tokio::spawn(async move {
            let mut ids = Vec::new();
            for i in 0..ITERATIONS_PER_TASK {
                let input = TransactionInput::new(
                    format!("t{}_i{}", task_id, i),
                    1,
                    TransactionType::Expense,
                );
                ids.push(repo.add_transaction(user_id, &input, today()).await?.id);
            }
            Ok::<_, fintrack_core::Error>(ids)
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.extend(handle.await.expect("task panicked").expect("write failed"));
    }
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), TASK_COUNT * ITERATIONS_PER_TASK);
    assert_eq!(
        repo.get_transactions(user_id).await.unwrap().len(),
        TASK_COUNT * ITERATIONS_PER_TASK
    );
}

#[tokio::test]
async fn test_reopen_after_drop() {
    let temp_dir = TempDir::new().unwrap();
    {
        let repo = create_test_repo(&temp_dir);
        repo.create_user("alice", "a@example.com", "hash", today()).await.unwrap();
    }

    let repo = create_test_repo(&temp_dir);
    let user = repo.get_user_by_username("alice").await.unwrap();
    assert!(user.is_some());
    assert!(repo.db_path().is_some());
}
