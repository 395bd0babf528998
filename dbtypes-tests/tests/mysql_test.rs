//! Integration tests for dbtypes with a MySQL testcontainer
//!
//! A single container is shared across all tests using the `ctor` pattern.
//! Tests only read the schema, but run sequentially with `serial_test` so
//! output directories and diagnostics never interleave.
//!
//! Container cleanup:
//! - The `watchdog` feature handles cleanup on CTRL+C or SIGTERM signals
//! - For normal process exit, we use `shutdown_hooks` to signal the container thread to stop
//! - The container lives inside the thread, so it's dropped when the thread exits

mod common;

use ctor::ctor;
use mysql_async::prelude::*;
use serial_test::serial;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::thread::{self, JoinHandle};
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::mysql::Mysql;

use common::{config_for, generate_file, RecordingDiagnostics};
use dbtypes::{DialectName, Generator, Severity};

// Holds the connection URL (container lives in the thread)
static DB_URL: OnceLock<String> = OnceLock::new();
// Flag to signal the container thread to exit
static SHUTDOWN: AtomicBool = AtomicBool::new(false);
// Thread handle for joining on exit
static CONTAINER_THREAD: OnceLock<JoinHandle<()>> = OnceLock::new();

/// Cleanup function called on process exit.
/// Signals the container thread to stop and waits for it to finish.
extern "C" fn cleanup_on_exit() {
    SHUTDOWN.store(true, Ordering::SeqCst);
    // Give the container thread time to clean up
    std::thread::sleep(std::time::Duration::from_millis(500));
}

#[ctor]
fn setup_container() {
    use std::time::Duration;

    shutdown_hooks::add_shutdown_hook(cleanup_on_exit);

    let (ready_tx, ready_rx) = std::sync::mpsc::channel();

    let handle = thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let container: ContainerAsync<Mysql> = Mysql::default().start().await.unwrap();
            let port = container.get_host_port_ipv4(3306).await.unwrap();
            let url = format!("mysql://root@127.0.0.1:{}/test", port);

            // Load the fixture schema
            let pool = mysql_async::Pool::new(url.as_str());
            let mut conn = pool.get_conn().await.unwrap();
            let schema = include_str!("../fixtures/mysql-schema.sql");
            for stmt in schema.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                conn.query_drop(stmt).await.unwrap();
            }
            drop(conn);
            pool.disconnect().await.unwrap();

            ready_tx.send(url).unwrap();

            // Keep container alive until shutdown is signaled.
            while !SHUTDOWN.load(Ordering::Relaxed) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });
    });

    let _ = CONTAINER_THREAD.set(handle);

    let url = ready_rx.recv().unwrap();
    DB_URL.set(url).unwrap();
}

fn get_db_url() -> &'static str {
    DB_URL.get().expect("Container not initialized")
}

#[tokio::test]
#[serial]
async fn test_generate_all_tables() {
    let dir = tempfile::tempdir().unwrap();
    let (summary, text, diagnostics) = generate_file(config_for(get_db_url(), dir.path())).await;

    assert_eq!(summary.dialect, DialectName::Mysql);
    assert_eq!(summary.table_count, 4);
    assert_eq!(
        diagnostics.messages(Severity::Info)[0],
        "No dialect specified. Assuming 'mysql'."
    );

    assert!(text.contains("import type { ColumnType } from \"kysely\";"));
    assert!(text.contains("export type Decimal = ColumnType<"));
    assert!(text.contains("export type Json = ColumnType<"));

    assert!(text.contains("export interface Users {\n"));
    assert!(text.contains("  id: Generated<number>;\n"));
    assert!(text.contains("  /** Login email */\n  email: string;\n"));
    assert!(text.contains("  display_name: string | null;\n"));
    assert!(text.contains("  status: Generated<\"active\" | \"inactive\" | \"banned\">;\n"));
    assert!(text.contains("  balance: Generated<Decimal>;\n"));
    assert!(text.contains("  settings: Json | null;\n"));
    assert!(text.contains("  avatar: Buffer | null;\n"));
    assert!(text.contains("  created_at: Generated<Date>;\n"));

    assert!(text.contains("  body: string | null;\n"));
    assert!(text.contains("  published: Generated<number>;\n"));

    assert!(text.contains(concat!(
        "export interface DB {\n",
        "  audit_log: AuditLog;\n",
        "  posts: Posts;\n",
        "  user_emails: UserEmails;\n",
        "  users: Users;\n",
        "}\n"
    )));

    let success = diagnostics.messages(Severity::Success);
    assert!(success[0].starts_with("Introspected 4 tables and generated "));
}

#[tokio::test]
#[serial]
async fn test_exclude_tables() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(get_db_url(), dir.path());
    config.exclude_tables = "audit_*,user_emails".to_string();

    let (summary, text, _) = generate_file(config).await;

    assert_eq!(summary.table_count, 2);
    assert!(!text.contains("AuditLog"));
    assert!(text.contains("  posts: Posts;\n  users: Users;\n"));
}

#[tokio::test]
#[serial]
async fn test_explicit_dialect_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(get_db_url(), dir.path());
    config.dialect = Some(DialectName::Mysql);

    let (summary, _, diagnostics) = generate_file(config).await;

    assert_eq!(summary.dialect, DialectName::Mysql);
    assert_eq!(diagnostics.messages(Severity::Info)[0], "Using dialect 'mysql'.");
}

#[tokio::test]
#[serial]
async fn test_wrong_dialect_override_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(get_db_url(), dir.path());
    config.dialect = Some(DialectName::Sqlite);
    let diagnostics = RecordingDiagnostics::default();

    let err = Generator::new(config).run(&diagnostics).await.unwrap_err();

    assert_eq!(err.kind(), "IntrospectionError");
    assert_eq!(diagnostics.messages(Severity::Info)[0], "Using dialect 'sqlite'.");
    assert!(!dir.path().join("generated").exists());
}
