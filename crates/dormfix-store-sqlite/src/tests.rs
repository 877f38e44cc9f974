//! Integration tests for `SqliteKv` against in-memory and on-disk databases.

use std::{path::PathBuf, sync::mpsc, thread, time::Duration};

use dormfix_core::{
  client::Client,
  fixtures::{DEMO_STUDENT_PASSWORD, DEMO_STUDENTS, default_admin},
  issue::{Category, IssueId, NewIssue, Severity},
  mirror::{ISSUES_KEY, KeyValue, SESSION_KEY, STUDENTS_KEY},
  session::Session,
};

use crate::{Error, SqliteKv};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn kv() -> SqliteKv { SqliteKv::open_in_memory().expect("in-memory mirror") }

fn temp_db(name: &str) -> PathBuf {
  let path = std::env::temp_dir().join(format!("dormfix-{name}-{}.db", std::process::id()));
  let _ = std::fs::remove_file(&path);
  path
}

// ─── Raw key-value behaviour ─────────────────────────────────────────────────

#[test]
fn get_missing_returns_none() {
  assert_eq!(kv().get("nope").unwrap(), None);
}

#[test]
fn set_then_get() {
  let kv = kv();
  kv.set("a", "1").unwrap();
  assert_eq!(kv.get("a").unwrap().as_deref(), Some("1"));
}

#[test]
fn set_overwrites() {
  let kv = kv();
  kv.set("a", "1").unwrap();
  kv.set("a", "2").unwrap();
  assert_eq!(kv.get("a").unwrap().as_deref(), Some("2"));
  assert_eq!(kv.keys().unwrap(), vec!["a".to_string()]);
}

#[test]
fn remove_is_idempotent() {
  let kv = kv();
  kv.set("a", "1").unwrap();
  kv.remove("a").unwrap();
  kv.remove("a").unwrap();
  assert_eq!(kv.get("a").unwrap(), None);
}

#[test]
fn values_survive_reopen() {
  let path = temp_db("reopen");
  {
    let kv = SqliteKv::open(&path).unwrap();
    kv.set("greeting", "{\"hello\":true}").unwrap();
  }
  let kv = SqliteKv::open(&path).unwrap();
  assert_eq!(kv.get("greeting").unwrap().as_deref(), Some("{\"hello\":true}"));
  drop(kv);
  let _ = std::fs::remove_file(&path);
}

#[test]
fn newer_schema_is_refused() {
  let path = temp_db("future");
  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 99;").unwrap();
  }
  assert!(matches!(SqliteKv::open(&path), Err(Error::SchemaVersion { found: 99, .. })));
  let _ = std::fs::remove_file(&path);
}

fn remove_db(path: &PathBuf) {
  for suffix in ["", "-wal", "-shm"] {
    let mut name = path.clone().into_os_string();
    name.push(suffix);
    let _ = std::fs::remove_file(name);
  }
}

// ─── Transactions ────────────────────────────────────────────────────────────

#[test]
fn failed_transaction_rolls_back() {
  let kv = kv();
  kv.set("kept", "1").unwrap();
  let result: Result<(), BoxError> = kv.transaction(|kv| {
    kv.set("kept", "2")?;
    kv.set("extra", "x")?;
    Err("abandoned".into())
  });
  assert!(result.is_err());
  assert_eq!(kv.get("kept").unwrap().as_deref(), Some("1"));
  assert_eq!(kv.get("extra").unwrap(), None);
}

#[test]
fn transaction_commits_every_write() {
  let kv = kv();
  let value: Result<u8, BoxError> = kv.transaction(|kv| {
    kv.set("a", "1")?;
    kv.set("b", "2")?;
    Ok(7)
  });
  assert_eq!(value.unwrap(), 7);
  assert_eq!(kv.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
}

// ─── Client mirroring ────────────────────────────────────────────────────────

#[test]
fn client_state_round_trips() {
  let kv = kv();
  let mut client = Client::restore(&kv, default_admin().unwrap(), true).unwrap();
  client.login_student(DEMO_STUDENTS[0], DEMO_STUDENT_PASSWORD).unwrap();
  let filed = client
    .report(NewIssue::new(Category::Cleaning, "sticky floor", Severity::Medium))
    .unwrap();
  client.persist(&kv).unwrap();

  assert_eq!(kv.keys().unwrap(), vec![ISSUES_KEY, SESSION_KEY, STUDENTS_KEY]);

  let mut restored = Client::restore(&kv, default_admin().unwrap(), true).unwrap();
  assert_eq!(restored.session().user().unwrap().student_id.as_str(), DEMO_STUDENTS[0]);
  assert_eq!(restored.desk().get_issue(filed.id).unwrap(), &filed);

  restored.logout();
  restored.persist(&kv).unwrap();
  assert_eq!(kv.get(SESSION_KEY).unwrap(), None);
  let again = Client::restore(&kv, default_admin().unwrap(), true).unwrap();
  assert_eq!(again.session(), &Session::None);
}

#[test]
fn ids_keep_counting_across_processes() {
  let kv = kv();
  let mut client = Client::restore(&kv, default_admin().unwrap(), true).unwrap();
  client.login_student(DEMO_STUDENTS[1], DEMO_STUDENT_PASSWORD).unwrap();
  let first = client.report(NewIssue::new(Category::Other, "one", Severity::Low)).unwrap();
  client.persist(&kv).unwrap();

  let mut client = Client::restore(&kv, default_admin().unwrap(), true).unwrap();
  let second = client.report(NewIssue::new(Category::Other, "two", Severity::Low)).unwrap();
  assert_eq!(first.id.to_string(), "MFU-009");
  assert_eq!(second.id.to_string(), "MFU-010");
}

fn report_in_transaction(kv: &SqliteKv, text: &str, pause: impl FnOnce()) -> IssueId {
  let admin = default_admin().unwrap();
  kv.transaction(|kv| -> Result<IssueId, BoxError> {
    let mut client = Client::restore(kv, admin, true)?;
    pause();
    let issue = client.report(NewIssue::new(Category::Other, text, Severity::Low))?;
    client.persist(kv)?;
    Ok(issue.id)
  })
  .unwrap()
}

#[test]
fn overlapping_runs_on_one_file_keep_every_report() {
  let path = temp_db("overlap");

  // Seed the file with a logged-in student so neither run hashes a password
  // while it holds the write lock.
  {
    let kv = SqliteKv::open(&path).unwrap();
    let mut client = Client::restore(&kv, default_admin().unwrap(), true).unwrap();
    client.login_student(DEMO_STUDENTS[0], DEMO_STUDENT_PASSWORD).unwrap();
    client.persist(&kv).unwrap();
  }

  let a = SqliteKv::open(&path).unwrap();
  let b = SqliteKv::open(&path).unwrap();
  let (restored_tx, restored_rx) = mpsc::channel();

  // `a` restores, then holds its transaction open while `b` starts.
  let first = thread::spawn(move || {
    report_in_transaction(&a, "from a", || {
      restored_tx.send(()).unwrap();
      thread::sleep(Duration::from_millis(200));
    })
  });
  restored_rx.recv().unwrap();
  let second = report_in_transaction(&b, "from b", || {});
  let first = first.join().unwrap();

  assert_ne!(first, second);
  let client = Client::restore(&b, default_admin().unwrap(), true).unwrap();
  assert_eq!(client.desk().issues().len(), 10);
  assert_eq!(client.desk().get_issue(first).unwrap().description, "from a");
  assert_eq!(client.desk().get_issue(second).unwrap().description, "from b");

  drop(b);
  remove_db(&path);
}
