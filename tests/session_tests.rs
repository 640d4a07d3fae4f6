// tests/session_tests.rs
mod common;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use common::{key_store_in, setup};
use oops::{encrypted_path, KeyStore, Mode, ProcessingSession, Scheme, SessionSettings};
use tempfile::{tempdir, TempDir};

fn settings(concurrency: Option<usize>, scheme: Scheme) -> SessionSettings {
    SessionSettings {
        concurrency,
        dry_run_max_delay: Duration::from_millis(5),
        scheme,
    }
}

/// `count` small files named file-N.txt, each holding its own name
fn make_files(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("file-{i}.txt"));
            fs::write(&path, format!("file-{i}.txt")).unwrap();
            path
        })
        .collect()
}

struct Fixture {
    _keys_dir: TempDir,
    data_dir: TempDir,
    keys: KeyStore,
}

fn fixture() -> Fixture {
    setup();
    let keys_dir = tempdir().unwrap();
    let keys = key_store_in(keys_dir.path());
    Fixture {
        _keys_dir: keys_dir,
        data_dir: tempdir().unwrap(),
        keys,
    }
}

#[tokio::test]
async fn test_example_scenario_encrypts_both_files() {
    let fx = fixture();
    let a = fx.data_dir.path().join("a.txt");
    let b = fx.data_dir.path().join("b.txt");
    fs::write(&a, b"Hello, world!").unwrap();
    fs::write(&b, b"").unwrap();

    let session = ProcessingSession::new(vec![a.clone(), b.clone()]);
    let report = session
        .run(Mode::Encrypt, false, &fx.keys, &settings(None, Scheme::SingleBlock))
        .await
        .unwrap();

    assert!(!a.exists() && !b.exists());
    assert_eq!(fs::read(encrypted_path(&a)).unwrap().len(), 128);
    assert_eq!(fs::read(encrypted_path(&b)).unwrap().len(), 128);
    assert_eq!((report.status.done, report.status.errored), (2, 0));
    assert_eq!(session.summary(), "Processed 2 of 2 files. Failed: 0");
}

#[tokio::test]
async fn test_encrypt_then_decrypt_sessions_restore_everything() {
    let fx = fixture();
    let files = make_files(fx.data_dir.path(), 12);

    let encrypt = ProcessingSession::new(files.clone());
    let report = encrypt
        .run(Mode::Encrypt, false, &fx.keys, &settings(Some(4), Scheme::Hybrid))
        .await
        .unwrap();
    assert_eq!((report.status.done, report.status.errored), (12, 0));
    assert!(files.iter().all(|p| !p.exists() && encrypted_path(p).exists()));

    let encrypted: Vec<PathBuf> = files.iter().map(|p| encrypted_path(p)).collect();
    let decrypt = ProcessingSession::new(encrypted);
    let report = decrypt
        .run(Mode::Decrypt, false, &fx.keys, &settings(Some(4), Scheme::Hybrid))
        .await
        .unwrap();
    assert_eq!((report.status.done, report.status.errored), (12, 0));

    for path in &files {
        let expected = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(fs::read_to_string(path).unwrap(), expected);
        assert!(!encrypted_path(path).exists());
    }
}

#[tokio::test]
async fn test_dry_run_counts_everything_and_touches_nothing() {
    setup();
    let data_dir = tempdir().unwrap();
    let files = make_files(data_dir.path(), 6);
    // No key files at all: a dry run must not need them
    let keys = KeyStore::new(data_dir.path().join("nope.pem"), data_dir.path().join("nope.pub"));

    let session = ProcessingSession::new(files.clone());
    let report = session
        .run(Mode::Encrypt, true, &keys, &settings(None, Scheme::Hybrid))
        .await
        .unwrap();

    assert!(report.dry_run);
    assert_eq!((report.status.done, report.status.errored), (6, 0));
    for path in &files {
        let expected = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(fs::read_to_string(path).unwrap(), expected);
        assert!(!encrypted_path(path).exists());
    }
}

#[tokio::test]
async fn test_failures_are_counted_without_stopping_siblings() {
    let fx = fixture();
    let mut files = make_files(fx.data_dir.path(), 3);
    files.push(fx.data_dir.path().join("vanished.txt"));
    let big = fx.data_dir.path().join("big.txt");
    fs::write(&big, vec![0u8; 1024]).unwrap();
    files.push(big.clone());

    let session = ProcessingSession::new(files);
    let report = session
        .run(Mode::Encrypt, false, &fx.keys, &settings(Some(2), Scheme::SingleBlock))
        .await
        .unwrap();

    assert_eq!(report.status.total, 5);
    assert_eq!((report.status.done, report.status.errored), (3, 2));
    assert!(big.exists(), "oversized file stays unencrypted");
    assert_eq!(session.summary(), "Processed 3 of 5 files. Failed: 2");
}

#[tokio::test]
async fn test_missing_key_errors_every_file() {
    setup();
    let data_dir = tempdir().unwrap();
    let files = make_files(data_dir.path(), 4);
    let keys = KeyStore::new(data_dir.path().join("nope.pem"), data_dir.path().join("nope.pub"));

    let session = ProcessingSession::new(files.clone());
    let report = session
        .run(Mode::Encrypt, false, &keys, &settings(None, Scheme::Hybrid))
        .await
        .unwrap();

    assert_eq!((report.status.done, report.status.errored), (0, 4));
    assert!(files.iter().all(|p| p.exists()));
}

#[tokio::test]
async fn test_decrypt_mode_refuses_plain_files() {
    let fx = fixture();
    let files = make_files(fx.data_dir.path(), 3);

    let session = ProcessingSession::new(files.clone());
    let report = session
        .run(Mode::Decrypt, false, &fx.keys, &settings(None, Scheme::Hybrid))
        .await
        .unwrap();

    assert_eq!((report.status.done, report.status.errored), (0, 3));
    assert!(files.iter().all(|p| p.exists()));
}

#[tokio::test]
async fn test_bounded_and_unbounded_runs_agree() {
    let fx = fixture();

    for concurrency in [Some(1), None] {
        let dir = tempdir().unwrap();
        let files = make_files(dir.path(), 9);
        let session = ProcessingSession::new(files);
        let report = session
            .run(Mode::Encrypt, false, &fx.keys, &settings(concurrency, Scheme::Hybrid))
            .await
            .unwrap();
        assert_eq!(
            (report.status.done, report.status.errored),
            (9, 0),
            "concurrency {concurrency:?}"
        );
    }
}

#[tokio::test]
async fn test_session_runs_only_once() {
    let fx = fixture();
    let session = ProcessingSession::new(make_files(fx.data_dir.path(), 2));
    let opts = settings(None, Scheme::Hybrid);

    session.run(Mode::Encrypt, true, &fx.keys, &opts).await.unwrap();
    assert!(session.run(Mode::Encrypt, true, &fx.keys, &opts).await.is_err());
    assert_eq!(session.snapshot().done, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_summary_is_consistent_while_running() {
    let fx = fixture();
    let files = make_files(fx.data_dir.path(), 20);
    let session = Arc::new(ProcessingSession::new(files));
    assert_eq!(session.summary(), "Processed 0 of 20 files. Failed: 0");

    let runner = {
        let session = session.clone();
        let keys = fx.keys.clone();
        tokio::spawn(async move {
            session
                .run(Mode::Encrypt, true, &keys, &settings(Some(3), Scheme::Hybrid))
                .await
        })
    };

    while !runner.is_finished() {
        let snap = session.snapshot();
        assert!(snap.done + snap.errored <= snap.total);
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let report = runner.await.unwrap().unwrap();
    assert_eq!(report.status.done, 20);
    assert_eq!(session.summary(), "Processed 20 of 20 files. Failed: 0");
}

#[tokio::test]
async fn test_run_report_serializes_counts() {
    let fx = fixture();
    let session = ProcessingSession::new(make_files(fx.data_dir.path(), 1));
    let report = session
        .run(Mode::Encrypt, true, &fx.keys, &settings(None, Scheme::Hybrid))
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["mode"], "encrypt");
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["total"], 1);
    assert_eq!(json["done"], 1);
    assert_eq!(json["errored"], 0);
}
