use halcyon::duplicates::GroupKey;
use halcyon::progress::ScanProgress;
use halcyon::scanner::{traverse, ScanOptions, TraversalError, Walker};
use halcyon::signal::CancellationToken;
use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, body: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(&path).unwrap().write_all(body).unwrap();
    path
}

fn document_fixture(dir: &Path) {
    write(dir, "document.txt", b"0123456789");
    write(dir, "document copy.txt", b"0123456789");
    write(dir, "document(1).txt", b"0123456789");
    write(dir, "report.pdf", b"0123456789");
}

fn sequential() -> ScanOptions {
    ScanOptions::default().with_parallel(false)
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();

    let result = traverse(dir.path(), &ScanOptions::default(), &CancellationToken::new()).unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.stats.total_visited, 0);
    assert_eq!(result.duplicate_group_count(), 0);
}

#[test]
fn test_document_scenario() {
    let dir = tempdir().unwrap();
    document_fixture(dir.path());

    let result = traverse(dir.path(), &ScanOptions::default(), &CancellationToken::new()).unwrap();

    let docs = &result.groups[&GroupKey::new("document.txt", 10)];
    assert_eq!(docs.len(), 3);
    assert_eq!(result.groups[&GroupKey::new("report.pdf", 10)].len(), 1);
    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.stats.total_visited, 4);
    assert_eq!(result.stats.processed, 4);
    assert_eq!(result.stats.skipped, 0);
}

#[test]
fn test_document_scenario_txt_only() {
    let dir = tempdir().unwrap();
    document_fixture(dir.path());

    let options = ScanOptions::default().with_extensions([".txt"]);
    let result = traverse(dir.path(), &options, &CancellationToken::new()).unwrap();

    assert_eq!(result.stats.processed, 3);
    assert_eq!(result.stats.skipped, 1);
    assert!(!result
        .groups
        .contains_key(&GroupKey::new("report.pdf", 10)));
}

#[test]
fn test_extension_match_is_case_sensitive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.TXT", b"x");
    write(dir.path(), "b.txt", b"x");

    let options = ScanOptions::default().with_extensions([".txt"]);
    let result = traverse(dir.path(), &options, &CancellationToken::new()).unwrap();

    assert_eq!(result.stats.processed, 1);
    assert_eq!(result.stats.skipped, 1);
}

#[test]
fn test_grouping_ignores_content() {
    let dir = tempdir().unwrap();
    write(dir.path(), "notes.txt", b"aaaa");
    write(dir.path(), "notes copy.txt", b"bbbb");
    write(dir.path(), "same.txt", b"zzzz");
    write(dir.path(), "other.txt", b"zzzz");

    let result = traverse(dir.path(), &sequential(), &CancellationToken::new()).unwrap();

    let groups: Vec<_> = result.duplicates().collect();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, GroupKey::new("notes.txt", 4));
}

#[test]
fn test_same_name_different_size_not_grouped() {
    let dir = tempdir().unwrap();
    write(dir.path(), "photo.jpg", b"12345");
    write(dir.path(), "photo (2).jpg", b"123456");

    let result = traverse(dir.path(), &sequential(), &CancellationToken::new()).unwrap();

    assert_eq!(result.duplicate_group_count(), 0);
    assert_eq!(result.groups.len(), 2);
}

#[test]
fn test_nested_directories() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a/b/c/deep.txt", b"data");
    write(dir.path(), "x/deep_2.txt", b"data");
    write(dir.path(), "Deep-3.TXT", b"data");

    let result = traverse(dir.path(), &ScanOptions::default(), &CancellationToken::new()).unwrap();

    assert_eq!(result.stats.total_visited, 3);
    assert_eq!(result.groups[&GroupKey::new("deep.txt", 4)].len(), 3);
}

#[test]
fn test_size_bounds_inclusive() {
    let dir = tempdir().unwrap();
    write(dir.path(), "small.bin", &[0; 10]);
    write(dir.path(), "exact_min.bin", &[0; 100]);
    write(dir.path(), "exact_max.bin", &[0; 200]);
    write(dir.path(), "large.bin", &[0; 201]);

    let options = ScanOptions::default().with_size_bounds(Some(100), Some(200));
    let result = traverse(dir.path(), &options, &CancellationToken::new()).unwrap();

    assert_eq!(result.stats.processed, 2);
    assert_eq!(result.stats.skipped, 2);
    assert!(result.stats.is_consistent());
}

#[test]
fn test_zero_bounds_mean_unbounded() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty.txt", b"");
    write(dir.path(), "big.txt", &[1; 4096]);

    let options = ScanOptions::default().with_size_bounds(Some(0), Some(0));
    let result = traverse(dir.path(), &options, &CancellationToken::new()).unwrap();

    assert_eq!(result.stats.processed, 2);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let dir = tempdir().unwrap();
    for i in 0..40 {
        write(dir.path(), &format!("set{}/file.txt", i % 4), b"same");
        write(dir.path(), &format!("set{}/file ({}).txt", i % 4, i), b"same");
        write(dir.path(), &format!("unique_{i}.dat"), &vec![0; i]);
    }

    let token = CancellationToken::new();
    let seq = traverse(dir.path(), &sequential(), &token).unwrap();
    let par = traverse(
        dir.path(),
        &ScanOptions::default().with_concurrency(3),
        &token,
    )
    .unwrap();

    assert_eq!(seq.stats, par.stats);
    let keys = |r: &halcyon::duplicates::ScanResult| r.groups.keys().cloned().collect::<BTreeSet<_>>();
    assert_eq!(keys(&seq), keys(&par));
    for (key, group) in &seq.groups {
        let members = |g: &halcyon::duplicates::DuplicateGroup| {
            g.files.iter().map(|f| f.path.clone()).collect::<BTreeSet<_>>()
        };
        assert_eq!(members(group), members(&par.groups[key]));
    }
}

#[test]
fn test_sequential_order_is_stable() {
    let dir = tempdir().unwrap();
    write(dir.path(), "b/song.mp3", b"la");
    write(dir.path(), "a/song (1).mp3", b"la");
    write(dir.path(), "song copy.mp3", b"la");

    let order = || {
        let result = traverse(dir.path(), &sequential(), &CancellationToken::new()).unwrap();
        result.groups[&GroupKey::new("song.mp3", 2)]
            .files
            .iter()
            .map(|f| f.path.clone())
            .collect::<Vec<_>>()
    };

    let first = order();
    assert_eq!(first.len(), 3);
    assert_eq!(first, order());
}

#[test]
fn test_empty_root_is_configuration_error() {
    let err = traverse(Path::new(""), &ScanOptions::default(), &CancellationToken::new()).unwrap_err();
    assert!(matches!(err, TraversalError::EmptyRoot));
    assert_eq!(err.to_string(), "directory path cannot be empty");
}

#[test]
fn test_missing_root_is_access_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope");

    let err = traverse(&missing, &ScanOptions::default(), &CancellationToken::new()).unwrap_err();

    match err {
        TraversalError::Access { path, .. } => assert_eq!(path, missing),
        other => panic!("expected access error, got {other:?}"),
    }
}

#[test]
fn test_cancelled_scan_returns_no_result() {
    let dir = tempdir().unwrap();
    document_fixture(dir.path());
    let token = CancellationToken::new();
    token.cancel();

    for parallel in [true, false] {
        let options = ScanOptions::default().with_parallel(parallel);
        let err = traverse(dir.path(), &options, &token).unwrap_err();
        assert!(err.is_cancelled());
    }
}

/// Presses "Ctrl+C" once the walk reaches a given entry.
struct InterruptAt {
    token: CancellationToken,
    at: u64,
    last_seen: AtomicU64,
}

impl ScanProgress for InterruptAt {
    fn on_scan_start(&self, _root: &str) {}

    fn on_entry(&self, visited: u64, _path: &str) {
        self.last_seen.store(visited, Ordering::SeqCst);
        if visited == self.at {
            self.token.cancel();
        }
    }

    fn on_scan_end(&self, _visited: u64) {}
}

#[test]
fn test_cancel_during_parallel_scan() {
    let dir = tempdir().unwrap();
    for i in 0..500 {
        write(dir.path(), &format!("batch{}/photo_{i}.jpg", i % 10), b"pixels");
    }

    let token = CancellationToken::new();
    let interrupt = Arc::new(InterruptAt {
        token: token.clone(),
        at: 50,
        last_seen: AtomicU64::new(0),
    });

    let outcome = Walker::new(
        dir.path(),
        ScanOptions::default().with_parallel(true).with_concurrency(4),
    )
    .with_cancellation(token)
    .with_progress(Arc::clone(&interrupt) as Arc<dyn ScanProgress>)
    .traverse();

    assert!(matches!(outcome, Err(TraversalError::Cancelled)));
    // Enumeration stopped right after the interrupt.
    assert_eq!(interrupt.last_seen.load(Ordering::SeqCst), 50);
}

#[test]
fn test_walker_builder_with_timeout() {
    let dir = tempdir().unwrap();
    document_fixture(dir.path());

    let token = CancellationToken::new().with_timeout(std::time::Duration::from_secs(3600));
    let result = Walker::new(dir.path(), ScanOptions::default())
        .with_cancellation(token)
        .traverse()
        .unwrap();

    assert_eq!(result.stats.total_visited, 4);
}

#[cfg(unix)]
#[test]
fn test_symlink_not_followed() {
    let dir = tempdir().unwrap();
    write(dir.path(), "target/inner.txt", b"abc");
    std::os::unix::fs::symlink(dir.path().join("target"), dir.path().join("link")).unwrap();

    let result = traverse(dir.path(), &sequential(), &CancellationToken::new()).unwrap();

    // inner.txt once, plus the link entry itself.
    assert_eq!(result.stats.total_visited, 2);
    assert_eq!(result.groups[&GroupKey::new("inner.txt", 3)].len(), 1);
}
