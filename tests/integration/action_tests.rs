use halcyon::actions::{
    delete_all_but_first, delete_selected, move_to_backup, DeleteConfig, DeleteError, Reviewer,
};
use halcyon::scanner::{traverse, ScanOptions};
use halcyon::signal::CancellationToken;
use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, body: &[u8]) {
    File::create(dir.join(name)).unwrap().write_all(body).unwrap();
}

fn scan(dir: &Path) -> Vec<halcyon::duplicates::DuplicateGroup> {
    let options = ScanOptions::default().with_parallel(false);
    traverse(dir, &options, &CancellationToken::new())
        .unwrap()
        .into_duplicates()
}

#[test]
fn test_scan_then_delete_all_but_first() {
    let dir = tempdir().unwrap();
    write(dir.path(), "invoice.pdf", b"pdfdata");
    write(dir.path(), "invoice (1).pdf", b"pdfdata");
    write(dir.path(), "invoice_copy.pdf", b"pdfdata");

    let groups = scan(dir.path());
    assert_eq!(groups.len(), 1);

    let result = delete_all_but_first(&groups[0].files, &DeleteConfig::permanent());

    assert_eq!(result.success_count(), 2);
    let remaining: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(remaining.len(), 1);

    // A rescan no longer reports the group.
    assert!(scan(dir.path()).is_empty());
}

#[test]
fn test_delete_selected_keeps_one_copy() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"1");
    write(dir.path(), "a copy.txt", b"1");

    let groups = scan(dir.path());
    let err = delete_selected(&groups[0].files, &[1, 0], &DeleteConfig::permanent()).unwrap_err();

    assert!(matches!(err, DeleteError::AllCopiesWouldBeDeleted));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
}

#[test]
fn test_move_group_to_backup() {
    let dir = tempdir().unwrap();
    let scan_root = dir.path().join("data");
    fs::create_dir(&scan_root).unwrap();
    write(&scan_root, "clip.mov", b"frames");
    write(&scan_root, "clip-2.mov", b"frames");
    let backup = dir.path().join("backup");

    let groups = scan(&scan_root);
    let result = move_to_backup(&groups[0].files, &backup).unwrap();

    assert!(result.all_succeeded());
    assert!(backup.join("clip.mov").exists());
    assert!(backup.join("clip-2.mov").exists());
    assert_eq!(fs::read_dir(&scan_root).unwrap().count(), 0);
}

#[test]
fn test_review_session_over_scan_result() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.txt", b"aaa");
    write(dir.path(), "a (1).txt", b"aaa");
    write(dir.path(), "b.txt", b"bb");
    write(dir.path(), "b copy.txt", b"bb");
    write(dir.path(), "b_2.txt", b"bb");

    let groups = scan(dir.path());
    assert_eq!(groups.len(), 2);

    // Skip group "a.txt", delete all but the first in group "b.txt".
    let mut out = Vec::new();
    let summary = Reviewer::new(Cursor::new("5\n3\nyes\n"), &mut out, DeleteConfig::permanent())
        .review_all(groups)
        .unwrap();

    assert_eq!(summary.groups_reviewed, 2);
    assert_eq!(summary.files_deleted, 2);
    assert_eq!(summary.bytes_freed, 4);
    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("a (1).txt").exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("a.txt"));
    assert!(text.contains("Deleted 2 file(s)"));
}
