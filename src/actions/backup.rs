//! Moving duplicate group members into a backup directory.
//!
//! Every member is moved to `<backup_dir>/<base name>`. A plain rename is
//! tried first; across filesystems the file is copied and the original
//! removed. Existing files in the backup directory are never overwritten.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::scanner::FileRecord;

/// Error type for backup operations.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The backup directory could not be created.
    #[error("failed to create backup directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source path has no file name component.
    #[error("no file name in path: {0}")]
    NoFileName(PathBuf),

    /// A file with the same name already exists in the backup directory.
    #[error("backup target already exists: {0}")]
    TargetExists(PathBuf),

    /// Moving the file failed.
    #[error("failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A file that was moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovedFile {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Outcome of moving a whole group.
#[derive(Debug, Default)]
pub struct BackupResult {
    pub moved: Vec<MovedFile>,
    pub failures: Vec<(PathBuf, String)>,
}

impl BackupResult {
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            format!("Moved {} file(s) to backup", self.moved.len())
        } else {
            format!(
                "Moved {} file(s) to backup, {} failed",
                self.moved.len(),
                self.failures.len()
            )
        }
    }
}

/// Create the backup directory (and parents) if needed.
///
/// # Errors
///
/// `CreateDir` if the directory cannot be created.
pub fn prepare_backup_dir(dir: &Path) -> Result<(), BackupError> {
    fs::create_dir_all(dir).map_err(|source| BackupError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Move a single file into `backup_dir`, keeping its base name.
///
/// # Errors
///
/// `NoFileName`, `TargetExists` or `Move`.
pub fn move_file(source: &Path, backup_dir: &Path) -> Result<PathBuf, BackupError> {
    let name = source
        .file_name()
        .ok_or_else(|| BackupError::NoFileName(source.to_path_buf()))?;
    let target = backup_dir.join(name);

    if target.symlink_metadata().is_ok() {
        return Err(BackupError::TargetExists(target));
    }

    let move_err = |source_err: io::Error| BackupError::Move {
        from: source.to_path_buf(),
        to: target.clone(),
        source: source_err,
    };

    if let Err(e) = fs::rename(source, &target) {
        // Rename cannot cross filesystems.
        if !source.exists() {
            return Err(move_err(e));
        }
        log::debug!(
            "rename {} failed ({}), copying instead",
            source.display(),
            e
        );
        fs::copy(source, &target).map_err(move_err)?;
        if let Err(e) = fs::remove_file(source) {
            let _ = fs::remove_file(&target);
            return Err(move_err(e));
        }
    }

    log::info!("Moved {} -> {}", source.display(), target.display());
    Ok(target)
}

/// Move every member of a group into `backup_dir`.
///
/// The directory is created first; failure to create it aborts the whole
/// operation. Individual move failures are collected.
///
/// # Errors
///
/// `CreateDir` if the backup directory cannot be created.
pub fn move_to_backup(files: &[FileRecord], backup_dir: &Path) -> Result<BackupResult, BackupError> {
    prepare_backup_dir(backup_dir)?;

    let mut result = BackupResult::default();
    for record in files {
        match move_file(&record.path, backup_dir) {
            Ok(to) => result.moved.push(MovedFile {
                from: record.path.clone(),
                to,
            }),
            Err(e) => {
                log::warn!("{}", e);
                result.failures.push((record.path.clone(), e.to_string()));
            }
        }
    }

    log::info!("{}", result.summary());
    Ok(result)
}
