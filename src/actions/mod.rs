//! Actions on duplicate groups.
//!
//! - Deletion to the system trash (default, recoverable) or permanently
//! - Moving a group into a backup directory
//! - The interactive review loop that offers these per group
//!
//! Every destructive path keeps at least one member of a group unless the
//! operator moves the whole group to a backup directory.
//!
//! ```no_run
//! use halcyon::actions::{delete_selected, DeleteConfig};
//! # let files: Vec<halcyon::scanner::FileRecord> = Vec::new();
//!
//! let result = delete_selected(&files, &[1, 2], &DeleteConfig::trash()).unwrap();
//! println!("{}", result.summary());
//! ```

pub mod backup;
pub mod delete;
pub mod review;

pub use backup::{move_to_backup, BackupError, BackupResult, MovedFile};
pub use delete::{
    delete_all_but_first, delete_file, delete_selected, verify_unchanged, BatchDeleteResult,
    DeleteConfig, DeleteError, DeleteResult,
};
pub use review::{
    parse_indices, GroupAction, IndexError, ReviewOutcome, ReviewSummary, Reviewer,
};
