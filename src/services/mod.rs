//! Post and backup workflows on top of the storage backend

mod backup;
mod posts;

pub use backup::{Backup, BackupService};
pub use posts::PostService;
