//! SQLite implementation of the due-state committer.

mod committer;

pub use committer::DueStateCommitter;
