pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use config::SyncRequest;
pub use core::{
    FileAction, FileOutcome, MatchedFile, OutcomeKind, PatternSet, ProgressEvent,
    ProgressReporter, SyncResult, Synchronizer,
};
pub use error::SyncError;
pub use logging::LogConfig;
