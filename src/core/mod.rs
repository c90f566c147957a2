pub mod engine;
pub mod pattern;
pub mod progress;
pub mod report;
pub mod resolver;
pub mod scanner;

pub use engine::Synchronizer;
pub use pattern::PatternSet;
pub use progress::{ProgressEvent, ProgressReporter};
pub use report::{Aggregator, FileOutcome, OutcomeKind, SyncResult};
pub use resolver::FileAction;
pub use scanner::{FileScanner, MatchedFile};
