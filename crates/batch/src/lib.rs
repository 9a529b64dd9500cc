pub mod batch;
pub mod extract;
pub mod logging;
pub mod output;
pub mod progress;
pub mod task_slot;

pub use batch::{discover, BatchDriver, BatchSummary, FailedFile, FileOutcome};
pub use extract::Extractor;
pub use logging::{LineSink, LogContext, LogContextBuilder, LogError};
pub use output::write_output;
pub use progress::{ConsoleProgress, NoProgress, Progress};
pub use task_slot::{SlotGuard, TaskSlot};
