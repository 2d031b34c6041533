//! Course-progress core: the typed course outline, the lesson sequencer,
//! the percent calculator and the completion state machine. Everything here
//! takes the acting user explicitly; nothing reads ambient session state.

mod calculator;
pub use calculator::completion_percent;

mod error;
pub use error::{ProgressError, ProgressResult};

mod outline;
pub use outline::{CourseOutline, LessonSummary, ModuleOutline};

mod sequencer;
pub use sequencer::{SequencePosition, locate};

mod service;
pub use service::{CompletionUpdate, mark_lesson_complete, mark_lesson_incomplete, record_playback};
