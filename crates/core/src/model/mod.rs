mod grade;
mod ids;
mod options;
mod session;
mod word;

pub use grade::{Grade, InvalidGrade, Tally};
pub use ids::{GroupId, OwnerId, ParseIdError, SessionId};
pub use options::{Direction, HintsMode, ParseOptionError, SessionDuration, Strategy};
pub use session::{GroupRef, SessionRecordError, TrainingParams, TrainingSession};
pub use word::{DirectionStats, WordError, WordSnapshot, WordStats};
