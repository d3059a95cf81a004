pub mod constraint;
pub mod error;
pub mod sentence;
pub mod verdict;

pub use constraint::{ConstraintSpec, GLUE_VERBS};
pub use error::{ForgeError, Result, classify_http_status, classify_transport};
pub use sentence::{CandidateSentence, FinalSet, RunReport, ValidatedSentence};
pub use verdict::{Verdict, Violation, ViolationKind};
