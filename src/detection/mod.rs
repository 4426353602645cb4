//! Issue model, timestamps and the summary classifier

mod result;
mod summary;
mod timestamp;

pub use result::{count_severity, sort_by_timestamp, Issue, IssueKind, Severity};
pub use summary::{classify, OverallStatus, Summary, SummaryClassifier};
pub use timestamp::{format_timestamp, parse_timestamp, serde_hms};
