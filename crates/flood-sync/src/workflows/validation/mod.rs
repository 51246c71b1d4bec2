//! Peer validation of citizen flood reports.
//!
//! Reports enter as pending, collect up/down votes from peers, and settle as
//! validated or rejected once the consensus thresholds in [`VotingRules`] are
//! met. Validators walk the eligible pool through a [`ValidationSession`];
//! validated reports feed the [`DashboardView`].

pub mod cache;
pub mod dashboard;
pub mod domain;
pub mod eligibility;
pub mod intake;
pub mod refresh;
pub mod repository;
pub mod router;
pub mod selection;
pub mod service;
pub mod voting;

#[cfg(test)]
mod tests;

pub use cache::ReportCache;
pub use dashboard::{validated_reports, DashboardView, ReportCard, ReportMarker, SensorChartPoint};
pub use domain::{
    NewReport, Report, ReportId, ReportStatus, ReportSubmission, SensorReading, VoteKind,
    MAP_CENTER, PLACEHOLDER_IMAGE_URL,
};
pub use eligibility::{eligible_reports, is_eligible};
pub use intake::{prepare_report, SubmissionError};
pub use refresh::{spawn_refresh, RefreshHandle};
pub use repository::{ReportStore, SensorStore, StoreError};
pub use router::{validation_router, VoteRequest};
pub use selection::{CursorMove, SessionId, ValidationSession};
pub use service::{
    PeerValidationService, SessionSnapshot, SessionVote, ValidationServiceError, VoteReceipt,
    DEFAULT_SESSION_IDLE_TIMEOUT,
};
pub use voting::{apply_vote, VoteApplication, VoteOutcome, VotingRules};
