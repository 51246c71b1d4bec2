use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::cache::ReportCache;
use super::dashboard::DashboardView;
use super::domain::{Report, ReportId, ReportSubmission, VoteKind};
use super::eligibility::{eligible_reports, is_eligible};
use super::intake::{prepare_report, SubmissionError};
use super::repository::{ReportStore, SensorStore, StoreError};
use super::selection::{CursorMove, SessionId, ValidationSession};
use super::voting::{apply_vote, VoteOutcome, VotingRules};

/// Service composing the stores, the local cache, and the consensus rules.
pub struct PeerValidationService<R, S> {
    reports: Arc<R>,
    sensors: Arc<S>,
    cache: Arc<ReportCache>,
    rules: VotingRules,
    sessions: Mutex<HashMap<SessionId, TrackedSession>>,
    session_idle_timeout: Duration,
    vote_locks: Mutex<HashMap<ReportId, Arc<tokio::sync::Mutex<()>>>>,
}

/// Sessions untouched for this long are dropped on the next refresh.
pub const DEFAULT_SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

struct TrackedSession {
    session: ValidationSession,
    last_seen: Instant,
}

impl TrackedSession {
    fn touch(&mut self) -> &mut ValidationSession {
        self.last_seen = Instant::now();
        &mut self.session
    }
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

/// Result of a single vote as reported back to the voter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub report: Report,
    pub outcome: VoteOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

/// What a validator currently sees in their session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub report: Option<Report>,
    pub cursor: usize,
    pub pending: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<&'static str>,
}

/// Vote cast from within a session plus the report shown next.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionVote {
    pub vote: VoteReceipt,
    pub cursor_move: CursorMove,
    pub next: SessionSnapshot,
}

impl<R, S> PeerValidationService<R, S>
where
    R: ReportStore + 'static,
    S: SensorStore + 'static,
{
    pub fn new(reports: Arc<R>, sensors: Arc<S>, rules: VotingRules) -> Self {
        Self {
            reports,
            sensors,
            cache: Arc::new(ReportCache::default()),
            rules,
            sessions: Mutex::new(HashMap::new()),
            session_idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
            vote_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_session_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.session_idle_timeout = idle_timeout;
        self
    }

    pub fn cache(&self) -> &ReportCache {
        &self.cache
    }

    /// Pull a fresh snapshot of reports and sensors into the cache and drop
    /// idle sessions.
    pub async fn refresh(&self) -> Result<(), ValidationServiceError> {
        let expired = self.prune_idle_sessions();
        let reports = self.reports.list().await?;
        let sensors = self.sensors.list().await?;
        debug!(
            reports = reports.len(),
            sensors = sensors.len(),
            expired_sessions = expired,
            "report cache refreshed"
        );
        self.cache.replace(reports, sensors);
        Ok(())
    }

    /// Submit a new flood report; it enters the pool as pending.
    pub async fn submit(
        &self,
        submission: ReportSubmission,
    ) -> Result<Report, ValidationServiceError> {
        let report = prepare_report(submission, Utc::now(), &mut rand::thread_rng())?;
        let stored = self.reports.create(report).await?;
        self.cache.upsert(stored.clone());

        info!(
            report_id = %stored.id,
            location = %stored.location,
            water_level = stored.water_level,
            "report submitted for peer validation"
        );
        Ok(stored)
    }

    pub fn reports(&self) -> Vec<Report> {
        self.cache.reports()
    }

    /// Reports still open for voting, in store order.
    pub fn eligible(&self) -> Vec<Report> {
        eligible_reports(&self.cache.reports(), &self.rules)
    }

    pub fn dashboard(&self) -> DashboardView {
        DashboardView::project(&self.cache.reports(), &self.cache.sensors())
    }

    /// Apply a vote to a report as one read-modify-write against the store.
    ///
    /// Votes on the same report are serialized; the record is re-read from
    /// the store under the lock so concurrent voters cannot lose updates.
    pub async fn cast_vote(
        &self,
        report_id: &ReportId,
        kind: VoteKind,
    ) -> Result<VoteReceipt, ValidationServiceError> {
        let lock = self.vote_lock(report_id);
        let result = {
            let _serialized = lock.lock().await;
            self.cast_vote_locked(report_id, kind).await
        };
        self.release_vote_lock(report_id, &lock);
        result
    }

    async fn cast_vote_locked(
        &self,
        report_id: &ReportId,
        kind: VoteKind,
    ) -> Result<VoteReceipt, ValidationServiceError> {
        let current = self
            .reports
            .fetch(report_id)
            .await?
            .ok_or_else(|| ValidationServiceError::UnknownReport(report_id.clone()))?;

        if !is_eligible(&current, &self.rules) {
            self.cache.upsert(current);
            return Err(ValidationServiceError::NotEligible(report_id.clone()));
        }

        let application = apply_vote(&current, kind, &self.rules);
        let stored = self
            .reports
            .update(report_id, application.report)
            .await?;
        self.cache.upsert(stored.clone());

        info!(
            report_id = %stored.id,
            vote = ?kind,
            upvotes = stored.upvotes,
            downvotes = stored.downvotes,
            outcome = application.outcome.label(),
            "peer vote recorded"
        );

        Ok(VoteReceipt {
            report: stored,
            outcome: application.outcome,
            notice: application.outcome.notice(),
        })
    }

    /// Start a validation session positioned at the first eligible report.
    pub fn open_session(&self) -> SessionSnapshot {
        let session_id = next_session_id();
        let pool = self.eligible();
        let mut session = ValidationSession::start();
        let snapshot = snapshot(&session_id, &mut session, &pool);

        self.lock_sessions().insert(
            session_id.clone(),
            TrackedSession {
                session,
                last_seen: Instant::now(),
            },
        );
        debug!(session_id = %session_id.0, pending = pool.len(), "validation session opened");
        snapshot
    }

    pub fn session(&self, session_id: &SessionId) -> Result<SessionSnapshot, ValidationServiceError> {
        let pool = self.eligible();
        let mut sessions = self.lock_sessions();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ValidationServiceError::UnknownSession(session_id.0.clone()))?
            .touch();
        Ok(snapshot(session_id, session, &pool))
    }

    pub fn active_sessions(&self) -> usize {
        self.lock_sessions().len()
    }

    pub fn close_session(&self, session_id: &SessionId) -> Result<(), ValidationServiceError> {
        self.lock_sessions()
            .remove(session_id)
            .map(|_| ())
            .ok_or_else(|| ValidationServiceError::UnknownSession(session_id.0.clone()))
    }

    /// Vote on the report the session is showing, then move the cursor on.
    pub async fn vote_in_session(
        &self,
        session_id: &SessionId,
        kind: VoteKind,
    ) -> Result<SessionVote, ValidationServiceError> {
        let target = {
            let pool = self.eligible();
            let mut sessions = self.lock_sessions();
            let session = sessions
                .get_mut(session_id)
                .ok_or_else(|| ValidationServiceError::UnknownSession(session_id.0.clone()))?
                .touch();
            session.current(&pool).cloned()
        }
        .ok_or(ValidationServiceError::NoReportAvailable)?;

        let vote = self.cast_vote(&target.id, kind).await?;

        let pool = self.eligible();
        let mut sessions = self.lock_sessions();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| ValidationServiceError::UnknownSession(session_id.0.clone()))?
            .touch();
        let cursor_move = session.advance(pool.len());
        let mut next = snapshot(session_id, session, &pool);
        if next.notice.is_none() {
            next.notice = cursor_move.notice();
        }

        Ok(SessionVote {
            vote,
            cursor_move,
            next,
        })
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<SessionId, TrackedSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prune_idle_sessions(&self) -> usize {
        let mut sessions = self.lock_sessions();
        let before = sessions.len();
        sessions.retain(|_, tracked| tracked.last_seen.elapsed() < self.session_idle_timeout);
        before - sessions.len()
    }

    fn vote_lock(&self, report_id: &ReportId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .vote_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(report_id.clone()).or_default().clone()
    }

    /// Forget the lock once no other voter holds or awaits it.
    fn release_vote_lock(&self, report_id: &ReportId, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .vote_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference in the map, one held by the caller.
        if Arc::strong_count(lock) <= 2 {
            locks.remove(report_id);
        }
    }

    #[cfg(test)]
    pub(crate) fn tracked_vote_locks(&self) -> usize {
        self.vote_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn snapshot(
    session_id: &SessionId,
    session: &mut ValidationSession,
    pool: &[Report],
) -> SessionSnapshot {
    let report = session.current(pool).cloned();
    let notice = report
        .is_none()
        .then_some("No reports pending validation at the moment. Try submitting a new report!");

    SessionSnapshot {
        session_id: session_id.clone(),
        report,
        cursor: session.cursor(),
        pending: pool.len(),
        notice,
    }
}

/// Error raised by the peer validation service.
#[derive(Debug, thiserror::Error)]
pub enum ValidationServiceError {
    #[error(transparent)]
    InvalidSubmission(#[from] SubmissionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("report {0} is no longer accepting votes")]
    NotEligible(ReportId),
    #[error("report {0} does not exist")]
    UnknownReport(ReportId),
    #[error("no reports pending validation")]
    NoReportAvailable,
    #[error("validation session {0} does not exist")]
    UnknownSession(String),
}
