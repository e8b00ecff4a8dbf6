//! Import job records and the board that merges poll results into them.
//!
//! The board is pure state: the async poller in `sheetport-client` fetches
//! a [`JobStatus`] per job each cycle and hands the whole batch to
//! [`JobBoard::apply_cycle`], which decides whether polling continues.

use serde::Serialize;

use crate::error::CoreError;
use crate::models::{JobStatus, SubmitResponse};
use crate::types::JobId;

// ---------------------------------------------------------------------------
// Status names
// ---------------------------------------------------------------------------

/// Local status given to a job between submission and its first poll.
pub const JOB_STATUS_PENDING: &str = "pending";
pub const JOB_STATUS_COMPLETED: &str = "completed";
pub const JOB_STATUS_FAILED: &str = "failed";

/// Statuses after which a job never changes again.
pub const TERMINAL_STATUSES: &[&str] = &[JOB_STATUS_COMPLETED, JOB_STATUS_FAILED];

/// Whether `status` is one of [`TERMINAL_STATUSES`].
pub fn is_terminal(status: Option<&str>) -> bool {
    status.is_some_and(|s| TERMINAL_STATUSES.contains(&s))
}

// ---------------------------------------------------------------------------
// Job id set
// ---------------------------------------------------------------------------

/// Ordered, de-duplicated, non-empty set of job ids from a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobIdSet(Vec<JobId>);

impl JobIdSet {
    /// Build a set from raw ids.
    ///
    /// Blank ids are dropped and duplicates keep their first position.
    /// Fails when nothing usable remains.
    pub fn new<I>(ids: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = JobId>,
    {
        let mut unique: Vec<JobId> = Vec::new();
        for id in ids {
            if !id.trim().is_empty() && !unique.contains(&id) {
                unique.push(id);
            }
        }

        if unique.is_empty() {
            return Err(CoreError::UnexpectedResponse(
                "response did not contain job_id(s)".to_string(),
            ));
        }
        Ok(Self(unique))
    }

    /// Normalise a submit response.
    ///
    /// The backend sends either a `job_ids` array or a single `job_id`; the
    /// array wins when it holds at least one id.
    pub fn from_submit(response: SubmitResponse) -> Result<Self, CoreError> {
        match response.job_ids {
            Some(ids) if !ids.is_empty() => Self::new(ids),
            _ => Self::new(response.job_id),
        }
    }

    pub fn as_slice(&self) -> &[JobId] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JobId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never `true` for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a JobIdSet {
    type Item = &'a JobId;
    type IntoIter = std::slice::Iter<'a, JobId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Client-side view of one submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRecord {
    pub id: JobId,
    /// `None` once the backend reported a job without a status.
    pub status: Option<String>,
    pub processed: u64,
    /// `0` while the backend does not yet know the row count.
    pub total: u64,
    pub filename: Option<String>,
    pub error_message: Option<String>,
}

impl JobRecord {
    /// A freshly accepted job that has not been polled yet.
    pub fn pending(id: JobId) -> Self {
        Self {
            id,
            status: Some(JOB_STATUS_PENDING.to_string()),
            processed: 0,
            total: 0,
            filename: None,
            error_message: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        is_terminal(self.status.as_deref())
    }

    /// Completion percentage, or `None` while the total is unknown.
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let pct = (self.processed.min(self.total) * 100) / self.total;
        Some(pct as u8)
    }

    /// Overwrite this record with the latest poll result.
    fn merge(&mut self, latest: &JobStatus) {
        self.status = latest.status.clone();
        self.processed = latest.processed_rows;
        self.total = latest.total_rows;
        self.filename = latest.filename.clone();
        self.error_message = latest.error_message.clone();
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// What the poller should do after a merged cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// At least one job is still running.
    Continue,
    /// Every job reached a terminal status.
    Finished {
        /// Error message of the first failed job that carries one.
        error: Option<String>,
    },
}

/// The set of job records owned by one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobBoard {
    jobs: Vec<JobRecord>,
}

impl JobBoard {
    /// Seed one pending record per submitted id, in submission order.
    pub fn new(ids: &JobIdSet) -> Self {
        Self {
            jobs: ids.iter().cloned().map(JobRecord::pending).collect(),
        }
    }

    pub fn jobs(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn get(&self, id: &str) -> Option<&JobRecord> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Merge one complete poll cycle.
    ///
    /// Each result replaces the record with the same id; records without a
    /// result are left alone and results for unknown ids are ignored. The
    /// cycle finishes polling only when every result is terminal.
    pub fn apply_cycle(&mut self, results: &[JobStatus]) -> CycleOutcome {
        for latest in results {
            if let Some(record) = self.jobs.iter_mut().find(|j| j.id == latest.id) {
                record.merge(latest);
            }
        }

        let all_done = results.iter().all(|r| is_terminal(r.status.as_deref()));
        if !all_done {
            return CycleOutcome::Continue;
        }

        let error = results
            .iter()
            .filter(|r| r.status.as_deref() == Some(JOB_STATUS_FAILED))
            .find_map(|r| r.error_message.clone());

        CycleOutcome::Finished { error }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn status(id: &str, s: &str) -> JobStatus {
        JobStatus {
            id: id.to_string(),
            status: Some(s.to_string()),
            processed_rows: 0,
            total_rows: 0,
            filename: None,
            error_message: None,
        }
    }

    fn ids(raw: &[&str]) -> JobIdSet {
        JobIdSet::new(raw.iter().map(|s| s.to_string())).unwrap()
    }

    // -- JobIdSet --

    #[test]
    fn submit_with_job_ids_array() {
        let set = JobIdSet::from_submit(SubmitResponse {
            job_ids: Some(vec!["a".into(), "b".into()]),
            job_id: None,
        })
        .unwrap();
        assert_eq!(set.as_slice(), ["a", "b"]);
    }

    #[test]
    fn submit_with_single_job_id() {
        let set = JobIdSet::from_submit(SubmitResponse {
            job_ids: None,
            job_id: Some("only".into()),
        })
        .unwrap();
        assert_eq!(set.as_slice(), ["only"]);
    }

    #[test]
    fn empty_job_ids_array_falls_back_to_job_id() {
        let set = JobIdSet::from_submit(SubmitResponse {
            job_ids: Some(vec![]),
            job_id: Some("x".into()),
        })
        .unwrap();
        assert_eq!(set.as_slice(), ["x"]);
    }

    #[test]
    fn submit_without_ids_is_rejected() {
        assert_matches!(
            JobIdSet::from_submit(SubmitResponse::default()),
            Err(CoreError::UnexpectedResponse(msg)) if msg.contains("job_id")
        );
    }

    #[test]
    fn duplicate_and_blank_ids_are_dropped() {
        let set = JobIdSet::new(vec!["a".into(), " ".into(), "b".into(), "a".into()]).unwrap();
        assert_eq!(set.as_slice(), ["a", "b"]);
        assert_eq!(set.len(), 2);
    }

    // -- JobRecord --

    #[test]
    fn terminal_statuses() {
        assert!(is_terminal(Some("completed")));
        assert!(is_terminal(Some("failed")));
        assert!(!is_terminal(Some("running")));
        assert!(!is_terminal(Some("pending")));
        assert!(!is_terminal(None));
    }

    #[test]
    fn percent_unknown_when_total_is_zero() {
        let record = JobRecord::pending("a".into());
        assert_eq!(record.percent(), None);
    }

    #[test]
    fn percent_is_capped() {
        let mut record = JobRecord::pending("a".into());
        record.processed = 150;
        record.total = 100;
        assert_eq!(record.percent(), Some(100));
        record.processed = 37;
        assert_eq!(record.percent(), Some(37));
    }

    // -- JobBoard --

    #[test]
    fn new_board_is_pending_in_order() {
        let board = JobBoard::new(&ids(&["b", "a"]));
        let jobs = board.jobs();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, "b");
        assert_eq!(jobs[1].id, "a");
        assert!(jobs.iter().all(|j| j.status.as_deref() == Some("pending")));
    }

    #[test]
    fn running_jobs_continue() {
        let mut board = JobBoard::new(&ids(&["a", "b"]));
        let outcome = board.apply_cycle(&[status("a", "running"), status("b", "completed")]);
        assert_eq!(outcome, CycleOutcome::Continue);
        assert_eq!(board.get("b").unwrap().status.as_deref(), Some("completed"));
    }

    #[test]
    fn all_terminal_finishes_with_failure_message() {
        let mut board = JobBoard::new(&ids(&["a", "b"]));
        board.apply_cycle(&[status("a", "running"), status("b", "running")]);

        let mut failed = status("b", "failed");
        failed.error_message = Some("bad header".into());
        let outcome = board.apply_cycle(&[status("a", "completed"), failed]);

        assert_eq!(
            outcome,
            CycleOutcome::Finished {
                error: Some("bad header".into())
            }
        );
        assert_eq!(
            board.get("b").unwrap().error_message.as_deref(),
            Some("bad header")
        );
    }

    #[test]
    fn failed_without_message_finishes_cleanly() {
        let mut board = JobBoard::new(&ids(&["a"]));
        let outcome = board.apply_cycle(&[status("a", "failed")]);
        assert_eq!(outcome, CycleOutcome::Finished { error: None });
    }

    #[test]
    fn merge_replaces_counts_and_filename() {
        let mut board = JobBoard::new(&ids(&["a"]));
        let mut latest = status("a", "running");
        latest.processed_rows = 10;
        latest.total_rows = 40;
        latest.filename = Some("a.xlsx".into());
        board.apply_cycle(&[latest]);

        let record = board.get("a").unwrap();
        assert_eq!(record.processed, 10);
        assert_eq!(record.total, 40);
        assert_eq!(record.filename.as_deref(), Some("a.xlsx"));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut board = JobBoard::new(&ids(&["a"]));
        board.apply_cycle(&[status("zzz", "completed"), status("a", "running")]);
        assert_eq!(board.jobs().len(), 1);
        assert!(board.get("zzz").is_none());
    }

    #[test]
    fn missing_status_keeps_polling() {
        let mut board = JobBoard::new(&ids(&["a"]));
        let mut latest = status("a", "x");
        latest.status = None;
        assert_eq!(board.apply_cycle(&[latest]), CycleOutcome::Continue);
    }
}
