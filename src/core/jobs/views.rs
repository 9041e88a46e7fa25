use serde::Serialize;

use super::types::{Job, JobStatus};

pub const DEFAULT_RECENT_JOBS: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub total: usize,
}

impl StatusCounts {
    pub fn tally(jobs: &[Job]) -> Self {
        jobs.iter().fold(Self::default(), |mut counts, job| {
            match job.status {
                JobStatus::Pending => counts.pending += 1,
                JobStatus::InProgress => counts.in_progress += 1,
                JobStatus::Completed => counts.completed += 1,
            }
            counts.total += 1;
            counts
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub counts: StatusCounts,
    pub recent: Vec<Job>,
}

pub fn dashboard(jobs: &[Job], recent: usize) -> DashboardSummary {
    DashboardSummary {
        counts: StatusCounts::tally(jobs),
        recent: jobs.iter().take(recent).cloned().collect(),
    }
}

/// The job log in stored order, optionally narrowed to one status.
pub fn history(jobs: &[Job], status: Option<JobStatus>) -> Vec<Job> {
    jobs.iter()
        .filter(|j| status.is_none_or(|s| j.status == s))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::jobs::types::BookingParams;

    fn job(id: &str, status: JobStatus) -> Job {
        let mut job = Job::from_booking(
            id.into(),
            "1/1/2026, 9:00:00 AM".into(),
            &BookingParams::default(),
            None,
        );
        job.status = status;
        job
    }

    fn sample() -> Vec<Job> {
        vec![
            job("FIX-5", JobStatus::Pending),
            job("FIX-4", JobStatus::InProgress),
            job("FIX-3", JobStatus::Pending),
            job("FIX-2", JobStatus::Completed),
            job("FIX-1", JobStatus::Pending),
        ]
    }

    #[test]
    fn tally_counts_each_status() {
        let counts = StatusCounts::tally(&sample());
        assert_eq!(
            counts,
            StatusCounts {
                pending: 3,
                in_progress: 1,
                completed: 1,
                total: 5,
            }
        );
    }

    #[test]
    fn tally_of_empty_list_is_zero() {
        assert_eq!(StatusCounts::tally(&[]), StatusCounts::default());
    }

    #[test]
    fn dashboard_keeps_newest_first() {
        let summary = dashboard(&sample(), 2);
        let ids: Vec<&str> = summary.recent.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["FIX-5", "FIX-4"]);
        assert_eq!(summary.counts.total, 5);
    }

    #[test]
    fn history_filters_without_reordering() {
        let pending = history(&sample(), Some(JobStatus::Pending));
        let ids: Vec<&str> = pending.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["FIX-5", "FIX-3", "FIX-1"]);
        assert_eq!(history(&sample(), None).len(), 5);
    }

    #[test]
    fn summary_serializes_camel_case_counts() {
        let value = serde_json::to_value(dashboard(&sample(), 1)).unwrap();
        assert_eq!(value["counts"]["inProgress"], 1);
        assert_eq!(value["recent"][0]["id"], "FIX-5");
    }
}
