use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::types::{Job, JobStatus};
use crate::core::store::KeyValueStore;

/// Key holding the serialized job list.
pub const JOBS_KEY: &str = "flash_fix_jobs";

const ID_PREFIX: &str = "FIX-";
const RANDOM_ID_MAX: u64 = 9999;
const RANDOM_ID_ATTEMPTS: usize = 64;

/// Canonical, newest-first list of jobs, mirrored to the key-value store.
///
/// The in-memory list is authoritative. A failed write only marks the store
/// dirty; the next mutation rewrites the full snapshot anyway.
pub struct RecordStore {
    store: Arc<dyn KeyValueStore>,
    jobs: Vec<Job>,
    dirty: bool,
}

impl RecordStore {
    /// Read the list persisted under [`JOBS_KEY`]. Missing or unreadable data
    /// yields an empty list.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let jobs = match store.get(JOBS_KEY).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Job>>(&raw) {
                Ok(jobs) => jobs,
                Err(e) => {
                    warn!("Stored job list is unreadable, starting empty: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read stored jobs, starting empty: {}", e);
                Vec::new()
            }
        };
        info!("Loaded {} job(s) from local store", jobs.len());

        Self {
            store,
            jobs,
            dirty: false,
        }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// True when the last snapshot write failed and has not been retried yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub async fn add(&mut self, job: Job) {
        self.jobs.insert(0, job);
        self.persist().await;
    }

    /// Returns whether a job matched. An unknown id leaves everything untouched.
    pub async fn set_status(&mut self, id: &str, status: JobStatus) -> bool {
        let Some(job) = self.jobs.iter_mut().find(|j| j.id == id) else {
            debug!("Status update for unknown job '{}' ignored", id);
            return false;
        };
        job.status = status;
        self.persist().await;
        true
    }

    /// An id in `FIX-<n>` form that no job in the list carries.
    pub fn allocate_id(&self) -> String {
        self.allocate_id_with(&mut rand::thread_rng())
    }

    fn allocate_id_with<R: Rng>(&self, rng: &mut R) -> String {
        let taken: HashSet<&str> = self.jobs.iter().map(|j| j.id.as_str()).collect();
        for _ in 0..RANDOM_ID_ATTEMPTS {
            let candidate = format_job_id(rng.gen_range(0..=RANDOM_ID_MAX));
            if !taken.contains(candidate.as_str()) {
                return candidate;
            }
        }

        // The random range is crowded; step past the highest number in use.
        let highest = self
            .jobs
            .iter()
            .filter_map(|j| parse_job_number(&j.id))
            .max();
        let next = match highest {
            None => 0,
            Some(n) => match n.checked_add(1) {
                Some(next) => next,
                // Top number taken; settle for the lowest free one.
                None => (0..=u64::MAX)
                    .find(|n| !taken.contains(format_job_id(*n).as_str()))
                    .unwrap_or(0),
            },
        };
        format_job_id(next)
    }

    async fn persist(&mut self) {
        let snapshot = match serde_json::to_string(&self.jobs) {
            Ok(s) => s,
            Err(e) => {
                warn!("Could not serialize job list: {}", e);
                self.dirty = true;
                return;
            }
        };

        match self.store.set(JOBS_KEY, &snapshot).await {
            Ok(()) => {
                if self.dirty {
                    info!("Job list persisted again after an earlier failed write");
                }
                self.dirty = false;
            }
            Err(e) => {
                warn!(
                    "Failed to persist {} job(s); keeping them in memory: {}",
                    self.jobs.len(),
                    e
                );
                self.dirty = true;
            }
        }
    }
}

pub fn format_job_id(n: u64) -> String {
    format!("{}{}", ID_PREFIX, n)
}

fn parse_job_number(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::jobs::types::BookingParams;
    use crate::core::store::MemoryStore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn job(id: &str) -> Job {
        let params = BookingParams {
            client_name: format!("Client {}", id),
            client_email: "pm@realty.com".into(),
            address: "123 Main St".into(),
            unit: "4B".into(),
            lockbox: "1234".into(),
            ..Default::default()
        };
        Job::from_booking(
            id.to_string(),
            "1/1/2026, 9:00:00 AM".into(),
            &params,
            Some("#".into()),
        )
    }

    async fn empty_store() -> (Arc<MemoryStore>, RecordStore) {
        let backing = Arc::new(MemoryStore::default());
        let records = RecordStore::load(backing.clone()).await;
        (backing, records)
    }

    #[tokio::test]
    async fn load_without_prior_data_is_empty() {
        let (_, records) = empty_store().await;
        assert!(records.is_empty());
        assert!(!records.is_dirty());
    }

    #[tokio::test]
    async fn load_with_corrupt_data_fails_open() {
        let backing = Arc::new(MemoryStore::with_entry(JOBS_KEY, "{not json"));
        let records = RecordStore::load(backing).await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn add_prepends_and_keeps_count() {
        let (_, mut records) = empty_store().await;
        for n in 0..5 {
            records.add(job(&format!("FIX-{}", n))).await;
            assert_eq!(records.len(), n + 1);
            assert_eq!(records.jobs()[0].id, format!("FIX-{}", n));
        }
        let order: Vec<&str> = records.jobs().iter().map(|j| j.id.as_str()).collect();
        assert_eq!(order, vec!["FIX-4", "FIX-3", "FIX-2", "FIX-1", "FIX-0"]);
    }

    #[tokio::test]
    async fn add_survives_reload() {
        let (backing, mut records) = empty_store().await;
        records.add(job("FIX-1")).await;
        records.add(job("FIX-2")).await;
        let original: Vec<Job> = records.jobs().to_vec();

        let reloaded = RecordStore::load(backing.clone()).await;
        assert_eq!(reloaded.jobs(), original.as_slice());

        let mut reloaded = reloaded;
        reloaded.add(job("FIX-3")).await;
        let after_restart = RecordStore::load(backing).await;
        assert_eq!(after_restart.jobs()[0].id, "FIX-3");
        assert_eq!(&after_restart.jobs()[1..], original.as_slice());
    }

    #[tokio::test]
    async fn set_status_changes_exactly_one_record() {
        let (_, mut records) = empty_store().await;
        records.add(job("FIX-1")).await;
        records.add(job("FIX-2")).await;
        records.add(job("FIX-3")).await;
        let before: Vec<Job> = records.jobs().to_vec();

        assert!(records.set_status("FIX-2", JobStatus::Completed).await);

        for (old, new) in before.iter().zip(records.jobs()) {
            if old.id == "FIX-2" {
                assert_eq!(new.status, JobStatus::Completed);
                assert_eq!(
                    Job {
                        status: old.status,
                        ..new.clone()
                    },
                    *old
                );
            } else {
                assert_eq!(new, old);
            }
        }
    }

    #[tokio::test]
    async fn set_status_allows_backward_moves() {
        let (_, mut records) = empty_store().await;
        records.add(job("FIX-7")).await;
        records.set_status("FIX-7", JobStatus::Completed).await;
        records.set_status("FIX-7", JobStatus::Pending).await;
        assert_eq!(records.get("FIX-7").unwrap().status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn set_status_unknown_id_leaves_snapshot_identical() {
        let (backing, mut records) = empty_store().await;
        records.add(job("FIX-1")).await;
        let before = backing.raw(JOBS_KEY).unwrap();

        assert!(!records.set_status("FIX-404", JobStatus::Completed).await);
        assert_eq!(backing.raw(JOBS_KEY).unwrap(), before);
    }

    #[tokio::test]
    async fn failed_write_keeps_memory_authoritative_and_retries() {
        let (backing, mut records) = empty_store().await;
        backing.set_fail_writes(true);
        records.add(job("FIX-1")).await;
        assert_eq!(records.len(), 1);
        assert!(records.is_dirty());
        assert_eq!(backing.raw(JOBS_KEY), None);

        backing.set_fail_writes(false);
        records.add(job("FIX-2")).await;
        assert!(!records.is_dirty());
        let persisted: Vec<Job> = serde_json::from_str(&backing.raw(JOBS_KEY).unwrap()).unwrap();
        assert_eq!(persisted.len(), 2);
    }

    #[tokio::test]
    async fn allocated_ids_never_collide_with_existing_jobs() {
        let (_, mut records) = empty_store().await;
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let id = records.allocate_id_with(&mut rng);
            assert!(id.starts_with("FIX-"));
            assert!(records.get(&id).is_none(), "duplicate id {}", id);
            records.add(job(&id)).await;
        }
    }

    #[tokio::test]
    async fn crowded_id_space_falls_back_past_highest_number() {
        let (_, mut records) = empty_store().await;
        // Fill the whole random range so every random candidate collides.
        records.jobs = (0..=RANDOM_ID_MAX).map(|n| job(&format_job_id(n))).collect();
        let id = records.allocate_id();
        assert_eq!(id, "FIX-10000");
    }

    #[tokio::test]
    async fn crowded_id_space_with_maximal_id_reuses_lowest_free_number() {
        let (_, mut records) = empty_store().await;
        records.jobs = (0..=RANDOM_ID_MAX).map(|n| job(&format_job_id(n))).collect();
        records.jobs.push(job("FIX-18446744073709551615"));
        let id = records.allocate_id();
        assert_eq!(id, "FIX-10000");
    }

    #[test]
    fn job_numbers_parse_only_fix_prefixed_ids() {
        assert_eq!(parse_job_number("FIX-123"), Some(123));
        assert_eq!(parse_job_number("JOB-123"), None);
        assert_eq!(parse_job_number("FIX-abc"), None);
    }
}
