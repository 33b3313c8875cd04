use anyhow::Result;
use chrono::{Duration, NaiveDate};
use sqlx::SqlitePool;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::database::models::Booking;
use crate::services::timezone::LocalClock;
use crate::utils::datetime::format_date;
use crate::utils::logging::{log_database_error, log_system_event};

// Daily at 00:05 UTC, after the salon's day has rolled over for positive offsets.
const PURGE_SCHEDULE: &str = "0 5 0 * * *";

/// Which bookings are old enough to be removed.
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub days: i64,
    pub clock: LocalClock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub cutoff: NaiveDate,
    pub removed: u64,
}

impl RetentionPolicy {
    pub fn new(days: i64, clock: LocalClock) -> Self {
        Self { days, clock }
    }

    pub fn cutoff(&self) -> NaiveDate {
        cutoff_for(self.clock.today(), self.days)
    }

    /// Deletes every booking dated before [`cutoff`](Self::cutoff).
    pub async fn purge(&self, pool: &SqlitePool) -> Result<PurgeReport, sqlx::Error> {
        let cutoff = self.cutoff();
        let removed = Booking::delete_before(pool, cutoff).await?;
        Ok(PurgeReport { cutoff, removed })
    }
}

/// Bookings dated strictly before the returned day are expired.
pub fn cutoff_for(today: NaiveDate, days: i64) -> NaiveDate {
    today - Duration::days(days)
}

pub struct RetentionService {
    pool: SqlitePool,
    policy: RetentionPolicy,
    scheduler: JobScheduler,
}

impl RetentionService {
    pub async fn new(pool: SqlitePool, policy: RetentionPolicy) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            pool,
            policy,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        let pool = self.pool.clone();
        let policy = self.policy;

        let purge_job = Job::new_async(PURGE_SCHEDULE, move |_uuid, _l| {
            let pool = pool.clone();
            Box::pin(async move {
                run_purge(&pool, &policy).await;
            })
        })?;

        self.scheduler.add(purge_job).await?;
        self.scheduler.start().await?;

        log_system_event(
            "Retention service started",
            Some(&format!("keeping {} days, purging daily at 00:05 UTC", policy.days)),
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

async fn run_purge(pool: &SqlitePool, policy: &RetentionPolicy) {
    match policy.purge(pool).await {
        Ok(report) => log_system_event(
            "Expired bookings purged",
            Some(&format!(
                "{} removed, cutoff {}",
                report.removed,
                format_date(report.cutoff)
            )),
        ),
        Err(e) => log_database_error("DELETE", "appointments", &e.to_string(), Some("scheduled purge")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_counts_back_whole_days() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert_eq!(cutoff_for(today, 2), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(cutoff_for(today, 0), today);
    }
}
