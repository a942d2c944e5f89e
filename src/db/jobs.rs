//! Job lookup, filtered paging, and job writes.

use crate::error::DatabaseError;
use crate::types::{JobFilters, JobKey, JobStatus};
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};

use super::{Database, Job, JobStore, NewJob};

const JOB_COLUMNS: &str = "job_id, role, party_id, name, description, partner, \
     initiator_party_id, status, progress, create_time, start_time, end_time, \
     dsl, runtime_conf";

const TERMINAL_STATUSES: [JobStatus; 4] = [
    JobStatus::Success,
    JobStatus::Failed,
    JobStatus::Timeout,
    JobStatus::Canceled,
];

/// Escape LIKE wildcards so the value matches literally, then wrap it in `%...%`
pub(crate) fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Append `WHERE ...` for every present filter, each matched against its own column
fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &JobFilters) {
    let clauses = [
        ("job_id", &filters.job_id),
        ("party_id", &filters.party_id),
        ("partner", &filters.partner),
        ("description", &filters.description),
    ];

    let mut first = true;
    for (column, value) in clauses {
        let Some(value) = value else { continue };
        builder.push(if first { " WHERE " } else { " AND " });
        first = false;
        builder
            .push(column)
            .push(" LIKE ")
            .push_bind(like_pattern(value))
            .push(" ESCAPE '\\'");
    }
}

impl Database {
    /// Insert a new job row
    pub async fn insert_job(&self, job: &NewJob) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO t_job (
                job_id, role, party_id, name, description, partner,
                initiator_party_id, status, progress, create_time,
                dsl, runtime_conf
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)
            "#,
        )
        .bind(&job.key.job_id)
        .bind(&job.key.role)
        .bind(&job.key.party_id)
        .bind(&job.name)
        .bind(&job.description)
        .bind(&job.partner)
        .bind(&job.initiator_party_id)
        .bind(job.status.persisted())
        .bind(job.create_time)
        .bind(&job.dsl)
        .bind(&job.runtime_conf)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(Error::Database(
                DatabaseError::ConstraintViolation(format!("job {} already exists", job.key)),
            )),
            Err(e) => Err(Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert job: {}",
                e
            )))),
        }
    }

    /// Record a status/progress change
    ///
    /// The start time is set the first time the job leaves `waiting`. A
    /// terminal status also sets the end time to `now_ms` if none was given.
    pub async fn update_job_progress(
        &self,
        key: &JobKey,
        status: &JobStatus,
        progress: i32,
        now_ms: i64,
    ) -> Result<()> {
        let started = !matches!(status, JobStatus::Waiting);
        let end_time = status.is_terminal().then_some(now_ms);

        let result = sqlx::query(
            r#"
            UPDATE t_job
            SET status = ?,
                progress = ?,
                start_time = CASE WHEN start_time IS NULL AND ? THEN ? ELSE start_time END,
                end_time = COALESCE(end_time, ?)
            WHERE job_id = ? AND role = ? AND party_id = ?
            "#,
        )
        .bind(status.persisted())
        .bind(progress)
        .bind(started)
        .bind(now_ms)
        .bind(end_time)
        .bind(&key.job_id)
        .bind(&key.role)
        .bind(&key.party_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to update job progress: {}",
                e
            )))
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("job {}", key)));
        }
        Ok(())
    }

    /// Delete a job row; returns whether a row was removed
    pub async fn delete_job(&self, key: &JobKey) -> Result<bool> {
        let result = sqlx::query("DELETE FROM t_job WHERE job_id = ? AND role = ? AND party_id = ?")
            .bind(&key.job_id)
            .bind(&key.role)
            .bind(&key.party_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to delete job: {}",
                    e
                )))
            })?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl JobStore for Database {
    async fn find_job(&self, key: &JobKey) -> Result<Option<Job>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder
            .push(JOB_COLUMNS)
            .push(" FROM t_job WHERE job_id = ")
            .push_bind(&key.job_id)
            .push(" AND role = ")
            .push_bind(&key.role)
            .push(" AND party_id = ")
            .push_bind(&key.party_id);

        let row = builder
            .build_query_as::<Job>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to get job: {}",
                    e
                )))
            })?;

        Ok(row)
    }

    async fn query_paged_jobs(
        &self,
        filters: &JobFilters,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Job>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder.push(JOB_COLUMNS).push(" FROM t_job");
        push_filters(&mut builder, filters);
        builder
            .push(" ORDER BY create_time DESC, job_id ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = builder
            .build_query_as::<Job>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to query jobs: {}",
                    e
                )))
            })?;

        Ok(rows)
    }

    async fn count_jobs(&self, filters: &JobFilters) -> Result<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM t_job");
        push_filters(&mut builder, filters);

        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to count jobs: {}",
                    e
                )))
            })?;

        Ok(count)
    }

    async fn query_job_status(&self) -> Result<Vec<Job>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder
            .push(JOB_COLUMNS)
            .push(" FROM t_job WHERE status NOT IN (");
        let mut terminal = builder.separated(", ");
        for status in TERMINAL_STATUSES {
            terminal.push_bind(status.persisted().to_string());
        }
        builder.push(") ORDER BY create_time DESC, job_id ASC");

        let rows = builder
            .build_query_as::<Job>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to query job status: {}",
                    e
                )))
            })?;

        Ok(rows)
    }
}
