//! Read-only aggregate and report queries.
//!
//! Filtered report queries are assembled with [`sqlx::QueryBuilder`] so each
//! entity only receives the filters that apply to it: location and gender
//! filters touch students and teachers, status filters touch applications
//! and tuition requests, and the date range applies to every entity through
//! its own timestamp column.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::RepositoryError;
use super::{applications, students, teachers, tuition_requests};
use crate::models::{
    ApplicationDetail, DashboardStats, ReportFilters, Student, Teacher, TuitionRequestDetail,
};

/// Creation counts for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct MonthCounts {
    pub students: i64,
    pub teachers: i64,
    pub requests: i64,
}

/// Repository for dashboard and report queries.
pub struct ReportRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReportRepository<'a> {
    /// Create a new report repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Count students, teachers and tuition requests created in
    /// `[start, end]`, both ends inclusive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<MonthCounts, RepositoryError> {
        let counts = sqlx::query_as::<_, MonthCounts>(
            r"
            SELECT
                (SELECT COUNT(*) FROM tutorlink.student
                 WHERE created_at BETWEEN $1 AND $2) AS students,
                (SELECT COUNT(*) FROM tutorlink.teacher
                 WHERE created_at BETWEEN $1 AND $2) AS teachers,
                (SELECT COUNT(*) FROM tutorlink.tuition_request
                 WHERE created_at BETWEEN $1 AND $2) AS requests
            ",
        )
        .bind(start)
        .bind(end)
        .fetch_one(self.pool)
        .await?;

        Ok(counts)
    }

    /// Every student's subject list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_student_subjects(&self) -> Result<Vec<Vec<String>>, RepositoryError> {
        let subjects = sqlx::query_scalar::<_, Vec<String>>("SELECT subjects FROM tutorlink.student")
            .fetch_all(self.pool)
            .await?;

        Ok(subjects)
    }

    /// Headline totals for the dashboard cards.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<DashboardStats, RepositoryError> {
        let stats = sqlx::query_as::<_, DashboardStats>(
            r"
            SELECT
                (SELECT COUNT(*) FROM tutorlink.student) AS total_students,
                (SELECT COUNT(*) FROM tutorlink.teacher) AS total_teachers,
                (SELECT COUNT(*) FROM tutorlink.teacher WHERE is_approved) AS approved_teachers,
                (SELECT COUNT(*) FROM tutorlink.tuition_request
                 WHERE status = 'active') AS active_requests,
                (SELECT COUNT(*) FROM tutorlink.application
                 WHERE status = 'pending') AS pending_applications,
                (SELECT COUNT(*) FROM tutorlink.notification
                 WHERE NOT is_read) AS unread_notifications
            ",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(stats)
    }

    /// Students matching the report filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn students(&self, filters: &ReportFilters) -> Result<Vec<Student>, RepositoryError> {
        let rows = students_query(filters)
            .build_query_as::<Student>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Teachers matching the report filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn teachers(&self, filters: &ReportFilters) -> Result<Vec<Teacher>, RepositoryError> {
        let rows = teachers_query(filters)
            .build_query_as::<Teacher>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Applications matching the report filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn applications(
        &self,
        filters: &ReportFilters,
    ) -> Result<Vec<ApplicationDetail>, RepositoryError> {
        let rows = applications_query(filters)
            .build_query_as::<ApplicationDetail>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Tuition requests matching the report filters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn tuition_requests(
        &self,
        filters: &ReportFilters,
    ) -> Result<Vec<TuitionRequestDetail>, RepositoryError> {
        let rows = tuition_requests_query(filters)
            .build_query_as::<TuitionRequestDetail>()
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }
}

// =============================================================================
// Query construction
// =============================================================================

/// Start of `day` in UTC.
fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// Append `column >= from` and `column < to + 1 day`, making `to` inclusive.
fn push_date_range(qb: &mut QueryBuilder<'_, Postgres>, column: &str, filters: &ReportFilters) {
    if let Some(from) = filters.from {
        qb.push(format_args!(" AND {column} >= ")).push_bind(day_start(from));
    }
    if let Some(next) = filters.to.and_then(|to| to.checked_add_days(Days::new(1))) {
        qb.push(format_args!(" AND {column} < ")).push_bind(day_start(next));
    }
}

fn push_location(qb: &mut QueryBuilder<'_, Postgres>, filters: &ReportFilters) {
    if let Some(province) = &filters.province {
        qb.push(" AND province = ").push_bind(province.clone());
    }
    if let Some(district) = &filters.district {
        qb.push(" AND district = ").push_bind(district.clone());
    }
}

pub(crate) fn students_query(filters: &ReportFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM tutorlink.student WHERE TRUE",
        students::COLUMNS
    ));
    push_date_range(&mut qb, "created_at", filters);
    push_location(&mut qb, filters);
    if let Some(gender) = filters.student_gender {
        qb.push(" AND gender = ").push_bind(gender);
    }
    qb.push(" ORDER BY created_at DESC, id DESC");
    qb
}

pub(crate) fn teachers_query(filters: &ReportFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM tutorlink.teacher WHERE TRUE",
        teachers::COLUMNS
    ));
    push_date_range(&mut qb, "created_at", filters);
    push_location(&mut qb, filters);
    if let Some(gender) = filters.teacher_gender {
        qb.push(" AND gender = ").push_bind(gender);
    }
    qb.push(" ORDER BY created_at DESC, id DESC");
    qb
}

pub(crate) fn applications_query(filters: &ReportFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(applications::DETAIL_SELECT);
    qb.push(" WHERE TRUE");
    push_date_range(&mut qb, "a.applied_at", filters);
    if let Some(status) = filters.application_status {
        qb.push(" AND a.status = ").push_bind(status);
    }
    qb.push(" ORDER BY a.applied_at DESC, a.id DESC");
    qb
}

pub(crate) fn tuition_requests_query(filters: &ReportFilters) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(tuition_requests::DETAIL_SELECT);
    qb.push(" WHERE TRUE");
    push_date_range(&mut qb, "r.created_at", filters);
    if let Some(status) = filters.request_status {
        qb.push(" AND r.status = ").push_bind(status);
    }
    qb.push(" ORDER BY r.created_at DESC, r.id DESC");
    qb
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tutorlink_core::{ApplicationStatus, Gender};

    fn squash(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_unfiltered_queries_have_no_binds() {
        let filters = ReportFilters::default();
        for qb in [
            students_query(&filters),
            teachers_query(&filters),
            applications_query(&filters),
            tuition_requests_query(&filters),
        ] {
            assert!(!qb.sql().contains('$'), "{}", qb.sql());
        }
    }

    #[test]
    fn test_province_only_filters_people() {
        let filters = ReportFilters {
            province: Some("Bagmati".to_string()),
            ..ReportFilters::default()
        };

        assert!(students_query(&filters).sql().contains("AND province = $1"));
        assert!(teachers_query(&filters).sql().contains("AND province = $1"));
        assert!(!applications_query(&filters).sql().contains("AND province"));
        assert!(!tuition_requests_query(&filters).sql().contains("AND province"));
    }

    #[test]
    fn test_gender_filters_are_entity_specific() {
        let filters = ReportFilters {
            student_gender: Some(Gender::Female),
            ..ReportFilters::default()
        };
        assert!(students_query(&filters).sql().contains("AND gender = $1"));
        assert!(!teachers_query(&filters).sql().contains("AND gender"));
    }

    #[test]
    fn test_date_range_uses_entity_timestamp() {
        let filters = ReportFilters {
            from: NaiveDate::from_ymd_opt(2026, 3, 1),
            to: NaiveDate::from_ymd_opt(2026, 3, 31),
            application_status: Some(ApplicationStatus::Approved),
            ..ReportFilters::default()
        };

        let sql = squash(applications_query(&filters).sql());
        assert!(sql.contains(
            "WHERE TRUE AND a.applied_at >= $1 AND a.applied_at < $2 AND a.status = $3 \
             ORDER BY a.applied_at DESC"
        ));

        let sql = squash(students_query(&filters).sql());
        assert!(sql.contains("AND created_at >= $1 AND created_at < $2 ORDER BY"));
    }

    #[test]
    fn test_day_start() {
        let start = day_start(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert_eq!(start.to_rfc3339(), "2026-02-28T00:00:00+00:00");
    }
}
