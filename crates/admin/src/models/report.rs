//! Dashboard and report payloads.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use tutorlink_core::{ApplicationStatus, Gender, TuitionRequestStatus};

use super::{ApplicationDetail, Student, Teacher, TuitionRequestDetail};

/// One month on the dashboard chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    /// Short month name, e.g. `"Mar"`.
    pub month: String,
    pub students: i64,
    pub teachers: i64,
    pub requests: i64,
}

/// A pie-chart segment for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectSlice {
    pub name: String,
    pub count: i64,
    pub color: &'static str,
}

/// Everything the dashboard chart renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardChartData {
    /// Oldest month first.
    pub monthly_data: Vec<MonthlyPoint>,
    pub subject_data: Vec<SubjectSlice>,
    pub growth_percent: i64,
}

/// Headline counters for the dashboard cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: i64,
    pub total_teachers: i64,
    pub approved_teachers: i64,
    pub active_requests: i64,
    pub pending_applications: i64,
    pub unread_notifications: i64,
}

/// Optional report filters, all taken from the query string.
///
/// `from` and `to` are inclusive calendar days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportFilters {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub student_gender: Option<Gender>,
    pub teacher_gender: Option<Gender>,
    pub application_status: Option<ApplicationStatus>,
    pub request_status: Option<TuitionRequestStatus>,
}

impl ReportFilters {
    /// Drop blank location strings so `?province=` means "any".
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.province = self.province.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        self.district = self.district.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());
        self
    }
}

/// A filtered snapshot of all four record kinds.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullReport {
    pub students: Vec<Student>,
    pub teachers: Vec<Teacher>,
    pub applications: Vec<ApplicationDetail>,
    pub tuition_requests: Vec<TuitionRequestDetail>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_from_query_string() {
        let filters: ReportFilters = serde_json::from_value(serde_json::json!({
            "from": "2026-01-01",
            "province": "  ",
            "teacherGender": "female",
            "requestStatus": "active"
        }))
        .unwrap();
        let filters = filters.normalized();

        assert_eq!(filters.from, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert!(filters.province.is_none());
        assert_eq!(filters.teacher_gender, Some(Gender::Female));
        assert_eq!(filters.request_status, Some(TuitionRequestStatus::Active));
    }

    #[test]
    fn test_empty_report_serializes_four_arrays() {
        let json = serde_json::to_value(FullReport::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "students": [],
                "teachers": [],
                "applications": [],
                "tuitionRequests": []
            })
        );
    }
}
