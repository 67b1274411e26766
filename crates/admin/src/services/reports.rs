//! Dashboard rollups and the filtered report snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use crate::db::{ReportRepository, RepositoryError};
use crate::models::{DashboardChartData, FullReport, MonthlyPoint, ReportFilters, SubjectSlice};

/// Months shown on the dashboard chart.
pub const CHART_MONTHS: u32 = 6;

/// Subjects shown on the pie chart.
pub const TOP_SUBJECTS: usize = 5;

/// Pie-chart colors, assigned in rank order.
pub const PALETTE: [&str; 5] = ["#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6"];

/// One calendar month, both bounds inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthWindow {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The trailing `count` calendar months ending with the month of `now`,
/// oldest first.
#[must_use]
pub fn month_windows(now: DateTime<Utc>, count: u32) -> Vec<MonthWindow> {
    let Some(current) = NaiveDate::from_ymd_opt(now.year(), now.month(), 1) else {
        return Vec::new();
    };

    (0..count)
        .rev()
        .filter_map(|back| {
            let first = current.checked_sub_months(Months::new(back))?;
            let next = first.checked_add_months(Months::new(1))?;
            let start = first.and_time(NaiveTime::MIN).and_utc();
            let end = next.and_time(NaiveTime::MIN).and_utc() - Duration::microseconds(1);
            Some(MonthWindow {
                label: first.format("%b").to_string(),
                start,
                end,
            })
        })
        .collect()
}

/// Month-over-month growth as a whole percentage.
///
/// A previous count of zero is treated as one; halves round up.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn growth_percent(previous: i64, current: i64) -> i64 {
    let ratio = (current - previous) as f64 / previous.max(1) as f64;
    (ratio * 100.0 + 0.5).floor() as i64
}

/// Tally subjects across students, keeping the [`TOP_SUBJECTS`] most common.
///
/// Ties keep first-seen order. Colors come from [`PALETTE`] by rank.
#[must_use]
pub fn tally_subjects(subject_lists: &[Vec<String>]) -> Vec<SubjectSlice> {
    let mut order: Vec<(&str, i64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for subject in subject_lists.iter().flatten() {
        match index.get(subject.as_str()) {
            Some(&i) => {
                if let Some(entry) = order.get_mut(i) {
                    entry.1 += 1;
                }
            }
            None => {
                index.insert(subject.as_str(), order.len());
                order.push((subject.as_str(), 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));

    order
        .into_iter()
        .take(TOP_SUBJECTS)
        .zip(PALETTE.into_iter().cycle())
        .map(|((name, count), color)| SubjectSlice {
            name: name.to_string(),
            count,
            color,
        })
        .collect()
}

/// Report service.
pub struct ReportService<'a> {
    reports: ReportRepository<'a>,
}

impl<'a> ReportService<'a> {
    /// Create a new report service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            reports: ReportRepository::new(pool),
        }
    }

    /// Monthly creation counts, top subjects, and student growth.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if a count query fails.
    #[instrument(skip(self))]
    pub async fn dashboard_chart(
        &self,
        now: DateTime<Utc>,
    ) -> Result<DashboardChartData, RepositoryError> {
        let mut monthly_data = Vec::new();
        for window in month_windows(now, CHART_MONTHS) {
            let counts = self
                .reports
                .count_created_between(window.start, window.end)
                .await?;
            monthly_data.push(MonthlyPoint {
                month: window.label,
                students: counts.students,
                teachers: counts.teachers,
                requests: counts.requests,
            });
        }

        let current = monthly_data.last().map_or(0, |m| m.students);
        let previous = monthly_data.iter().rev().nth(1).map_or(0, |m| m.students);

        let subjects = self.reports.all_student_subjects().await?;

        Ok(DashboardChartData {
            monthly_data,
            subject_data: tally_subjects(&subjects),
            growth_percent: growth_percent(previous, current),
        })
    }

    /// The four filtered collections, or all-empty if anything fails.
    ///
    /// Failures are logged and swallowed so the report view always renders.
    #[instrument(skip(self))]
    pub async fn full_report<E: std::fmt::Display + std::fmt::Debug>(
        &self,
        filters: Result<ReportFilters, E>,
    ) -> FullReport {
        let filters = match filters {
            Ok(filters) => filters.normalized(),
            Err(e) => {
                tracing::warn!(error = %e, "Invalid report filters, returning empty report");
                return FullReport::default();
            }
        };

        let result = tokio::try_join!(
            self.reports.students(&filters),
            self.reports.teachers(&filters),
            self.reports.applications(&filters),
            self.reports.tuition_requests(&filters),
        );

        match result {
            Ok((students, teachers, applications, tuition_requests)) => FullReport {
                students,
                teachers,
                applications,
                tuition_requests,
            },
            Err(e) => {
                tracing::error!(error = %e, "Report query failed, returning empty report");
                FullReport::default()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn subjects(lists: &[&[&str]]) -> Vec<Vec<String>> {
        lists
            .iter()
            .map(|l| l.iter().map(ToString::to_string).collect())
            .collect()
    }

    #[test]
    fn test_growth_percent() {
        assert_eq!(growth_percent(0, 0), 0);
        assert_eq!(growth_percent(0, 5), 500);
        assert_eq!(growth_percent(4, 5), 25);
        assert_eq!(growth_percent(5, 0), -100);
        assert_eq!(growth_percent(3, 4), 33);
        assert_eq!(growth_percent(3, 5), 67);
        // halves round up
        assert_eq!(growth_percent(8, 9), 13);
    }

    #[test]
    fn test_month_windows_span_year_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 0).unwrap();
        let windows = month_windows(now, 6);

        let labels: Vec<_> = windows.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(labels, ["Sep", "Oct", "Nov", "Dec", "Jan", "Feb"]);

        let first = windows.first().unwrap();
        assert_eq!(first.start, Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap());
        assert_eq!(
            first.end,
            Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap() - Duration::microseconds(1)
        );
    }

    #[test]
    fn test_month_windows_are_contiguous() {
        let now = Utc.with_ymd_and_hms(2026, 7, 31, 23, 59, 59).unwrap();
        let windows = month_windows(now, 6);
        assert_eq!(windows.len(), 6);
        for pair in windows.windows(2) {
            let [a, b] = pair else { unreachable!() };
            assert_eq!(a.end + Duration::microseconds(1), b.start);
        }
        assert!(windows.last().unwrap().end >= now);
    }

    #[test]
    fn test_tally_subjects_top_five_with_palette() {
        let lists = subjects(&[
            &["Math", "English"],
            &["Math", "Science"],
            &["Math", "English", "Nepali"],
            &["Physics", "Chemistry", "Accountancy"],
        ]);
        let slices = tally_subjects(&lists);

        assert_eq!(slices.len(), 5);
        let names: Vec<_> = slices.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Math", "English", "Science", "Nepali", "Physics"]);
        assert_eq!(slices.first().unwrap().count, 3);
        let colors: Vec<_> = slices.iter().map(|s| s.color).collect();
        assert_eq!(colors, PALETTE);
    }

    #[test]
    fn test_tally_subjects_empty() {
        assert!(tally_subjects(&[]).is_empty());
        assert!(tally_subjects(&subjects(&[&[], &[]])).is_empty());
    }

    #[test]
    fn test_tally_subjects_fewer_than_palette() {
        let slices = tally_subjects(&subjects(&[&["Math"], &["English"], &["Math"]]));
        assert_eq!(slices.len(), 2);
        assert_eq!(slices.first().unwrap().color, "#3b82f6");
        assert_eq!(slices.get(1).unwrap().color, "#10b981");
    }
}
