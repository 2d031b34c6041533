use serde::Serialize;

use crate::model::entity::{CoursePerformanceRow, DailyEnrollmentRow, EnrollmentTotalsRow};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    enrollments: EnrollmentTotalsRow,
    courses: Vec<CoursePerformanceRow>,
    total_watch_time_seconds: i64,
    daily_enrollments: Vec<DailyEnrollmentRow>,
}

impl DashboardResponse {
    pub fn new(
        enrollments: EnrollmentTotalsRow,
        courses: Vec<CoursePerformanceRow>,
        total_watch_time_seconds: i64,
        daily_enrollments: Vec<DailyEnrollmentRow>,
    ) -> Self {
        Self {
            enrollments,
            courses,
            total_watch_time_seconds,
            daily_enrollments,
        }
    }
}
