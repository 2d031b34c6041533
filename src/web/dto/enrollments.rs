use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::entity::{Enrollment, EnrollmentStatus, LessonProgress},
    progress::CourseOutline,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct EnrollBody {
    pub course_id: Uuid,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LessonProgressView {
    id: Uuid,
    title: String,
    order_index: i32,
    duration_seconds: Option<i32>,
    is_completed: bool,
    last_position: i32,
    watch_time: i32,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ModuleProgressView {
    id: Uuid,
    title: String,
    order_index: i32,
    lessons: Vec<LessonProgressView>,
}

/// One enrollment unfolded over its course outline, with the student's
/// state on every lesson (NotStarted lessons simply have no stored row).
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EnrollmentDetailResponse {
    id: Uuid,
    course_id: Uuid,
    status: EnrollmentStatus,
    progress: i32,
    enrolled_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    modules: Vec<ModuleProgressView>,
}

impl EnrollmentDetailResponse {
    pub fn new(
        enrollment: &Enrollment,
        outline: CourseOutline,
        progress_rows: Vec<LessonProgress>,
    ) -> Self {
        let by_lesson: HashMap<Uuid, LessonProgress> = progress_rows
            .into_iter()
            .map(|row| (row.lesson_id(), row))
            .collect();

        let modules = outline
            .modules
            .into_iter()
            .map(|module| ModuleProgressView {
                id: module.id,
                title: module.title,
                order_index: module.order_index,
                lessons: module
                    .lessons
                    .into_iter()
                    .map(|lesson| {
                        let row = by_lesson.get(&lesson.id);
                        LessonProgressView {
                            id: lesson.id,
                            title: lesson.title,
                            order_index: lesson.order_index,
                            duration_seconds: lesson.duration_seconds,
                            is_completed: row.map(LessonProgress::is_completed).unwrap_or(false),
                            last_position: row.map(LessonProgress::last_position).unwrap_or(0),
                            watch_time: row.map(LessonProgress::watch_time).unwrap_or(0),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: enrollment.id(),
            course_id: enrollment.course_id(),
            status: enrollment.status(),
            progress: enrollment.progress(),
            enrolled_at: *enrollment.enrolled_at(),
            completed_at: enrollment.completed_at().copied(),
            modules,
        }
    }
}
