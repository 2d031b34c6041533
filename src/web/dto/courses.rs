use serde::Serialize;
use uuid::Uuid;

use crate::{model::entity::Course, progress::CourseOutline};

/// A course together with its ordered module/lesson outline.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CourseDetailResponse {
    id: Uuid,
    title: String,
    description: String,
    published: bool,
    created_by: Uuid,
    total_lessons: usize,
    outline: CourseOutline,
}

impl CourseDetailResponse {
    pub fn new(course: Course, outline: CourseOutline) -> Self {
        Self {
            id: course.id(),
            title: course.title().to_string(),
            description: course.description().to_string(),
            published: course.published(),
            created_by: course.created_by(),
            total_lessons: outline.total_lessons(),
            outline,
        }
    }
}
