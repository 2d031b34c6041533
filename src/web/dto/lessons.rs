use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    model::entity::{EnrollmentStatus, Lesson, LessonProgress},
    progress::{CompletionUpdate, SequencePosition},
};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LessonNeighbor {
    id: Uuid,
    title: String,
}

/// The student lesson page: content, where the lesson sits in the course
/// sequence, and the student's own playback/completion state.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LessonViewResponse {
    id: Uuid,
    module_id: Uuid,
    title: String,
    content: String,
    video_url: Option<String>,
    duration_seconds: Option<i32>,
    enrollment_id: Uuid,
    sequence_index: usize,
    sequence_total: usize,
    previous: Option<LessonNeighbor>,
    next: Option<LessonNeighbor>,
    is_completed: bool,
    last_position: i32,
    watch_time: i32,
}

impl LessonViewResponse {
    pub fn new(
        lesson: Lesson,
        enrollment_id: Uuid,
        position: &SequencePosition<'_>,
        progress: Option<&LessonProgress>,
    ) -> Self {
        let neighbor = |l: &crate::progress::LessonSummary| LessonNeighbor {
            id: l.id,
            title: l.title.clone(),
        };

        Self {
            id: lesson.id(),
            module_id: lesson.module_id(),
            title: lesson.title().to_string(),
            content: lesson.content().to_string(),
            video_url: lesson.video_url().map(String::from),
            duration_seconds: lesson.duration_seconds(),
            enrollment_id,
            sequence_index: position.index,
            sequence_total: position.total,
            previous: position.previous.map(neighbor),
            next: position.next.map(neighbor),
            is_completed: progress.map(LessonProgress::is_completed).unwrap_or(false),
            last_position: progress.map(LessonProgress::last_position).unwrap_or(0),
            watch_time: progress.map(LessonProgress::watch_time).unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PlaybackUpdateBody {
    pub position_seconds: i32,
    /// Seconds actually watched since the previous report.
    #[serde(default)]
    pub watched_delta_seconds: i32,
}

/// Outcome of a completion toggle, mirrored back to the player UI.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CompletionResponse {
    enrollment_id: Uuid,
    progress: i32,
    status: EnrollmentStatus,
    newly_completed: bool,
    certificate_number: Option<String>,
}

impl From<CompletionUpdate> for CompletionResponse {
    fn from(update: CompletionUpdate) -> Self {
        Self {
            enrollment_id: update.enrollment_id,
            progress: update.progress,
            status: update.status,
            newly_completed: update.newly_completed,
            certificate_number: update
                .certificate
                .map(|c| c.certificate_number().to_string()),
        }
    }
}
