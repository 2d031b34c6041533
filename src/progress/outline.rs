use serde::Serialize;
use uuid::Uuid;

use crate::{
    model::{
        DatabaseResult, ModelManager,
        entity::{Lesson, Module},
    },
    web::AuthenticatedUser,
};

/// The slice of a lesson the sequencer cares about.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LessonSummary {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub duration_seconds: Option<i32>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ModuleOutline {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub lessons: Vec<LessonSummary>,
}

/// Ordered Course -> Module -> Lesson tree, built once at the data-access
/// boundary. The module/lesson order here is the authoritative sequence:
/// `(order_index, id)` everywhere, so duplicate indexes still produce a
/// deterministic total order.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CourseOutline {
    pub course_id: Uuid,
    pub modules: Vec<ModuleOutline>,
}

impl CourseOutline {
    /// Normalizes ordering on construction so in-memory built outlines
    /// (tests, callers holding already-fetched rows) behave like loaded ones.
    pub fn new(course_id: Uuid, mut modules: Vec<ModuleOutline>) -> Self {
        modules.sort_by_key(|m| (m.order_index, m.id));
        for module in &mut modules {
            module.lessons.sort_by_key(|l| (l.order_index, l.id));
        }
        Self { course_id, modules }
    }

    pub async fn load(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        course_id: Uuid,
    ) -> DatabaseResult<Self> {
        let modules = Module::all_by_course(mm, actor, course_id).await?;

        let mut outline_modules = Vec::with_capacity(modules.len());
        for module in modules {
            let lessons = Lesson::all_by_module(mm, actor, module.id()).await?;
            outline_modules.push(ModuleOutline {
                id: module.id(),
                title: module.title().to_string(),
                order_index: module.order_index(),
                lessons: lessons
                    .into_iter()
                    .map(|l| LessonSummary {
                        id: l.id(),
                        title: l.title().to_string(),
                        order_index: l.order_index(),
                        duration_seconds: l.duration_seconds(),
                    })
                    .collect(),
            });
        }

        Ok(Self::new(course_id, outline_modules))
    }

    /// Lessons in course order, flattened across modules.
    pub fn flatten(&self) -> Vec<&LessonSummary> {
        self.modules.iter().flat_map(|m| m.lessons.iter()).collect()
    }

    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    pub fn contains(&self, lesson_id: Uuid) -> bool {
        self.modules
            .iter()
            .any(|m| m.lessons.iter().any(|l| l.id == lesson_id))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn lesson(id: Uuid, order_index: i32) -> LessonSummary {
        LessonSummary {
            id,
            title: format!("lesson {order_index}"),
            order_index,
            duration_seconds: None,
        }
    }

    pub fn module(order_index: i32, lessons: Vec<LessonSummary>) -> ModuleOutline {
        ModuleOutline {
            id: Uuid::new_v4(),
            title: format!("module {order_index}"),
            order_index,
            lessons,
        }
    }
}

#[cfg(test)]
mod test {
    use super::test_support::{lesson, module};
    use super::*;

    #[test]
    fn flatten_walks_modules_in_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let outline = CourseOutline::new(
            Uuid::new_v4(),
            vec![
                module(2, vec![lesson(c, 1)]),
                module(1, vec![lesson(a, 1), lesson(b, 2)]),
            ],
        );

        let ids: Vec<Uuid> = outline.flatten().iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![a, b, c]);
        assert_eq!(outline.total_lessons(), 3);
    }

    #[test]
    fn duplicate_order_breaks_ties_by_id() {
        let mut ids = [Uuid::new_v4(), Uuid::new_v4()];
        ids.sort();

        // same order_index, reversed insertion order
        let outline = CourseOutline::new(
            Uuid::new_v4(),
            vec![module(0, vec![lesson(ids[1], 5), lesson(ids[0], 5)])],
        );

        let flattened: Vec<Uuid> = outline.flatten().iter().map(|l| l.id).collect();
        assert_eq!(flattened, ids.to_vec());
    }

    #[test]
    fn contains_and_empty_course() {
        let outline = CourseOutline::new(Uuid::new_v4(), vec![]);
        assert_eq!(outline.total_lessons(), 0);
        assert!(!outline.contains(Uuid::new_v4()));
    }
}
