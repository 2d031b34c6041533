use uuid::Uuid;

use super::outline::{CourseOutline, LessonSummary};

/// Where a lesson sits in the flattened course sequence.
#[derive(Debug)]
pub struct SequencePosition<'a> {
    pub index: usize,
    pub total: usize,
    pub previous: Option<&'a LessonSummary>,
    pub current: &'a LessonSummary,
    pub next: Option<&'a LessonSummary>,
}

/// Finds `lesson_id` in the course sequence and returns its neighbors.
/// `None` when the lesson is not part of the course (callers surface 404).
pub fn locate(outline: &CourseOutline, lesson_id: Uuid) -> Option<SequencePosition<'_>> {
    let sequence = outline.flatten();
    let index = sequence.iter().position(|l| l.id == lesson_id)?;

    Some(SequencePosition {
        index,
        total: sequence.len(),
        previous: index.checked_sub(1).map(|i| sequence[i]),
        current: sequence[index],
        next: sequence.get(index + 1).copied(),
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::progress::outline::test_support::{lesson, module};

    fn three_lesson_course() -> (CourseOutline, [Uuid; 3]) {
        let ids = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
        let outline = CourseOutline::new(
            Uuid::new_v4(),
            vec![
                module(1, vec![lesson(ids[0], 1), lesson(ids[1], 2)]),
                module(2, vec![lesson(ids[2], 1)]),
            ],
        );
        (outline, ids)
    }

    #[test]
    fn first_lesson_has_no_previous() {
        let (outline, ids) = three_lesson_course();
        let pos = locate(&outline, ids[0]).unwrap();

        assert_eq!(pos.index, 0);
        assert_eq!(pos.total, 3);
        assert!(pos.previous.is_none());
        assert_eq!(pos.current.id, ids[0]);
        assert_eq!(pos.next.unwrap().id, ids[1]);
    }

    #[test]
    fn middle_lesson_sees_both_neighbors() {
        let (outline, ids) = three_lesson_course();
        let pos = locate(&outline, ids[1]).unwrap();

        assert_eq!(pos.previous.unwrap().id, ids[0]);
        assert_eq!(pos.current.id, ids[1]);
        // next crosses the module boundary
        assert_eq!(pos.next.unwrap().id, ids[2]);
    }

    #[test]
    fn last_lesson_has_no_next() {
        let (outline, ids) = three_lesson_course();
        let pos = locate(&outline, ids[2]).unwrap();

        assert_eq!(pos.index, 2);
        assert_eq!(pos.previous.unwrap().id, ids[1]);
        assert!(pos.next.is_none());
    }

    #[test]
    fn unknown_lesson_is_none() {
        let (outline, _) = three_lesson_course();
        assert!(locate(&outline, Uuid::new_v4()).is_none());
    }

    #[test]
    fn single_lesson_course_has_no_neighbors() {
        let id = Uuid::new_v4();
        let outline = CourseOutline::new(Uuid::new_v4(), vec![module(1, vec![lesson(id, 1)])]);
        let pos = locate(&outline, id).unwrap();

        assert!(pos.previous.is_none());
        assert!(pos.next.is_none());
        assert_eq!(pos.total, 1);
    }
}
