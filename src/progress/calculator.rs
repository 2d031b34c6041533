/// Percent-complete for an enrollment: `round(100 * completed / total)`,
/// round-half-up. A course with no lessons is pinned to 0 (it can never be
/// completed), and the result is clamped so a denominator shrunk by
/// authoring edits cannot push stored progress past 100.
pub fn completion_percent(completed: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }

    let percent = (100.0 * completed as f64 / total as f64).round() as i32;
    percent.clamp(0, 100)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_course_is_zero() {
        assert_eq!(completion_percent(0, 0), 0);
        assert_eq!(completion_percent(5, 0), 0);
    }

    #[test]
    fn quarter_steps() {
        assert_eq!(completion_percent(0, 4), 0);
        assert_eq!(completion_percent(1, 4), 25);
        assert_eq!(completion_percent(3, 4), 75);
        assert_eq!(completion_percent(4, 4), 100);
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(completion_percent(1, 8), 13); // 12.5
        assert_eq!(completion_percent(1, 3), 33); // 33.33
        assert_eq!(completion_percent(2, 3), 67); // 66.67
        assert_eq!(completion_percent(1, 6), 17); // 16.67
    }

    #[test]
    fn clamped_when_denominator_shrinks() {
        // lessons deleted after the student completed them
        assert_eq!(completion_percent(5, 4), 100);
    }
}
