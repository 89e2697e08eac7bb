//! Progress derivation: pure functions over a learner's completed set and a
//! course's current content.
//!
//! Nothing here is stored. Percentage and completion are recomputed on every
//! read, so they self-correct when course content is later extended (the
//! denominator grows and the percentage can drop) or when completed ids go
//! stale (they simply stop counting).

use crate::domain::Course;

/// Count completed ids that still match a current content item.
///
/// Ids for items that never existed, or whose course content changed
/// underneath them, are tolerated and not counted.
pub fn completed_in_course(completed: &[String], course: &Course) -> usize {
    course
        .course_content
        .iter()
        .filter(|item| completed.iter().any(|id| id == item.content_id()))
        .count()
}

/// Completion percentage, rounded to the nearest integer.
/// A course with zero content items is 0, never a division by zero.
pub fn progress_percentage(completed: &[String], course: &Course) -> u8 {
    let total = course.course_content.len();
    if total == 0 {
        return 0;
    }
    let done = completed_in_course(completed, course);
    (100.0 * done as f64 / total as f64).round() as u8
}

/// A course counts as completed only when it has content and every current
/// item is done. A zero-content course is never completed even though its
/// percentage is 0; dashboard aggregates rely on that asymmetry.
pub fn is_course_completed(completed: &[String], course: &Course) -> bool {
    let total = course.course_content.len();
    total > 0 && completed_in_course(completed, course) == total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ContentItem;
    use bson::oid::ObjectId;
    use chrono::Utc;

    fn course_with_ids(ids: &[&str]) -> Course {
        Course {
            id: Some(ObjectId::new()),
            title: "t".into(),
            description: String::new(),
            created_at: Utc::now(),
            course_content: ids
                .iter()
                .map(|id| ContentItem::Youtube {
                    content_id: (*id).into(),
                    url: "dQw4w9WgXcQ".into(),
                    uploaded_at: Utc::now(),
                })
                .collect(),
        }
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_zero_content_course_is_zero_percent() {
        let course = course_with_ids(&[]);
        assert_eq!(progress_percentage(&ids(&[]), &course), 0);
        // Even a non-empty completed set cannot move the needle
        assert_eq!(progress_percentage(&ids(&["ghost"]), &course), 0);
    }

    #[test]
    fn test_zero_content_course_never_completed() {
        let course = course_with_ids(&[]);
        assert!(!is_course_completed(&ids(&[]), &course));
        assert!(!is_course_completed(&ids(&["ghost"]), &course));
    }

    #[test]
    fn test_quarter_then_full() {
        let course = course_with_ids(&["a", "b", "c", "d"]);
        let one = ids(&["a"]);
        assert_eq!(progress_percentage(&one, &course), 25);
        assert!(!is_course_completed(&one, &course));

        let all = ids(&["a", "b", "c", "d"]);
        assert_eq!(progress_percentage(&all, &course), 100);
        assert!(is_course_completed(&all, &course));
    }

    #[test]
    fn test_percentage_bounds() {
        let course = course_with_ids(&["a", "b", "c"]);
        for completed in [ids(&[]), ids(&["a"]), ids(&["a", "b"]), ids(&["a", "b", "c"])] {
            let pct = progress_percentage(&completed, &course);
            assert!(pct <= 100);
        }
        assert_eq!(progress_percentage(&ids(&["a"]), &course), 33);
        assert_eq!(progress_percentage(&ids(&["a", "b"]), &course), 67);
    }

    #[test]
    fn test_stale_ids_not_counted() {
        // markComplete never validated membership, so ids for items that
        // never existed can be stored; they must not inflate the numerator.
        let course = course_with_ids(&["a", "b"]);
        let completed = ids(&["a", "deleted-item", "another-ghost"]);
        assert_eq!(progress_percentage(&completed, &course), 50);
        assert!(!is_course_completed(&completed, &course));
    }

    #[test]
    fn test_denominator_growth_drops_percentage() {
        let mut course = course_with_ids(&["a", "b"]);
        let completed = ids(&["a", "b"]);
        assert_eq!(progress_percentage(&completed, &course), 100);
        assert!(is_course_completed(&completed, &course));

        // Appending content retroactively lowers the derived percentage
        course.course_content.push(ContentItem::Youtube {
            content_id: "c".into(),
            url: "dQw4w9WgXcQ".into(),
            uploaded_at: Utc::now(),
        });
        assert_eq!(progress_percentage(&completed, &course), 67);
        assert!(!is_course_completed(&completed, &course));
    }

    #[test]
    fn test_duplicate_completed_ids_count_once() {
        // The store's add-to-set makes duplicates unreachable in practice,
        // but the derivation itself must also not double count.
        let course = course_with_ids(&["a", "b"]);
        let completed = ids(&["a", "a", "a"]);
        assert_eq!(progress_percentage(&completed, &course), 50);
    }
}
