//! Next/previous traversal over a course's chapter→video ordering.
//!
//! Empty chapters are skipped, so a boundary move lands on the nearest
//! chapter that actually has videos.
use crate::model::{Course, LessonPosition, Video};

pub fn locate(course: &Course, pos: LessonPosition) -> Option<&Video> {
    course.chapters.get(pos.chapter)?.videos.get(pos.video)
}

/// `None` when `pos` is the last video of the last non-empty chapter.
pub fn next(course: &Course, pos: LessonPosition) -> Option<LessonPosition> {
    locate(course, pos)?;
    if pos.video + 1 < course.chapters[pos.chapter].videos.len() {
        return Some(LessonPosition::new(pos.chapter, pos.video + 1));
    }
    course
        .chapters
        .iter()
        .enumerate()
        .skip(pos.chapter + 1)
        .find(|(_, c)| !c.videos.is_empty())
        .map(|(ci, _)| LessonPosition::new(ci, 0))
}

/// `None` at the first video of the first non-empty chapter.
pub fn previous(course: &Course, pos: LessonPosition) -> Option<LessonPosition> {
    locate(course, pos)?;
    if pos.video > 0 {
        return Some(LessonPosition::new(pos.chapter, pos.video - 1));
    }
    course.chapters[..pos.chapter]
        .iter()
        .enumerate()
        .rev()
        .find(|(_, c)| !c.videos.is_empty())
        .map(|(ci, c)| LessonPosition::new(ci, c.videos.len() - 1))
}

pub fn has_next(course: &Course, pos: LessonPosition) -> bool {
    next(course, pos).is_some()
}

pub fn has_previous(course: &Course, pos: LessonPosition) -> bool {
    previous(course, pos).is_some()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::Chapter;

    pub(crate) fn course(shape: &[usize]) -> Course {
        Course {
            id: "rust-101".into(),
            title: "Rust 101".into(),
            chapters: shape
                .iter()
                .enumerate()
                .map(|(ci, n)| Chapter {
                    title: format!("Chapter {}", ci + 1),
                    videos: (0..*n)
                        .map(|vi| Video {
                            id: format!("c{}v{}", ci, vi),
                            title: format!("Lesson {}.{}", ci + 1, vi + 1),
                            url: None,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn next_within_chapter() {
        let c = course(&[3, 2]);
        assert_eq!(next(&c, LessonPosition::new(0, 1)), Some(LessonPosition::new(0, 2)));
    }

    #[test]
    fn next_crosses_chapter_boundary() {
        let c = course(&[2, 2, 2]);
        assert_eq!(next(&c, LessonPosition::new(0, 1)), Some(LessonPosition::new(1, 0)));
        assert_eq!(next(&c, LessonPosition::new(1, 1)), Some(LessonPosition::new(2, 0)));
    }

    #[test]
    fn next_disabled_at_last_video() {
        let c = course(&[2, 2]);
        assert_eq!(next(&c, LessonPosition::new(1, 1)), None);
        assert!(!has_next(&c, LessonPosition::new(1, 1)));
    }

    #[test]
    fn previous_disabled_at_first_video() {
        let c = course(&[2, 2]);
        assert_eq!(previous(&c, LessonPosition::FIRST), None);
        assert!(!has_previous(&c, LessonPosition::FIRST));
    }

    #[test]
    fn previous_crosses_to_last_video_of_prior_chapter() {
        let c = course(&[3, 2]);
        assert_eq!(previous(&c, LessonPosition::new(1, 0)), Some(LessonPosition::new(0, 2)));
        assert_eq!(previous(&c, LessonPosition::new(1, 1)), Some(LessonPosition::new(1, 0)));
    }

    #[test]
    fn empty_chapters_are_skipped() {
        let c = course(&[1, 0, 2, 0]);
        assert_eq!(next(&c, LessonPosition::FIRST), Some(LessonPosition::new(2, 0)));
        assert_eq!(previous(&c, LessonPosition::new(2, 0)), Some(LessonPosition::FIRST));
        assert_eq!(next(&c, LessonPosition::new(2, 1)), None);
    }

    #[test]
    fn out_of_range_position_has_no_neighbours() {
        let c = course(&[2]);
        assert_eq!(next(&c, LessonPosition::new(5, 0)), None);
        assert_eq!(previous(&c, LessonPosition::new(5, 0)), None);
        assert!(locate(&c, LessonPosition::new(0, 2)).is_none());
        assert_eq!(previous(&c, LessonPosition::new(0, 7)), None);
    }

    #[test]
    fn locate_finds_video() {
        let c = course(&[2, 2]);
        assert!(locate(&c, LessonPosition::new(2, 0)).is_none());
        assert_eq!(locate(&c, LessonPosition::new(1, 0)).map(|v| v.id.as_str()), Some("c1v0"));
    }
}
