use crate::model::{Course, WatchProgressEntry};

/// Entry recorded for exactly `video_id`. With duplicates, the last one wins.
pub fn entry_for<'a>(
    entries: &'a [WatchProgressEntry],
    video_id: &str,
) -> Option<&'a WatchProgressEntry> {
    entries.iter().rev().find(|e| e.video_id == video_id)
}

/// Mean watched percent over every video in the course; unwatched videos count as 0.
pub fn course_completion(course: &Course, entries: &[WatchProgressEntry]) -> f64 {
    let (total, count) = course.videos().fold((0.0, 0usize), |(sum, n), video| {
        let pct = entry_for(entries, &video.id)
            .map(|e| e.watched_percent.clamp(0.0, 100.0))
            .unwrap_or(0.0);
        (sum + pct, n + 1)
    });
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::tests::course;

    fn entry(video_id: &str, pct: f64) -> WatchProgressEntry {
        WatchProgressEntry {
            course_id: "rust-101".into(),
            video_id: video_id.into(),
            watched_percent: pct,
            last_watched_time: 1,
            updated_at: None,
        }
    }

    #[test]
    fn entry_for_matches_exact_video() {
        let entries = vec![entry("c0v0", 10.0), entry("c0v10", 90.0)];
        assert_eq!(entry_for(&entries, "c0v1"), None);
        assert_eq!(entry_for(&entries, "c0v10").unwrap().watched_percent, 90.0);
    }

    #[test]
    fn later_duplicate_wins() {
        let entries = vec![entry("c0v0", 100.0), entry("c0v0", 45.0)];
        assert_eq!(entry_for(&entries, "c0v0").unwrap().watched_percent, 45.0);
    }

    #[test]
    fn completion_averages_over_all_videos() {
        let c = course(&[2, 2]);
        let entries = vec![entry("c0v0", 100.0), entry("c1v1", 50.0)];
        assert_eq!(course_completion(&c, &entries), 37.5);
    }

    #[test]
    fn empty_course_is_zero_complete() {
        let c = course(&[]);
        assert_eq!(course_completion(&c, &[entry("x", 100.0)]), 0.0);
    }
}
