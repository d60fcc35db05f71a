use crate::model::WatchProgressEntry;

/// One-shot "Continue Watching" affordance for a single page instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePrompt {
    offset: Option<u64>,
    used: bool,
}

impl ResumePrompt {
    pub fn from_entry(entry: Option<&WatchProgressEntry>) -> Self {
        Self {
            offset: entry.map(|e| e.last_watched_time).filter(|t| *t > 0),
            used: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.offset.is_some() && !self.used
    }

    /// Stored offset, whether or not the prompt is still showing.
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// Consume the prompt. Yields the seek target the first time only.
    pub fn activate(&mut self) -> Option<u64> {
        if !self.is_visible() {
            return None;
        }
        self.used = true;
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(last_watched_time: u64) -> WatchProgressEntry {
        WatchProgressEntry {
            course_id: "rust-101".into(),
            video_id: "c0v0".into(),
            watched_percent: 40.0,
            last_watched_time,
            updated_at: None,
        }
    }

    #[test]
    fn no_entry_never_shows() {
        let mut prompt = ResumePrompt::from_entry(None);
        assert!(!prompt.is_visible());
        assert_eq!(prompt.activate(), None);
    }

    #[test]
    fn zero_offset_never_shows() {
        let prompt = ResumePrompt::from_entry(Some(&entry(0)));
        assert!(!prompt.is_visible());
    }

    #[test]
    fn activates_exactly_once() {
        let mut prompt = ResumePrompt::from_entry(Some(&entry(93)));
        assert!(prompt.is_visible());
        assert_eq!(prompt.activate(), Some(93));
        assert!(!prompt.is_visible());
        assert_eq!(prompt.activate(), None);
        assert_eq!(prompt.offset(), Some(93));
    }
}
