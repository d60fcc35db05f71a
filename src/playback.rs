//! Playback state machine and progress reporting.
//!
//! `PlaybackController` turns player events into progress entries without
//! doing any I/O. `ProgressReporter` ships those entries to the backend and
//! swallows failures so playback is never interrupted.
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiError, LmsService};
use crate::model::WatchProgressEntry;

/// A pause must reach this share of the video to be reported.
pub const MIN_REPORT_PERCENT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    Ended,
}

impl PlaybackState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    course_id: String,
    video_id: String,
    state: PlaybackState,
    position: f64,
}

/// Duration is usable only once the media has reported a finite positive length.
fn known_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}

fn floor_secs(t: f64) -> u64 {
    if t.is_finite() && t > 0.0 {
        t.floor() as u64
    } else {
        0
    }
}

impl PlaybackController {
    pub fn new(course_id: impl Into<String>, video_id: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            video_id: video_id.into(),
            state: PlaybackState::Idle,
            position: 0.0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current playback offset in seconds.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    pub fn seek(&mut self, to: f64) {
        if to.is_finite() {
            self.position = to.max(0.0);
        }
    }

    /// Pause event. Returns the entry to submit, if the pause is worth recording.
    pub fn pause(&mut self, current_time: f64, duration: Option<f64>) -> Option<WatchProgressEntry> {
        self.seek(current_time);
        self.state = PlaybackState::Paused;

        let duration = known_duration(duration)?;
        let percent = current_time / duration * 100.0;
        if !percent.is_finite() || percent < MIN_REPORT_PERCENT {
            debug!(video_id = %self.video_id, percent, "pause below report threshold");
            return None;
        }
        Some(self.entry(percent.min(100.0), current_time))
    }

    /// End-of-media event; always reported as fully watched.
    pub fn ended(&mut self, current_time: f64) -> WatchProgressEntry {
        self.seek(current_time);
        self.state = PlaybackState::Ended;
        self.entry(100.0, current_time)
    }

    fn entry(&self, watched_percent: f64, current_time: f64) -> WatchProgressEntry {
        WatchProgressEntry {
            course_id: self.course_id.clone(),
            video_id: self.video_id.clone(),
            watched_percent,
            last_watched_time: floor_secs(current_time),
            updated_at: None,
        }
    }
}

/// How a spawned submission ended. Never surfaced to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Stored,
    /// No credential was available, so nothing was sent.
    Skipped,
    Failed,
}

/// Fire-and-forget submitter. Submissions are not sequenced; the server keeps
/// whichever write lands last.
#[derive(Clone)]
pub struct ProgressReporter {
    lms: Arc<dyn LmsService>,
}

impl ProgressReporter {
    pub fn new(lms: Arc<dyn LmsService>) -> Self {
        Self { lms }
    }

    /// Spawn the submission. The handle only exists for observation; dropping
    /// it does not cancel the request.
    pub fn submit(&self, entry: WatchProgressEntry) -> JoinHandle<SubmitOutcome> {
        let lms = Arc::clone(&self.lms);
        tokio::spawn(async move { submit_logged(lms.as_ref(), entry).await })
    }
}

#[instrument(skip_all, fields(course_id = %entry.course_id, video_id = %entry.video_id))]
async fn submit_logged(lms: &dyn LmsService, entry: WatchProgressEntry) -> SubmitOutcome {
    match lms.submit_progress(&entry).await {
        Ok(()) => {
            info!(
                watched_percent = entry.watched_percent,
                last_watched_time = entry.last_watched_time,
                "progress submitted"
            );
            SubmitOutcome::Stored
        }
        Err(err) if ApiError::is_auth_unavailable(&err) => {
            debug!("no credential; progress submission skipped");
            SubmitOutcome::Skipped
        }
        Err(err) => {
            warn!(?err, "progress submission failed; ignoring");
            SubmitOutcome::Failed
        }
    }
}
