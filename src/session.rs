//! Lesson page lifecycle: credential context, loading, and the live player.
//!
//! A `LessonPlayer` is one page instance. Moving to another lesson means
//! opening a fresh page through `LessonLoader::open`, which re-runs the
//! access decision and resume lookup for that lesson.
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::access::{self, AccessDecision, AccessRequest};
use crate::api::{ApiError, LmsService, TokenSource};
use crate::config::Config;
use crate::model::{Course, LessonPosition, Video};
use crate::navigation;
use crate::playback::{PlaybackController, PlaybackState, ProgressReporter, SubmitOutcome};
use crate::progress;
use crate::resume::ResumePrompt;

/// Process-wide credential holder. Initialised by `sign_in` once the identity
/// provider hands over a token and cleared by `sign_out`.
#[derive(Clone, Default)]
pub struct SessionContext {
    token: Arc<RwLock<Option<String>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.into());
        info!("session signed in");
    }

    pub fn sign_out(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
        info!("session signed out");
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }
}

impl TokenSource for SessionContext {
    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct LessonSettings {
    pub read_attempts: u32,
    pub retry_delay: Duration,
    pub upsell_url: String,
}

impl From<&Config> for LessonSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            read_attempts: cfg.app.read_attempts,
            retry_delay: cfg.app.retry_delay(),
            upsell_url: cfg.player.upsell_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Account,
    Course,
    Progress,
}

impl LoadStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStage::Account => "account",
            LoadStage::Course => "course",
            LoadStage::Progress => "progress",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StallReason {
    AuthUnavailable,
    Failed(String),
}

/// Why a page is still showing its loading state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadStall {
    pub stage: LoadStage,
    pub reason: StallReason,
}

pub enum LessonPage {
    Loading(LoadStall),
    Redirect(String),
    NotFound(LessonPosition),
    Player(LessonPlayer),
}

impl LessonPage {
    pub fn kind(&self) -> &'static str {
        match self {
            LessonPage::Loading(_) => "loading",
            LessonPage::Redirect(_) => "redirect",
            LessonPage::NotFound(_) => "not_found",
            LessonPage::Player(_) => "player",
        }
    }
}

pub struct LessonLoader {
    lms: Arc<dyn LmsService>,
    settings: LessonSettings,
}

impl LessonLoader {
    pub fn new(lms: Arc<dyn LmsService>, settings: LessonSettings) -> Self {
        Self { lms, settings }
    }

    /// Run a read with bounded retries. A missing credential is never retried.
    async fn read<T, F, Fut>(&self, stage: LoadStage, mut op: F) -> Result<T, LoadStall>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let attempts = self.settings.read_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if ApiError::is_auth_unavailable(&err) => {
                    debug!(stage = stage.as_str(), "no credential; request skipped");
                    return Err(LoadStall {
                        stage,
                        reason: StallReason::AuthUnavailable,
                    });
                }
                Err(err) if attempt >= attempts => {
                    warn!(?err, stage = stage.as_str(), attempt, "read failed; giving up");
                    return Err(LoadStall {
                        stage,
                        reason: StallReason::Failed(format!("{:#}", err)),
                    });
                }
                Err(err) => {
                    warn!(?err, stage = stage.as_str(), attempt, "read failed; retrying");
                    tokio::time::sleep(self.settings.retry_delay).await;
                }
            }
        }
    }

    /// Load the lesson at `position`. Progress is only fetched once access is granted.
    #[instrument(skip(self))]
    pub async fn open(&self, course_id: &str, position: LessonPosition) -> LessonPage {
        let lms = &self.lms;
        let (account, course) = tokio::join!(
            self.read(LoadStage::Account, || lms.fetch_account()),
            self.read(LoadStage::Course, || lms.fetch_course(course_id)),
        );
        let account = match account {
            Ok(account) => account,
            Err(stall) => return LessonPage::Loading(stall),
        };
        let course = match course {
            Ok(course) => course,
            Err(stall) => return LessonPage::Loading(stall),
        };

        let subscription = account.subscription_at(Utc::now());
        let decision = access::decide(&AccessRequest {
            subscription,
            purchased_course_ids: &account.purchased_courses,
            course_id,
            position,
        });
        if decision == AccessDecision::Deny {
            info!(
                course_id,
                ?position,
                subscription = subscription.as_str(),
                "lesson locked; redirecting to upsell"
            );
            return LessonPage::Redirect(self.settings.upsell_url.clone());
        }

        let Some(video) = navigation::locate(&course, position).cloned() else {
            warn!(course_id, ?position, "lesson position not in course");
            return LessonPage::NotFound(position);
        };

        let entries = match self
            .read(LoadStage::Progress, || lms.fetch_progress(course_id))
            .await
        {
            Ok(entries) => entries,
            Err(stall) => return LessonPage::Loading(stall),
        };
        let resume = ResumePrompt::from_entry(progress::entry_for(&entries, &video.id));

        let player = LessonPlayer::new(
            course,
            position,
            video,
            resume,
            ProgressReporter::new(Arc::clone(&self.lms)),
        );
        info!(
            session_id = %player.session_id(),
            video_id = %player.video().id,
            position = ?player.position(),
            resume_offset = ?player.resume_prompt().offset(),
            "lesson ready"
        );
        LessonPage::Player(player)
    }
}

/// A single lesson page: one video, one controller, one resume prompt.
pub struct LessonPlayer {
    session_id: Uuid,
    course: Course,
    position: LessonPosition,
    video: Video,
    controller: PlaybackController,
    resume: ResumePrompt,
    reporter: ProgressReporter,
}

impl LessonPlayer {
    pub fn new(
        course: Course,
        position: LessonPosition,
        video: Video,
        resume: ResumePrompt,
        reporter: ProgressReporter,
    ) -> Self {
        let controller = PlaybackController::new(course.id.clone(), video.id.clone());
        Self {
            session_id: Uuid::new_v4(),
            course,
            position,
            video,
            controller,
            resume,
            reporter,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn position(&self) -> LessonPosition {
        self.position
    }

    pub fn video(&self) -> &Video {
        &self.video
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn current_time(&self) -> f64 {
        self.controller.position()
    }

    pub fn resume_prompt(&self) -> &ResumePrompt {
        &self.resume
    }

    pub fn play(&mut self) {
        self.controller.play();
    }

    pub fn seek(&mut self, to: f64) {
        self.controller.seek(to);
    }

    /// "Continue Watching": seek to the stored offset, once per page.
    pub fn continue_watching(&mut self) -> Option<u64> {
        let offset = self.resume.activate()?;
        self.controller.seek(offset as f64);
        debug!(session_id = %self.session_id, offset, "resumed playback");
        Some(offset)
    }

    /// Returns the submission handle when the pause was reported.
    pub fn pause(&mut self, current_time: f64, duration: Option<f64>) -> Option<JoinHandle<SubmitOutcome>> {
        let entry = self.controller.pause(current_time, duration);
        debug!(
            session_id = %self.session_id,
            state = self.state().as_str(),
            reported = entry.is_some(),
            "pause"
        );
        Some(self.reporter.submit(entry?))
    }

    pub fn ended(&mut self, current_time: f64) -> JoinHandle<SubmitOutcome> {
        let entry = self.controller.ended(current_time);
        self.reporter.submit(entry)
    }

    pub fn has_next(&self) -> bool {
        navigation::has_next(&self.course, self.position)
    }

    pub fn has_previous(&self) -> bool {
        navigation::has_previous(&self.course, self.position)
    }

    /// Target of the "next" control; `None` when disabled.
    pub fn go_to_next(&self) -> Option<LessonPosition> {
        navigation::next(&self.course, self.position)
    }

    /// Target of the "previous" control; `None` when disabled.
    pub fn go_to_previous(&self) -> Option<LessonPosition> {
        navigation::previous(&self.course, self.position)
    }
}
