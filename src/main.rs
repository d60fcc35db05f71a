use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use course_player::api::{LmsClient, LmsService};
use course_player::config;
use course_player::guard::{self, RouteDecision};
use course_player::model::LessonPosition;
use course_player::playback::{PlaybackController, ProgressReporter};
use course_player::progress;
use course_player::session::{LessonLoader, LessonPage, LessonSettings, SessionContext, StallReason};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open a lesson: access check, resume lookup, navigation targets
    Open {
        #[arg(long)]
        course: String,
        #[arg(long, default_value_t = 0)]
        chapter: usize,
        #[arg(long, default_value_t = 0)]
        video: usize,
    },
    /// Feed one pause (or end) event through the player and submit it
    Report {
        #[arg(long)]
        course: String,
        #[arg(long)]
        video: String,
        /// Playback offset in seconds
        #[arg(long)]
        time: f64,
        /// Media duration in seconds; omitted means not yet known
        #[arg(long)]
        duration: Option<f64>,
        /// Treat the event as end-of-media
        #[arg(long)]
        ended: bool,
    },
    /// Show recorded progress for a course
    Progress {
        #[arg(long)]
        course: String,
    },
    /// Check which page a route resolves to for the signed-in account
    Route {
        #[arg(long)]
        path: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;

    let session = SessionContext::new();
    match cfg.resolved_token() {
        Some(token) => session.sign_in(token),
        None => warn!("no credential configured; requests will be skipped"),
    }

    let client = LmsClient::new(
        cfg.base_url()?,
        Arc::new(session.clone()),
        cfg.app.request_timeout(),
    )?;
    let lms: Arc<dyn LmsService> = Arc::new(client);

    match args.command {
        Command::Open {
            course,
            chapter,
            video,
        } => {
            let loader = LessonLoader::new(Arc::clone(&lms), LessonSettings::from(&cfg));
            match loader.open(&course, LessonPosition::new(chapter, video)).await {
                LessonPage::Loading(stall) => match stall.reason {
                    StallReason::AuthUnavailable => {
                        println!("loading: waiting for credential ({})", stall.stage.as_str())
                    }
                    StallReason::Failed(reason) => {
                        println!("loading: {} unavailable: {}", stall.stage.as_str(), reason)
                    }
                },
                LessonPage::Redirect(to) => println!("redirect: {}", to),
                LessonPage::NotFound(pos) => {
                    println!("not found: chapter {} video {}", pos.chapter, pos.video)
                }
                LessonPage::Player(player) => {
                    println!(
                        "playing: {} / {} ({})",
                        player.course().title,
                        player.video().title,
                        player.video().id
                    );
                    let prompt = player.resume_prompt();
                    if let Some(offset) = prompt.offset().filter(|_| prompt.is_visible()) {
                        println!("continue watching from {}s", offset);
                    }
                    if let Some(next) = player.go_to_next() {
                        println!("next: chapter {} video {}", next.chapter, next.video);
                    }
                    if let Some(prev) = player.go_to_previous() {
                        println!("previous: chapter {} video {}", prev.chapter, prev.video);
                    }
                }
            }
        }
        Command::Report {
            course,
            video,
            time,
            duration,
            ended,
        } => {
            let mut controller = PlaybackController::new(course, video);
            controller.play();
            let entry = if ended {
                Some(controller.ended(time))
            } else {
                controller.pause(time, duration)
            };
            info!(state = controller.state().as_str(), "event handled");
            match entry {
                Some(entry) => {
                    let handle = ProgressReporter::new(Arc::clone(&lms)).submit(entry);
                    match handle.await {
                        Ok(outcome) => info!(?outcome, "submission finished"),
                        Err(err) => warn!(?err, "submission task aborted"),
                    }
                }
                None => info!("event below report threshold; nothing submitted"),
            }
        }
        Command::Progress { course } => {
            let (course, entries) =
                tokio::try_join!(lms.fetch_course(&course), lms.fetch_progress(&course))?;
            for video in course.videos() {
                match progress::entry_for(&entries, &video.id) {
                    Some(e) => println!(
                        "{:<24} {:>6.1}%  at {}s",
                        video.id, e.watched_percent, e.last_watched_time
                    ),
                    None => println!("{:<24} {:>6}", video.id, "-"),
                }
            }
            println!(
                "course completion: {:.1}%",
                progress::course_completion(&course, &entries)
            );
        }
        Command::Route { path } => {
            let role = if session.is_signed_in() {
                lms.fetch_account().await?.role
            } else {
                None
            };
            match guard::check(role, &path, &cfg.routes.sign_in) {
                RouteDecision::Render => println!("render: {}", path),
                RouteDecision::Redirect(to) => println!("redirect: {}", to),
            }
        }
    }

    Ok(())
}
