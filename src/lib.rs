//! Client-side lesson player contract for the training platform: access
//! gating, playback progress reporting, resume prompts, and the REST client
//! they share.

pub mod access;
pub mod api;
pub mod config;
pub mod guard;
pub mod model;
pub mod navigation;
pub mod playback;
pub mod progress;
pub mod resume;
pub mod session;
