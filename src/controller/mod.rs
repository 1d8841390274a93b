//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and drives the playback session.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `player`: Playback session state machine
//! - `playback`: Playback commands issued from the UI
//! - `navigation`: Chapter list, reading pane, tabs and bookmarks
//! - `player_events`: Audio engine event pump

mod input;
mod navigation;
mod playback;
mod player;
mod player_events;

pub use player::PlaybackController;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::model::{AppModel, PlaybackInfo, QuranClient};

#[derive(Clone)]
pub struct AppController {
    pub(crate) model: Arc<Mutex<AppModel>>,
    pub(crate) player: Arc<Mutex<PlaybackController>>,
    pub(crate) client: QuranClient,
}

impl AppController {
    pub fn new(
        model: Arc<Mutex<AppModel>>,
        player: Arc<Mutex<PlaybackController>>,
        client: QuranClient,
    ) -> Self {
        Self { model, player, client }
    }

    pub async fn playback_info(&self) -> PlaybackInfo {
        self.player.lock().await.info()
    }

    /// Surface a failed user action in the error popup
    pub(crate) async fn report<T>(&self, context: &str, result: anyhow::Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(context, error = %e, "Action failed");
                let model = self.model.lock().await;
                model.set_error(Self::format_error(context, &e)).await;
                None
            }
        }
    }

    pub(crate) fn format_error(context: &str, error: &anyhow::Error) -> String {
        if let Some(fetch) = error.downcast_ref::<crate::error::FetchError>() {
            return fetch.user_message();
        }
        if error.downcast_ref::<std::io::Error>().is_some() {
            return format!("{context}: could not write preferences to disk.");
        }
        format!("{context}: {error}")
    }
}
