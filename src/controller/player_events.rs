//! Event pump for audio engine callbacks and progress samples

use tokio::sync::mpsc::UnboundedReceiver;

use crate::audio::EngineEvent;
use crate::model::{PlaybackStatus, PlaybackTarget};
use super::AppController;

impl AppController {
    pub fn start_player_event_listener(&self, mut events: UnboundedReceiver<EngineEvent>) {
        let controller = self.clone();
        tracing::info!("Starting audio engine event listener");

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                if controller.model.lock().await.should_quit().await {
                    tracing::debug!("Audio engine event listener shutting down");
                    break;
                }
                controller.handle_engine_event(event).await;
            }
        });
    }

    pub(crate) async fn handle_engine_event(&self, event: EngineEvent) {
        let is_tick = matches!(event, EngineEvent::Tick { .. });
        if !is_tick {
            tracing::debug!(?event, "Engine event");
        }

        let mut player = self.player.lock().await;
        let previous_target = player.target();
        if !player.on_event(event) {
            return;
        }
        let info = player.info();
        drop(player);

        if info.status == PlaybackStatus::Errored {
            if let Some(message) = info.last_error {
                let model = self.model.lock().await;
                model.set_error(format!("Playback failed: {message}")).await;
            }
            return;
        }

        if let Some(PlaybackTarget::Verse { chapter, verse, .. }) = info.target {
            if info.target != previous_target {
                let model = self.model.lock().await;
                model.follow_verse(chapter, verse).await;
            }
        }
    }
}
