//! HTTP client side of the remote player protocol.
//!
//! Decisions are a blocking request/response on `POST {base}/decide`; game
//! events are fired at `POST {base}/log-event` with a hard 5 second cap and
//! never propagate failures. Every instance carries a session UUID so the
//! remote service can correlate the two call streams.

use std::time::Duration;

use anyhow::{bail, Context};
use engine_interface::{Decision, Event, GameState, Player};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

const LOG_EVENT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecisionRequest<'a> {
    state: &'a GameState,
    options: &'a [Decision],
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a Event>,
    player_uuid: &'a str,
}

#[derive(Deserialize)]
struct DecisionResponse {
    decision: Decision,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LogEventRequest<'a> {
    state: &'a GameState,
    event: &'a Event,
    player_uuid: &'a str,
}

pub struct RemotePlayer {
    name: String,
    base_url: String,
    player_uuid: String,
    decide_client: reqwest::blocking::Client,
    observer_client: reqwest::blocking::Client,
}

impl RemotePlayer {
    pub fn new(name: impl Into<String>, base_url: &str) -> anyhow::Result<Self> {
        Ok(RemotePlayer {
            name: name.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            player_uuid: Uuid::new_v4().to_string(),
            // Decisions block for as long as the remote service thinks; no
            // timeout is enforced here.
            decide_client: reqwest::blocking::Client::new(),
            observer_client: reqwest::blocking::Client::builder()
                .timeout(LOG_EVENT_TIMEOUT)
                .build()
                .context("building observer http client")?,
        })
    }

    pub fn player_uuid(&self) -> &str {
        &self.player_uuid
    }
}

impl Player for RemotePlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn decide(
        &mut self,
        state: &GameState,
        options: &[Decision],
        reason: Option<&Event>,
    ) -> anyhow::Result<Decision> {
        let request = DecisionRequest {
            state,
            options,
            reason,
            player_uuid: &self.player_uuid,
        };
        let response = self
            .decide_client
            .post(format!("{}/decide", self.base_url))
            .json(&request)
            .send()
            .with_context(|| format!("requesting decision from {}", self.base_url))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            bail!("player server {} returned {status}: {body}", self.base_url);
        }
        let decoded: DecisionResponse = response
            .json()
            .with_context(|| format!("decoding decision from {}", self.base_url))?;
        Ok(decoded.decision)
    }

    fn observe(&mut self, state: &GameState, event: &Event) {
        let request = LogEventRequest {
            state,
            event,
            player_uuid: &self.player_uuid,
        };
        let sent = self
            .observer_client
            .post(format!("{}/log-event", self.base_url))
            .json(&request)
            .send();
        match sent {
            Ok(response) if !response.status().is_success() => {
                warn!(
                    player = %self.name,
                    status = %response.status(),
                    "event log rejected by player server"
                );
            }
            Ok(_) => {}
            Err(e) => {
                warn!(player = %self.name, error = %e, "failed to deliver event log");
            }
        }
    }
}
