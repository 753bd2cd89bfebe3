//! Riot Games API collector.
//!
//! Requires an API key and is rate-limited, so it is disabled by default.
//! Currently fetches the free champion rotation; other endpoints can be added
//! as the corpus grows.

use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::document::{DocMetadata, Document};
use crate::errors::{CollectorError, Result};

/// Collects live data from the Riot Games API.
#[derive(Clone, Debug)]
pub struct RiotApiCollector {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    region: String,
}

impl RiotApiCollector {
    pub fn new(api_key: Option<String>, region: impl Into<String>) -> Result<Self> {
        let region = region.into();
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: format!("https://{region}.api.riotgames.com"),
            api_key,
            region,
        })
    }

    pub fn name(&self) -> &'static str {
        "RiotAPI"
    }

    /// A missing key disables the collector rather than failing collection.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.api_key.is_none() {
            return Err("RIOT_API_KEY not found. Riot API collector will be skipped.".into());
        }
        Ok(())
    }

    pub async fn collect(&self) -> Result<Vec<Document>> {
        let Some(key) = &self.api_key else {
            return Ok(Vec::new());
        };

        let url = format!("{}/lol/platform/v3/champion-rotations", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("X-Riot-Token", key)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CollectorError::HttpStatus {
                status: resp.status(),
                url,
            });
        }

        let rotation: ChampionRotations = resp
            .json()
            .await
            .map_err(|e| CollectorError::Decode(e.to_string()))?;

        let text = format!(
            "Free Champion Rotation ({}):\n\n\
             {} champions are free to play this week. \
             {} additional champions are free for new players (up to level {}).",
            self.region,
            rotation.free_champion_ids.len(),
            rotation.free_champion_ids_for_new_players.len(),
            rotation.max_new_player_level
        );

        info!(
            "Collected champion rotation with {} free champions",
            rotation.free_champion_ids.len()
        );

        Ok(vec![Document::new(
            text,
            DocMetadata {
                doc_type: "rotation".into(),
                source: "riot_api".into(),
                ..Default::default()
            },
        )])
    }
}

/* ==========================
Riot API payloads
========================== */

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChampionRotations {
    free_champion_ids: Vec<u32>,
    #[serde(default)]
    free_champion_ids_for_new_players: Vec<u32>,
    #[serde(default)]
    max_new_player_level: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_fails_validation_and_collects_nothing() {
        let c = RiotApiCollector::new(None, "na1").unwrap();
        assert!(c.validate().is_err());
    }
}
