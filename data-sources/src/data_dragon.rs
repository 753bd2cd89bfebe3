//! Data Dragon collector.
//!
//! Data Dragon is Riot's public static-data API; no key is required.
//! One request resolves the current game version, a second fetches the
//! champion roster for that version.

use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::document::{DocMetadata, Document};
use crate::errors::{CollectorError, Result};

/// Pinned fallback when the version endpoint is unreachable.
const FALLBACK_VERSION: &str = "14.1.1";

/// Collects the champion roster from Data Dragon.
#[derive(Clone, Debug)]
pub struct DataDragonCollector {
    http: reqwest::Client,
    base_url: String,
    version: Option<String>,
    language: String,
}

impl DataDragonCollector {
    /// `version = None` resolves the latest version at collect time.
    pub fn new(version: Option<String>, language: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: "https://ddragon.leagueoflegends.com".into(),
            version,
            language: language.into(),
        })
    }

    pub fn name(&self) -> &'static str {
        "DataDragon"
    }

    pub async fn collect(&self) -> Result<Vec<Document>> {
        let version = match &self.version {
            Some(v) => v.clone(),
            None => self.latest_version().await,
        };

        let url = format!(
            "{}/cdn/{}/data/{}/champion.json",
            self.base_url, version, self.language
        );
        info!("Fetching champion data from {url}");

        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(CollectorError::HttpStatus {
                status: resp.status(),
                url,
            });
        }

        let payload: ChampionFile = resp
            .json()
            .await
            .map_err(|e| CollectorError::Decode(e.to_string()))?;

        let documents: Vec<Document> = payload
            .data
            .into_values()
            .map(|c| champion_to_document(c, &version))
            .collect();

        info!("Collected {} champion documents", documents.len());
        Ok(documents)
    }

    /// Latest game version; falls back to a pinned version on any failure.
    async fn latest_version(&self) -> String {
        let url = format!("{}/api/versions.json", self.base_url);
        let fetched: Result<Vec<String>> = async {
            let resp = self.http.get(&url).send().await?;
            if !resp.status().is_success() {
                return Err(CollectorError::HttpStatus {
                    status: resp.status(),
                    url: url.clone(),
                });
            }
            resp.json()
                .await
                .map_err(|e| CollectorError::Decode(e.to_string()))
        }
        .await;

        match fetched {
            Ok(versions) if !versions.is_empty() => versions[0].clone(),
            Ok(_) => {
                warn!("Version list empty, using fallback {FALLBACK_VERSION}");
                FALLBACK_VERSION.into()
            }
            Err(e) => {
                warn!("Could not fetch latest version, using fallback: {e}");
                FALLBACK_VERSION.into()
            }
        }
    }
}

fn champion_to_document(champ: ChampionEntry, version: &str) -> Document {
    let roles = if champ.tags.is_empty() {
        "Unknown".to_string()
    } else {
        champ.tags.join(", ")
    };

    let mut text = format!(
        "Champion: {}\nTitle: {}\nRole: {}\n\n{}",
        champ.name, champ.title, roles, champ.blurb
    );

    if !champ.spells.is_empty() {
        text.push_str("\n\nAbilities:");
        for spell in &champ.spells {
            text.push_str(&format!("\n- {}: {}", spell.name, spell.description));
        }
    }

    Document::new(
        text,
        DocMetadata {
            doc_type: "champion".into(),
            source: "data_dragon".into(),
            champion: Some(champ.name),
            role: champ.tags.first().cloned(),
            version: Some(version.to_string()),
        },
    )
}

/* ==========================
Data Dragon payloads
========================== */

#[derive(Debug, Deserialize)]
struct ChampionFile {
    data: std::collections::BTreeMap<String, ChampionEntry>,
}

#[derive(Debug, Deserialize)]
struct ChampionEntry {
    name: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    blurb: String,
    #[serde(default)]
    tags: Vec<String>,
    /// Present in the per-champion files; absent from the roster summary.
    #[serde(default)]
    spells: Vec<SpellEntry>,
}

#[derive(Debug, Deserialize)]
struct SpellEntry {
    name: String,
    #[serde(default)]
    description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn champion_payload_maps_to_document() {
        let entry: ChampionEntry = serde_json::from_str(
            r#"{"name":"Ahri","title":"the Nine-Tailed Fox","blurb":"Innately connected...","tags":["Mage","Assassin"]}"#,
        )
        .unwrap();
        let doc = champion_to_document(entry, "14.1.1");
        assert!(doc.text.contains("Champion: Ahri"));
        assert!(doc.text.contains("Mage, Assassin"));
        assert_eq!(doc.metadata.champion.as_deref(), Some("Ahri"));
        assert_eq!(doc.metadata.version.as_deref(), Some("14.1.1"));
    }
}
