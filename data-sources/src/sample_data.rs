//! Hard-coded sample data, used as the fallback when every external source
//! is disabled or failing. Guarantees the corpus is never empty.

use tracing::info;

use crate::document::{DocMetadata, Document};

/// Fallback collector serving a small built-in corpus.
#[derive(Clone, Debug, Default)]
pub struct SampleDataCollector;

struct SampleChampion {
    name: &'static str,
    role: &'static str,
    description: &'static str,
    abilities: [(&'static str, &'static str); 4],
    playstyle: &'static str,
}

const SAMPLE_CHAMPIONS: &[SampleChampion] = &[
    SampleChampion {
        name: "Ahri",
        role: "Mage/Assassin",
        description: "Ahri is a mobile mage-assassin hybrid who uses her charm and mobility to outplay opponents.",
        abilities: [
            ("Q", "Orb of Deception - Sends out an orb that deals magic damage on the way out and true damage on the way back."),
            ("W", "Fox-Fire - Summons three fox-fires that target nearby enemies."),
            ("E", "Charm - Blows a kiss that charms the first enemy hit, causing them to walk harmlessly towards Ahri."),
            ("R", "Spirit Rush - Dashes forward and fires essence bolts, can be cast up to 3 times."),
        ],
        playstyle: "Ahri excels at picking off isolated targets and escaping dangerous situations with her ultimate.",
    },
    SampleChampion {
        name: "Yasuo",
        role: "Fighter/Assassin",
        description: "Yasuo is a melee carry who relies on critical strikes and mobility to dominate teamfights.",
        abilities: [
            ("Q", "Steel Tempest - Thrusts forward, dealing damage. After two casts, the third creates a tornado."),
            ("W", "Wind Wall - Creates a wall that blocks all enemy projectiles for 4 seconds."),
            ("E", "Sweeping Blade - Dashes through a target enemy, dealing damage. Cannot be used on the same target for a few seconds."),
            ("R", "Last Breath - Blinks to an airborne enemy champion, dealing damage and keeping them in the air."),
        ],
        playstyle: "Yasuo requires precise positioning and timing to maximize his damage output and survivability.",
    },
    SampleChampion {
        name: "Jinx",
        role: "Marksman",
        description: "Jinx is a hyper-carry marksman who excels at dealing massive area damage in teamfights.",
        abilities: [
            ("Q", "Switcheroo! - Switches between Pow-Pow (machine gun) and Fishbones (rocket launcher)."),
            ("W", "Zap! - Fires a shock blast that slows and reveals the first enemy hit."),
            ("E", "Flame Chompers! - Throws three chompers that explode when enemies step on them."),
            ("R", "Super Mega Death Rocket! - Fires a global rocket that deals more damage the farther it travels."),
        ],
        playstyle: "Jinx scales incredibly well into late game and can single-handedly win teamfights with proper positioning.",
    },
    SampleChampion {
        name: "Thresh",
        role: "Support",
        description: "Thresh is a tanky support who excels at crowd control and protecting allies.",
        abilities: [
            ("Q", "Death Sentence - Throws his scythe, pulling himself and the enemy closer together."),
            ("W", "Dark Passage - Throws a lantern that allies can click to dash to Thresh."),
            ("E", "Flay - Sweeps his chain, knocking enemies in the direction of the swing."),
            ("R", "The Box - Creates walls of spectral energy that slow and damage enemies who pass through."),
        ],
        playstyle: "Thresh is a playmaking support who can initiate fights and save teammates with his utility.",
    },
    SampleChampion {
        name: "Lee Sin",
        role: "Fighter/Assassin",
        description: "Lee Sin is a highly mobile jungler known for his early game pressure and outplay potential.",
        abilities: [
            ("Q", "Sonic Wave / Resonating Strike - Fires a skillshot that marks enemies, can recast to dash to them."),
            ("W", "Safeguard / Iron Will - Dashes to an ally or ward, gaining a shield. Can activate for lifesteal and spell vamp."),
            ("E", "Tempest / Cripple - Slams the ground, dealing damage and revealing enemies. Can recast to slow."),
            ("R", "Dragon's Rage - Kicks an enemy champion away, dealing damage and knocking back all enemies hit."),
        ],
        playstyle: "Lee Sin requires high mechanical skill and game knowledge to maximize his impact throughout the game.",
    },
];

impl SampleDataCollector {
    pub fn name(&self) -> &'static str {
        "SampleData"
    }

    /// Produce the built-in corpus. Infallible by design: this is the
    /// collector of last resort.
    pub fn collect(&self) -> Vec<Document> {
        info!("Using sample data collector (fallback)");

        let mut documents = Vec::new();

        for champ in SAMPLE_CHAMPIONS {
            let abilities = champ
                .abilities
                .iter()
                .map(|(key, desc)| format!("- {key}: {desc}"))
                .collect::<Vec<_>>()
                .join("\n");

            let text = format!(
                "Champion: {}\nRole: {}\nDescription: {}\n\nAbilities:\n{}\n\nPlaystyle: {}",
                champ.name, champ.role, champ.description, abilities, champ.playstyle
            );

            documents.push(Document::new(
                text,
                DocMetadata {
                    doc_type: "champion".into(),
                    source: "sample".into(),
                    champion: Some(champ.name.into()),
                    role: Some(champ.role.into()),
                    version: None,
                },
            ));
        }

        documents.push(Document::new(
            "League of Legends Game Mechanics:\n\n\
             Laning Phase: The early game phase where players farm minions and trade with opponents in their assigned lanes.\n\
             Objectives: Important map locations like Dragon, Baron Nashor, and Rift Herald that provide team-wide benefits.\n\
             Teamfighting: Coordinated group combat where teams fight for objectives or map control.\n\
             Positioning: Critical skill of placing your champion in optimal locations during fights to maximize effectiveness while minimizing risk.\n\
             Vision Control: Using wards and sweepers to control map visibility and prevent ganks.",
            DocMetadata {
                doc_type: "game_mechanics".into(),
                source: "sample".into(),
                ..Default::default()
            },
        ));

        documents.push(Document::new(
            "Item Builds in League of Legends:\n\n\
             Core Items: Essential items that define a champion's playstyle and power spikes.\n\
             Situational Items: Items built based on the enemy team composition and game state.\n\
             Boots: Movement speed items that also provide combat stats. Different types for different roles.\n\
             Mythic Items: Powerful items that define a champion's build path and provide unique effects.\n\
             Legendary Items: High-tier items that complement the mythic item choice.",
            DocMetadata {
                doc_type: "items".into(),
                source: "sample".into(),
                ..Default::default()
            },
        ));

        documents.push(Document::new(
            "Ranked System:\n\n\
             Ranked Tiers: Iron, Bronze, Silver, Gold, Platinum, Emerald, Diamond, Master, Grandmaster, Challenger\n\
             LP (League Points): Points earned or lost based on match outcomes\n\
             Promotion Series: Best-of series to advance to the next tier\n\
             MMR (Matchmaking Rating): Hidden rating that determines matchmaking",
            DocMetadata {
                doc_type: "ranked".into(),
                source: "sample".into(),
                ..Default::default()
            },
        ));

        info!("Created {} sample documents", documents.len());
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_corpus_is_non_empty() {
        let docs = SampleDataCollector.collect();
        assert!(docs.len() >= 5);
    }

    #[test]
    fn champion_documents_carry_champion_metadata() {
        let docs = SampleDataCollector.collect();
        let ahri = docs
            .iter()
            .find(|d| d.metadata.champion.as_deref() == Some("Ahri"))
            .expect("Ahri document present");
        assert_eq!(ahri.metadata.doc_type, "champion");
        assert!(ahri.text.contains("Orb of Deception"));
        assert!(ahri.text.contains("Spirit Rush"));
    }
}
