//! Loading missions, submissions and rule overrides from JSON files.

use anyhow::{Context, Result};
use scoring_core::{MissionConfig, ScoringRules, TeamSubmission};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A mission and every team's submission for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    pub mission: MissionConfig,
    #[serde(default)]
    pub submissions: Vec<TeamSubmission>,
}

impl Bundle {
    /// Keep only the named team's submission.
    pub fn retain_team(&mut self, team: &str) {
        self.submissions.retain(|submission| submission.team == team);
    }
}

pub async fn load_bundle(path: &Path) -> Result<Bundle> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read bundle {}", path.display()))?;
    let bundle: Bundle = serde_json::from_str(&raw)
        .with_context(|| format!("invalid bundle {}", path.display()))?;
    tracing::info!(
        mission = bundle.mission.id,
        teams = bundle.submissions.len(),
        "Loaded bundle"
    );
    Ok(bundle)
}

/// Load rule overrides, falling back to the defaults when no file is given.
pub async fn load_rules(path: Option<&Path>) -> Result<ScoringRules> {
    let Some(path) = path else {
        return Ok(ScoringRules::default());
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read rules {}", path.display()))?;
    let rules = serde_json::from_str(&raw)
        .with_context(|| format!("invalid rules {}", path.display()))?;
    tracing::info!(path = %path.display(), "Loaded scoring rules");
    Ok(rules)
}
