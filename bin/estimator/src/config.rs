use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub subgraph: SubgraphSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubgraphSettings {
    /// Overrides the network's default endpoint when set
    pub url: Option<String>,
    pub timeout_secs: u64,
    pub retry_attempts: u32,
}

impl EstimatorConfig {
    pub async fn load_from_file(path: &Path) -> eyre::Result<Self> {
        let contents = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            subgraph: SubgraphSettings {
                url: None,
                timeout_secs: 30,
                retry_attempts: 3,
            },
        }
    }
}
