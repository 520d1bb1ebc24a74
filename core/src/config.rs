//! External configuration — task catalogs and time compression settings.
//!
//! Catalogs are data, not code: the engine loads them once at build time
//! and treats them as immutable for the whole run. In tests, use
//! SimConfig::default_test().

use crate::{
    scaler::TimeCompressionConfig,
    task::Task,
    types::TrackId,
};
use serde::{Deserialize, Serialize};

/// One track's ordered task list as it appears in the catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackCatalog {
    pub track_id: TrackId,
    pub label: String,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Deserialize)]
struct TaskCatalogFile {
    tracks: Vec<TrackCatalog>,
}

/// Everything the engine needs to build a run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub catalog: Vec<TrackCatalog>,
    pub compression: TimeCompressionConfig,
}

impl SimConfig {
    /// Load from the data/ directory.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/catalog/task_catalog.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let file: TaskCatalogFile = serde_json::from_str(&content)?;

        let compression_path = format!("{data_dir}/catalog/time_compression.json");
        let compression_content = std::fs::read_to_string(&compression_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {compression_path}: {e}"))?;
        let compression: TimeCompressionConfig = serde_json::from_str(&compression_content)?;

        let config = Self {
            catalog: file.tracks,
            compression,
        };
        config.validate()?;
        Ok(config)
    }

    /// The bundled three-track demo catalog, compiled into the crate so
    /// tests never depend on the working directory.
    pub fn default_test() -> anyhow::Result<Self> {
        let file: TaskCatalogFile =
            serde_json::from_str(include_str!("../../data/catalog/task_catalog.json"))?;
        let compression: TimeCompressionConfig =
            serde_json::from_str(include_str!("../../data/catalog/time_compression.json"))?;
        let config = Self {
            catalog: file.tracks,
            compression,
        };
        config.validate()?;
        Ok(config)
    }

    /// Structural checks beyond what serde enforces. Scaling-level
    /// failures (zero-sum catalogs, ratio sanity) are caught by the
    /// scaler at engine build.
    fn validate(&self) -> anyhow::Result<()> {
        if !(self.compression.target_duration_ms > 0.0) {
            anyhow::bail!(
                "target_duration_ms must be > 0, got {}",
                self.compression.target_duration_ms
            );
        }
        if !(self.compression.tick_interval_ms > 0.0) {
            anyhow::bail!(
                "tick_interval_ms must be > 0, got {}",
                self.compression.tick_interval_ms
            );
        }
        for track in &self.catalog {
            if !self
                .compression
                .completion_ratios
                .contains_key(&track.track_id)
            {
                anyhow::bail!("No completion ratio configured for track '{}'", track.track_id);
            }
            for task in &track.tasks {
                if !task.duration_ms.is_finite() || task.duration_ms <= 0.0 {
                    anyhow::bail!(
                        "Task '{}' in track '{}' has invalid duration {}",
                        task.id,
                        track.track_id,
                        task.duration_ms
                    );
                }
            }
        }
        Ok(())
    }
}
