use serde::Deserialize;
use std::path::Path;

use crate::blobs::BlobParams;
use crate::corners::RectificationMode;
use crate::error::Result;

/// Tunables for one run. Every field is optional in the JSON file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub blobs: BlobParams,
    pub mode: RectificationMode,
    /// Also write the debug overlay next to each rectified frame.
    pub annotate: bool,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
