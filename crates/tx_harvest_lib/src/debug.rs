use crate::err_from;
use crate::error::HarvestError;
use crate::model::DebugSample;
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
struct DebugReport<'a> {
    samples: &'a [DebugSample],
    timestamp: f64,
}

/// Collects samples of blocks whose transactions could not be harvested.
/// Lives for a single harvesting run.
#[derive(Debug, Default)]
pub struct DebugRecorder {
    samples: Vec<DebugSample>,
}

impl DebugRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, sample: DebugSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[DebugSample] {
        &self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Writes all samples as one JSON document. Nothing is written when no
    /// sample was recorded; returns whether the file was written.
    pub fn flush(&self, path: &Path) -> Result<bool, HarvestError> {
        if self.samples.is_empty() {
            return Ok(false);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(err_from!())?;
        }
        let report = DebugReport {
            samples: &self.samples,
            timestamp: chrono::Utc::now().timestamp_millis() as f64 / 1000.0,
        };
        let json = serde_json::to_string_pretty(&report).map_err(err_from!())?;
        fs::write(path, json).map_err(err_from!())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_flush_writes_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("fetch_debug.json");

        let mut recorder = DebugRecorder::new();
        recorder.record(DebugSample {
            block_number: 12,
            transactions_field_type: "array".to_string(),
            transactions_repr: "[]".to_string(),
        });
        assert!(recorder.flush(&path).unwrap());

        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["samples"][0]["block_number"], 12);
        assert_eq!(doc["samples"][0]["transactions_field_type"], "array");
        assert_eq!(doc["samples"][0]["transactions_repr"], "[]");
        assert!(doc["timestamp"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_flush_skips_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fetch_debug.json");
        assert!(!DebugRecorder::new().flush(&path).unwrap());
        assert!(!path.exists());
    }
}
