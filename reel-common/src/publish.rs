//! Publish results and the manual-upload artifact

use crate::models::VideoRecord;
use crate::storage::write_atomic;
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// File name the site expects for its bundled catalog
pub const EXPORT_FILE_NAME: &str = "videos.json";

/// Serialized catalog offered for download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    /// Pretty-printed JSON array of videos (storage order)
    pub contents: String,
}

impl ExportArtifact {
    /// Render `videos` as the downloadable `videos.json`
    pub fn from_videos(videos: &[VideoRecord]) -> Result<Self> {
        let contents = serde_json::to_string_pretty(videos)
            .map_err(|e| Error::Persistence(format!("Failed to serialize catalog: {}", e)))?;
        Ok(Self {
            file_name: EXPORT_FILE_NAME.to_string(),
            contents,
        })
    }

    /// Save the artifact into `dir`, returning the written path
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(&self.file_name);
        write_atomic(&path, self.contents.as_bytes())?;
        Ok(path)
    }
}

/// How a publish finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Remote document now holds the catalog
    SyncedRemotely,

    /// Remote write unavailable or failed; the user must upload this by hand
    DownloadedForManualUpload(ExportArtifact),
}

impl PublishOutcome {
    pub fn needs_manual_step(&self) -> bool {
        matches!(self, PublishOutcome::DownloadedForManualUpload(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VideoInput;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_is_pretty_json_array() {
        let videos = vec![VideoRecord::from_input(&VideoInput::with_id("a"), 1)];
        let artifact = ExportArtifact::from_videos(&videos).unwrap();

        assert_eq!(artifact.file_name, "videos.json");
        assert!(artifact.contents.starts_with('['));
        assert!(artifact.contents.contains('\n'));

        let parsed: Vec<VideoRecord> = serde_json::from_str(&artifact.contents).unwrap();
        assert_eq!(parsed, videos);
    }

    #[test]
    fn test_write_to_directory() {
        let dir = TempDir::new().unwrap();
        let artifact = ExportArtifact::from_videos(&[]).unwrap();

        let path = artifact.write_to(&dir.path().join("exports")).unwrap();

        assert_eq!(path, dir.path().join("exports").join("videos.json"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn test_needs_manual_step() {
        assert!(!PublishOutcome::SyncedRemotely.needs_manual_step());
        let artifact = ExportArtifact::from_videos(&[]).unwrap();
        assert!(PublishOutcome::DownloadedForManualUpload(artifact).needs_manual_step());
    }
}
