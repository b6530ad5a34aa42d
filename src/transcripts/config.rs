use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{MediaError, MediaResult},
    transcripts::model::Video,
};

pub const DEFAULT_OUTPUT_DIR: &str = "transcripts";
pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptConfig {
    pub videos: Vec<Video>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for TranscriptConfig {
    /// The SQL vs NoSQL lecture series.
    fn default() -> Self {
        Self {
            videos: vec![
                Video::new("icAJxnynJZI", "HLD_SQL_vs_NoSQL_5"),
                Video::new("QQOkT6wrpdE", "HLD_SQL_vs_NoSQL_6"),
                Video::new("BaLdJ6GWWDg", "HLD_NoSQL_continued_7"),
            ],
            output_dir: default_output_dir(),
            language: default_language(),
        }
    }
}

impl TranscriptConfig {
    pub fn load(path: &Path) -> MediaResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open transcript config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse transcript config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> MediaResult<()> {
        if self.language.trim().is_empty() {
            return Err(MediaError::validation("transcript language must be non-empty"));
        }
        for v in &self.videos {
            if v.id.trim().is_empty() || v.title.trim().is_empty() {
                return Err(MediaError::validation(format!(
                    "video entries need a non-empty id and title (got id='{}', title='{}')",
                    v.id, v.title
                )));
            }
        }
        Ok(())
    }
}
