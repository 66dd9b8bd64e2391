use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crosscrawl_core as game;

/// Best score kept in a small JSON object on disk.
///
/// Read and write failures are logged and never reach the game.
#[derive(Clone, Debug)]
pub(crate) struct FileScoreStore {
    path: PathBuf,
    scores: BTreeMap<String, u32>,
}

impl FileScoreStore {
    pub fn open(path: &Path) -> Self {
        let scores = match Self::read(path) {
            Ok(scores) => scores,
            Err(err) => {
                log::warn!("Ignoring score file: {:#}", err);
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            scores,
        }
    }

    fn read(path: &Path) -> Result<BTreeMap<String, u32>> {
        if !path.exists() {
            log::debug!("No score file at {}", path.display());
            return Ok(BTreeMap::new());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("decoding {}", path.display()))
    }

    fn write(&self) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.scores)?;
        std::fs::write(&self.path, text).with_context(|| format!("writing {}", self.path.display()))
    }
}

impl game::ScoreStore for FileScoreStore {
    fn load_best(&self) -> Option<u32> {
        self.scores.get(game::BEST_SCORE_KEY).copied()
    }

    fn save_best(&mut self, score: u32) {
        self.scores.insert(game::BEST_SCORE_KEY.to_string(), score);
        match self.write() {
            Ok(()) => log::info!("Saved best score {} to {}", score, self.path.display()),
            Err(err) => log::error!("Could not save best score: {:#}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game::ScoreStore;

    fn scratch(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("crosscrawl-{}-{}.json", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_file_has_no_best() {
        let store = FileScoreStore::open(&scratch("missing"));

        assert_eq!(store.load_best(), None);
    }

    #[test]
    fn saved_best_survives_reopen() {
        let path = scratch("reopen");
        let mut store = FileScoreStore::open(&path);

        store.save_best(42);

        assert_eq!(FileScoreStore::open(&path).load_best(), Some(42));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"crosscrawl_hi\": 42"));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn corrupt_file_is_ignored() {
        let path = scratch("corrupt");
        std::fs::write(&path, "not json").unwrap();

        let store = FileScoreStore::open(&path);

        assert_eq!(store.load_best(), None);
        std::fs::remove_file(&path).unwrap();
    }
}
