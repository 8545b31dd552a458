use std::{
    collections::BTreeMap,
    fmt::Write as _,
    fs, io,
    path::{Path, PathBuf},
};

use crop_rivals_core::MatchReport;
use crop_rivals_simulation::ScoreSink;
use thiserror::Error;

const NAME_PREFIX: &str = "Name:";

/// Errors raised while reading or writing a profile save file.
#[derive(Debug, Error)]
pub(crate) enum ProfileError {
    /// The save file exists but could not be read.
    #[error("failed to read profile {path}")]
    Read {
        /// Location of the save file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The save file could not be written.
    #[error("failed to write profile {path}")]
    Write {
        /// Location of the save file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Player profile holding the latest score per level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Profile {
    name: String,
    scores: BTreeMap<u32, u32>,
}

impl Profile {
    /// Loads the profile at `path`, starting a fresh one named `name` when the file is absent.
    pub(crate) fn open(path: &Path, name: &str) -> Result<Self, ProfileError> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::parse(&text, name)),
            Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(Self::new(name)),
            Err(source) => Err(ProfileError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Starts an empty profile.
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            scores: BTreeMap::new(),
        }
    }

    /// Parses `Name:` and `<level>: <score>` lines, skipping anything malformed.
    fn parse(text: &str, fallback_name: &str) -> Self {
        let mut profile = Self::new(fallback_name);
        for line in text.lines() {
            if let Some(name) = line.strip_prefix(NAME_PREFIX) {
                let name = name.trim();
                if !name.is_empty() {
                    profile.name = name.to_owned();
                }
                continue;
            }

            let Some((level, score)) = line.split_once(':') else {
                continue;
            };
            let (Ok(level), Ok(score)) = (level.trim().parse::<u32>(), score.trim().parse::<u32>())
            else {
                continue;
            };
            if level > 0 {
                let _ = profile.scores.insert(level, score);
            }
        }
        profile
    }

    fn render(&self) -> String {
        let mut text = format!("{NAME_PREFIX} {}\n", self.name);
        for (level, score) in &self.scores {
            let _ = writeln!(text, "{level}: {score}");
        }
        text
    }

    /// Writes the profile to `path`.
    pub(crate) fn save(&self, path: &Path) -> Result<(), ProfileError> {
        fs::write(path, self.render()).map_err(|source| ProfileError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Display name of the player.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Stored score for a 1-indexed level.
    pub(crate) fn score(&self, level: u32) -> Option<u32> {
        self.scores.get(&level).copied()
    }
}

impl ScoreSink for Profile {
    fn record(&mut self, report: &MatchReport) {
        let _ = self.scores.insert(report.level.get(), report.player.score);
    }
}
