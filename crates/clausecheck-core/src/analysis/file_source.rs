use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;

use super::{Lexicon, LexiconEntry, LexiconSource, RiskTier};

/// Loads the risk lexicon from a `terms.txt` file under a base directory.
/// Each non-comment line is `term|tier|weight`. Parsed once and cached for
/// the lifetime of the source.
pub struct FileLexiconSource {
    base_path: PathBuf,
    cache: OnceCell<Lexicon>,
}

impl FileLexiconSource {
    /// Create a source rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            cache: OnceCell::new(),
        }
    }

    fn terms_path(&self) -> PathBuf {
        self.base_path.join("terms.txt")
    }

    fn parse(&self) -> Result<Lexicon> {
        let path = self.terms_path();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read lexicon file at {}", path.display()))?;

        let mut entries = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let parts: Vec<_> = trimmed.splitn(3, '|').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(anyhow::anyhow!(
                    "invalid lexicon line at {}:{} (expected term|tier|weight)",
                    path.display(),
                    idx + 1
                ));
            }
            let tier: RiskTier = parts[1].parse().with_context(|| {
                format!(
                    "invalid tier `{}` for term `{}` at {}:{}",
                    parts[1],
                    parts[0],
                    path.display(),
                    idx + 1
                )
            })?;
            let weight: u8 = parts[2].parse().with_context(|| {
                format!(
                    "invalid weight `{}` for term `{}` at {}:{}",
                    parts[2],
                    parts[0],
                    path.display(),
                    idx + 1
                )
            })?;
            entries.push(LexiconEntry::new(parts[0], tier, weight)?);
        }

        Lexicon::new(entries)
            .with_context(|| format!("invalid lexicon at {}", path.display()))
    }
}

#[async_trait::async_trait]
impl LexiconSource for FileLexiconSource {
    async fn load(&self) -> Result<Lexicon> {
        let lexicon = self.cache.get_or_try_init(|| self.parse())?;
        Ok(lexicon.clone())
    }
}
