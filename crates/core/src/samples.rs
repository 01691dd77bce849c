use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("サンプルファイル `{path}` の読み込みに失敗しました: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Prepared survey datasets, loaded once from a directory of `*.md`
/// files (file stem → content). A missing directory is an empty library,
/// not an error.
#[derive(Debug, Default, Clone)]
pub struct SampleLibrary {
    samples: BTreeMap<String, String>,
}

impl SampleLibrary {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, SampleError> {
        let dir = dir.as_ref();
        let mut samples = BTreeMap::new();

        if !dir.is_dir() {
            return Ok(Self { samples });
        }

        let entries = fs::read_dir(dir).map_err(|source| SampleError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| SampleError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            let is_markdown = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("md"))
                .unwrap_or(false);
            if !path.is_file() || !is_markdown {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let content = fs::read_to_string(&path).map_err(|source| SampleError::Io {
                path: path.clone(),
                source,
            })?;
            samples.insert(stem.to_string(), content);
        }

        Ok(Self { samples })
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.samples.keys().map(|name| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.samples.get(name).map(|content| content.as_str())
    }
}
