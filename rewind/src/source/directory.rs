use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

use super::MigrationSource;
use crate::errors::{BoxError, MigrationError, MigrationResult};
use crate::migration::Migration;

/// A file matched by a [`DirectorySource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Name derived from the `name` capture group, or the file stem.
    pub name: String,
    /// Absolute or root-joined path of the file.
    pub path: PathBuf,
}

/// Discovers migration files under a directory and loads each through a
/// caller-supplied loader.
///
/// Files are yielded in lexicographic order of their path relative to the
/// root, so timestamp-prefixed names sort chronologically.
pub struct DirectorySource<L> {
    root: PathBuf,
    pattern: Regex,
    max_depth: usize,
    loader: L,
}

impl<L> DirectorySource<L>
where
    L: Fn(MigrationFile) -> Result<Migration, BoxError>,
{
    /// `pattern` is matched against the file name. A `name` capture group,
    /// if present, becomes the migration name.
    pub fn new(root: impl Into<PathBuf>, pattern: Regex, loader: L) -> Self {
        Self {
            root: root.into(),
            pattern,
            max_depth: 1,
            loader,
        }
    }

    /// Descend into subdirectories up to `depth` levels (1 = root only).
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Matching files in canonical order, without loading them.
    pub fn discover(&self) -> MigrationResult<Vec<MigrationFile>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(self.max_depth)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| MigrationError::Source {
                message: format!("failed to read {}", self.root.display()),
                source: Some(Box::new(err)),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            let Some(captures) = self.pattern.captures(file_name) else {
                continue;
            };

            let name = match captures.name("name") {
                Some(name) => name.as_str().to_string(),
                None => file_stem(entry.path()),
            };

            files.push(MigrationFile {
                name,
                path: entry.path().to_path_buf(),
            });
        }

        files.sort_by(|a, b| relative(&self.root, &a.path).cmp(relative(&self.root, &b.path)));
        Ok(files)
    }
}

impl<L> MigrationSource for DirectorySource<L>
where
    L: Fn(MigrationFile) -> Result<Migration, BoxError>,
{
    async fn migrations(&self) -> MigrationResult<Vec<Migration>> {
        let files = self.discover()?;
        log::debug!("discovered {} migration file(s) in {}", files.len(), self.root.display());

        files
            .into_iter()
            .map(|file| {
                let path = file.path.clone();
                (self.loader)(file).map_err(|err| MigrationError::Source {
                    message: format!("failed to load {}", path.display()),
                    source: Some(err),
                })
            })
            .collect()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_string()
}

fn relative<'a>(root: &Path, path: &'a Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
