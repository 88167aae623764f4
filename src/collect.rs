//! Metadata collection: walk the source tree and build the family catalog.
//!
//! Every file named exactly `METADATA.pb` under the input root is read and
//! mapped into a [`FontFamily`]. Other files and directories (font binaries,
//! license texts, `README.md`, stray `metadata.pb.bak`) are skipped.
//!
//! Collection is fail-fast: one malformed record aborts the whole run with
//! the offending path attached, rather than producing a partial catalog.
//! Two records deriving the same family id (the same family filed under two
//! license directories, or names differing only in case) are rejected as
//! [`CollectError::DuplicateId`], since the id names every artifact and
//! scratch path the family owns.
//!
//! ## Ordering
//!
//! The result is sorted by display name using byte ordering (`"Zilla"` sorts
//! before `"abeezee"`), so emitted indexes diff cleanly between runs. The
//! directory walk itself is sorted too, so families with identical names keep
//! a stable relative order.

use crate::metadata::{self, METADATA_FILENAME, MetadataError};
use crate::types::FontFamily;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Input directory not found: {0}")]
    MissingRoot(PathBuf),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Invalid metadata in {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: MetadataError,
    },
    #[error("Family id '{id}' is declared by more than one record: {}", join_paths(.paths))]
    DuplicateId { id: String, paths: Vec<PathBuf> },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collect every family under `root`, drop the ones whose id is in
/// `ignored`, and sort by name.
pub fn collect(root: &Path, ignored: &[String]) -> Result<Vec<FontFamily>, CollectError> {
    if !root.is_dir() {
        return Err(CollectError::MissingRoot(root.to_path_buf()));
    }

    let mut records: Vec<(FontFamily, PathBuf)> = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || entry.file_name() != METADATA_FILENAME {
            continue;
        }
        let path = entry.path();
        let family = metadata::read_metadata(path).map_err(|source| CollectError::Metadata {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("collected {} from {}", family.id, path.display());
        records.push((family, path.to_path_buf()));
    }

    records.retain(|(family, _)| !ignored.contains(&family.id));

    // Ids name every output and scratch path, so they must be unique
    let mut by_id: BTreeMap<&str, Vec<&Path>> = BTreeMap::new();
    for (family, path) in &records {
        by_id.entry(family.id.as_str()).or_default().push(path.as_path());
    }
    if let Some((id, paths)) = by_id.into_iter().find(|(_, paths)| paths.len() > 1) {
        return Err(CollectError::DuplicateId {
            id: id.to_string(),
            paths: paths.into_iter().map(Path::to_path_buf).collect(),
        });
    }

    let mut families: Vec<FontFamily> = records.into_iter().map(|(family, _)| family).collect();
    families.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
    Ok(families)
}
