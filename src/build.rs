//! Font binary build: subset, compress and place every (font, subset) pair.
//!
//! For each family with at least one renderable subset:
//!
//! 1. Write one range file per requested subset into the family's scratch
//!    directory (`{temp}/{id}/range-{subset}.txt`).
//! 2. Locate each font's source binary at
//!    `{input}/{license-dir}/{family-dir}/{filename}`.
//! 3. For each renderable subset, run the subsetter into
//!    `{temp}/{id}/{subset}.subset.ttf`, compress it, and move the `.woff2`
//!    to `fonts/{id}_{subset}_{weight}_{style}.woff2`.
//! 4. Copy the family's license text to `licenses/{id}-LICENSE.txt`
//!    (optional).
//! 5. Remove the scratch directory.
//!
//! ## Parallelism
//!
//! Families are built on a bounded [rayon](https://docs.rs/rayon) pool, one
//! family per task; fonts and subsets within a family run sequentially.
//! Every scratch and output path embeds the family id, so concurrent families
//! never touch the same file and no locking is needed.
//!
//! Family ids must be unique within a run and usable as a single path
//! component; both are checked before any scratch directory is touched.
//!
//! The first failing family cancels the run: workers already inside a family
//! finish it, but no new family starts, and the first error is returned.

use crate::attributes;
use crate::naming::{self, OutputLayout};
use crate::subsets::{self, SubsetError};
use crate::tools::{ToolError, ToolInvoker};
use crate::types::FontFamily;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// License files looked up in a family's source directory, in order.
pub const LICENSE_FILES: &[&str] = &["OFL.txt", "LICENSE.txt", "UFL.txt"];

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{family}: {font} ({subset}): {source}")]
    Tool {
        family: String,
        font: String,
        subset: String,
        #[source]
        source: ToolError,
    },
    #[error("{family}: source font {font} not found at {path}")]
    SourceNotFound {
        family: String,
        font: String,
        path: PathBuf,
    },
    #[error("{family}: {font} ({subset}): failed to move {from} to {to}: {source}")]
    Move {
        family: String,
        font: String,
        subset: String,
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{family}: no license file ({}) in {dir}", LICENSE_FILES.join(", "))]
    LicenseNotFound { family: String, dir: PathBuf },
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{family}: scratch directory {path} is not a child of the scratch root")]
    UnsafeScratch { family: String, path: PathBuf },
    #[error("Family id '{0}' appears more than once")]
    DuplicateFamily(String),
    #[error(transparent)]
    Subset(#[from] SubsetError),
    #[error("Failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> BuildError + '_ {
    move |source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where a build reads from and writes to.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Source tree root (`<license-dir>/<family-dir>/<font file>`).
    pub input_dir: PathBuf,
    /// Scratch root; each family works in its own sub-directory.
    pub temp_dir: PathBuf,
    pub layout: OutputLayout,
    /// Requested subsets, in order.
    pub subsets: Vec<String>,
    pub copy_licenses: bool,
}

/// Progress events emitted while building.
#[derive(Debug, Clone)]
pub enum BuildEvent {
    FamilyStarted {
        family: String,
        fonts: usize,
        subsets: usize,
    },
    FontBuilt {
        family: String,
        file: String,
    },
    FamilySkipped {
        family: String,
    },
    FamilyFinished {
        family: String,
        files: usize,
        license: bool,
    },
}

/// Files produced for one family.
#[derive(Debug, Clone, PartialEq)]
pub struct FamilyReport {
    pub id: String,
    pub files: Vec<PathBuf>,
    pub license: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Built families, sorted by id.
    pub families: Vec<FamilyReport>,
    /// Families with no renderable subset, sorted.
    pub skipped: Vec<String>,
}

impl BuildSummary {
    pub fn file_count(&self) -> usize {
        self.families.iter().map(|f| f.files.len()).sum()
    }
}

fn notify(events: Option<&Sender<BuildEvent>>, event: BuildEvent) {
    if let Some(tx) = events {
        // A closed receiver only means nobody is printing progress
        let _ = tx.send(event);
    }
}

/// Build every renderable (font, subset) binary for one family.
///
/// Returns `Ok(None)` for a family with no renderable subset.
pub fn build_family(
    invoker: &dyn ToolInvoker,
    family: &FontFamily,
    ctx: &BuildContext,
    events: Option<&Sender<BuildEvent>>,
) -> Result<Option<FamilyReport>, BuildError> {
    let renderable = attributes::renderable_subsets(family, &ctx.subsets);
    if renderable.is_empty() {
        log::debug!("{}: no renderable subsets", family.id);
        notify(
            events,
            BuildEvent::FamilySkipped {
                family: family.id.clone(),
            },
        );
        return Ok(None);
    }
    notify(
        events,
        BuildEvent::FamilyStarted {
            family: family.id.clone(),
            fonts: family.fonts.len(),
            subsets: renderable.len(),
        },
    );

    let scratch = naming::scratch_dir(&ctx.temp_dir, &family.id);
    if !naming::is_scratch_child(&ctx.temp_dir, &scratch) {
        return Err(BuildError::UnsafeScratch {
            family: family.id.clone(),
            path: scratch,
        });
    }
    std::fs::create_dir_all(&scratch).map_err(io_error(&scratch))?;
    for subset in &ctx.subsets {
        let path = naming::range_scratch_path(&ctx.temp_dir, &family.id, subset);
        std::fs::write(&path, subsets::tool_range_format(subset)?).map_err(io_error(&path))?;
    }

    let mut files = Vec::with_capacity(family.fonts.len() * renderable.len());
    for font in &family.fonts {
        let source = naming::source_font_path(&ctx.input_dir, family, font);
        if !source.is_file() {
            return Err(BuildError::SourceNotFound {
                family: family.id.clone(),
                font: font.filename.clone(),
                path: source,
            });
        }
        let weight = attributes::font_weight(family, font);

        for subset in &renderable {
            let tool_error = |source| BuildError::Tool {
                family: family.id.clone(),
                font: font.filename.clone(),
                subset: subset.to_string(),
                source,
            };
            let ranges = naming::range_scratch_path(&ctx.temp_dir, &family.id, subset);
            let subsetted = naming::subset_scratch_path(&ctx.temp_dir, &family.id, subset);

            invoker
                .subset(&ranges, &source, &subsetted)
                .map_err(tool_error)?;
            let compressed = invoker.compress(&subsetted).map_err(tool_error)?;

            let file_name = naming::font_file_name(&family.id, subset, &weight, &font.style);
            let dest = ctx.layout.fonts_dir.join(&file_name);
            move_file(&compressed, &dest).map_err(|source| BuildError::Move {
                family: family.id.clone(),
                font: font.filename.clone(),
                subset: subset.to_string(),
                from: compressed.clone(),
                to: dest.clone(),
                source,
            })?;

            notify(
                events,
                BuildEvent::FontBuilt {
                    family: family.id.clone(),
                    file: file_name,
                },
            );
            files.push(dest);
        }
    }

    let license = if ctx.copy_licenses {
        Some(copy_license(family, &ctx.input_dir, &ctx.layout.licenses_dir)?)
    } else {
        None
    };

    log::debug!("{}: removing {}", family.id, scratch.display());
    std::fs::remove_dir_all(&scratch).map_err(io_error(&scratch))?;

    notify(
        events,
        BuildEvent::FamilyFinished {
            family: family.id.clone(),
            files: files.len(),
            license: license.is_some(),
        },
    );
    Ok(Some(FamilyReport {
        id: family.id.clone(),
        files,
        license,
    }))
}

/// Rename, falling back to copy + delete when the scratch and output trees
/// are on different filesystems.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::rename(from, to).or_else(|err| {
        log::debug!(
            "rename {} -> {} failed ({err}), copying instead",
            from.display(),
            to.display()
        );
        std::fs::copy(from, to)?;
        std::fs::remove_file(from)
    })
}

/// Copy the first license file found in the family's source directory to
/// `licenses/{id}-LICENSE.txt`.
pub fn copy_license(
    family: &FontFamily,
    input_dir: &Path,
    licenses_dir: &Path,
) -> Result<PathBuf, BuildError> {
    let dir = naming::family_source_dir(input_dir, family);
    let Some(source) = LICENSE_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
    else {
        return Err(BuildError::LicenseNotFound {
            family: family.id.clone(),
            dir,
        });
    };
    let dest = licenses_dir.join(naming::license_file_name(&family.id));
    std::fs::copy(&source, &dest).map_err(io_error(&dest))?;
    Ok(dest)
}

/// Build every family on a pool of `threads` workers.
///
/// Fails fast: once a family fails, no further family is started and the
/// first error is returned after in-flight families finish.
pub fn build_all(
    invoker: &dyn ToolInvoker,
    families: &[FontFamily],
    ctx: &BuildContext,
    threads: usize,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildSummary, BuildError> {
    // Unknown subsets are a configuration error, caught before any work starts
    for subset in &ctx.subsets {
        subsets::ranges(subset)?;
    }
    // Each family owns {temp}/{id}; two families sharing an id would share it
    let mut seen = HashSet::new();
    for family in families {
        if !seen.insert(family.id.as_str()) {
            return Err(BuildError::DuplicateFamily(family.id.clone()));
        }
    }
    ctx.layout
        .create_dirs()
        .map_err(io_error(&ctx.layout.index_dir))?;
    std::fs::create_dir_all(&ctx.temp_dir).map_err(io_error(&ctx.temp_dir))?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()?;

    let cancelled = AtomicBool::new(false);
    let first_error: Mutex<Option<BuildError>> = Mutex::new(None);
    let reports: Mutex<Vec<FamilyReport>> = Mutex::new(Vec::new());
    let skipped: Mutex<Vec<String>> = Mutex::new(Vec::new());
    let events = events.as_ref();

    pool.install(|| {
        families.par_iter().with_max_len(1).for_each(|family| {
            if cancelled.load(Ordering::SeqCst) {
                log::debug!("{}: not started, build cancelled", family.id);
                return;
            }
            match build_family(invoker, family, ctx, events) {
                Ok(Some(report)) => reports
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(report),
                Ok(None) => skipped
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(family.id.clone()),
                Err(err) => {
                    cancelled.store(true, Ordering::SeqCst);
                    let mut slot = first_error.lock().unwrap_or_else(PoisonError::into_inner);
                    if slot.is_none() {
                        *slot = Some(err);
                    }
                }
            }
        });
    });

    if let Some(err) = first_error
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
    {
        return Err(err);
    }

    let mut families = reports.into_inner().unwrap_or_else(PoisonError::into_inner);
    families.sort_by(|a, b| a.id.cmp(&b.id));
    let mut skipped = skipped.into_inner().unwrap_or_else(PoisonError::into_inner);
    skipped.sort();
    Ok(BuildSummary { families, skipped })
}
