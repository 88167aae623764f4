//! Artifact emission: JSON indexes and CSS stylesheets.
//!
//! The render functions in this module are pure; [`emit`] is the only one
//! that touches the filesystem. Every document is scoped to a family's
//! *renderable* subsets (requested ∩ declared). A family with no renderable
//! subset gets no index entry, no detail file and no stylesheet.
//!
//! ## Documents
//!
//! | File | Content |
//! |---|---|
//! | `fonts.json` | `[{id, name, designer, subsets, weights, styles}]` for every renderable family |
//! | `subsets.json` | `[{subset, ranges}]` for every requested subset |
//! | `fonts/{id}.json` | One index entry |
//! | `fonts/{id}.css` | `@font-face` blocks, subsets in requested order then fonts in declared order |
//! | `fonts/{id}_{subset}_{weight}_{style}.css` | One `@font-face` block (fragment layout) |
//!
//! A rendered block looks like:
//!
//! ```css
//! @font-face {
//! 	font-family: "Lato";
//! 	font-style: normal;
//! 	font-weight: 400;
//! 	font-display: swap;
//! 	src: url('lato_latin_400_normal.woff2') format('woff2');
//! 	unicode-range: U+0000-00FF, U+0131, ...;
//! }
//! ```

use crate::attributes::{self, WeightToken};
use crate::config::{CssConfig, CssLayout};
use crate::naming::{self, OutputLayout};
use crate::subsets::{self, SubsetError};
use crate::types::{Font, FontFamily};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmitError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Subset(#[from] SubsetError),
}

/// One family in `fonts.json`, and the whole of `{id}.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexEntry {
    pub id: String,
    pub name: String,
    pub designer: String,
    pub subsets: Vec<String>,
    pub weights: Vec<WeightToken>,
    pub styles: Vec<String>,
}

/// One entry in `subsets.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsetDescriptor {
    pub subset: String,
    pub ranges: String,
}

/// What [`emit`] wrote.
#[derive(Debug, Default)]
pub struct EmitSummary {
    /// Families that received a detail file and stylesheet(s).
    pub emitted: Vec<String>,
    /// Families with no renderable subset.
    pub skipped: Vec<String>,
    pub stylesheets: usize,
    pub index_path: PathBuf,
    pub subsets_path: PathBuf,
}

// ============================================================================
// Pure renderers
// ============================================================================

/// Index entry for a family, or `None` if it has no renderable subset.
pub fn index_entry(family: &FontFamily, requested: &[String]) -> Option<IndexEntry> {
    let renderable = attributes::renderable_subsets(family, requested);
    if renderable.is_empty() {
        return None;
    }
    Some(IndexEntry {
        id: family.id.clone(),
        name: family.name.clone(),
        designer: family.designer.clone(),
        subsets: renderable.into_iter().map(str::to_string).collect(),
        weights: attributes::family_weights(family),
        styles: attributes::family_styles(family),
    })
}

pub fn index_document(families: &[FontFamily], requested: &[String]) -> Vec<IndexEntry> {
    families
        .iter()
        .filter_map(|family| index_entry(family, requested))
        .collect()
}

pub fn subset_descriptors(requested: &[String]) -> Result<Vec<SubsetDescriptor>, SubsetError> {
    requested
        .iter()
        .map(|subset| {
            Ok(SubsetDescriptor {
                subset: subset.clone(),
                ranges: subsets::css_range_format(subset)?,
            })
        })
        .collect()
}

/// One `@font-face` block for a (font, subset) pair.
pub fn font_face(family: &FontFamily, font: &Font, subset: &str) -> Result<String, SubsetError> {
    let weight = attributes::font_weight(family, font);
    let file = naming::font_file_name(&family.id, subset, &weight, &font.style);
    let ranges = subsets::css_range_format(subset)?;
    Ok(format!(
        "@font-face {{\n\
         \tfont-family: \"{name}\";\n\
         \tfont-style: {style};\n\
         \tfont-weight: {weight};\n\
         \tfont-display: swap;\n\
         \tsrc: url('{file}') format('woff2');\n\
         \tunicode-range: {ranges};\n\
         }}\n",
        name = family.name,
        style = font.style,
        weight = weight.css_value(),
    ))
}

/// Class binding the family's CSS name: `.font-{id} { font-family: "..."; }`
pub fn class_selector(family: &FontFamily) -> String {
    format!(
        ".font-{} {{\n  font-family: \"{}\";\n}}\n",
        family.id, family.name
    )
}

/// Whole-family stylesheet, or `None` if the family has no renderable subset.
pub fn stylesheet(
    family: &FontFamily,
    requested: &[String],
    with_class_selector: bool,
) -> Result<Option<String>, SubsetError> {
    let renderable = attributes::renderable_subsets(family, requested);
    if renderable.is_empty() {
        return Ok(None);
    }
    let mut css = String::new();
    for subset in renderable {
        for font in &family.fonts {
            css.push_str(&font_face(family, font, subset)?);
        }
    }
    if with_class_selector {
        css.push_str(&class_selector(family));
    }
    Ok(Some(css))
}

/// Fragment layout: `(file name, single-block stylesheet)` per (subset, font).
pub fn fragments(
    family: &FontFamily,
    requested: &[String],
) -> Result<Vec<(String, String)>, SubsetError> {
    let mut out = Vec::new();
    for subset in attributes::renderable_subsets(family, requested) {
        for font in &family.fonts {
            let weight = attributes::font_weight(family, font);
            out.push((
                naming::fragment_file_name(&family.id, subset, &weight, &font.style),
                font_face(family, font, subset)?,
            ));
        }
    }
    Ok(out)
}

// ============================================================================
// Writing
// ============================================================================

fn write_file(path: &Path, contents: &str) -> Result<(), EmitError> {
    std::fs::write(path, contents).map_err(|source| EmitError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), EmitError> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    write_file(path, &json)
}

/// Write every index, detail document and stylesheet for the catalog.
pub fn emit(
    families: &[FontFamily],
    requested: &[String],
    css: &CssConfig,
    layout: &OutputLayout,
) -> Result<EmitSummary, EmitError> {
    layout.create_dirs().map_err(|source| EmitError::Io {
        path: layout.fonts_dir.clone(),
        source,
    })?;

    let mut summary = EmitSummary {
        index_path: layout.index_dir.join(naming::INDEX_FILE),
        subsets_path: layout.index_dir.join(naming::SUBSETS_FILE),
        ..Default::default()
    };

    // Validate every requested subset before writing anything
    let descriptors = subset_descriptors(requested)?;
    write_json(&summary.subsets_path, &descriptors)?;
    write_json(&summary.index_path, &index_document(families, requested))?;

    for family in families {
        let Some(entry) = index_entry(family, requested) else {
            log::debug!("{} has no renderable subsets, skipping", family.id);
            summary.skipped.push(family.id.clone());
            continue;
        };
        write_json(
            &layout.fonts_dir.join(naming::detail_file_name(&family.id)),
            &entry,
        )?;

        match css.layout {
            CssLayout::Family => {
                if let Some(sheet) = stylesheet(family, requested, css.class_selector)? {
                    write_file(
                        &layout.fonts_dir.join(naming::stylesheet_file_name(&family.id)),
                        &sheet,
                    )?;
                    summary.stylesheets += 1;
                }
            }
            CssLayout::Fragments => {
                for (name, block) in fragments(family, requested)? {
                    write_file(&layout.fonts_dir.join(name), &block)?;
                    summary.stylesheets += 1;
                }
            }
        }
        summary.emitted.push(family.id.clone());
    }

    Ok(summary)
}
