//! Centralized naming for every file the pipeline reads, writes or hands to
//! an external tool.
//!
//! The emitters and the build orchestrator both name files through this
//! module, so a stylesheet can never reference a font binary under a name the
//! orchestrator did not produce.
//!
//! ## Artifacts
//!
//! | Artifact | Name |
//! |---|---|
//! | Font binary | `{id}_{subset}_{weight}_{style}.woff2` |
//! | CSS fragment | `{id}_{subset}_{weight}_{style}.css` |
//! | Family stylesheet | `{id}.css` |
//! | Family detail | `{id}.json` |
//! | License copy | `{id}-LICENSE.txt` |
//! | Catalog index | `fonts.json` |
//! | Subset table | `subsets.json` |
//!
//! `{weight}` is the font's own [`WeightToken::file_token`]: `400`, or
//! `100-900` for variable families.
//!
//! ## Scratch files
//!
//! Each family gets its own scratch directory `{temp}/{id}/`. Range files
//! (`range-{subset}.txt`) and intermediate subset fonts (`{subset}.subset.ttf`)
//! live inside it, so two families with different ids never share a path.

use crate::attributes::WeightToken;
use crate::types::{Font, FontFamily};
use std::path::{Component, Path, PathBuf};

pub const INDEX_FILE: &str = "fonts.json";
pub const SUBSETS_FILE: &str = "subsets.json";

/// License tags whose source directory is not simply the lower-cased tag.
const LICENSE_DIRS: &[(&str, &str)] = &[("apache2", "apache")];

/// Family identifier: the display name lower-cased with spaces replaced by
/// hyphens. `"Alegreya Sans SC"` → `"alegreya-sans-sc"`.
pub fn family_id(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Why `id` cannot name a file or directory, or `None` if it can.
///
/// Ids become single path components under the scratch and output trees, so
/// they must be non-empty, must not be `.` or `..`, and must not contain a
/// path separator.
pub fn unsafe_id_reason(id: &str) -> Option<&'static str> {
    if id.is_empty() {
        Some("derives an empty family id")
    } else if id == "." || id == ".." {
        Some("derives a family id that is a relative path")
    } else if id.contains(['/', '\\']) {
        Some("derives a family id containing a path separator")
    } else {
        None
    }
}

/// Source directory of a family: the display name lower-cased with spaces
/// removed. `"Alegreya Sans SC"` → `"alegreyasanssc"`.
pub fn family_dir_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "")
}

/// Source sub-directory for a license tag. Tags outside the lookup table
/// pass through lower-cased.
pub fn license_dir_name(license: &str) -> String {
    let lower = license.to_lowercase();
    LICENSE_DIRS
        .iter()
        .find(|(tag, _)| *tag == lower)
        .map(|(_, dir)| dir.to_string())
        .unwrap_or(lower)
}

/// Directory holding a family's source files:
/// `{input}/{license-dir}/{family-dir}`.
pub fn family_source_dir(input: &Path, family: &FontFamily) -> PathBuf {
    input
        .join(license_dir_name(&family.license))
        .join(family_dir_name(&family.name))
}

/// Expected path of a font's source binary.
pub fn source_font_path(input: &Path, family: &FontFamily, font: &Font) -> PathBuf {
    family_source_dir(input, family).join(&font.filename)
}

fn artifact_stem(family_id: &str, subset: &str, weight: &WeightToken, style: &str) -> String {
    format!("{family_id}_{subset}_{}_{style}", weight.file_token())
}

/// Final compressed font binary name.
pub fn font_file_name(family_id: &str, subset: &str, weight: &WeightToken, style: &str) -> String {
    format!("{}.woff2", artifact_stem(family_id, subset, weight, style))
}

/// Per-(subset, weight, style) CSS fragment name.
pub fn fragment_file_name(
    family_id: &str,
    subset: &str,
    weight: &WeightToken,
    style: &str,
) -> String {
    format!("{}.css", artifact_stem(family_id, subset, weight, style))
}

pub fn stylesheet_file_name(family_id: &str) -> String {
    format!("{family_id}.css")
}

pub fn detail_file_name(family_id: &str) -> String {
    format!("{family_id}.json")
}

pub fn license_file_name(family_id: &str) -> String {
    format!("{family_id}-LICENSE.txt")
}

/// Scratch directory owned by one family.
pub fn scratch_dir(temp: &Path, family_id: &str) -> PathBuf {
    temp.join(family_id)
}

/// True if `scratch` is a direct, named child of `temp`.
pub fn is_scratch_child(temp: &Path, scratch: &Path) -> bool {
    scratch.parent() == Some(temp)
        && matches!(scratch.components().next_back(), Some(Component::Normal(_)))
}

/// Unicode range file handed to the subsetter.
pub fn range_scratch_path(temp: &Path, family_id: &str, subset: &str) -> PathBuf {
    scratch_dir(temp, family_id).join(format!("range-{subset}.txt"))
}

/// Intermediate subsetted font written by the subsetter.
pub fn subset_scratch_path(temp: &Path, family_id: &str, subset: &str) -> PathBuf {
    scratch_dir(temp, family_id).join(format!("{subset}.subset.ttf"))
}

/// Where the output tree puts each kind of artifact.
///
/// ```text
/// {output}/api/{version}/            fonts.json, subsets.json
/// {output}/api/{version}/fonts/      {id}.json, {id}.css, *.css, *.woff2
/// {output}/api/{version}/licenses/   {id}-LICENSE.txt
/// ```
///
/// Stylesheets and font binaries share a directory so the relative `url()`
/// references inside the CSS resolve.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    pub index_dir: PathBuf,
    pub fonts_dir: PathBuf,
    pub licenses_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(output: &Path, api_version: &str) -> Self {
        let index_dir = output.join("api").join(api_version);
        Self {
            fonts_dir: index_dir.join("fonts"),
            licenses_dir: index_dir.join("licenses"),
            index_dir,
        }
    }

    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.fonts_dir)?;
        std::fs::create_dir_all(&self.licenses_dir)
    }
}
