//! Catalog types shared by every pipeline stage.
//!
//! A [`FontFamily`] is built once per run by [`collect`](crate::collect) and
//! then only read: the attribute deriver, the emitters and the build
//! orchestrator all borrow the same collected list.

/// Tag of the variation axis that overrides per-font weights.
pub const WEIGHT_AXIS: &str = "wght";

/// One logical typeface family.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFamily {
    /// Lower-case, space-to-hyphen slug of `name`; the file-name prefix of
    /// every artifact the family produces.
    pub id: String,
    pub name: String,
    pub designer: String,
    pub license: String,
    pub category: Vec<String>,
    pub fonts: Vec<Font>,
    /// Subsets the family's source files actually cover.
    pub subsets: Vec<String>,
    /// Present only for variable fonts.
    pub axes: Vec<VariationAxis>,
    pub minisite_url: Option<String>,
}

impl FontFamily {
    /// The `wght` axis, if this is a variable-weight family.
    pub fn weight_axis(&self) -> Option<&VariationAxis> {
        self.axes.iter().find(|axis| axis.tag == WEIGHT_AXIS)
    }
}

/// One font file within a family.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub name: String,
    /// `normal`, `italic`, ...
    pub style: String,
    pub weight: u32,
    /// Source file name, e.g. `AlegreyaSans-Thin.ttf`
    pub filename: String,
    pub post_script_name: String,
    pub full_name: String,
    pub copyright: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariationAxis {
    pub tag: String,
    pub min_value: f32,
    pub max_value: f32,
}
