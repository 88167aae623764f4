//! Shared test utilities for the font-delivery test suite.
//!
//! Provides family builders, a `METADATA.pb` renderer, source-tree fixture
//! writers and lookup helpers that work with collected families.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! let fam = family("Lato", vec![font("normal", 400), font("italic", 400)]);
//! write_source_tree(tmp.path(), &fam);
//!
//! let families = collect(tmp.path(), &[]).unwrap();
//! assert_eq!(family_ids(&families), vec!["lato"]);
//! ```

use std::path::{Path, PathBuf};

use crate::naming;
use crate::types::{Font, FontFamily, VariationAxis};

// =========================================================================
// Builders
// =========================================================================

/// A font with the given style and weight. The file name is derived from
/// both so fonts in one family never share a source file.
pub fn font(style: &str, weight: u32) -> Font {
    Font {
        name: String::new(),
        style: style.to_string(),
        weight,
        filename: format!("Font-{weight}-{style}.ttf"),
        post_script_name: String::new(),
        full_name: String::new(),
        copyright: String::new(),
    }
}

/// A static OFL family covering `latin` only.
pub fn family(name: &str, fonts: Vec<Font>) -> FontFamily {
    let fonts = fonts
        .into_iter()
        .map(|mut f| {
            f.name = name.to_string();
            f.filename = format!("{}-{}", name.replace(' ', ""), f.filename);
            f
        })
        .collect();
    FontFamily {
        id: naming::family_id(name),
        name: name.to_string(),
        designer: "Test Designer".to_string(),
        license: "OFL".to_string(),
        category: vec!["SANS_SERIF".to_string()],
        fonts,
        subsets: vec!["latin".to_string()],
        axes: Vec::new(),
        minisite_url: None,
    }
}

/// A family with a `wght` axis spanning `min..=max`.
pub fn variable_family(name: &str, fonts: Vec<Font>, min: f32, max: f32) -> FontFamily {
    let mut fam = family(name, fonts);
    fam.axes.push(VariationAxis {
        tag: "wght".to_string(),
        min_value: min,
        max_value: max,
    });
    fam
}

/// Requested subset list from string literals.
pub fn subsets(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

// =========================================================================
// Fixture writers
// =========================================================================

/// Render a family back into `METADATA.pb` text.
pub fn metadata_text(family: &FontFamily) -> String {
    let mut out = format!(
        "name: \"{}\"\ndesigner: \"{}\"\nlicense: \"{}\"\n",
        family.name, family.designer, family.license
    );
    for category in &family.category {
        out.push_str(&format!("category: \"{category}\"\n"));
    }
    for f in &family.fonts {
        out.push_str(&format!(
            "fonts {{\n  name: \"{}\"\n  style: \"{}\"\n  weight: {}\n  filename: \"{}\"\n}}\n",
            f.name, f.style, f.weight, f.filename
        ));
    }
    for subset in &family.subsets {
        out.push_str(&format!("subsets: \"{subset}\"\n"));
    }
    for axis in &family.axes {
        out.push_str(&format!(
            "axes {{\n  tag: \"{}\"\n  min_value: {:?}\n  max_value: {:?}\n}}\n",
            axis.tag, axis.min_value, axis.max_value
        ));
    }
    out
}

/// Write a family's source directory: `METADATA.pb`, one dummy binary per
/// font and an `OFL.txt`. Returns the family directory.
pub fn write_source_tree(input: &Path, family: &FontFamily) -> PathBuf {
    let dir = naming::family_source_dir(input, family);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("METADATA.pb"), metadata_text(family)).unwrap();
    for f in &family.fonts {
        std::fs::write(dir.join(&f.filename), format!("ttf:{}", f.filename)).unwrap();
    }
    std::fs::write(dir.join("OFL.txt"), format!("license for {}", family.name)).unwrap();
    dir
}

// =========================================================================
// Lookups
// =========================================================================

/// All family ids in list order.
pub fn family_ids(families: &[FontFamily]) -> Vec<&str> {
    families.iter().map(|f| f.id.as_str()).collect()
}

/// Find a family by id. Panics if not found.
pub fn find_family<'a>(families: &'a [FontFamily], id: &str) -> &'a FontFamily {
    families.iter().find(|f| f.id == id).unwrap_or_else(|| {
        let ids = family_ids(families);
        panic!("family '{id}' not found. Available: {ids:?}")
    })
}

/// Sorted file names directly inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
