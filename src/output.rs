//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **family-centric, not file-centric**. The primary display for
//! every family is its positional index and display name; ids, derived
//! attributes and produced files follow as indented context lines.
//!
//! # Output Format
//!
//! ## Collect
//!
//! ```text
//! Families
//! 001 Alegreya Sans (14 fonts)
//!     Id: alegreya-sans
//!     Weights: 100, 300, 400, 500, 700, 800, 900
//!     Styles: normal, italic
//!     Subsets: latin, latin-ext, vietnamese
//! 002 Noto Sans Thai (1 font)
//!     Id: noto-sans-thai
//!     Subsets: none requested (thai)
//!
//! Collected 2 families, 1 renderable
//! ```
//!
//! ## Emit
//!
//! ```text
//! Index → api/v2/fonts.json
//! Subsets → api/v2/subsets.json
//! 001 alegreya-sans → api/v2/fonts/alegreya-sans.json
//!
//! Skipped (no renderable subsets)
//!     noto-sans-thai
//!
//! Emitted 1 family, 1 stylesheet
//! ```
//!
//! ## Build
//!
//! ```text
//! alegreya-sans (14 fonts × 3 subsets)
//!     alegreya-sans_latin_100_normal.woff2
//!     ...
//!     42 files, license copied
//!
//! Built 42 files for 1 family, 1 skipped
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::attributes;
use crate::build::{BuildEvent, BuildSummary};
use crate::emit::EmitSummary;
use crate::types::FontFamily;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 family`, `3 families`.
fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

/// Path relative to `root` for display, falling back to the full path.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

// ============================================================================
// Collect
// ============================================================================

/// Format the collected catalog against the requested subsets.
pub fn format_collect_output(families: &[FontFamily], requested: &[String]) -> Vec<String> {
    let mut lines = vec!["Families".to_string()];
    let mut renderable_count = 0;

    for (i, family) in families.iter().enumerate() {
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            family.name,
            plural(family.fonts.len(), "font", "fonts")
        ));
        lines.push(format!("{}Id: {}", indent(1), family.id));

        let renderable = attributes::renderable_subsets(family, requested);
        if renderable.is_empty() {
            lines.push(format!(
                "{}Subsets: none requested ({})",
                indent(1),
                family.subsets.join(", ")
            ));
            continue;
        }
        renderable_count += 1;

        let weights: Vec<String> = attributes::family_weights(family)
            .iter()
            .map(|w| w.file_token())
            .collect();
        lines.push(format!("{}Weights: {}", indent(1), weights.join(", ")));
        lines.push(format!(
            "{}Styles: {}",
            indent(1),
            attributes::family_styles(family).join(", ")
        ));
        lines.push(format!("{}Subsets: {}", indent(1), renderable.join(", ")));
    }

    lines.push(String::new());
    lines.push(format!(
        "Collected {}, {} renderable",
        plural(families.len(), "family", "families"),
        renderable_count
    ));
    lines
}

pub fn print_collect_output(families: &[FontFamily], requested: &[String]) {
    for line in format_collect_output(families, requested) {
        println!("{}", line);
    }
}

// ============================================================================
// Emit
// ============================================================================

/// Format the emit summary. Paths are shown relative to `output_root`.
pub fn format_emit_output(summary: &EmitSummary, output_root: &Path) -> Vec<String> {
    let mut lines = vec![
        format!("Index → {}", display_path(&summary.index_path, output_root)),
        format!("Subsets → {}", display_path(&summary.subsets_path, output_root)),
    ];

    let fonts_dir = summary.index_path.parent().map(|dir| dir.join("fonts"));
    for (i, id) in summary.emitted.iter().enumerate() {
        let detail = match &fonts_dir {
            Some(dir) => display_path(&dir.join(crate::naming::detail_file_name(id)), output_root),
            None => crate::naming::detail_file_name(id),
        };
        lines.push(format!("{} {} → {}", format_index(i + 1), id, detail));
    }

    if !summary.skipped.is_empty() {
        lines.push(String::new());
        lines.push("Skipped (no renderable subsets)".to_string());
        for id in &summary.skipped {
            lines.push(format!("{}{}", indent(1), id));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Emitted {}, {}",
        plural(summary.emitted.len(), "family", "families"),
        plural(summary.stylesheets, "stylesheet", "stylesheets")
    ));
    lines
}

pub fn print_emit_output(summary: &EmitSummary, output_root: &Path) {
    for line in format_emit_output(summary, output_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::FamilyStarted {
            family,
            fonts,
            subsets,
        } => vec![format!(
            "{} ({} × {})",
            family,
            plural(*fonts, "font", "fonts"),
            plural(*subsets, "subset", "subsets")
        )],
        BuildEvent::FontBuilt { file, .. } => vec![format!("{}{}", indent(1), file)],
        BuildEvent::FamilySkipped { family } => {
            vec![format!("{}: skipped, no renderable subsets", family)]
        }
        BuildEvent::FamilyFinished { files, license, .. } => {
            let mut line = format!("{}{}", indent(1), plural(*files, "file", "files"));
            if *license {
                line.push_str(", license copied");
            }
            vec![line]
        }
    }
}

pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    let mut line = format!(
        "Built {} for {}",
        plural(summary.file_count(), "file", "files"),
        plural(summary.families.len(), "family", "families")
    );
    if !summary.skipped.is_empty() {
        line.push_str(&format!(", {} skipped", summary.skipped.len()));
    }
    vec![String::new(), line]
}

pub fn print_build_summary(summary: &BuildSummary) {
    for line in format_build_summary(summary) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::FamilyReport;
    use crate::test_helpers::*;
    use std::path::PathBuf;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "family", "families"), "1 family");
        assert_eq!(plural(0, "family", "families"), "0 families");
        assert_eq!(plural(3, "font", "fonts"), "3 fonts");
    }

    #[test]
    fn display_path_strips_root() {
        assert_eq!(
            display_path(Path::new("/out/api/v2/fonts.json"), Path::new("/out")),
            "api/v2/fonts.json"
        );
        assert_eq!(
            display_path(Path::new("/elsewhere/x"), Path::new("/out")),
            "/elsewhere/x"
        );
    }

    // =========================================================================
    // Collect
    // =========================================================================

    #[test]
    fn collect_output_lists_families_with_attributes() {
        let mut thai = family("Noto Sans Thai", vec![font("normal", 400)]);
        thai.subsets = subsets(&["thai"]);
        let families = vec![
            family("Lato", vec![font("normal", 400), font("italic", 700)]),
            thai,
        ];

        let lines = format_collect_output(&families, &subsets(&["latin"]));
        assert_eq!(
            lines,
            vec![
                "Families",
                "001 Lato (2 fonts)",
                "    Id: lato",
                "    Weights: 400, 700",
                "    Styles: normal, italic",
                "    Subsets: latin",
                "002 Noto Sans Thai (1 font)",
                "    Id: noto-sans-thai",
                "    Subsets: none requested (thai)",
                "",
                "Collected 2 families, 1 renderable",
            ]
        );
    }

    #[test]
    fn collect_output_variable_weights() {
        let families = vec![variable_family("Inter", vec![font("normal", 400)], 100.0, 900.0)];
        let lines = format_collect_output(&families, &subsets(&["latin"]));
        assert!(lines.contains(&"    Weights: 100-900".to_string()));
    }

    // =========================================================================
    // Emit
    // =========================================================================

    #[test]
    fn emit_output_relative_paths() {
        let summary = EmitSummary {
            emitted: vec!["lato".to_string()],
            skipped: vec!["noto-sans-thai".to_string()],
            stylesheets: 1,
            index_path: PathBuf::from("/out/api/v2/fonts.json"),
            subsets_path: PathBuf::from("/out/api/v2/subsets.json"),
        };
        let lines = format_emit_output(&summary, Path::new("/out"));
        assert_eq!(
            lines,
            vec![
                "Index → api/v2/fonts.json",
                "Subsets → api/v2/subsets.json",
                "001 lato → api/v2/fonts/lato.json",
                "",
                "Skipped (no renderable subsets)",
                "    noto-sans-thai",
                "",
                "Emitted 1 family, 1 stylesheet",
            ]
        );
    }

    // =========================================================================
    // Build
    // =========================================================================

    #[test]
    fn build_events_format() {
        let started = BuildEvent::FamilyStarted {
            family: "lato".to_string(),
            fonts: 2,
            subsets: 1,
        };
        assert_eq!(format_build_event(&started), vec!["lato (2 fonts × 1 subset)"]);

        let built = BuildEvent::FontBuilt {
            family: "lato".to_string(),
            file: "lato_latin_400_normal.woff2".to_string(),
        };
        assert_eq!(
            format_build_event(&built),
            vec!["    lato_latin_400_normal.woff2"]
        );

        let finished = BuildEvent::FamilyFinished {
            family: "lato".to_string(),
            files: 2,
            license: true,
        };
        assert_eq!(
            format_build_event(&finished),
            vec!["    2 files, license copied"]
        );

        let skipped = BuildEvent::FamilySkipped {
            family: "noto-sans-thai".to_string(),
        };
        assert_eq!(
            format_build_event(&skipped),
            vec!["noto-sans-thai: skipped, no renderable subsets"]
        );
    }

    #[test]
    fn build_summary_counts() {
        let summary = BuildSummary {
            families: vec![
                FamilyReport {
                    id: "lato".to_string(),
                    files: vec![PathBuf::from("a.woff2"), PathBuf::from("b.woff2")],
                    license: None,
                },
                FamilyReport {
                    id: "roboto".to_string(),
                    files: vec![PathBuf::from("c.woff2")],
                    license: None,
                },
            ],
            skipped: vec!["noto-sans-thai".to_string()],
        };
        assert_eq!(
            format_build_summary(&summary),
            vec!["", "Built 3 files for 2 families, 1 skipped"]
        );
    }
}
