//! Unicode range table for the named subsets served by the catalog.
//!
//! Each subset maps to an ordered list of code-point ranges. The table is the
//! single source of truth for both consumers of range data:
//!
//! - [`tool_range_format`] feeds the external subsetting tool, one range per
//!   line (`0000-00FF`, `0131`, ...).
//! - [`css_range_format`] produces the value of a `unicode-range` CSS
//!   declaration (`U+0000-00FF, U+0131, ...`).
//!
//! Both formatters reject names that are not in the table. An unknown subset
//! is a configuration error, so it surfaces as [`SubsetError::UnknownSubset`]
//! instead of an empty string.

use std::fmt::Write as _;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubsetError {
    #[error("Unknown subset: {0}")]
    UnknownSubset(String),
}

/// A single code point or an inclusive `[low, high]` span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicodeRange {
    Single(u32),
    Span(u32, u32),
}

use UnicodeRange::{Single, Span};

const LATIN: &[UnicodeRange] = &[
    Span(0x0000, 0x00FF),
    Single(0x0131),
    Span(0x0152, 0x0153),
    Span(0x02BB, 0x02BC),
    Single(0x02C6),
    Single(0x02DA),
    Single(0x02DC),
    Single(0x0304),
    Single(0x0308),
    Single(0x0329),
    Span(0x2000, 0x206F),
    Single(0x20AC),
    Single(0x2122),
    Single(0x2191),
    Single(0x2193),
    Single(0x2212),
    Single(0x2215),
    Single(0xFEFF),
    Single(0xFFFD),
];

const LATIN_EXT: &[UnicodeRange] = &[
    Span(0x0100, 0x02BA),
    Span(0x02BD, 0x02C5),
    Span(0x02C7, 0x02CC),
    Span(0x02CE, 0x02D7),
    Span(0x02DD, 0x02FF),
    Single(0x0304),
    Single(0x0308),
    Single(0x0329),
    Span(0x1D00, 0x1DBF),
    Span(0x1E00, 0x1E9F),
    Span(0x1EF2, 0x1EFF),
    Single(0x2020),
    Span(0x20A0, 0x20AB),
    Span(0x20AD, 0x20C0),
    Single(0x2113),
    Span(0x2C60, 0x2C7F),
    Span(0xA720, 0xA7FF),
];

const VIETNAMESE: &[UnicodeRange] = &[
    Span(0x0102, 0x0103),
    Span(0x0110, 0x0111),
    Span(0x0128, 0x0129),
    Span(0x0168, 0x0169),
    Span(0x01A0, 0x01A1),
    Span(0x01AF, 0x01B0),
    Span(0x0300, 0x0301),
    Span(0x0303, 0x0304),
    Span(0x0308, 0x0309),
    Single(0x0323),
    Single(0x0329),
    Span(0x1EA0, 0x1EF9),
    Single(0x20AB),
];

const CYRILLIC_EXT: &[UnicodeRange] = &[
    Span(0x0460, 0x052F),
    Span(0x1C80, 0x1C8A),
    Single(0x20B4),
    Span(0x2DE0, 0x2DFF),
    Span(0xA640, 0xA69F),
    Span(0xFE2E, 0xFE2F),
];

const CYRILLIC: &[UnicodeRange] = &[
    Single(0x0301),
    Span(0x0400, 0x045F),
    Span(0x0490, 0x0491),
    Span(0x04B0, 0x04B1),
    Single(0x2116),
];

const GREEK_EXT: &[UnicodeRange] = &[Span(0x1F00, 0x1FFF)];

const GREEK: &[UnicodeRange] = &[
    Span(0x0370, 0x0377),
    Span(0x037A, 0x037F),
    Span(0x0384, 0x038A),
    Single(0x038C),
    Span(0x038E, 0x03A1),
    Span(0x03A3, 0x03FF),
];

const HEBREW: &[UnicodeRange] = &[
    Span(0x0307, 0x0308),
    Span(0x0590, 0x05FF),
    Span(0x200C, 0x2010),
    Single(0x20AA),
    Single(0x25CC),
    Span(0xFB1D, 0xFB4F),
];

/// Subset name → ranges, in the order the catalog lists them by default.
pub const SUBSET_RANGES: &[(&str, &[UnicodeRange])] = &[
    ("latin", LATIN),
    ("latin-ext", LATIN_EXT),
    ("vietnamese", VIETNAMESE),
    ("cyrillic", CYRILLIC),
    ("cyrillic-ext", CYRILLIC_EXT),
    ("hebrew", HEBREW),
    ("greek", GREEK),
    ("greek-ext", GREEK_EXT),
];

/// All subset names known to the table.
pub fn known_subsets() -> impl Iterator<Item = &'static str> {
    SUBSET_RANGES.iter().map(|(name, _)| *name)
}

/// Look up the ranges for a subset.
pub fn ranges(subset: &str) -> Result<&'static [UnicodeRange], SubsetError> {
    SUBSET_RANGES
        .iter()
        .find(|(name, _)| *name == subset)
        .map(|(_, ranges)| *ranges)
        .ok_or_else(|| SubsetError::UnknownSubset(subset.to_string()))
}

/// Ranges in the subsetting tool's unicodes-file format:
///
/// ```text
/// 0000-00FF
/// 0131
/// 0152-0153
/// ```
///
/// Every line, including the last, is newline-terminated.
pub fn tool_range_format(subset: &str) -> Result<String, SubsetError> {
    let mut out = String::new();
    for range in ranges(subset)? {
        // Writing into a String cannot fail
        let _ = match range {
            Single(cp) => writeln!(out, "{cp:04X}"),
            Span(lo, hi) => writeln!(out, "{lo:04X}-{hi:04X}"),
        };
    }
    Ok(out)
}

/// Ranges as a CSS `unicode-range` value: `U+0000-00FF, U+0131, ...`.
pub fn css_range_format(subset: &str) -> Result<String, SubsetError> {
    let tokens: Vec<String> = ranges(subset)?
        .iter()
        .map(|range| match range {
            Single(cp) => format!("U+{cp:04X}"),
            Span(lo, hi) => format!("U+{lo:04X}-{hi:04X}"),
        })
        .collect();
    Ok(tokens.join(", "))
}
