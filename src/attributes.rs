//! Derived per-family attributes: weight tokens, weight and style rollups,
//! and the renderable subset intersection.
//!
//! Everything here is a pure function of a [`FontFamily`] (plus the requested
//! subset list). Rollups are computed as sets, so they do not depend on the
//! order fonts are declared in.
//!
//! ## Weight tokens
//!
//! A family with a `wght` variation axis is variable: every font in it
//! reports the axis bounds, regardless of its own `weight` field. Otherwise
//! each font reports its literal weight.
//!
//! | Family | `css_value()` | `file_token()` |
//! |---|---|---|
//! | `wght` axis 100..900 | `100 900` | `100-900` |
//! | `wght` axis 100..750.5 | `100 750.5` | `100-750.5` |
//! | font weight 400 | `400` | `400` |

use crate::types::{Font, FontFamily};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Weight of a font as it appears in CSS and in file names.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightToken {
    Fixed(u32),
    Variable { min: f32, max: f32 },
}

impl WeightToken {
    fn parts(&self) -> Vec<String> {
        match self {
            // f32 Display drops a zero fraction: 100.0 → "100", 750.5 → "750.5"
            WeightToken::Variable { min, max } => vec![min.to_string(), max.to_string()],
            WeightToken::Fixed(weight) => vec![weight.to_string()],
        }
    }

    /// Value of a `font-weight` declaration: bounds separated by a space.
    pub fn css_value(&self) -> String {
        self.parts().join(" ")
    }

    /// Weight segment of an artifact file name: bounds separated by a hyphen.
    pub fn file_token(&self) -> String {
        self.parts().join("-")
    }
}

impl fmt::Display for WeightToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_token())
    }
}

/// Weights serialize in their file-token form (`"400"`, `"100-900"`).
impl Serialize for WeightToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.file_token())
    }
}

/// Weight token for one font, following the family-wide axis rule.
pub fn font_weight(family: &FontFamily, font: &Font) -> WeightToken {
    match family.weight_axis() {
        Some(axis) => WeightToken::Variable {
            min: axis.min_value,
            max: axis.max_value,
        },
        None => WeightToken::Fixed(font.weight),
    }
}

/// Family weight set: the single axis range for variable families, else the
/// distinct literal weights in ascending numeric order.
pub fn family_weights(family: &FontFamily) -> Vec<WeightToken> {
    if let Some(axis) = family.weight_axis() {
        return vec![WeightToken::Variable {
            min: axis.min_value,
            max: axis.max_value,
        }];
    }
    let distinct: BTreeSet<u32> = family.fonts.iter().map(|f| f.weight).collect();
    distinct.into_iter().map(WeightToken::Fixed).collect()
}

/// Family style set: `normal` before `italic`, any other style after them in
/// byte order. Each style appears once.
pub fn family_styles(family: &FontFamily) -> Vec<String> {
    let distinct: BTreeSet<&str> = family.fonts.iter().map(|f| f.style.as_str()).collect();
    let mut styles: Vec<String> = Vec::with_capacity(distinct.len());
    for known in ["normal", "italic"] {
        if distinct.contains(known) {
            styles.push(known.to_string());
        }
    }
    styles.extend(
        distinct
            .iter()
            .filter(|s| !matches!(**s, "normal" | "italic"))
            .map(|s| s.to_string()),
    );
    styles
}

/// Requested subsets the family actually covers, in requested order.
pub fn renderable_subsets<'a>(family: &FontFamily, requested: &'a [String]) -> Vec<&'a str> {
    requested
        .iter()
        .filter(|subset| family.subsets.contains(*subset))
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{family, font, variable_family};

    fn weights_as_tokens(family: &FontFamily) -> Vec<String> {
        family_weights(family).iter().map(|w| w.file_token()).collect()
    }

    // =========================================================================
    // font_weight
    // =========================================================================

    #[test]
    fn variable_axis_overrides_every_font_weight() {
        let fam = variable_family(
            "Inter",
            vec![font("normal", 400), font("italic", 700)],
            100.0,
            900.0,
        );
        for f in &fam.fonts {
            let token = font_weight(&fam, f);
            assert_eq!(token.file_token(), "100-900");
            assert_eq!(token.css_value(), "100 900");
        }
    }

    #[test]
    fn fixed_weight_reported_per_font() {
        let fam = family("Lato", vec![font("normal", 300), font("normal", 700)]);
        assert_eq!(font_weight(&fam, &fam.fonts[0]), WeightToken::Fixed(300));
        assert_eq!(font_weight(&fam, &fam.fonts[1]).css_value(), "700");
    }

    #[test]
    fn fractional_axis_bound_kept() {
        let fam = variable_family("Recursive", vec![font("normal", 400)], 300.0, 1000.5);
        assert_eq!(font_weight(&fam, &fam.fonts[0]).file_token(), "300-1000.5");
    }

    #[test]
    fn non_weight_axis_is_ignored() {
        let mut fam = family("Roboto Flex", vec![font("normal", 400)]);
        fam.axes.push(crate::types::VariationAxis {
            tag: "wdth".to_string(),
            min_value: 25.0,
            max_value: 151.0,
        });
        assert_eq!(font_weight(&fam, &fam.fonts[0]), WeightToken::Fixed(400));
    }

    // =========================================================================
    // family_weights / family_styles
    // =========================================================================

    #[test]
    fn family_weights_distinct_ascending() {
        let mut fonts = Vec::new();
        for w in [900, 100, 300, 400, 500, 700, 800] {
            fonts.push(font("normal", w));
            fonts.push(font("italic", w));
        }
        let fam = family("Alegreya Sans", fonts);
        assert_eq!(
            weights_as_tokens(&fam),
            vec!["100", "300", "400", "500", "700", "800", "900"]
        );
    }

    #[test]
    fn family_weights_numeric_not_lexicographic() {
        let fam = family("Wide", vec![font("normal", 1000), font("normal", 200)]);
        assert_eq!(weights_as_tokens(&fam), vec!["200", "1000"]);
    }

    #[test]
    fn family_weights_variable_single_range() {
        let fam = variable_family(
            "JetBrains Mono",
            vec![font("normal", 400), font("italic", 400)],
            100.0,
            800.0,
        );
        assert_eq!(weights_as_tokens(&fam), vec!["100-800"]);
    }

    #[test]
    fn family_styles_normal_before_italic() {
        let fam = family(
            "Mixed",
            vec![font("italic", 400), font("normal", 400), font("normal", 700)],
        );
        assert_eq!(family_styles(&fam), vec!["normal", "italic"]);
    }

    #[test]
    fn family_styles_only_italic() {
        let fam = family("Slanted", vec![font("italic", 400)]);
        assert_eq!(family_styles(&fam), vec!["italic"]);
    }

    #[test]
    fn family_styles_unknown_style_after_known() {
        let fam = family(
            "Odd",
            vec![font("oblique", 400), font("normal", 400), font("italic", 400)],
        );
        assert_eq!(family_styles(&fam), vec!["normal", "italic", "oblique"]);
    }

    #[test]
    fn rollups_stable_under_font_reordering() {
        let fonts = vec![font("italic", 700), font("normal", 300), font("normal", 700)];
        let mut reversed = fonts.clone();
        reversed.reverse();
        let a = family("Order", fonts);
        let b = family("Order", reversed);
        assert_eq!(family_weights(&a), family_weights(&b));
        assert_eq!(family_styles(&a), family_styles(&b));
    }

    // =========================================================================
    // renderable_subsets
    // =========================================================================

    #[test]
    fn renderable_subsets_follow_requested_order() {
        let mut fam = family("Multi", vec![font("normal", 400)]);
        fam.subsets = vec!["cyrillic".into(), "menu".into(), "latin".into()];
        let requested: Vec<String> = vec!["latin".into(), "greek".into(), "cyrillic".into()];
        assert_eq!(renderable_subsets(&fam, &requested), vec!["latin", "cyrillic"]);
    }

    #[test]
    fn renderable_subsets_empty_intersection() {
        let mut fam = family("Devanagari Only", vec![font("normal", 400)]);
        fam.subsets = vec!["devanagari".into()];
        let requested: Vec<String> = vec!["latin".into()];
        assert!(renderable_subsets(&fam, &requested).is_empty());
    }

    #[test]
    fn weight_token_serializes_as_file_token() {
        let json = serde_json::to_string(&vec![
            WeightToken::Fixed(400),
            WeightToken::Variable {
                min: 100.0,
                max: 900.0,
            },
        ])
        .unwrap();
        assert_eq!(json, r#"["400","100-900"]"#);
    }
}
