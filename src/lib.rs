//! # font-delivery
//!
//! Builds a static web-font catalog. Per-family `METADATA.pb` records are read
//! from a source tree, normalized into [`types::FontFamily`] values, and
//! turned into three kinds of artifact for a static file host: subsetted
//! WOFF2 binaries, `@font-face` stylesheets, and JSON indexes.
//!
//! # Architecture: Collect → Emit / Build
//!
//! ```text
//! 1. Collect   fonts/**/METADATA.pb  →  Vec<FontFamily>     (sorted, ignore list applied)
//! 2. Emit      Vec<FontFamily>       →  fonts.json, subsets.json, <id>.json, <id>.css
//! 3. Build     Vec<FontFamily>       →  <id>_<subset>_<weight>_<style>.woff2, licenses
//! ```
//!
//! Emit and Build are independent of each other. They agree on file names
//! only because both go through [`naming`], which owns every output and
//! scratch path.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`subsets`] | Unicode range table and its two formatters (tool file, CSS `unicode-range`) |
//! | [`textproto`] | Protobuf text-format reader producing a schema-less message tree |
//! | [`metadata`] | Maps a `METADATA.pb` message onto [`types::FontFamily`] |
//! | [`types`] | `FontFamily`, `Font`, `VariationAxis` |
//! | [`collect`] | Walks the source tree, reads every record, sorts the catalog |
//! | [`attributes`] | Weight tokens, weight/style rollups, renderable subsets |
//! | [`naming`] | Artifact, scratch and source path naming; output layout |
//! | [`emit`] | JSON index/detail documents and CSS stylesheets |
//! | [`tools`] | `ToolInvoker` trait and the subprocess implementation |
//! | [`build`] | Parallel per-family subset → compress → place orchestration |
//! | [`config`] | `font-delivery.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting for every stage |
//!
//! # Design Decisions
//!
//! ## External Tools Behind a Trait
//!
//! Subsetting and WOFF2 compression are delegated to `hb-subset` and
//! `woff2_compress`. The orchestrator only sees the [`tools::ToolInvoker`]
//! trait, so tests drive the whole pipeline with an in-process fake.
//!
//! ## One Family per Worker
//!
//! Families are the unit of parallelism. A worker builds every font and
//! subset of one family sequentially, inside a scratch directory named after
//! the family id. Distinct ids mean disjoint paths, so workers share the
//! output and scratch trees without locks.
//!
//! ## Fail Fast
//!
//! A malformed record aborts collection; a failed tool run aborts the build
//! after in-flight families finish. A catalog is either complete or reported
//! as failed, never silently partial.

pub mod attributes;
pub mod build;
pub mod collect;
pub mod config;
pub mod emit;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod subsets;
pub mod textproto;
pub mod tools;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
