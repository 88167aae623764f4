//! External tool invocation.
//!
//! The [`ToolInvoker`] trait is the seam between the build orchestrator and
//! the two external programs it drives:
//!
//! | Operation | Default tool | Command line |
//! |---|---|---|
//! | subset | `hb-subset` | `hb-subset --unicodes-file=<ranges> --output-file=<out> <input>` |
//! | compress | `woff2_compress` | `woff2_compress <input>` → `<input stem>.woff2` |
//!
//! [`CommandInvoker`] runs the real binaries. Each call blocks until the
//! subprocess exits; no timeout is applied. Tests substitute an in-process
//! fake that records calls and writes placeholder files.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },
    #[error("{tool} reported success but did not produce {path}")]
    MissingOutput { tool: String, path: PathBuf },
}

/// Interface to the subsetting and compression tools.
///
/// Implementations must be `Sync`: one invoker is shared by every worker in
/// the build pool.
pub trait ToolInvoker: Sync {
    /// Subset `input` to the code points listed in `ranges_file`, writing the
    /// result to `output`.
    fn subset(&self, ranges_file: &Path, input: &Path, output: &Path) -> Result<(), ToolError>;

    /// Compress `input` to WOFF2. Returns the path of the compressed sibling
    /// file (same stem, `.woff2` extension).
    fn compress(&self, input: &Path) -> Result<PathBuf, ToolError>;
}

/// Path the compressor writes for a given input.
pub fn compressed_sibling(input: &Path) -> PathBuf {
    input.with_extension("woff2")
}

/// Runs the configured tools as subprocesses.
#[derive(Debug, Clone)]
pub struct CommandInvoker {
    pub subsetter: String,
    pub compressor: String,
}

impl CommandInvoker {
    pub fn new(subsetter: impl Into<String>, compressor: impl Into<String>) -> Self {
        Self {
            subsetter: subsetter.into(),
            compressor: compressor.into(),
        }
    }

    fn run(tool: &str, command: &mut Command) -> Result<(), ToolError> {
        log::debug!("running {command:?}");
        let output = command.output().map_err(|source| ToolError::Spawn {
            tool: tool.to_string(),
            source,
        })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(ToolError::Failed {
                tool: tool.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl ToolInvoker for CommandInvoker {
    fn subset(&self, ranges_file: &Path, input: &Path, output: &Path) -> Result<(), ToolError> {
        let mut unicodes_arg = std::ffi::OsString::from("--unicodes-file=");
        unicodes_arg.push(ranges_file);
        let mut output_arg = std::ffi::OsString::from("--output-file=");
        output_arg.push(output);

        Self::run(
            &self.subsetter,
            Command::new(&self.subsetter)
                .arg(unicodes_arg)
                .arg(output_arg)
                .arg(input),
        )
    }

    fn compress(&self, input: &Path) -> Result<PathBuf, ToolError> {
        Self::run(&self.compressor, Command::new(&self.compressor).arg(input))?;
        let compressed = compressed_sibling(input);
        if !compressed.exists() {
            return Err(ToolError::MissingOutput {
                tool: self.compressor.clone(),
                path: compressed,
            });
        }
        Ok(compressed)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fake invoker that records operations and writes placeholder outputs.
    /// Uses Mutex (not RefCell) so it is Sync and works with rayon's par_iter.
    #[derive(Default)]
    pub struct MockInvoker {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// Any call whose input path contains one of these fragments fails.
        pub fail_on: Vec<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Subset {
            ranges: String,
            input: String,
            output: String,
        },
        Compress(String),
    }

    impl MockInvoker {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(fragment: &str) -> Self {
            Self {
                operations: Mutex::new(Vec::new()),
                fail_on: vec![fragment.to_string()],
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn check(&self, tool: &str, input: &Path) -> Result<(), ToolError> {
            let text = input.to_string_lossy();
            if self.fail_on.iter().any(|f| text.contains(f.as_str())) {
                return Err(ToolError::Failed {
                    tool: tool.to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: format!("mock failure for {text}"),
                });
            }
            Ok(())
        }
    }

    impl ToolInvoker for MockInvoker {
        fn subset(&self, ranges_file: &Path, input: &Path, output: &Path) -> Result<(), ToolError> {
            self.operations.lock().unwrap().push(RecordedOp::Subset {
                ranges: ranges_file.to_string_lossy().to_string(),
                input: input.to_string_lossy().to_string(),
                output: output.to_string_lossy().to_string(),
            });
            self.check("hb-subset", input)?;
            let ranges = std::fs::read_to_string(ranges_file).map_err(|source| ToolError::Spawn {
                tool: "hb-subset".to_string(),
                source,
            })?;
            std::fs::write(output, format!("subset of {}\n{ranges}", input.display())).map_err(
                |source| ToolError::Spawn {
                    tool: "hb-subset".to_string(),
                    source,
                },
            )
        }

        fn compress(&self, input: &Path) -> Result<PathBuf, ToolError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Compress(input.to_string_lossy().to_string()));
            self.check("woff2_compress", input)?;
            let compressed = compressed_sibling(input);
            std::fs::copy(input, &compressed).map_err(|source| ToolError::Spawn {
                tool: "woff2_compress".to_string(),
                source,
            })?;
            Ok(compressed)
        }
    }

    #[test]
    fn compressed_sibling_swaps_extension() {
        assert_eq!(
            compressed_sibling(Path::new("tmp/lato/latin.subset.ttf")),
            Path::new("tmp/lato/latin.subset.woff2")
        );
    }

    #[test]
    fn mock_records_and_writes_outputs() {
        let tmp = tempfile::TempDir::new().unwrap();
        let ranges = tmp.path().join("range-latin.txt");
        let input = tmp.path().join("Lato-Regular.ttf");
        let output = tmp.path().join("latin.subset.ttf");
        std::fs::write(&ranges, "0000-00FF\n").unwrap();

        let invoker = MockInvoker::new();
        invoker.subset(&ranges, &input, &output).unwrap();
        let compressed = invoker.compress(&output).unwrap();

        assert_eq!(compressed, tmp.path().join("latin.subset.woff2"));
        assert!(std::fs::read_to_string(&compressed).unwrap().contains("0000-00FF"));
        let ops = invoker.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[1], RecordedOp::Compress(p) if p.ends_with("latin.subset.ttf")));
    }

    #[test]
    fn mock_fails_on_matching_input() {
        let invoker = MockInvoker::failing_on("Broken");
        let err = invoker.compress(Path::new("/x/Broken.ttf")).unwrap_err();
        assert!(matches!(err, ToolError::Failed { ref tool, .. } if tool == "woff2_compress"));
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let invoker = CommandInvoker::new("font-delivery-no-such-subsetter", "woff2_compress");
        let err = invoker
            .subset(Path::new("r.txt"), Path::new("in.ttf"), Path::new("out.ttf"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_failure() {
        let invoker = CommandInvoker::new("false", "false");
        let err = invoker
            .subset(Path::new("r.txt"), Path::new("in.ttf"), Path::new("out.ttf"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed { ref tool, .. } if tool == "false"));
    }

    #[cfg(unix)]
    #[test]
    fn success_without_output_is_missing_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let input = tmp.path().join("latin.subset.ttf");
        std::fs::write(&input, "ttf").unwrap();

        let invoker = CommandInvoker::new("true", "true");
        let err = invoker.compress(&input).unwrap_err();
        assert!(
            matches!(err, ToolError::MissingOutput { ref path, .. } if path.ends_with("latin.subset.woff2"))
        );
    }
}
