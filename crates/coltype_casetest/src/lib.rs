//! Runner for declarative type parsing case files.
mod case;
mod check;

use std::fs;
use std::path::{Path, PathBuf};

use coltype::ParserConfig;
use coltype_error::{ColtypeError, Result, ResultExt};
use libtest_mimic::{Arguments, Trial};
use logutil::{configure_global_logger, LogFormat, LogTarget};
use tracing::info;

pub use case::{parse_cases, Case, CaseKind};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunConfig {
    /// Parser config used for every case in a file.
    pub parser: ParserConfig,
}

/// Run all case files from the provided paths, one test per file.
///
/// This sets up tracing to log only at the ERROR level. RUST_LOG can be used
/// to print out logs at a lower level.
///
/// `kind` should be used to group these tests together.
pub fn run(paths: impl IntoIterator<Item = PathBuf>, conf: RunConfig, kind: &str) -> Result<()> {
    let args = Arguments::from_args();
    configure_global_logger(tracing::Level::ERROR, LogFormat::Compact, LogTarget::TestWriter);

    let tests = paths
        .into_iter()
        .map(|path| {
            let test_name = path.to_string_lossy().to_string();
            let test_name = test_name.trim_start_matches("../").to_string();
            Trial::test(test_name, move || match run_file(&path, conf) {
                Ok(_) => Ok(()),
                Err(e) => Err(e.into()),
            })
            .with_kind(kind)
        })
        .collect();

    libtest_mimic::run(&args, tests).exit_if_failed();

    Ok(())
}

/// Recursively find all case files (`.test`) in the given directory.
pub fn find_files(dir: &Path) -> Result<Vec<PathBuf>> {
    fn inner(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
        if dir.is_dir() {
            for entry in fs::read_dir(dir).context("read dir")? {
                let entry = entry.context("entry")?;
                let path = entry.path();
                if path.is_dir() {
                    inner(&path, paths)?;
                } else if path.extension().is_some_and(|ext| ext == "test") {
                    paths.push(path.to_path_buf());
                }
            }
        }
        Ok(())
    }

    let mut paths = Vec::new();
    inner(dir, &mut paths)?;
    paths.sort();

    Ok(paths)
}

/// Run every case in a single file, reporting all failures at once.
pub fn run_file(path: &Path, conf: RunConfig) -> Result<()> {
    let content = fs::read_to_string(path).context_fn(|| format!("read {}", path.display()))?;
    let cases = parse_cases(&content).context_fn(|| format!("parse {}", path.display()))?;
    info!(path = %path.display(), cases = cases.len(), "running case file");

    let failures: Vec<_> = cases
        .iter()
        .filter_map(|case| {
            check::run_case(case, conf)
                .err()
                .map(|e| format!("{}:{}: {}", path.display(), case.line, e.get_msg()))
        })
        .collect();

    if failures.is_empty() {
        return Ok(());
    }
    Err(ColtypeError::new(format!(
        "{} of {} cases failed\n{}",
        failures.len(),
        cases.len(),
        failures.join("\n")
    )))
}
