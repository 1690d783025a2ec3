//! Reading and writing of workload and result files.
//!
//! These files are the reproduction artifacts of a divergence: the workload
//! that triggered it, the reference's result vector and the diverging engine's
//! result vector.

use super::Workload;
use crate::common::error::HarnessError;

use std::{
    fs,
    path::{Path, PathBuf},
};

pub const WORKLOAD_FILE: &str = "workload.txt";
pub const EXPECTED_FILE: &str = "expected.txt";
pub const ACTUAL_FILE: &str = "actual.txt";

/// Writes `workload` to `path` in the format of [`Workload::to_text`].
pub fn write_workload(path: impl AsRef<Path>, workload: &Workload) -> Result<(), HarnessError> {
    fs::write(path, workload.to_text())?;
    Ok(())
}

pub fn read_workload(path: impl AsRef<Path>) -> Result<Workload, HarnessError> {
    Workload::from_text(&fs::read_to_string(path)?)
}

/// Serializes a result vector: the element count on the first line, the
/// space-separated elements on the second.
pub fn results_to_text(results: &[u64]) -> String {
    let values = results
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}\n{values}\n", results.len())
}

pub fn results_from_text(text: &str) -> Result<Vec<u64>, HarnessError> {
    let mut lines = text.lines();

    let len = lines
        .next()
        .and_then(|line| line.trim().parse::<usize>().ok())
        .ok_or_else(|| HarnessError::parse(1, "expected the element count"))?;

    let results = lines
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .map(|value| {
            value
                .parse::<u64>()
                .map_err(|e| HarnessError::parse(2, format!("`{value}`: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if results.len() != len {
        return Err(HarnessError::parse(
            2,
            format!("expected {len} elements, found {}", results.len()),
        ));
    }
    Ok(results)
}

pub fn write_results(path: impl AsRef<Path>, results: &[u64]) -> Result<(), HarnessError> {
    fs::write(path, results_to_text(results))?;
    Ok(())
}

pub fn read_results(path: impl AsRef<Path>) -> Result<Vec<u64>, HarnessError> {
    results_from_text(&fs::read_to_string(path)?)
}

/// Creates a fresh `divergence-<uuid>` directory under `root` and writes the
/// workload and both result vectors into it. Returns the new directory.
pub(crate) fn write_divergence(
    root: &Path,
    workload: &Workload,
    expected: &[u64],
    actual: &[u64],
) -> Result<PathBuf, HarnessError> {
    let dir = root.join(format!("divergence-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir)?;
    write_workload(dir.join(WORKLOAD_FILE), workload)?;
    write_results(dir.join(EXPECTED_FILE), expected)?;
    write_results(dir.join(ACTUAL_FILE), actual)?;
    Ok(dir)
}
