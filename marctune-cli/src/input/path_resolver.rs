//! Input path resolution
//!
//! An input is a regular file, a directory (its regular files, not
//! recursive) or a glob pattern. Directory and glob results are filtered by
//! extension; explicitly named files are taken as given. Inputs keep their
//! command-line order, and each directory or glob expands in sorted order.

use crate::error::CliError;
use anyhow::{Context, Result};
use glob::glob;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Whether `path` ends in one of `extensions` (case-insensitive)
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Resolve inputs to a de-duplicated list of files in command-line order
pub fn resolve_inputs(inputs: &[String], extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            let found = directory_files(path, extensions)?;
            if found.is_empty() {
                return Err(CliError::NoInputs(format!(
                    "directory {} has no {} files",
                    path.display(),
                    extensions.join("/")
                ))
                .into());
            }
            files.extend(found);
        } else if is_pattern(input) {
            files.extend(pattern_files(input, extensions)?);
        } else {
            return Err(CliError::FileNotFound(input.clone()).into());
        }
    }

    if files.is_empty() {
        return Err(CliError::NoInputs(inputs.join(", ")).into());
    }

    // First occurrence wins
    let mut seen = HashSet::new();
    files.retain(|file| seen.insert(file.clone()));

    Ok(files)
}

fn is_pattern(input: &str) -> bool {
    input.contains(['*', '?', '['])
}

fn directory_files(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?
            .path();
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn pattern_files(pattern: &str, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let paths = glob(pattern).map_err(|_| CliError::InvalidPattern(pattern.to_string()))?;

    let mut files = Vec::new();
    for path_result in paths {
        let path = path_result.with_context(|| format!("Error resolving pattern: {pattern}"))?;
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "<collection/>").unwrap();
        path
    }

    #[test]
    fn test_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = touch(temp_dir.path(), "records.marcxml");

        let files = resolve_inputs(&[file.display().to_string()], &["xml"]).unwrap();
        assert_eq!(files, vec![file]);
    }

    #[test]
    fn test_directory_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let b = touch(temp_dir.path(), "b.xml");
        let a = touch(temp_dir.path(), "a.XML");
        touch(temp_dir.path(), "notes.txt");
        fs::create_dir(temp_dir.path().join("nested.xml")).unwrap();

        let files = resolve_inputs(&[temp_dir.path().display().to_string()], &["xml"]).unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn test_glob_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let one = touch(temp_dir.path(), "part1.xml");
        let two = touch(temp_dir.path(), "part2.xml");
        touch(temp_dir.path(), "other.txt");

        let pattern = format!("{}/part*", temp_dir.path().display());
        let files = resolve_inputs(&[pattern], &["xml"]).unwrap();
        assert_eq!(files, vec![one, two]);
    }

    #[test]
    fn test_duplicates_removed() {
        let temp_dir = TempDir::new().unwrap();
        let file = touch(temp_dir.path(), "a.xml");
        let input = file.display().to_string();

        let files = resolve_inputs(&[input.clone(), input], &["xml"]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_argument_order_kept() {
        let temp_dir = TempDir::new().unwrap();
        let b = touch(temp_dir.path(), "b.xml");
        let a = touch(temp_dir.path(), "a.xml");
        let inputs = [b.display().to_string(), a.display().to_string()];

        let files = resolve_inputs(&inputs, &["xml"]).unwrap();
        assert_eq!(files, vec![b.clone(), a.clone()]);

        // A directory listed after one of its files does not reorder it
        let inputs = [b.display().to_string(), temp_dir.path().display().to_string()];
        let files = resolve_inputs(&inputs, &["xml"]).unwrap();
        assert_eq!(files, vec![b, a]);
    }

    #[test]
    fn test_missing_path() {
        let err = resolve_inputs(&["/nonexistent/records.xml".to_string()], &["xml"]).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let err = resolve_inputs(&[temp_dir.path().display().to_string()], &["xml"]).unwrap_err();
        assert!(err.to_string().contains("No input files found"));
    }

    #[test]
    fn test_pattern_without_matches() {
        let temp_dir = TempDir::new().unwrap();
        let pattern = format!("{}/*.xml", temp_dir.path().display());
        assert!(resolve_inputs(&[pattern], &["xml"]).is_err());
    }
}
