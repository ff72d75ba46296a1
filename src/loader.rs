//! Descriptor loading from JSON and YAML files.
//!
//! A file holds a single case object, an array of cases, or a suite object
//! `{ "name": ..., "cases": [...] }`. Directories are searched recursively for
//! `.json`, `.yaml` and `.yml` files, visited in sorted order.

use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::case::TestCaseDescriptor;
use crate::errors::VeritasError;

/// Descriptors read from one file.
#[derive(Debug, Clone)]
pub struct DescriptorSet {
    pub name: String,
    pub path: PathBuf,
    pub cases: Vec<TestCaseDescriptor>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorFile {
    Suite {
        #[serde(default)]
        name: Option<String>,
        cases: Vec<TestCaseDescriptor>,
    },
    Many(Vec<TestCaseDescriptor>),
    One(Box<TestCaseDescriptor>),
}

impl DescriptorFile {
    fn into_set(self, path: &Path) -> DescriptorSet {
        let stem = || {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        };
        let (name, cases) = match self {
            DescriptorFile::Suite { name, cases } => (name.unwrap_or_else(stem), cases),
            DescriptorFile::Many(cases) => (stem(), cases),
            DescriptorFile::One(case) => (stem(), vec![*case]),
        };
        DescriptorSet {
            name,
            path: path.to_path_buf(),
            cases,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

fn format_of(path: &Path) -> Option<Format> {
    match path.extension()?.to_str()? {
        "json" => Some(Format::Json),
        "yaml" | "yml" => Some(Format::Yaml),
        _ => None,
    }
}

/// Recursively finds descriptor files under `root`, sorted by path.
pub fn discover_case_files<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && format_of(e.path()).is_some())
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

/// Parses descriptors from a JSON document. `path` is used for naming and errors.
pub fn parse_json(source: &str, path: &Path) -> Result<DescriptorSet, VeritasError> {
    serde_json::from_str::<DescriptorFile>(source)
        .map(|file| file.into_set(path))
        .map_err(|source| VeritasError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Parses descriptors from a YAML document. `path` is used for naming and errors.
pub fn parse_yaml(source: &str, path: &Path) -> Result<DescriptorSet, VeritasError> {
    serde_yaml::from_str::<DescriptorFile>(source)
        .map(|file| file.into_set(path))
        .map_err(|source| VeritasError::Yaml {
            path: path.to_path_buf(),
            source,
        })
}

/// Loads one descriptor file. Files without a YAML extension are read as JSON.
pub fn load_file(path: &Path) -> Result<DescriptorSet, VeritasError> {
    let source = fs::read_to_string(path).map_err(|source| VeritasError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let set = match format_of(path) {
        Some(Format::Yaml) => parse_yaml(&source, path)?,
        _ => parse_json(&source, path)?,
    };
    debug!("loaded {} case(s) from {}", set.cases.len(), path.display());
    Ok(set)
}

/// Loads a file, or every descriptor file below a directory.
pub fn load_path(path: &Path) -> Result<Vec<DescriptorSet>, VeritasError> {
    if !path.is_dir() {
        return Ok(vec![load_file(path)?]);
    }
    let files = discover_case_files(path);
    if files.is_empty() {
        return Err(VeritasError::NoTestFiles {
            path: path.to_path_buf(),
        });
    }
    files.iter().map(|file| load_file(file)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_object() {
        let set = parse_json(
            r#"{"function_name": "divide", "input": []}"#,
            Path::new("cases/division.json"),
        )
        .unwrap();
        assert_eq!(set.name, "division");
        assert_eq!(set.cases.len(), 1);
    }

    #[test]
    fn array_of_cases() {
        let set = parse_json(
            r#"[{"function_name": "a"}, {"function_name": "b"}]"#,
            Path::new("many.json"),
        )
        .unwrap();
        assert_eq!(set.cases.len(), 2);
        assert_eq!(set.cases[1].function_name.as_deref(), Some("b"));
    }

    #[test]
    fn suite_object_keeps_its_name() {
        let set = parse_yaml(
            "name: temperatures\ncases:\n  - function_name: celsius_to_fahrenheit\n",
            Path::new("t.yaml"),
        )
        .unwrap();
        assert_eq!(set.name, "temperatures");
        assert_eq!(set.cases.len(), 1);
    }

    #[test]
    fn malformed_json_names_the_file() {
        let err = parse_json("{ not json", Path::new("broken.json")).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn format_by_extension() {
        assert_eq!(format_of(Path::new("a.json")), Some(Format::Json));
        assert_eq!(format_of(Path::new("a.yml")), Some(Format::Yaml));
        assert_eq!(format_of(Path::new("a.txt")), None);
    }
}
