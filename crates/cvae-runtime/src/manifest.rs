use crate::error::RuntimeError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// `manifest.json`: where the decoder weights live and which labels it was trained on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Weights location, relative to the manifest's own directory.
    pub model: String,
    pub labels: Vec<String>,
}

impl Manifest {
    pub fn new(model: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            model: model.into(),
            labels,
        }
    }

    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let contents = fs::read_to_string(path).map_err(|source| RuntimeError::ManifestLoad {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| RuntimeError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), RuntimeError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            RuntimeError::ManifestParse {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolves [`model`](Self::model) against the directory holding `manifest_path`.
    /// Absolute model paths are returned unchanged.
    pub fn resolve_model_path(&self, manifest_path: &Path) -> PathBuf {
        let model = Path::new(&self.model);
        if model.is_absolute() {
            return model.to_path_buf();
        }
        match manifest_path.parent() {
            Some(dir) => dir.join(model),
            None => model.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_resolves_relative_model_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(
            &path,
            r#"{ "model": "weights/decoder.mpk", "labels": ["cat", "dog", "bird"] }"#,
        )
        .unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.labels, vec!["cat", "dog", "bird"]);
        assert_eq!(
            manifest.resolve_model_path(&path),
            dir.path().join("weights").join("decoder.mpk")
        );
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Manifest::load(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(RuntimeError::ManifestLoad { .. })));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, r#"{ "model": "decoder.mpk", "labels": "#).unwrap();
        assert!(matches!(
            Manifest::load(&path),
            Err(RuntimeError::ManifestParse { .. })
        ));

        fs::write(&path, r#"{ "labels": ["a"] }"#).unwrap();
        assert!(matches!(
            Manifest::load(&path),
            Err(RuntimeError::ManifestParse { .. })
        ));
    }

    #[test]
    fn save_then_load_keeps_the_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        let manifest = Manifest::new("decoder.mpk", vec!["x".into(), "y".into()]);
        manifest.save(&path).unwrap();
        assert_eq!(Manifest::load(&path).unwrap(), manifest);
    }
}
