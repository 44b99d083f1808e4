use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Shopping-insight categories tracked when the collection file does not
/// override them.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "패션의류",
    "패션잡화",
    "화장품/미용",
    "디지털/가전",
    "가구/인테리어",
    "출산/육아",
    "식품",
    "스포츠/레저",
    "생활/건강",
    "여가/생활편의",
    "도서",
];

/// Contents of `config/collection.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionFile {
    /// Categories pre-populated in every keyword rank entry.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// Extra keywords collected in addition to the ranked ones.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Default for CollectionFile {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            keywords: Vec::new(),
        }
    }
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|c| (*c).to_string()).collect()
}

impl CollectionFile {
    /// Merges ranked keywords (kept in their order) with the extra keywords
    /// from this file, skipping any already present.
    #[must_use]
    pub fn collection_keywords(&self, ranked: &[String]) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut out = Vec::with_capacity(ranked.len() + self.keywords.len());
        for keyword in ranked.iter().chain(&self.keywords) {
            if seen.insert(keyword.as_str()) {
                out.push(keyword.clone());
            }
        }
        out
    }
}

/// Load and validate the collection file.
///
/// A missing file is not an error: the defaults (all known categories, no
/// extra keywords) are returned.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_collection(path: &Path) -> Result<CollectionFile, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "collection file not found; using defaults");
            return Ok(CollectionFile::default());
        }
        Err(e) => {
            return Err(ConfigError::CollectionFileIo {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let collection: CollectionFile = serde_yaml::from_str(&content)?;
    validate_collection(&collection)?;
    Ok(collection)
}

fn validate_collection(collection: &CollectionFile) -> Result<(), ConfigError> {
    validate_list("category", &collection.categories)?;
    validate_list("keyword", &collection.keywords)?;
    Ok(())
}

fn validate_list(kind: &str, items: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for item in items {
        if item.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{kind} must be non-empty")));
        }
        if !seen.insert(item.trim()) {
            return Err(ConfigError::Validation(format!("duplicate {kind}: '{item}'")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: CollectionFile = serde_yaml::from_str("keywords: [\"텀블러\"]").unwrap();
        assert_eq!(parsed.categories.len(), DEFAULT_CATEGORIES.len());
        assert_eq!(parsed.keywords, vec!["텀블러"]);
    }

    #[test]
    fn validate_rejects_blank_keyword() {
        let collection = CollectionFile {
            categories: default_categories(),
            keywords: vec!["  ".to_string()],
        };
        let err = validate_collection(&collection).unwrap_err();
        assert!(err.to_string().contains("keyword must be non-empty"));
    }

    #[test]
    fn validate_rejects_duplicate_category() {
        let collection = CollectionFile {
            categories: vec!["도서".to_string(), "도서".to_string()],
            keywords: vec![],
        };
        let err = validate_collection(&collection).unwrap_err();
        assert!(err.to_string().contains("duplicate category"));
    }

    #[test]
    fn collection_keywords_appends_unseen_extras() {
        let collection = CollectionFile {
            categories: default_categories(),
            keywords: vec!["텀블러".to_string(), "가방".to_string()],
        };
        let ranked = vec!["가방".to_string(), "지갑".to_string()];
        assert_eq!(
            collection.collection_keywords(&ranked),
            vec!["가방", "지갑", "텀블러"]
        );
    }

    #[test]
    fn load_collection_missing_file_returns_defaults() {
        let path = std::env::temp_dir().join("giftrank-no-such-collection.yaml");
        let collection = load_collection(&path).unwrap();
        assert_eq!(collection, CollectionFile::default());
    }
}
