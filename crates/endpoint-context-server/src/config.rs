use std::path::{Path, PathBuf};

use endpoint_context::cache::DEFAULT_CAPACITY;

use crate::error::AppError;

const DEFAULT_TOP_K: usize = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub corpus_path: PathBuf,
    pub rendered_path: Option<PathBuf>,
    pub cache_capacity: usize,
    pub default_top_k: usize,
}

impl Config {
    /// Required:
    /// - `ENDPOINT_CORPUS_PATH` (JSON file with `{ "title", "endpoints": [...] }`)
    ///
    /// Optional:
    /// - `ENDPOINT_RENDERED_PATH` (rendered markdown for the keyword filter)
    /// - `ENDPOINT_INDEX_CACHE_CAPACITY` (default: 5)
    /// - `ENDPOINT_DEFAULT_TOP_K` (default: 8)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let corpus_path = lookup("ENDPOINT_CORPUS_PATH").ok_or_else(|| {
            AppError::Config("ENDPOINT_CORPUS_PATH environment variable is required".to_string())
        })?;
        let corpus_path = existing_file(&corpus_path)?;

        let rendered_path = lookup("ENDPOINT_RENDERED_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(|p| existing_file(&p))
            .transpose()?;

        let cache_capacity = positive(
            "ENDPOINT_INDEX_CACHE_CAPACITY",
            lookup("ENDPOINT_INDEX_CACHE_CAPACITY"),
            DEFAULT_CAPACITY,
        )?;
        let default_top_k = positive(
            "ENDPOINT_DEFAULT_TOP_K",
            lookup("ENDPOINT_DEFAULT_TOP_K"),
            DEFAULT_TOP_K,
        )?;

        Ok(Self {
            corpus_path,
            rendered_path,
            cache_capacity,
            default_top_k,
        })
    }
}

fn existing_file(raw: &str) -> Result<PathBuf, AppError> {
    let path = Path::new(raw.trim());
    if !path.is_file() {
        return Err(AppError::Config(format!(
            "required file not found: {}",
            path.display()
        )));
    }
    Ok(path.to_path_buf())
}

fn positive(name: &str, raw: Option<String>, default: usize) -> Result<usize, AppError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<usize>() {
        Ok(value) if value >= 1 => Ok(value),
        _ => Err(AppError::Config(format!(
            "{name} must be a positive integer, got '{raw}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    fn manifest() -> String {
        concat!(env!("CARGO_MANIFEST_DIR"), "/Cargo.toml").to_string()
    }

    #[test]
    fn corpus_path_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("ENDPOINT_CORPUS_PATH"));
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Config::from_lookup(lookup(&[("ENDPOINT_CORPUS_PATH", "/no/such/corpus.json")]))
            .unwrap_err();
        assert!(matches!(err, AppError::Config(ref m) if m.contains("required file not found")));
    }

    #[test]
    fn defaults_apply() {
        let path = manifest();
        let config = Config::from_lookup(lookup(&[("ENDPOINT_CORPUS_PATH", path.as_str())])).unwrap();
        assert_eq!(config.cache_capacity, 5);
        assert_eq!(config.default_top_k, 8);
        assert!(config.rendered_path.is_none());
    }

    #[test]
    fn rejects_zero_and_garbage() {
        let path = manifest();
        for bad in ["0", "-3", "many"] {
            let err = Config::from_lookup(lookup(&[
                ("ENDPOINT_CORPUS_PATH", path.as_str()),
                ("ENDPOINT_DEFAULT_TOP_K", bad),
            ]))
            .unwrap_err();
            assert!(err.to_string().contains("ENDPOINT_DEFAULT_TOP_K"), "{bad}");
        }
    }

    #[test]
    fn overrides_are_read() {
        let path = manifest();
        let config = Config::from_lookup(lookup(&[
            ("ENDPOINT_CORPUS_PATH", path.as_str()),
            ("ENDPOINT_RENDERED_PATH", path.as_str()),
            ("ENDPOINT_INDEX_CACHE_CAPACITY", "2"),
            ("ENDPOINT_DEFAULT_TOP_K", " 12 "),
        ]))
        .unwrap();
        assert_eq!(config.cache_capacity, 2);
        assert_eq!(config.default_top_k, 12);
        assert_eq!(config.rendered_path.as_deref(), Some(Path::new(&path)));
    }
}
