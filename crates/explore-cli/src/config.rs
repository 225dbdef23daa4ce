//! TOML config loading for the explore CLI.
//!
//! Deserializes `configs/explore.toml`, which has an `[explore]` section,
//! then merges with CLI overrides.

use std::path::Path;

use explore::{ExploreConfig, SearchType};
use serde::Deserialize;

/// Top-level structure matching `configs/explore.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct ExploreToml {
    /// Exploration parameters.
    #[serde(default)]
    pub explore: ExploreConfig,
}

/// Load and deserialize an `ExploreToml` from a TOML file.
pub fn load_explore_toml(path: &Path) -> anyhow::Result<ExploreToml> {
    let contents = std::fs::read_to_string(path)?;
    let config: ExploreToml = toml::from_str(&contents)?;
    tracing::info!(path = %path.display(), "Loaded explore config");
    Ok(config)
}

/// Command-line overrides for `ExploreConfig` fields.
#[derive(Debug, Default, Clone)]
pub struct ExploreOverrides {
    pub search_type: Option<SearchType>,
    pub depth_bound: Option<u32>,
    pub depth_first: bool,
    pub rewrite_limit: Option<u64>,
}

/// Build an `ExploreConfig` from defaults, an optional TOML file and CLI flags.
///
/// Priority chain: `ExploreConfig::default()` < TOML values < CLI flags.
pub fn build_explore_config(
    path: Option<&Path>,
    overrides: &ExploreOverrides,
) -> anyhow::Result<ExploreConfig> {
    let mut config = match path {
        Some(path) => load_explore_toml(path)?.explore,
        None => ExploreConfig::default(),
    };

    if let Some(search_type) = overrides.search_type {
        config.search_type = search_type;
    }
    if let Some(depth) = overrides.depth_bound {
        config.depth_bound = Some(depth);
    }
    if overrides.depth_first {
        config.depth_first = true;
    }
    if let Some(limit) = overrides.rewrite_limit {
        config.rewrite_limit = Some(limit);
    }

    Ok(config)
}

/// Parse a `--search-type` flag value.
pub fn parse_search_type(s: &str) -> Result<SearchType, String> {
    SearchType::from_name(s).ok_or_else(|| {
        format!("unknown search type '{s}' (expected one-step, at-least-one-step, any-steps or normal-form)")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_explore_toml() {
        let file = write_toml(
            r#"
            [explore]
            search_type = "one_step"
            depth_first = true
            "#,
        );
        let toml = load_explore_toml(file.path()).unwrap();
        assert_eq!(toml.explore.search_type, SearchType::OneStep);
        assert!(toml.explore.depth_first);
    }

    #[test]
    fn test_missing_section_uses_defaults() {
        let file = write_toml("");
        let toml = load_explore_toml(file.path()).unwrap();
        assert_eq!(toml.explore.search_type, SearchType::AnySteps);
    }

    #[test]
    fn test_cli_overrides_toml() {
        let file = write_toml(
            r#"
            [explore]
            search_type = "one_step"
            depth_bound = 3
            rewrite_limit = 50
            "#,
        );
        let overrides = ExploreOverrides {
            search_type: Some(SearchType::NormalForm),
            depth_bound: Some(8),
            ..Default::default()
        };
        let config = build_explore_config(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.search_type, SearchType::NormalForm);
        assert_eq!(config.depth_bound, Some(8));
        // TOML value survives when no flag is given
        assert_eq!(config.rewrite_limit, Some(50));
    }

    #[test]
    fn test_no_config_file() {
        let config = build_explore_config(None, &ExploreOverrides::default()).unwrap();
        assert_eq!(config.search_type, SearchType::AnySteps);
        assert_eq!(config.depth_bound, None);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let result = build_explore_config(
            Some(Path::new("/nonexistent/explore.toml")),
            &ExploreOverrides::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_search_type() {
        assert_eq!(parse_search_type("at-least-one-step"), Ok(SearchType::AtLeastOneStep));
        assert!(parse_search_type("breadth").is_err());
    }
}
