use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use confik::{Configuration, EnvSource};
use serde::{Deserialize, Serialize};

use self::yaml::YamlFileSource;

/// Whether malformed documents fail the build or get placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Configuration)]
#[serde(rename_all = "lowercase")]
#[confik(forward(serde(rename_all = "lowercase")))]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    pub fn is_development(self) -> bool {
        self == BuildMode::Development
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Configuration)]
pub struct BuildConfig {
    #[serde(default = "default_mode")]
    pub mode: BuildMode,
    pub output_dir: String,
    /// Layout given to pages living outside the content root.
    pub default_layout: String,
    #[serde(default)]
    pub remove_title_heading: bool,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_mode() -> BuildMode {
    BuildMode::Production
}

#[derive(Debug, Clone, Serialize, Deserialize, Configuration)]
pub struct ContentConfig {
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Configuration)]
pub struct DiagramConfig {
    pub kroki_url: String,
    /// Directory rendered diagram files are written to. Wiped once per build.
    pub output_dir: String,
    /// URL path the output directory is served under.
    pub public_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl DiagramConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Configuration)]
pub struct SitemapConfig {
    #[serde(default)]
    pub static_excludes: Vec<String>,
    pub vanity_file: String,
    #[serde(default)]
    pub excluded_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Configuration)]
pub struct SiteConfig {
    pub build: BuildConfig,
    pub content: ContentConfig,
    pub diagrams: DiagramConfig,
    pub sitemap: SitemapConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            build: BuildConfig {
                mode: BuildMode::Production,
                output_dir: "dist".into(),
                default_layout: "page".into(),
                remove_title_heading: false,
                ignore_patterns: vec!["node_modules".into(), ".git".into()],
            },
            content: ContentConfig {
                root: "content".into(),
            },
            diagrams: DiagramConfig {
                kroki_url: "https://kroki.io".into(),
                output_dir: "public/diagrams".into(),
                public_path: "/diagrams".into(),
                timeout_secs: default_timeout_secs(),
            },
            sitemap: SitemapConfig {
                static_excludes: vec!["/404".into(), "/drafts".into()],
                vanity_file: "vanity.yml".into(),
                excluded_prefixes: vec!["/in-research".into()],
            },
        }
    }
}

impl SiteConfig {
    /// Load configuration from `FOLIO_CONFIG` (or `config.yml` next to the
    /// crate) and environment variables. Falls back to the compiled-in
    /// defaults when parsing fails.
    pub fn load() -> Self {
        let config_path = env::var("FOLIO_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Path::new(env!("CARGO_MANIFEST_DIR")).join("config.yml"));
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Self {
        let mut builder = SiteConfig::builder();

        if config_path.exists() {
            builder.override_with(YamlFileSource::new(config_path));
        }

        builder.override_with(EnvSource::new());

        match builder.try_build() {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!(
                    "Failed to load {} or env overrides: {err}. Using defaults.",
                    config_path.display()
                );
                SiteConfig::default()
            }
        }
    }

    pub fn content_root(&self) -> PathBuf {
        PathBuf::from(&self.content.root)
    }

    pub fn output_root(&self) -> PathBuf {
        PathBuf::from(&self.build.output_dir)
    }

    pub fn mode(&self) -> BuildMode {
        self.build.mode
    }
}

mod yaml {
    use std::error::Error;
    use std::path::PathBuf;

    use confik::Source;
    use serde::de::DeserializeOwned;

    #[derive(Debug)]
    pub struct YamlFileSource {
        path: PathBuf,
    }

    impl YamlFileSource {
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self { path: path.into() }
        }
    }

    impl<T> Source<T> for YamlFileSource
    where
        T: DeserializeOwned + confik::ConfigurationBuilder,
    {
        fn allows_secrets(&self) -> bool {
            false
        }

        fn provide(&self) -> Result<T, Box<dyn Error + Sync + Send>> {
            let contents = std::fs::read_to_string(&self.path)?;
            let parsed = serde_yaml::from_str(&contents)?;
            Ok(parsed)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_load_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(
            &path,
            r#"
build:
  mode: development
  output_dir: out
  default_layout: page
  remove_title_heading: true
  ignore_patterns: []
content:
  root: site/content
diagrams:
  kroki_url: http://localhost:8000
  output_dir: out/diagrams
  public_path: /diagrams
  timeout_secs: 10
sitemap:
  static_excludes: ["/404"]
  vanity_file: vanity.yml
  excluded_prefixes: ["/in-research"]
"#,
        )
        .unwrap();

        let cfg = SiteConfig::load_from(&path);

        assert_eq!(cfg.mode(), BuildMode::Development);
        assert!(cfg.build.remove_title_heading);
        assert_eq!(cfg.content_root(), PathBuf::from("site/content"));
        assert_eq!(cfg.diagrams.kroki_url, "http://localhost:8000");
        assert_eq!(cfg.sitemap.excluded_prefixes, vec!["/in-research".to_string()]);
    }

    #[test]
    fn test_unparsable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "build: [not, a, map").unwrap();

        let cfg = SiteConfig::load_from(&path);

        assert_eq!(cfg.mode(), BuildMode::Production);
        assert_eq!(cfg.content.root, "content");
    }
}
