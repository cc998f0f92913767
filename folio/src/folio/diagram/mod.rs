//! Build-time diagram rendering.
//!
//! A [`DiagramRenderer`] turns Mermaid sources into SVG, a [`DiagramStore`]
//! puts the results on disk under content-addressed names.

pub mod kroki;
pub mod store;
pub mod theme;

use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;

use crate::folio::error::RenderError;

pub use kroki::KrokiRenderer;
pub use store::{DiagramArtifact, DiagramStore};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDiagram {
    pub svg: String,
    /// Accessible description taken from the SVG's `<desc>` or `<title>`.
    pub description: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Mermaid `init` options for one render call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeOptions {
    pub theme: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub theme_variables: BTreeMap<String, String>,
}

impl ThemeOptions {
    pub fn light() -> Self {
        Self {
            theme: theme::LIGHT_THEME.to_string(),
            theme_variables: BTreeMap::new(),
        }
    }

    pub fn dark() -> Self {
        Self {
            theme: theme::DARK_THEME.to_string(),
            theme_variables: theme::DARK_THEME_VARIABLES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// The `%%{init: ...}%%` directive carrying these options.
    pub fn init_directive(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        format!("%%{{init: {json}}}%%")
    }
}

/// Renders a batch of diagrams with one theme.
///
/// Implementations settle every input: the result has exactly one entry
/// per source, in order, and a failure of one never hides the others.
pub trait DiagramRenderer: Send + Sync {
    fn render(
        &self,
        sources: &[String],
        options: &ThemeOptions,
    ) -> impl Future<Output = Vec<Result<RenderedDiagram, RenderError>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_directive() {
        assert_eq!(
            ThemeOptions::light().init_directive(),
            r#"%%{init: {"theme":"default"}}%%"#
        );

        let dark = ThemeOptions::dark().init_directive();
        assert!(dark.starts_with(r#"%%{init: {"theme":"base","themeVariables":{"#));
        assert!(dark.contains(r#""darkMode":"true""#));
    }
}
