use std::time::Duration;

use futures_util::future::join_all;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::folio::config::DiagramConfig;
use crate::folio::error::RenderError;

use super::{DiagramRenderer, RenderedDiagram, ThemeOptions};

static VIEW_BOX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"viewBox="\s*-?[\d.]+[\s,]+-?[\d.]+[\s,]+([\d.]+)[\s,]+([\d.]+)\s*""#)
        .expect("viewBox regex")
});
static DESC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<desc[^>]*>(.*?)</desc>").expect("desc regex"));
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<title[^>]*>(.*?)</title>").expect("title regex"));

/// Renders Mermaid through a Kroki server, one request per diagram.
pub struct KrokiRenderer {
    client: Client,
    base_url: String,
}

impl KrokiRenderer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RenderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &DiagramConfig) -> Result<Self, RenderError> {
        Self::new(config.kroki_url.clone(), config.timeout())
    }

    async fn render_one(
        &self,
        source: &str,
        options: &ThemeOptions,
    ) -> Result<RenderedDiagram, RenderError> {
        let body = format!("{}\n{}", options.init_directive(), source);
        let url = format!("{}/mermaid/svg", self.base_url);
        debug!("POST {url} ({} bytes)", body.len());

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(RenderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        parse_svg(text)
    }
}

impl DiagramRenderer for KrokiRenderer {
    async fn render(
        &self,
        sources: &[String],
        options: &ThemeOptions,
    ) -> Vec<Result<RenderedDiagram, RenderError>> {
        join_all(sources.iter().map(|source| self.render_one(source, options))).await
    }
}

/// Pull dimensions and the accessible description out of a rendered SVG.
pub fn parse_svg(svg: String) -> Result<RenderedDiagram, RenderError> {
    if !svg.contains("<svg") {
        return Err(RenderError::InvalidSvg);
    }

    let (width, height) = VIEW_BOX_RE
        .captures(&svg)
        .map(|c| (dimension(&c[1]), dimension(&c[2])))
        .unwrap_or((None, None));

    let description = [&*DESC_RE, &*TITLE_RE].iter().find_map(|re| {
        re.captures(&svg)
            .map(|c| c[1].trim().to_string())
            .filter(|d| !d.is_empty())
    });

    Ok(RenderedDiagram {
        svg,
        description,
        width,
        height,
    })
}

fn dimension(value: &str) -> Option<u32> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.round() as u32)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_svg_reads_view_box_and_desc() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="-8 -8 240.5 118"><title>Flow</title><desc> Order pipeline </desc></svg>"#;
        let diagram = parse_svg(svg.to_string()).unwrap();

        assert_eq!(diagram.width, Some(241));
        assert_eq!(diagram.height, Some(118));
        assert_eq!(diagram.description.as_deref(), Some("Order pipeline"));
    }

    #[test]
    fn test_parse_svg_falls_back_to_title() {
        let diagram = parse_svg(r#"<svg><title>Only title</title></svg>"#.into()).unwrap();
        assert_eq!(diagram.description.as_deref(), Some("Only title"));
        assert_eq!(diagram.width, None);
    }

    #[test]
    fn test_parse_svg_rejects_non_svg() {
        assert!(matches!(
            parse_svg("Syntax error in graph".into()),
            Err(RenderError::InvalidSvg)
        ));
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let renderer = KrokiRenderer::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(renderer.base_url, "http://localhost:8000");
    }
}
