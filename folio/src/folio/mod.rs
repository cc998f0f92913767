pub mod config;
pub mod diagram;
pub mod error;
pub mod hast;
pub mod output;
pub mod paths;
pub mod plugins;
pub mod renderer;
pub mod sitemap;
#[cfg(test)]
pub(crate) mod test_log;
pub mod text;
pub mod types;
pub mod visit;

pub use config::SiteConfig;
pub use renderer::{BuildReport, FolioEngine};
pub use types::{Frontmatter, Page, RenderedPage};
