pub mod article;
pub mod config;
pub mod date;
mod html;
pub mod markdown;
pub mod metadata;
mod site;
pub mod tags;
pub mod template;
mod text;

pub use config::SiteConfig;
pub use metadata::SourceKind;
pub use site::{Result, Site};
