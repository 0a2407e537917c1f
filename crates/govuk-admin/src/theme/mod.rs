//! GOV.UK theme: templates, asset includes and list page rendering.
//!
//! Provides Tera-based rendering with embedded GOV.UK Design System
//! templates, the Vite asset manifest lookup and list cell formatting.

pub mod assets;
mod engine;
pub mod format;
mod page;

pub use assets::{AssetManifest, ManifestError};
pub use engine::{PAGE_PLACEHOLDER, SharedThemeEngine, Theme, ThemeEngine};
pub use format::{format_cell, format_datetime};
pub use page::{ActiveFilterView, ListPage, page_count};
