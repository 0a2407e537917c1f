//! Theme engine with embedded GOV.UK templates and suggestion resolution.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use dashmap::DashMap;
use tera::Tera;
use tracing::debug;

use crate::form::{self, BoundField, FormField, Widget};
use crate::pagination::{self, PaginationParams};

use super::assets::AssetManifest;
use super::format::{format_datetime, parse_datetime};
use super::page::ListPage;

/// Placeholder replaced by the page index in pagination URL templates.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Where the theme's templates live and which one pages extend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub folder: &'static str,
    pub base_template: &'static str,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            folder: "admin",
            base_template: "admin/base.html",
        }
    }
}

const TEMPLATES: &[(&str, &str)] = &[
    ("admin/base.html", include_str!("../../templates/admin/base.html")),
    ("admin/model/list.html", include_str!("../../templates/admin/model/list.html")),
    ("govuk/_field_header.html", include_str!("../../templates/govuk/_field_header.html")),
    ("govuk/pagination.html", include_str!("../../templates/govuk/pagination.html")),
    ("govuk/text-input.html", include_str!("../../templates/govuk/text-input.html")),
    ("govuk/textarea.html", include_str!("../../templates/govuk/textarea.html")),
    ("govuk/checkbox.html", include_str!("../../templates/govuk/checkbox.html")),
    ("govuk/select.html", include_str!("../../templates/govuk/select.html")),
    (
        "govuk/select-with-search.html",
        include_str!("../../templates/govuk/select-with-search.html"),
    ),
    ("govuk/date-input.html", include_str!("../../templates/govuk/date-input.html")),
    (
        "govuk/datetime-input.html",
        include_str!("../../templates/govuk/datetime-input.html"),
    ),
];

/// Theme engine for rendering admin pages and widgets.
pub struct ThemeEngine {
    /// Tera template engine instance.
    tera: Tera,
    theme: Theme,
    service_name: Option<String>,
    /// Cache mapping suggestion lists to resolved template names.
    suggestion_cache: DashMap<String, String>,
}

impl ThemeEngine {
    /// Create an engine with the embedded templates.
    ///
    /// Without a manifest the CSS/JS include functions render nothing.
    pub fn new(service_name: Option<String>, manifest: Option<&AssetManifest>) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .context("failed to load embedded templates")?;

        let (css, js) = match manifest {
            Some(manifest) => (
                manifest.include_css().context("stylesheet missing from manifest")?,
                manifest.include_js().context("script missing from manifest")?,
            ),
            None => {
                tracing::warn!("no asset manifest; pages render without theme CSS and JS");
                (String::new(), String::new())
            }
        };

        Self::register_functions(&mut tera, css, js);
        Self::register_filters(&mut tera);

        debug!(count = tera.get_template_names().count(), "loaded templates");

        Ok(Self {
            tera,
            theme: Theme::default(),
            service_name,
            suggestion_cache: DashMap::new(),
        })
    }

    /// Register the template functions.
    fn register_functions(tera: &mut Tera, css: String, js: String) {
        tera.register_function(
            "govuk_admin_include_css",
            move |_args: &HashMap<String, tera::Value>| Ok(tera::Value::String(css.clone())),
        );
        tera.register_function(
            "govuk_admin_include_js",
            move |_args: &HashMap<String, tera::Value>| Ok(tera::Value::String(js.clone())),
        );

        // govuk_pagination_data_builder(page=0, pages=10, url="/admin/user/?page={page}")
        tera.register_function(
            "govuk_pagination_data_builder",
            |args: &HashMap<String, tera::Value>| {
                let number = |name: &str| {
                    args.get(name)
                        .and_then(tera::Value::as_u64)
                        .map(|n| n as usize)
                        .ok_or_else(|| {
                            tera::Error::msg(format!(
                                "govuk_pagination_data_builder: `{name}` must be a non-negative integer"
                            ))
                        })
                };
                let page = number("page")?;
                let pages = number("pages")?;
                let url = args.get("url").and_then(tera::Value::as_str).ok_or_else(|| {
                    tera::Error::msg("govuk_pagination_data_builder: `url` must be a string")
                })?;

                let params = pagination::build(page, pages, |index| {
                    url.replace(PAGE_PLACEHOLDER, &index.to_string())
                })
                .map_err(|e| tera::Error::msg(e.to_string()))?;
                tera::to_value(params).map_err(tera::Error::from)
            },
        );
    }

    /// Register custom Tera filters.
    fn register_filters(tera: &mut Tera) {
        // Datetimes without sub-second digits
        tera.register_filter(
            "govuk_datetime",
            |value: &tera::Value, _args: &HashMap<String, tera::Value>| {
                let formatted = match value {
                    tera::Value::String(raw) => match parse_datetime(raw) {
                        Some(dt) => format_datetime(Some(&dt)),
                        None => raw.clone(),
                    },
                    _ => String::new(),
                };
                Ok(tera::Value::String(formatted))
            },
        );
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Get the underlying Tera instance for custom operations.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }

    /// Get a mutable reference to Tera (for adding templates at runtime).
    pub fn tera_mut(&mut self) -> &mut Tera {
        self.clear_cache();
        &mut self.tera
    }

    /// Context every admin page starts from.
    pub fn base_context(&self) -> tera::Context {
        let mut context = tera::Context::new();
        context.insert("govuk_admin_service_name", &self.service_name);
        context.insert("base_template", self.theme.base_template);
        context
    }

    /// Resolve the best template from a list of suggestions.
    ///
    /// Templates are tried in order; the first one that exists is returned.
    pub fn resolve_template(&self, suggestions: &[&str]) -> Option<String> {
        if suggestions.is_empty() {
            return None;
        }

        let cache_key = suggestions.join("|");
        if let Some(cached) = self.suggestion_cache.get(&cache_key) {
            return Some(cached.clone());
        }

        for suggestion in suggestions {
            let template_name = format!("{suggestion}.html");
            if self.tera.get_template(&template_name).is_ok() {
                self.suggestion_cache
                    .insert(cache_key, template_name.clone());
                return Some(template_name);
            }
        }

        None
    }

    /// List template suggestions, most specific first.
    ///
    /// `admin/model/{table}/list` lets a model override the shared list page.
    pub fn list_suggestions(&self, table: &str) -> Vec<String> {
        vec![
            format!("{}/model/{table}/list", self.theme.folder),
            format!("{}/model/list", self.theme.folder),
        ]
    }

    /// Render a list page.
    pub fn render_list(&self, table: &str, page: &ListPage, messages: &[String]) -> Result<String> {
        let suggestions = self.list_suggestions(table);
        let suggestion_refs: Vec<&str> = suggestions.iter().map(String::as_str).collect();
        let template = self
            .resolve_template(&suggestion_refs)
            .unwrap_or_else(|| "admin/model/list.html".to_string());

        let mut context = self.base_context();
        context.insert("page", page);
        context.insert("messages", messages);
        if let Some(params) = &page.pagination {
            context.insert("params", params);
        }

        self.tera
            .render(&template, &context)
            .with_context(|| format!("failed to render list page for {table}"))
    }

    /// Render the pagination component on its own.
    pub fn render_pagination(&self, params: &PaginationParams) -> Result<String> {
        let mut context = tera::Context::new();
        context.insert("params", params);
        self.tera
            .render("govuk/pagination.html", &context)
            .context("failed to render pagination")
    }

    /// Render one form field with its widget.
    pub fn render_field(&self, field: &FormField, bound: &BoundField) -> Result<String> {
        let widget_args = &field.widget_args;
        let params = match &field.args.widget {
            Widget::TextInput => form::widgets::text_input_params(bound, widget_args),
            Widget::ArrayTextArea => form::widgets::array_textarea_params(bound, widget_args),
            Widget::Checkbox => form::widgets::checkbox_params(bound, widget_args),
            Widget::DateInput => form::widgets::date_input_params(bound, widget_args),
            Widget::DateTimeInput => form::widgets::datetime_input_params(bound, widget_args),
            Widget::Select => form::widgets::select_params(bound, widget_args, &field.args.choices),
            Widget::SelectWithSearch { multiple } => form::widgets::select_with_search_params(
                bound,
                widget_args,
                &field.args.choices,
                *multiple,
            ),
        };

        let mut context = tera::Context::new();
        context.insert("params", &params);
        self.tera
            .render(field.args.widget.template(), &context)
            .with_context(|| format!("failed to render form field: {}", field.name))
    }

    /// Clear the suggestion cache.
    pub fn clear_cache(&self) {
        self.suggestion_cache.clear();
    }
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine")
            .field("template_count", &self.tera.get_template_names().count())
            .field("cache_size", &self.suggestion_cache.len())
            .finish()
    }
}

/// Wrap ThemeEngine in Arc for sharing across handlers.
pub type SharedThemeEngine = Arc<ThemeEngine>;
