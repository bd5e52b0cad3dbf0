//! Prompt Loader
//!
//! Loads prompt templates from override directories or falls back to
//! embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;
use crate::catalog::{Catalog, Product};

/// Context for the system prompt
#[derive(Debug, Clone, Serialize)]
pub struct SystemContext {
    /// Comma-separated catalog categories
    pub categories: String,
}

impl SystemContext {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let categories = catalog.categories();
        let categories = if categories.is_empty() {
            "beauty and personal care products".to_string()
        } else {
            categories.join(", ")
        };
        debug!(%categories, "SystemContext::from_catalog: called");
        Self { categories }
    }
}

/// Context for the routine request
#[derive(Debug, Clone, Serialize)]
pub struct RoutineContext {
    /// Numbered "N. Name (Brand)" lines in selection order
    pub product_list: String,
    pub product_count: usize,
}

impl RoutineContext {
    pub fn from_products(products: &[&Product]) -> Self {
        debug!(count = products.len(), "RoutineContext::from_products: called");
        let product_list = products
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}", i + 1, p.label()))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            product_list,
            product_count: products.len(),
        }
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// Override directories, searched in order
    override_dirs: Vec<PathBuf>,
}

impl PromptLoader {
    /// Create a loader searching the configured directory, then `.routinepicker/prompts/`
    pub fn new(configured_dir: Option<&Path>) -> Self {
        debug!(?configured_dir, "PromptLoader::new: called");
        let candidates = configured_dir
            .map(Path::to_path_buf)
            .into_iter()
            .chain(std::iter::once(PathBuf::from(".routinepicker/prompts")));

        let override_dirs: Vec<PathBuf> = candidates.filter(|dir| dir.is_dir()).collect();
        debug!(?override_dirs, "PromptLoader::new: override directories found");

        Self {
            hbs: Self::engine(),
            override_dirs,
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        Self {
            hbs: Self::engine(),
            override_dirs: Vec::new(),
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text; product names like "L'Oréal" must not be HTML-escaped
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name, overrides first
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        for dir in &self.override_dirs {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt {}: {}", path.display(), e));
            }
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        let template = self.load_template(template_name)?;
        info!("Rendering template '{}'", template_name);
        let rendered = self
            .hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))?;
        Ok(rendered.trim().to_string())
    }

    pub fn system_prompt(&self, context: &SystemContext) -> Result<String> {
        self.render("system", context)
    }

    pub fn routine_prompt(&self, context: &RoutineContext) -> Result<String> {
        self.render("routine", context)
    }
}
