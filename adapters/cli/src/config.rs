//! TOML configuration of a headless session.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use lost_and_found_core::{Catalog, Difficulty, DifficultyEdit, DifficultyField, ItemDefinition};
use lost_and_found_world::Layout;
use serde::Deserialize;

/// Configuration shipped with the binary.
pub(crate) const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Complete description of a session.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) catalog: CatalogConfig,
    pub(crate) difficulty: Difficulty,
    pub(crate) layout: Layout,
    pub(crate) session: SessionConfig,
}

/// Item definitions of both pools.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct CatalogConfig {
    pub(crate) searchable: Vec<ItemDefinition>,
    pub(crate) trash: Vec<ItemDefinition>,
}

/// Session bookkeeping parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionConfig {
    pub(crate) initial_health: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_health: lost_and_found_system_session::Config::default().initial_health(),
        }
    }
}

impl GameConfig {
    /// Loads the configuration at `path`, or the embedded default.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config at {}", path.display()))?;
                Self::from_toml_str(&contents)
                    .with_context(|| format!("invalid config at {}", path.display()))
            }
            None => Self::from_toml_str(DEFAULT_CONFIG).context("invalid embedded default config"),
        }
    }

    /// Parses and validates configuration text.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).context("failed to parse config toml")?;
        config
            .difficulty
            .validate()
            .context("difficulty table out of range")?;
        if config.layout.destinations.is_empty() {
            bail!("layout must place at least one destination");
        }
        Ok(config)
    }

    /// Builds the immutable catalog described by the `[catalog]` table.
    pub(crate) fn build_catalog(&self) -> Result<Catalog> {
        Catalog::new(self.catalog.searchable.clone(), self.catalog.trash.clone())
            .context("invalid item catalog")
    }
}

/// Parses `field=value` pairs into a difficulty edit.
///
/// Unknown field names are an error. Values are kept as raw text so that the
/// edit itself decides whether they are acceptable.
pub(crate) fn parse_edits(pairs: &[String]) -> Result<DifficultyEdit> {
    let mut edit = DifficultyEdit::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("expected `field=value`, got `{pair}`");
        };
        let name = name.trim();
        let Some(field) = DifficultyField::from_name(name) else {
            bail!("unknown difficulty field `{name}`");
        };
        edit.push(field, value);
    }
    Ok(edit)
}
