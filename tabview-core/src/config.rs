//! Configuration file support for tabview
//!
//! Loads dataset profiles from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.tabviewrc.json` in the working directory
//! 3. `tabview.config.json` in the working directory
//!
//! All fields are optional. A configured profile may extend a built-in one
//! and override only the parts it names; a configured profile with the
//! same name as a built-in replaces it.

use crate::classify::{Predicate, RowClassifier};
use crate::compare::{CompareKind, SortDirection, SortState};
use crate::format::DisplayTransform;
use crate::profile::{self, ColumnSpec, DatasetProfile, DerivedField, RecordSource};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Largest decimal count accepted for `fixed` display
const MAX_FIXED_DECIMALS: u8 = 10;

/// Config file names probed during discovery, in priority order
const CONFIG_FILE_NAMES: &[&str] = &[".tabviewrc.json", "tabview.config.json"];

/// tabview configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TabviewConfig {
    /// Profiles by name
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

/// One configured dataset profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Built-in profile to start from
    #[serde(default)]
    pub extends: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// Where records sit in the payload (default: root array)
    #[serde(default)]
    pub source: Option<RecordSource>,

    /// Explicit columns; replaces the base profile's columns when given
    #[serde(default)]
    pub columns: Option<Vec<ColumnConfig>>,

    /// Comparison kind for fields without an explicit entry (default: numeric)
    #[serde(default)]
    pub default_kind: Option<CompareKind>,

    /// Comparison kind overrides by field name
    #[serde(default)]
    pub fields: BTreeMap<String, CompareKind>,

    /// Display transforms for inferred columns, by field-name suffix
    #[serde(default)]
    pub suffix_display: BTreeMap<String, DisplayTransform>,

    /// Derived ratio columns; replaces the base profile's list when given
    #[serde(default)]
    pub derived: Option<Vec<DerivedField>>,

    /// Classification rules, first match wins; replaces the base rules when given
    #[serde(default)]
    pub rules: Option<RowClassifier>,

    /// Default sort applied on every load
    #[serde(default)]
    pub default_sort: Option<SortConfig>,
}

/// Column entry in a profile config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnConfig {
    pub key: String,
    /// Header text (default: the key)
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub compare: Option<CompareKind>,
    #[serde(default)]
    pub display: Option<DisplayTransform>,
    /// Whether header clicks sort this column (default: true)
    #[serde(default)]
    pub sortable: Option<bool>,
}

/// Default sort in a profile config; a null key means arrival order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortConfig {
    pub key: Option<String>,
    #[serde(default)]
    pub direction: SortDirection,
}

/// Resolved configuration: built-ins merged with configured profiles
#[derive(Debug)]
pub struct ResolvedConfig {
    pub profiles: Vec<DatasetProfile>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl TabviewConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        for (name, profile) in &self.profiles {
            validate_profile(name, profile)
                .with_context(|| format!("invalid profile \"{}\"", name))?;
        }
        Ok(())
    }

    /// Resolve config into profiles ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let mut profiles = profile::builtins();
        for (name, config) in &self.profiles {
            let resolved = resolve_profile(name, config)
                .with_context(|| format!("invalid profile \"{}\"", name))?;
            match profiles.iter_mut().find(|p| p.name == *name) {
                Some(existing) => *existing = resolved,
                None => profiles.push(resolved),
            }
        }

        Ok(ResolvedConfig {
            profiles,
            config_path: None,
        })
    }
}

fn validate_profile(name: &str, config: &ProfileConfig) -> Result<()> {
    if name.trim().is_empty() {
        anyhow::bail!("profile name must not be empty");
    }

    if let Some(base) = &config.extends {
        if profile::builtin(base).is_none() {
            anyhow::bail!(
                "extends unknown built-in profile \"{}\" (expected one of: {})",
                base,
                profile::BUILTIN_PROFILES.join(", ")
            );
        }
    }

    if let Some(columns) = &config.columns {
        let mut seen = std::collections::BTreeSet::new();
        for column in columns {
            if column.key.is_empty() {
                anyhow::bail!("column key must not be empty");
            }
            if !seen.insert(column.key.as_str()) {
                anyhow::bail!("duplicate column \"{}\"", column.key);
            }
            if let Some(display) = &column.display {
                validate_display(display)
                    .with_context(|| format!("column \"{}\"", column.key))?;
            }
        }
    }

    for (suffix, display) in &config.suffix_display {
        if suffix.is_empty() {
            anyhow::bail!("suffix_display keys must not be empty");
        }
        validate_display(display).with_context(|| format!("suffix_display \"{}\"", suffix))?;
    }

    if let Some(derived) = &config.derived {
        for d in derived {
            if d.key.is_empty() || d.numerator.is_empty() || d.denominator.is_empty() {
                anyhow::bail!("derived fields need a key, numerator and denominator");
            }
            if d.key == d.numerator || d.key == d.denominator {
                anyhow::bail!("derived field \"{}\" must not reference itself", d.key);
            }
        }
    }

    if let Some(rules) = &config.rules {
        for rule in rules.rules() {
            if rule.tag.trim().is_empty() {
                anyhow::bail!("classification tags must not be empty");
            }
            validate_predicate(&rule.when)
                .with_context(|| format!("rule \"{}\"", rule.tag))?;
        }
    }

    Ok(())
}

fn validate_display(display: &DisplayTransform) -> Result<()> {
    if let DisplayTransform::Fixed { decimals } = display {
        if *decimals > MAX_FIXED_DECIMALS {
            anyhow::bail!(
                "fixed decimals must be at most {} (got {})",
                MAX_FIXED_DECIMALS,
                decimals
            );
        }
    }
    Ok(())
}

fn validate_predicate(pred: &Predicate) -> Result<()> {
    if pred.fields().iter().any(|f| f.is_empty()) {
        anyhow::bail!("threshold field must not be empty");
    }
    Ok(())
}

fn resolve_profile(name: &str, config: &ProfileConfig) -> Result<DatasetProfile> {
    let mut profile = match &config.extends {
        Some(base) => profile::builtin(base)
            .with_context(|| format!("unknown built-in profile \"{}\"", base))?,
        None => DatasetProfile::new(name, name),
    };
    profile.name = name.to_string();

    if let Some(title) = &config.title {
        profile.title = title.clone();
    }
    if let Some(source) = &config.source {
        profile.source = source.clone();
    }
    if let Some(kind) = config.default_kind {
        profile.comparators.default_kind = kind;
    }
    if let Some(columns) = &config.columns {
        profile.columns.clear();
        for column in columns {
            let spec = ColumnSpec {
                key: column.key.clone(),
                header: column.header.clone().unwrap_or_else(|| column.key.clone()),
                display: column.display.unwrap_or_default(),
                sortable: column.sortable.unwrap_or(true),
            };
            if let Some(kind) = column.compare {
                profile.comparators.fields.insert(column.key.clone(), kind);
            }
            profile.columns.push(spec);
        }
    }
    for (field, kind) in &config.fields {
        profile.comparators.fields.insert(field.clone(), *kind);
    }
    for (suffix, display) in &config.suffix_display {
        profile.suffix_display.insert(suffix.clone(), *display);
    }
    if let Some(derived) = &config.derived {
        profile.derived = derived.clone();
    }
    if let Some(rules) = &config.rules {
        profile.rules = rules.clone();
    }
    if let Some(sort) = &config.default_sort {
        profile.default_sort = SortState {
            key: sort.key.clone(),
            direction: sort.direction,
        };
    }

    check_default_sort(&profile)?;
    Ok(profile)
}

/// The default sort key must be a declared, sortable column
fn check_default_sort(profile: &DatasetProfile) -> Result<()> {
    let Some(key) = profile.default_sort.key.as_deref() else {
        return Ok(());
    };
    if profile.infers_columns() {
        return Ok(());
    }
    match profile.columns.iter().find(|c| c.key == key) {
        Some(column) if column.sortable => Ok(()),
        Some(_) => anyhow::bail!("default_sort.key \"{}\" is not a sortable column", key),
        None => anyhow::bail!("default_sort.key \"{}\" is not a declared column", key),
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        TabviewConfig::default().resolve()
    }

    pub fn profile(&self, name: &str) -> Option<&DatasetProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Look up a profile, with the available names in the error
    pub fn require_profile(&self, name: &str) -> Result<&DatasetProfile> {
        self.profile(name).with_context(|| {
            format!(
                "unknown profile \"{}\" (available: {})",
                name,
                self.names().join(", ")
            )
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Discover and load a config file from a directory
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(dir: &Path) -> Result<Option<(TabviewConfig, PathBuf)>> {
    for name in CONFIG_FILE_NAMES {
        let path = dir.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<TabviewConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: TabviewConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `dir`.
/// Returns the built-in profiles if nothing is found.
pub fn load_and_resolve(dir: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (TabviewConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    tracing::debug!(
        profiles = resolved.profiles.len(),
        config = ?resolved.config_path,
        "configuration resolved"
    );
    Ok(resolved)
}
