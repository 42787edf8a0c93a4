//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::app::classify::ExtractOptions;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".lang-select/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub extract: Extract,
    #[serde(default)]
    pub display: Display,
    #[serde(default)]
    pub select: Select,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extract {
    #[serde(default = "Extract::default_indent_step")]
    pub indent_step: usize,
    #[serde(default = "Extract::default_tab_width")]
    pub tab_width: usize,
    #[serde(default = "Extract::default_min_paragraph_len")]
    pub min_paragraph_len: usize,
    #[serde(default = "Extract::default_max_paragraph_len")]
    pub max_paragraph_len: usize,
    #[serde(default = "Extract::default_max_key_len")]
    pub max_key_len: usize,
    #[serde(default)]
    pub enhanced: bool,
}

impl Extract {
    fn default_indent_step() -> usize {
        2
    }

    fn default_tab_width() -> usize {
        4
    }

    fn default_min_paragraph_len() -> usize {
        10
    }

    fn default_max_paragraph_len() -> usize {
        200
    }

    fn default_max_key_len() -> usize {
        40
    }

    /// Pass-wide options for the classifier and extractor.
    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            indent_step: self.indent_step,
            tab_width: self.tab_width,
            min_paragraph_len: self.min_paragraph_len,
            max_paragraph_len: self.max_paragraph_len,
            max_key_len: self.max_key_len,
        }
    }
}

impl Default for Extract {
    fn default() -> Self {
        Self {
            indent_step: Self::default_indent_step(),
            tab_width: Self::default_tab_width(),
            min_paragraph_len: Self::default_min_paragraph_len(),
            max_paragraph_len: Self::default_max_paragraph_len(),
            max_key_len: Self::default_max_key_len(),
            enhanced: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Display {
    #[serde(default = "Display::default_style")]
    pub style: String,
    #[serde(default = "Display::default_color")]
    pub color: bool,
}

impl Display {
    fn default_style() -> String {
        "hierarchy".into()
    }

    fn default_color() -> bool {
        true
    }
}

impl Default for Display {
    fn default() -> Self {
        Self {
            style: Self::default_style(),
            color: Self::default_color(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Select {
    #[serde(default = "Select::default_tool")]
    pub tool: String,
    #[serde(default = "Select::default_prompt")]
    pub prompt: String,
}

impl Select {
    fn default_tool() -> String {
        "auto".into()
    }

    fn default_prompt() -> String {
        "Select an item".into()
    }
}

impl Default for Select {
    fn default() -> Self {
        Self {
            tool: Self::default_tool(),
            prompt: Self::default_prompt(),
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    tool: Option<String>,
    style: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            tool: env::var("LANG_SELECT_TOOL").ok(),
            style: env::var("LANG_SELECT_STYLE").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(tool: &str, style: &str) -> Self {
        Self {
            tool: Some(tool.to_owned()),
            style: Some(style.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config,
    /// and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            extract: merge_extract(self.extract, other.extract),
            display: merge_display(self.display, other.display),
            select: merge_select(self.select, other.select),
        }
    }
}

fn merge_extract(base: Extract, overlay: Extract) -> Extract {
    Extract {
        indent_step: if overlay.indent_step != Extract::default_indent_step() {
            overlay.indent_step
        } else {
            base.indent_step
        },
        tab_width: if overlay.tab_width != Extract::default_tab_width() {
            overlay.tab_width
        } else {
            base.tab_width
        },
        min_paragraph_len: if overlay.min_paragraph_len != Extract::default_min_paragraph_len() {
            overlay.min_paragraph_len
        } else {
            base.min_paragraph_len
        },
        max_paragraph_len: if overlay.max_paragraph_len != Extract::default_max_paragraph_len() {
            overlay.max_paragraph_len
        } else {
            base.max_paragraph_len
        },
        max_key_len: if overlay.max_key_len != Extract::default_max_key_len() {
            overlay.max_key_len
        } else {
            base.max_key_len
        },
        enhanced: overlay.enhanced || base.enhanced,
    }
}

fn merge_display(base: Display, overlay: Display) -> Display {
    Display {
        style: if overlay.style != Display::default_style() {
            overlay.style
        } else {
            base.style
        },
        color: if overlay.color != Display::default_color() {
            overlay.color
        } else {
            base.color
        },
    }
}

fn merge_select(base: Select, overlay: Select) -> Select {
    Select {
        tool: if overlay.tool != Select::default_tool() {
            overlay.tool
        } else {
            base.tool
        },
        prompt: if overlay.prompt != Select::default_prompt() {
            overlay.prompt
        } else {
            base.prompt
        },
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("lang-select/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(tool) = env.tool {
        config.select.tool = tool;
    }
    if let Some(style) = env.style {
        config.display.style = style;
    }
    config
}
