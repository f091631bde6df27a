use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use toml_edit::{DocumentMut, Item, Table, value};

use crate::module::ModKind;
use crate::templates;

const CONFIG_DIR: &str = ".modkit";
const CONFIG_FILE: &str = "config.toml";

/// Root configuration document, `.modkit/config.toml`.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModConfig {
    pub tree: String,
    pub tree_dir: Option<Utf8PathBuf>,
    pub package_prefix: String,
    pub remote_base: Option<String>,
    pub module_info: bool,
    pub browse_after_split: bool,
    pub hosting: HostingConfig,
    pub tools: ToolsConfig,
    pub dependencies: DependencyConfig,
}

impl Default for ModConfig {
    fn default() -> Self {
        Self {
            tree: "KJ".to_owned(),
            tree_dir: None,
            package_prefix: "matt".to_owned(),
            remote_base: None,
            module_info: false,
            browse_after_split: true,
            hosting: HostingConfig::default(),
            tools: ToolsConfig::default(),
            dependencies: DependencyConfig::default(),
        }
    }
}

impl ModConfig {
    pub fn remote_base(&self) -> Result<&str> {
        self.remote_base
            .as_deref()
            .map(|base| base.trim_end_matches('/'))
            .ok_or_else(|| {
                anyhow!("`remote_base` is not configured; run `modkit config set remote_base <url>`")
            })
    }

    /// Project a module of `kind` depends on, `None` for abstract modules.
    pub fn dependency_for(&self, kind: ModKind) -> Option<&str> {
        let deps = &self.dependencies;
        match kind {
            ModKind::App => Some(&deps.app),
            ModKind::ClApp => Some(&deps.clapp),
            ModKind::AppLib => Some(&deps.applib),
            ModKind::Lib => Some(&deps.lib),
            ModKind::Abstract => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostingConfig {
    pub program: String,
    pub visibility: String,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            program: "gh".to_owned(),
            visibility: "private".to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub git: String,
    pub editor: Option<String>,
    pub browser: Option<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            git: "git".to_owned(),
            editor: None,
            browser: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DependencyConfig {
    pub app: String,
    pub clapp: String,
    pub applib: String,
    pub lib: String,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            app: ModKind::App.default_dependency().unwrap_or_default().to_owned(),
            clapp: ModKind::ClApp.default_dependency().unwrap_or_default().to_owned(),
            applib: ModKind::AppLib.default_dependency().unwrap_or_default().to_owned(),
            lib: ModKind::Lib.default_dependency().unwrap_or_default().to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigPathSource {
    Explicit,
    Discovered,
    HomeDefault,
}

impl ConfigPathSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigPathSource::Explicit => "explicit",
            ConfigPathSource::Discovered => "discovered",
            ConfigPathSource::HomeDefault => "home-default",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedConfigPath {
    pub path: Utf8PathBuf,
    pub source: ConfigPathSource,
}

/// Pick the config file: explicit flag, then the nearest `.modkit/config.toml`
/// above `start`, then the one in the home directory.
pub fn resolve_path(explicit: Option<&Utf8Path>, start: &Utf8Path) -> Result<ResolvedConfigPath> {
    if let Some(path) = explicit {
        return Ok(ResolvedConfigPath {
            path: path.to_owned(),
            source: ConfigPathSource::Explicit,
        });
    }

    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
        if candidate.exists() {
            return Ok(ResolvedConfigPath {
                path: candidate,
                source: ConfigPathSource::Discovered,
            });
        }
    }

    let home = dirs::home_dir().ok_or_else(|| anyhow!("unable to determine home directory"))?;
    let home = Utf8PathBuf::from_path_buf(home)
        .map_err(|_| anyhow!("home directory must be valid UTF-8"))?;
    Ok(ResolvedConfigPath {
        path: home.join(CONFIG_DIR).join(CONFIG_FILE),
        source: ConfigPathSource::HomeDefault,
    })
}

/// Load a configuration file from disk and deserialize it.
pub fn load_from_path(path: &Utf8Path) -> Result<ModConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path))
}

/// Like [`load_from_path`], but a missing file yields the defaults.
pub fn load_or_default(path: &Utf8Path) -> Result<ModConfig> {
    if !path.exists() {
        tracing::debug!(%path, "no config file; using defaults");
        return Ok(ModConfig::default());
    }
    load_from_path(path)
}

pub fn write_example_config(path: &Utf8Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!("{} already exists; rerun with --force to overwrite", path);
    }

    templates::write_template(path, templates::EXAMPLE_CONFIG)
}

/// Set a single key, keeping the rest of the document (and its comments)
/// intact. Dotted keys address tables, e.g. `hosting.program`.
pub fn set_value(path: &Utf8Path, key: &str, raw_value: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating directory {}", parent))?;
    }

    let mut doc: DocumentMut = if path.exists() {
        let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
        raw.parse()
            .with_context(|| format!("parsing config {}", path))?
    } else {
        DocumentMut::new()
    };

    let mut segments: Vec<&str> = key.split('.').collect();
    let Some(leaf) = segments.pop().filter(|leaf| !leaf.is_empty()) else {
        bail!("invalid config key `{}`", key);
    };

    let mut table = doc.as_table_mut();
    for segment in segments {
        if !table.contains_key(segment) {
            table.insert(segment, Item::Table(Table::new()));
        }
        table = table
            .get_mut(segment)
            .and_then(Item::as_table_mut)
            .ok_or_else(|| anyhow!("config key `{}` is not a table", segment))?;
    }

    table[leaf] = match raw_value {
        "true" => value(true),
        "false" => value(false),
        other => value(other),
    };

    let rendered = doc.to_string();
    toml::from_str::<ModConfig>(&rendered)
        .with_context(|| format!("setting `{}` would make {} invalid", key, path))?;
    fs::write(path, rendered).with_context(|| format!("writing config {}", path))
}

pub fn format_summary(config: &ModConfig) -> String {
    let mut out = String::new();
    let tree_dir = config
        .tree_dir
        .as_ref()
        .map(|dir| dir.to_string())
        .unwrap_or_else(|| "<search upward>".to_owned());

    let _ = writeln!(out, "Tree: {} ({})", config.tree, tree_dir);
    let _ = writeln!(out, "Package prefix: {}", config.package_prefix);
    let _ = writeln!(
        out,
        "Remote base: {}",
        config.remote_base.as_deref().unwrap_or("<none>")
    );
    let _ = writeln!(
        out,
        "Hosting: {} (--{})",
        config.hosting.program, config.hosting.visibility
    );
    let _ = writeln!(
        out,
        "Editor: {}",
        config.tools.editor.as_deref().unwrap_or("<none>")
    );
    let _ = writeln!(out, "module-info.java: {}", config.module_info);
    let _ = write!(out, "Dependencies:");
    for kind in ModKind::ALL {
        if let Some(dep) = config.dependency_for(kind) {
            let _ = write!(out, "\n  {} -> {}", kind.as_str(), dep);
        }
    }
    out
}
