use std::fmt;

use anyhow::{Result, bail};
use camino::Utf8PathBuf;
use clap::ValueEnum;

use crate::config::ModConfig;
use crate::workspace::Layout;

/// Closed set of module shapes `newmod` can scaffold.
#[derive(ValueEnum, Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModKind {
    App,
    #[value(name = "clapp")]
    ClApp,
    #[value(name = "applib")]
    AppLib,
    Lib,
    Abstract,
}

impl ModKind {
    pub const ALL: [ModKind; 5] = [
        ModKind::App,
        ModKind::ClApp,
        ModKind::AppLib,
        ModKind::Lib,
        ModKind::Abstract,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModKind::App => "app",
            ModKind::ClApp => "clapp",
            ModKind::AppLib => "applib",
            ModKind::Lib => "lib",
            ModKind::Abstract => "abstract",
        }
    }

    /// Marker written to `modtype.txt`.
    pub fn marker(&self) -> &'static str {
        match self {
            ModKind::App => "APP",
            ModKind::ClApp => "CLAPP",
            ModKind::AppLib => "APPLIB",
            ModKind::Lib => "LIB",
            ModKind::Abstract => "ABSTRACT",
        }
    }

    pub fn default_dependency(&self) -> Option<&'static str> {
        match self {
            ModKind::App => Some("gui"),
            ModKind::ClApp => Some("exec"),
            ModKind::AppLib => Some("kjlib"),
            ModKind::Lib => Some("kjlib.lang"),
            ModKind::Abstract => None,
        }
    }

    pub fn from_index(index: usize) -> Option<ModKind> {
        Self::ALL.get(index).copied()
    }

    /// `0=app, 1=clapp, ...` as shown by the kind prompt.
    pub fn menu() -> String {
        Self::ALL
            .iter()
            .enumerate()
            .map(|(idx, kind)| format!("{idx}={}", kind.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn has_sources(&self) -> bool {
        !matches!(self, ModKind::Abstract)
    }
}

impl fmt::Display for ModKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every path and name derived from a dotted module argument such as `gui.fx`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModulePaths {
    pub name_last: String,
    pub package: String,
    pub rel_path: String,
    pub root_rel_path: String,
    pub url: Option<String>,
    pub package_path: String,
    pub dir: Utf8PathBuf,
}

impl ModulePaths {
    pub fn new(layout: &Layout, config: &ModConfig, arg: &str) -> Self {
        let name_last = arg.rsplit('.').next().unwrap_or(arg).to_owned();
        let package = format!("{}.{}", config.package_prefix, arg.to_lowercase());
        let rel_path = arg.replace('.', "/");
        let root_rel_path = format!("{}/{}", layout.tree_name(), rel_path);
        let url = config
            .remote_base()
            .ok()
            .map(|base| format!("{base}/{rel_path}"));
        let package_path = package.replace('.', "/");
        let dir = layout.tree_dir.join(&rel_path);

        Self {
            name_last,
            package,
            rel_path,
            root_rel_path,
            url,
            package_path,
            dir,
        }
    }

    pub fn url(&self) -> Result<&str> {
        match &self.url {
            Some(url) => Ok(url),
            None => bail!(
                "`remote_base` is not configured; cannot derive a remote for {}",
                self.rel_path
            ),
        }
    }

    pub fn kotlin_dir(&self) -> Utf8PathBuf {
        self.dir.join("src").join("main").join("kotlin")
    }

    pub fn java_dir(&self) -> Utf8PathBuf {
        self.dir.join("src").join("main").join("java")
    }

    pub fn build_script(&self) -> Utf8PathBuf {
        self.dir.join("build.gradle.kts")
    }

    pub fn kind_marker(&self) -> Utf8PathBuf {
        self.dir.join("modtype.txt")
    }

    /// Entry source file for kinds that have one.
    pub fn entry_source(&self, kind: ModKind) -> Option<Utf8PathBuf> {
        let package_dir = self.kotlin_dir().join(&self.package_path);
        match kind {
            ModKind::App | ModKind::ClApp => {
                Some(package_dir.join(format!("{}Main.kt", capitalize(&self.name_last))))
            }
            ModKind::AppLib | ModKind::Lib => {
                Some(package_dir.join(format!("{}.kt", self.name_last)))
            }
            ModKind::Abstract => None,
        }
    }

    /// Name of the `.git/config` section git records for this submodule.
    pub fn submodule_section(&self) -> String {
        format!("submodule.{}", self.root_rel_path)
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout {
        Layout::new(Utf8PathBuf::from("/work/KJ")).unwrap()
    }

    fn config() -> ModConfig {
        toml::from_str("remote_base = 'https://github.com/someone'").unwrap()
    }

    #[test]
    fn derives_names_and_paths_from_dotted_argument() {
        let paths = ModulePaths::new(&layout(), &config(), "gui.FxTools");
        assert_eq!(paths.name_last, "FxTools");
        assert_eq!(paths.package, "matt.gui.fxtools");
        assert_eq!(paths.rel_path, "gui/FxTools");
        assert_eq!(paths.root_rel_path, "KJ/gui/FxTools");
        assert_eq!(paths.url().unwrap(), "https://github.com/someone/gui/FxTools");
        assert_eq!(paths.package_path, "matt/gui/fxtools");
        assert_eq!(paths.dir, Utf8PathBuf::from("/work/KJ/gui/FxTools"));
        assert_eq!(paths.submodule_section(), "submodule.KJ/gui/FxTools");
    }

    #[test]
    fn entry_source_depends_on_kind() {
        let paths = ModulePaths::new(&layout(), &config(), "exec.runner");
        let base = "/work/KJ/exec/runner/src/main/kotlin/matt/exec/runner";
        assert_eq!(
            paths.entry_source(ModKind::ClApp).unwrap(),
            Utf8PathBuf::from(format!("{base}/RunnerMain.kt"))
        );
        assert_eq!(
            paths.entry_source(ModKind::Lib).unwrap(),
            Utf8PathBuf::from(format!("{base}/runner.kt"))
        );
        assert_eq!(paths.entry_source(ModKind::Abstract), None);
    }

    #[test]
    fn url_requires_remote_base() {
        let config = ModConfig::default();
        let paths = ModulePaths::new(&layout(), &config, "lib");
        assert!(paths.url().is_err());
    }

    #[test]
    fn kind_index_follows_declaration_order() {
        assert_eq!(ModKind::from_index(0), Some(ModKind::App));
        assert_eq!(ModKind::from_index(4), Some(ModKind::Abstract));
        assert_eq!(ModKind::from_index(5), None);
        assert_eq!(
            ModKind::menu(),
            "0=app, 1=clapp, 2=applib, 3=lib, 4=abstract"
        );
    }
}
