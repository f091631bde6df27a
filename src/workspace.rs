use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};

use crate::config::ModConfig;

/// Location of the module tree and of the outer repository that contains it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    pub tree_dir: Utf8PathBuf,
    pub root_dir: Utf8PathBuf,
}

impl Layout {
    pub fn new(tree_dir: Utf8PathBuf) -> Result<Self> {
        let root_dir = tree_dir
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .ok_or_else(|| anyhow!("module tree {} has no parent repository", tree_dir))?
            .to_owned();
        Ok(Self { tree_dir, root_dir })
    }

    /// Resolve the tree directory: explicit override, then `tree_dir` from the
    /// config, then the nearest ancestor of `cwd` named like `config.tree`.
    pub fn discover(
        override_dir: Option<&Utf8Path>,
        config: &ModConfig,
        cwd: &Utf8Path,
    ) -> Result<Self> {
        if let Some(dir) = override_dir.or(config.tree_dir.as_deref()) {
            let dir = if dir.is_absolute() {
                dir.to_owned()
            } else {
                cwd.join(dir)
            };
            if !dir.is_dir() {
                bail!("module tree {} is not a directory", dir);
            }
            let dir = dir
                .canonicalize_utf8()
                .with_context(|| format!("resolving module tree {}", dir))?;
            return Self::new(dir);
        }

        let found = cwd
            .ancestors()
            .find(|dir| dir.file_name() == Some(config.tree.as_str()))
            .ok_or_else(|| {
                anyhow!("could not locate a \"{}\" directory above {}", config.tree, cwd)
            })?;
        Self::new(found.to_owned())
    }

    pub fn tree_name(&self) -> &str {
        self.tree_dir.file_name().unwrap_or(self.tree_dir.as_str())
    }

    pub fn git_modules_dir(&self) -> Utf8PathBuf {
        self.root_dir.join(".git").join("modules")
    }
}

pub fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("determining current directory")?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|_| anyhow!("current directory must be valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_nearest_tree_ancestor() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        let nested = root.join("KJ").join("gui").join("src");
        fs::create_dir_all(&nested).unwrap();

        let layout = Layout::discover(None, &ModConfig::default(), &nested).unwrap();
        assert_eq!(layout.tree_dir, root.join("KJ"));
        assert_eq!(layout.root_dir, root);
        assert_eq!(layout.tree_name(), "KJ");
        assert_eq!(layout.git_modules_dir(), root.join(".git").join("modules"));
    }

    #[test]
    fn override_wins_over_search() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        fs::create_dir_all(root.join("modules")).unwrap();

        let root = root.canonicalize_utf8().unwrap();

        let layout =
            Layout::discover(Some(Utf8Path::new("modules")), &ModConfig::default(), &root).unwrap();
        assert_eq!(layout.tree_dir, root.join("modules"));
        assert_eq!(layout.tree_name(), "modules");
    }

    #[test]
    fn relative_override_is_normalised() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
            .unwrap()
            .canonicalize_utf8()
            .unwrap();
        let gui = root.join("KJ").join("gui");
        fs::create_dir_all(&gui).unwrap();

        let layout =
            Layout::discover(Some(Utf8Path::new("..")), &ModConfig::default(), &gui).unwrap();
        assert_eq!(layout.tree_dir, root.join("KJ"));
        assert_eq!(layout.root_dir, root);
        assert_eq!(layout.tree_name(), "KJ");
    }

    #[test]
    fn missing_tree_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).unwrap();
        let err = Layout::discover(None, &ModConfig::default(), &root).unwrap_err();
        assert!(err.to_string().contains("could not locate a \"KJ\" directory"));
    }
}
