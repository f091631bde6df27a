use std::fs;

use anyhow::{Context, Result, anyhow, bail};
use camino::Utf8PathBuf;
use tracing::debug;

use super::Session;
use crate::command::ExitStatus;
use crate::module::{ModKind, ModulePaths};
use crate::repl::Interact;
use crate::{opener, templates};

/// Scaffold a new module directory under the tree.
pub fn run(session: &Session<'_>, arg: &str, io: &mut dyn Interact) -> Result<ExitStatus> {
    let module = session.module(arg);
    if module.dir.exists() {
        bail!("{} already exists", module.rel_path);
    }

    let kind = match session.preset_kind {
        Some(kind) => kind,
        None => ask_kind(io)?,
    };

    let files = plan(session, &module, kind)?;
    let package_dir = kind
        .has_sources()
        .then(|| module.kotlin_dir().join(&module.package_path));
    if session.dry_run {
        for (path, _) in &files {
            io.say(&format!("(dry-run) would write {path}"))?;
        }
        if let Some(dir) = &package_dir {
            io.say(&format!("(dry-run) would create {dir}"))?;
        }
        return Ok(ExitStatus::Continue);
    }

    for (path, contents) in &files {
        templates::write_to(path, contents.as_bytes())?;
    }
    if let Some(package_dir) = &package_dir {
        debug!(dir = %package_dir, "creating package directory");
        fs::create_dir_all(package_dir)
            .with_context(|| format!("creating directory {}", package_dir))?;
    }
    io.say(&format!("created {} module {} ({})", kind, module.rel_path, module.package))?;

    let to_open = module.entry_source(kind).unwrap_or_else(|| module.build_script());
    opener::open_in_editor(&session.config.tools, session.executor, &module.dir, &to_open)?;
    Ok(ExitStatus::Continue)
}

fn ask_kind(io: &mut dyn Interact) -> Result<ModKind> {
    let answer = io
        .prompt(&format!("module kind? {}: ", ModKind::menu()))?
        .ok_or_else(|| anyhow!("no module kind given"))?;
    let index: usize = answer.trim().parse().map_err(|_| anyhow!("must be an integer"))?;
    ModKind::from_index(index).ok_or_else(|| anyhow!("must use a valid index"))
}

/// Files `newmod` writes for `kind`, in write order.
fn plan(
    session: &Session<'_>,
    module: &ModulePaths,
    kind: ModKind,
) -> Result<Vec<(Utf8PathBuf, String)>> {
    let package = module.package.as_str();
    let mut files = Vec::new();

    if session.config.module_info && kind.has_sources() {
        files.push((
            module.java_dir().join("module-info.java"),
            templates::render(templates::MODULE_INFO, &[("package", package)])?,
        ));
    }

    let build_script = match session.config.dependency_for(kind) {
        Some(dependency) => {
            let tree = session.layout.tree_name().to_lowercase();
            templates::render(
                templates::BUILD_SCRIPT,
                &[("tree", tree.as_str()), ("dependency", dependency)],
            )?
        }
        None => String::new(),
    };
    files.push((module.build_script(), build_script));
    files.push((module.kind_marker(), kind.marker().to_owned()));

    if let Some(source) = module.entry_source(kind) {
        files.push((
            source,
            templates::render(templates::KOTLIN_SOURCE, &[("package", package)])?,
        ));
    }
    Ok(files)
}
