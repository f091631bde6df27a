use std::fs;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use super::Session;
use crate::command::ExitStatus;
use crate::gitops::{self, Git};
use crate::opener;
use crate::repl::Interact;

/// Split a module out of the tree into its own hosted repository and put it
/// back as a submodule. Re-running after a partial failure is safe up to the
/// point where the module directory is removed.
pub fn split(session: &Session<'_>, arg: &str, io: &mut dyn Interact) -> Result<ExitStatus> {
    let module = session.module(arg);
    let url = module.url()?;
    if !module.dir.is_dir() {
        bail!("{} does not exist; nothing to split", module.rel_path);
    }

    let created = gitops::create_remote_repo(
        &session.config.hosting,
        session.executor,
        &module.dir,
        &module.name_last,
    )?;
    if !created.stdout.trim().is_empty() {
        io.say(created.stdout.trim())?;
    }

    let git = Git::new(&session.config.tools.git, module.dir.clone(), session.executor);
    git.init()?;
    git.add_all()?;
    git.commit_pending("first commit")?;
    let status = git.status()?;
    if !status.stdout.trim().is_empty() {
        io.say(status.stdout.trim())?;
    }
    git.set_origin(url)?;
    git.push(true)?;

    if session.config.browse_after_split {
        opener::browse(&session.config.tools, session.executor, &session.layout.root_dir, url)?;
    }

    if session.dry_run {
        io.say(&format!("(dry-run) would remove {}", module.dir))?;
    } else {
        fs::remove_dir_all(&module.dir).with_context(|| format!("removing {}", module.dir))?;
    }

    let root = session.root_git();
    root.add_all()?;
    root.commit(&format!("remove {} which is to become submodule", module.rel_path))?;
    root.submodule_add(url, &module.root_rel_path)?;
    root.add_all()?;
    root.commit(&format!("add {} submodule", module.rel_path))?;
    root.push(false)?;

    io.say(&format!("{} is now a submodule tracking {}", module.rel_path, url))?;
    Ok(ExitStatus::Continue)
}

/// Register an already hosted module as a submodule of the root repository.
pub fn add(session: &Session<'_>, arg: &str) -> Result<ExitStatus> {
    let module = session.module(arg);
    let url = module.url()?;
    session.root_git().submodule_add(url, &module.root_rel_path)?;
    Ok(ExitStatus::Continue)
}

/// Drop a submodule: index entry, cached clone under `.git/modules`, and
/// its `.git/config` section.
pub fn remove(session: &Session<'_>, arg: &str) -> Result<ExitStatus> {
    let module = session.module(arg);
    let root = session.root_git();
    root.rm(&module.root_rel_path)?;

    let cached = session.layout.git_modules_dir().join(&module.root_rel_path);
    if session.dry_run {
        info!(dir = %cached, "(dry-run) would remove cached submodule clone");
    } else if cached.exists() {
        fs::remove_dir_all(&cached).with_context(|| format!("removing {}", cached))?;
    }

    // `git rm` usually drops the section already.
    let section = module.submodule_section();
    let output = root.try_config_remove_section(&section)?;
    if !output.success() {
        warn!(%section, "could not remove config section: {}", output.diagnostic());
    }
    Ok(ExitStatus::Continue)
}
