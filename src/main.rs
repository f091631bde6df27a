mod actions;
mod cli;
mod command;
mod config;
mod gitops;
mod logging;
mod module;
mod opener;
mod process;
mod repl;
mod runner;
mod templates;
mod workspace;

fn main() -> anyhow::Result<()> {
    let app = cli::parse();
    logging::init(app.verbose, app.dry_run);
    runner::run(app)
}
