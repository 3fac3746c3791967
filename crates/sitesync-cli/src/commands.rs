use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use sitesync_diff::{compare, CompareStrategy, DiffSet};
use sitesync_mirror::MirrorManager;
use sitesync_remote::{FtpStore, RemoteStore};
use sitesync_sync::{apply, plan};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::notify::{DeploySummary, LogNotifier, Notifier};
use crate::steps::run_step;

pub async fn run_command(cli: Cli) -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    match cli.command {
        Command::Deploy => cmd_deploy(&config).await,
        Command::Plan => cmd_plan(&config).await,
    }
}

async fn cmd_deploy(config: &Config) -> Result<()> {
    let notifier = LogNotifier::new(config.notify.clone());
    match deploy(config).await {
        Ok(summary) => {
            notifier.deploy_succeeded(&summary).await;
            Ok(())
        }
        Err(err) => {
            notifier.deploy_failed(&format!("{err:#}")).await;
            Err(err)
        }
    }
}

async fn deploy(config: &Config) -> Result<DeploySummary> {
    // Fail on missing credentials before any pipeline step runs.
    let remote = config.require_remote()?;

    step("Pulling changes...");
    run_step("pull", &config.pull_command, &config.repo_dir, false).await?;

    step("Installing dependencies...");
    run_step("install", &config.install_command, &config.repo_dir, true).await?;

    step("Building site...");
    run_step("build", &config.build_command, &config.repo_dir, false).await?;

    step("Comparing build with previous deployment...");
    let mirror = MirrorManager::open(&config.mirror_dir)?;
    let diff = compare(
        &config.build_dir,
        mirror.root(),
        CompareStrategy::SizeAndContent,
    )?;
    print_statistics(&diff);

    if diff.same() {
        success("Already up to date!");
        return Ok(DeploySummary {
            completed: 0,
            total: 0,
            unchanged: true,
        });
    }

    let batch = plan(&diff);
    step("Uploading changes...");
    let store = Arc::new(
        FtpStore::connect(remote)
            .await
            .context("connecting to remote store")?,
    );
    let report = apply(
        batch,
        Arc::clone(&store) as Arc<dyn RemoteStore>,
        &config.sync,
    )
    .await?;
    if let Ok(store) = Arc::try_unwrap(store) {
        store.quit().await;
    }

    step("Recording deployed state...");
    mirror
        .commit(&config.build_dir)
        .context("mirror commit failed; mirror and remote have diverged")?;

    success(&format!(
        "Deployed {} change{}.",
        report.completed,
        if report.completed == 1 { "" } else { "s" }
    ));
    Ok(DeploySummary {
        completed: report.completed,
        total: report.total,
        unchanged: false,
    })
}

async fn cmd_plan(config: &Config) -> Result<()> {
    step("Comparing build with previous deployment...");
    let mirror = MirrorManager::open(&config.mirror_dir)?;
    let diff = compare(
        &config.build_dir,
        mirror.root(),
        CompareStrategy::SizeAndContent,
    )?;
    print_statistics(&diff);

    if diff.same() {
        success("Already up to date!");
        return Ok(());
    }

    let batch = plan(&diff);
    for op in batch.iter() {
        println!("{op}");
    }
    println!("{} operations pending.", batch.len());
    Ok(())
}

fn print_statistics(diff: &DiffSet) {
    println!(
        "Statistics - equal entries: {}, distinct entries: {}, \
         local only entries: {}, mirror only entries: {}",
        diff.equal, diff.distinct, diff.local_only, diff.mirror_only
    );
}

fn step(message: &str) {
    println!("{}", message.cyan());
}

fn success(message: &str) {
    println!("{}", message.yellow());
}
