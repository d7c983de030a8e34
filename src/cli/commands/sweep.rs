use std::sync::Arc;

use dialoguer::{theme::ColorfulTheme, Confirm};

use super::{resolve_project, resolve_target};
use crate::cli::parser::SweepArgs;
use crate::config::Config;
use crate::core::executor::{
    spawn_batch, BatchEvent, BatchExecutor, BranchOutcome, OperationResult,
};
use crate::core::filter::{apply_date_filter, apply_pattern_filter, DateRange, FilterAction};
use crate::core::model::{BranchRecord, SelectionModel};
use crate::core::remote::{GitLabRemote, RemoteApi};
use crate::core::{reconcile, Classifier, SweepMode};
use crate::utils::{Result, SweepError};

pub fn execute(config: Config, args: SweepArgs, mode: SweepMode) -> Result<()> {
    let project = resolve_project(&config, args.project.as_deref())?;
    let target = resolve_target(&config, args.target.as_deref());

    let remote = Arc::new(GitLabRemote::from_config(&config)?);
    let classifier = Classifier::new(remote.as_ref(), &project);
    let mut model = classifier.build_model(target.as_deref())?;

    if model.is_empty() {
        println!("No branches found in '{}'", project);
        return Ok(());
    }

    apply_filters(&mut model, &args)?;

    // Confirmation works on an isolated snapshot; the canonical model is
    // only touched again by reconciliation after the batch.
    let snapshot = model.snapshot_copy();
    let confirmed = snapshot.selected();

    if confirmed.is_empty() {
        println!("Nothing selected — no branches match the given filters.");
        return Ok(());
    }

    show_plan(&confirmed, mode, config.archive_prefix());

    if args.dry_run {
        println!("\nDry run — remote untouched.");
        return Ok(());
    }
    if !args.yes && !confirm_plan(confirmed.len(), mode)? {
        println!("Aborted.");
        return Ok(());
    }

    let executor = BatchExecutor::new(
        remote.clone() as Arc<dyn RemoteApi + Send + Sync>,
        project,
        config.archive_prefix(),
    );
    let handle = spawn_batch(executor, confirmed, mode);

    let cancel = handle.cancel.clone();
    ctrlc::set_handler(move || {
        println!("\n🛑 Cancellation requested — finishing the branch in flight...");
        cancel.request();
    })?;

    for event in &handle.events {
        report_event(&event);
    }

    let result = handle.join()?;
    reconcile::apply(&mut model, &result);
    report_summary(&result);
    Ok(())
}

fn apply_filters(model: &mut SelectionModel, args: &SweepArgs) -> Result<()> {
    for pattern in &args.include {
        apply_pattern_filter(model, pattern, FilterAction::Include)?;
    }

    let range = DateRange::new(args.after, args.before);
    if !range.is_unbounded() {
        apply_date_filter(model, range, FilterAction::Include);
    }

    for pattern in &args.exclude {
        apply_pattern_filter(model, pattern, FilterAction::Exclude)?;
    }
    Ok(())
}

fn show_plan(confirmed: &[BranchRecord], mode: SweepMode, archive_prefix: &str) {
    match mode {
        SweepMode::Delete => println!("About to delete {} branches:", confirmed.len()),
        SweepMode::Archive => println!(
            "About to archive {} branches under '{}':",
            confirmed.len(),
            archive_prefix
        ),
    }
    for record in confirmed {
        println!("  • {} ({})", record.name(), short_sha(record.last_commit_sha()));
    }
}

fn confirm_plan(count: usize, mode: SweepMode) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Err(SweepError::invalid_args(
            "refusing to prompt without a terminal; pass --yes to proceed",
        ));
    }

    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("{} {} branches?", verb(mode), count))
        .default(false)
        .interact()
        .map_err(|e| SweepError::invalid_args(format!("Failed to read input: {}", e)))
}

fn report_event(event: &BatchEvent) {
    match event {
        BatchEvent::Started { mode, total } => {
            println!("\n🧹 {} {} branches...", verb(*mode), total)
        }
        BatchEvent::Processed { name, outcome } => match outcome {
            BranchOutcome::Succeeded {
                archived_name: Some(archived),
            } => println!("  ✅ {} → {}", name, archived),
            BranchOutcome::Succeeded { archived_name: None } => println!("  ✅ {}", name),
            BranchOutcome::Failed(reason) => println!("  ❌ {}: {}", name, reason),
        },
        BatchEvent::Finished(_) => {}
    }
}

fn report_summary(result: &OperationResult) {
    println!();
    if result.is_cancelled() {
        println!(
            "🛑 Cancelled after {} of {} branches.",
            result.processed(),
            result.confirmed.len()
        );
    }

    match result.mode {
        SweepMode::Delete => println!("  ✅ Deleted {} branches", result.succeeded.len()),
        SweepMode::Archive => println!("  ✅ Archived {} branches", result.succeeded.len()),
    }

    if !result.failed.is_empty() {
        println!("\n⚠️  {} branches failed:", result.failed.len());
        for failure in &result.failed {
            println!(
                "  • {} ({}): {}",
                failure.name,
                short_sha(&failure.sha),
                failure.reason
            );
        }
    }
}

fn verb(mode: SweepMode) -> &'static str {
    match mode {
        SweepMode::Delete => "Delete",
        SweepMode::Archive => "Archive",
    }
}

fn short_sha(sha: &str) -> &str {
    if sha.len() >= 8 {
        &sha[..8]
    } else {
        sha
    }
}
