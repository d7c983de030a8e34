use super::{resolve_project, resolve_target};
use crate::cli::parser::ListArgs;
use crate::config::Config;
use crate::core::model::{BranchRecord, MergeStatus, SelectionModel};
use crate::core::remote::GitLabRemote;
use crate::core::Classifier;
use crate::utils::Result;

pub fn execute(config: Config, args: ListArgs) -> Result<()> {
    let project = resolve_project(&config, args.project.as_deref())?;
    let target = if args.no_target {
        None
    } else {
        resolve_target(&config, args.target.as_deref())
    };

    let remote = GitLabRemote::from_config(&config)?;
    let classifier = Classifier::new(&remote, &project);
    let model = classifier.build_model(target.as_deref())?;

    if args.quiet {
        display_quiet(&model);
    } else {
        display_full(&model, &project);
    }
    Ok(())
}

fn display_quiet(model: &SelectionModel) {
    for record in model.records() {
        println!("{}", record.name());
    }
}

fn display_full(model: &SelectionModel, project: &str) {
    if model.is_empty() {
        println!("No branches found in '{}'", project);
        return;
    }

    match model.target_branch() {
        Some(target) => println!(
            "Branches in '{}' (merge status vs '{}'):\n",
            project, target
        ),
        None => println!("Branches in '{}' (no target branch selected):\n", project),
    }

    for record in model.records() {
        println!(
            "  {} {}  {}{}",
            merge_symbol(record),
            last_commit_day(record),
            record.name(),
            markers(record)
        );
    }

    println!("\n{} branches total", model.len());
}

fn merge_symbol(record: &BranchRecord) -> &'static str {
    match record.merged_into_target {
        MergeStatus::Merged => "✓",
        MergeStatus::NotMerged => "·",
        MergeStatus::Unknown => "?",
    }
}

fn last_commit_day(record: &BranchRecord) -> String {
    match record.last_commit_at {
        Some(at) => at.format("%Y-%m-%d").to_string(),
        None => "          ".to_string(),
    }
}

fn markers(record: &BranchRecord) -> String {
    let mut markers = String::new();
    if record.is_default {
        markers.push_str("  [default]");
    }
    if record.is_protected {
        markers.push_str("  🔒");
    }
    markers
}
