//! Publish command - upload a packaged chart to configured repositories

use console::style;
use futures::future::join_all;
use std::path::Path;

use crate::error::{CliError, Result};
use crate::util::{format_size, short_digest, spinner};
use chartpush_core::ChartArchive;
use chartpush_repo::{ChartPublisher, PublisherParams, PublishingConfig, RepoError};

/// Publish `archive` to the selected repositories
///
/// Every target is snapshotted before the first request goes out, so a
/// misconfigured repository fails the command without uploading anywhere.
/// Uploads then run concurrently and independently.
pub async fn run(
    config_path: Option<&Path>,
    archive: &Path,
    repos: &[String],
    all: bool,
) -> Result<()> {
    let chart = ChartArchive::load(archive)?;
    let config = super::load_config(config_path)?;

    let targets = select_targets(&config, repos, all)?;
    let repositories = config.to_repositories()?;
    let snapshots = targets
        .iter()
        .map(|name| -> Result<(String, PublisherParams)> {
            Ok((name.clone(), repositories.publisher_params(name)?))
        })
        .collect::<Result<Vec<_>>>()?;

    println!(
        "Publishing {} {} ({}, sha256:{})",
        style(chart.name()).cyan().bold(),
        chart.version(),
        format_size(chart.size()),
        short_digest(&chart.digest())
    );

    let pb = spinner(format!("Uploading to {} repositories...", snapshots.len()));

    let uploads = snapshots.iter().map(|(name, params)| {
        let publisher = params.create_publisher();
        let chart = &chart;
        async move {
            let result = publisher.publish_chart(chart).await;
            (name.as_str(), params, result)
        }
    });
    let results = join_all(uploads).await;

    pb.finish_and_clear();

    let total = results.len();
    let mut failed = 0;
    for (name, params, result) in results {
        match result {
            Ok(()) => println!(
                "  {} {} ({})",
                style("✓").green(),
                name,
                style(params.url()).dim()
            ),
            Err(e) => {
                failed += 1;
                tracing::warn!(repository = name, error = %e, "upload failed");
                println!("  {} {}: {}", style("✗").red(), name, e);
            }
        }
    }

    if failed > 0 {
        return Err(CliError::PublishFailed { failed, total });
    }

    println!();
    println!(
        "{} Published {}-{} to {} repositories",
        style("✓").green().bold(),
        chart.name(),
        chart.version(),
        total
    );
    Ok(())
}

/// Resolve which repositories a publish goes to
///
/// Without `--repo` or `--all`, a lone configured repository is used.
fn select_targets(
    config: &PublishingConfig,
    repos: &[String],
    all: bool,
) -> Result<Vec<String>> {
    let configured = config.names();

    if configured.is_empty() {
        return Err(CliError::config_with_help(
            "No publishing repositories configured",
            "Add one with: chartpush repo add <name> <url>",
        ));
    }

    if all {
        return Ok(configured.into_iter().map(str::to_string).collect());
    }

    if repos.is_empty() {
        return match configured.as_slice() {
            [only] => Ok(vec![only.to_string()]),
            _ => Err(CliError::usage_with_help(
                format!(
                    "{} repositories are configured; choose the targets",
                    configured.len()
                ),
                "Pass --repo <name> (repeatable) or --all",
            )),
        };
    }

    let mut targets: Vec<String> = Vec::with_capacity(repos.len());
    for name in repos {
        if config.get(name).is_none() {
            return Err(RepoError::RepositoryNotFound { name: name.clone() }.into());
        }
        if !targets.contains(name) {
            targets.push(name.clone());
        }
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes;
    use chartpush_repo::RepositoryEntry;

    fn config(names: &[&str]) -> PublishingConfig {
        let mut config = PublishingConfig::default();
        for name in names {
            config
                .add(RepositoryEntry::new(*name, "https://charts.example.com"))
                .unwrap();
        }
        config
    }

    #[test]
    fn test_single_repository_is_default_target() {
        let targets = select_targets(&config(&["internal"]), &[], false).unwrap();
        assert_eq!(targets, vec!["internal"]);
    }

    #[test]
    fn test_several_repositories_need_a_choice() {
        let err = select_targets(&config(&["a", "b"]), &[], false).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::USAGE_ERROR);
    }

    #[test]
    fn test_all_selects_in_config_order() {
        let targets = select_targets(&config(&["b", "a", "c"]), &[], true).unwrap();
        assert_eq!(targets, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_explicit_targets_deduplicated() {
        let repos = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let targets = select_targets(&config(&["a", "b", "c"]), &repos, false).unwrap();
        assert_eq!(targets, vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_target() {
        let repos = vec!["missing".to_string()];
        let err = select_targets(&config(&["a"]), &repos, false).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn test_nothing_configured() {
        let err = select_targets(&PublishingConfig::default(), &[], true).unwrap_err();
        assert_eq!(err.exit_code(), exit_codes::CONFIG_ERROR);
    }
}
