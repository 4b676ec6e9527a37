//! Repository management commands

use console::style;
use std::path::Path;
use std::time::Duration;

use crate::error::{CliError, Result};
use chartpush_repo::{ChartPublisher, Credentials, RepositoryEntry, RepositoryFlavor};

/// Chart used by `repo show` to illustrate the upload request
const SAMPLE_CHART: (&str, &str) = ("mychart", "0.1.0");

/// Arguments of `repo add`
pub struct AddOptions<'a> {
    pub name: &'a str,
    pub url: &'a str,
    pub flavor: &'a str,
    pub tenants: &'a [String],
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub token: Option<&'a str>,
    pub timeout: Option<Duration>,
}

/// Add a new publishing repository
pub fn add(config_path: Option<&Path>, opts: AddOptions<'_>) -> Result<()> {
    let mut config = super::load_config(config_path)?;

    if config.get(opts.name).is_some() {
        return Err(CliError::usage_with_help(
            format!("Repository '{}' already exists", opts.name),
            format!("Remove it first with: chartpush repo remove {}", opts.name),
        ));
    }

    let flavor: RepositoryFlavor = opts.flavor.parse().map_err(|_| {
        CliError::usage_with_help(
            format!("Unknown flavor '{}'", opts.flavor),
            "Use --flavor chartmuseum or --flavor artifactory",
        )
    })?;
    if flavor == RepositoryFlavor::Artifactory && !opts.tenants.is_empty() {
        return Err(CliError::usage("--tenant is only supported for chartmuseum repositories"));
    }

    let mut entry = RepositoryEntry::new(opts.name, opts.url);
    entry.flavor = flavor;
    entry.tenant_ids = opts.tenants.to_vec();
    entry.credentials = credentials(&opts)?;
    entry.timeout = opts.timeout;

    // Validate the URL the same way a publish would
    entry.to_repository().publisher_params()?;

    config.add(entry)?;
    super::save_config(&config, config_path)?;

    println!(
        "\"{}\" has been added to your publishing repositories ({})",
        opts.name, flavor
    );
    Ok(())
}

fn credentials(opts: &AddOptions<'_>) -> Result<Option<Credentials>> {
    if let Some(token) = opts.token {
        return Ok(Some(Credentials::bearer(token)));
    }

    match (opts.username, opts.password) {
        (Some(user), Some(pass)) => Ok(Some(Credentials::basic(user, pass))),
        (Some(user), None) => {
            let pass = rpassword::prompt_password(format!("Password for {}: ", user))?;
            Ok(Some(Credentials::basic(user, pass)))
        }
        (None, Some(_)) => Err(CliError::usage_with_help(
            "--password requires --username",
            "Pass both --username and --password, or use --token",
        )),
        (None, None) => Ok(None),
    }
}

/// List configured publishing repositories
pub fn list(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;

    if config.repositories.is_empty() {
        println!("No publishing repositories configured.");
        println!();
        println!("Add one with: chartpush repo add <name> <url>");
        return Ok(());
    }

    println!(
        "{:<20} {:<12} {:<50} {}",
        "NAME", "FLAVOR", "URL", "TENANTS"
    );
    println!("{}", "-".repeat(90));

    for entry in &config.repositories {
        let url = match (&entry.url, &entry.url_env) {
            (Some(url), _) => url.clone(),
            (None, Some(var)) => format!("${}", var),
            (None, None) => "-".to_string(),
        };
        let tenants = if entry.tenant_ids.is_empty() {
            "-".to_string()
        } else {
            entry.tenant_ids.join("/")
        };
        let auth = if entry.credentials.is_some() {
            " (authenticated)"
        } else {
            ""
        };

        println!(
            "{:<20} {:<12} {:<50} {}{}",
            entry.name,
            entry.flavor.to_string(),
            url,
            tenants,
            auth
        );
    }

    Ok(())
}

/// Remove a publishing repository
pub fn remove(config_path: Option<&Path>, name: &str) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    config.remove(name)?;
    super::save_config(&config, config_path)?;

    println!("\"{}\" has been removed from your publishing repositories", name);
    Ok(())
}

/// Show the request a publish to `name` would make
pub fn show(config_path: Option<&Path>, name: &str) -> Result<()> {
    let config = super::load_config(config_path)?;
    let repositories = config.to_repositories()?;
    let params = repositories.publisher_params(name)?;
    let publisher = params.create_publisher();

    let (chart_name, chart_version) = SAMPLE_CHART;
    let method = publisher.upload_method();
    let path = publisher.upload_path(chart_name, chart_version);
    let transport = publisher.transport();

    println!("{}", style(name).cyan().bold());
    println!("  Flavor:      {}", params.flavor());
    println!("  URL:         {}", params.url());
    println!(
        "  Auth:        {}",
        if transport.credentials().is_some() {
            "yes"
        } else {
            "no"
        }
    );
    if let Some(timeout) = transport.timeout() {
        println!(
            "  Timeout:     {}",
            humantime_serde::re::humantime::format_duration(timeout)
        );
    }
    println!("  Upload:      {} {}", method, path);
    println!("  Request URL: {}", transport.request_url(&path));

    Ok(())
}
