//! mcp-get - MCP server installer for Claude Desktop
//!
//! Usage:
//!   mcp-get install <name>[@version]   # Install from the registry
//!   mcp-get install <name> -- cmd ...  # Install a custom launch command
//!   mcp-get list                       # Show installed servers
//!   mcp-get status                     # Compare ledger and desktop config

mod output;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, theme::ColorfulTheme};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mcpget_core::config::{AppConfigStore, platform_name};
use mcpget_core::context::AppContext;
use mcpget_core::install::{
    InstallReport, InstallRequest, Installer, PackageSpec, UpdateOutcome, parse_env_pairs,
    remove_server,
};
use mcpget_core::registry::{ListQuery, RegistryCatalog, RegistryClient};
use mcpget_core::status::{DriftState, collect_status};
use mcpget_core::types::LaunchConfig;

use crate::output::{error, heading, info, success, warning};

#[derive(Parser)]
#[command(name = "mcp-get")]
#[command(version, about = "Install MCP servers into Claude Desktop", long_about = None)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install an MCP server from the registry
    #[command(visible_aliases = ["i", "add"])]
    Install(InstallArgs),

    /// Remove an installed MCP server
    #[command(visible_aliases = ["uninstall", "rm"])]
    Remove {
        /// MCP server name
        name: String,
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Update installed MCP server(s) to the latest version
    #[command(visible_alias = "upgrade")]
    Update {
        /// Server to update (all installed servers if omitted)
        name: Option<String>,
        /// Only check for updates, do not install
        #[arg(long)]
        check: bool,
    },

    /// List installed MCP servers
    #[command(visible_alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Show servers from the desktop config instead of the ledger
        #[arg(long)]
        config: bool,
    },

    /// Show detailed information about an MCP server
    #[command(visible_aliases = ["show", "view"])]
    Info {
        /// MCP server name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the registry
    #[command(visible_alias = "find")]
    Search {
        /// Search query
        query: String,
        /// Result page
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Results per page
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Browse registry packages
    Browse {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Sort order (e.g. downloads, rating, recent)
        #[arg(long)]
        sort: Option<String>,
        /// Result page
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Results per page
        #[arg(long, default_value_t = 20)]
        limit: u32,
        /// Show only featured servers
        #[arg(long)]
        featured: bool,
    },

    /// Show drift between installed servers and the desktop config
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or change settings
    Config {
        /// Set the registry API URL
        #[arg(long, value_name = "URL")]
        api: Option<String>,
        /// Set the desktop config file path
        #[arg(long, value_name = "PATH")]
        config_path: Option<PathBuf>,
        /// Print all settings as JSON
        #[arg(long)]
        list: bool,
    },
}

#[derive(Args)]
struct InstallArgs {
    /// MCP server name, optionally `name@version`
    name: String,
    /// Version to install
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    pkg_version: Option<String>,
    /// Reinstall if already installed
    #[arg(short, long)]
    force: bool,
    /// Environment variable for the server (KEY=VALUE)
    #[arg(short, long = "env", value_name = "KEY=VALUE")]
    env: Vec<String>,
    /// Custom launch command (after --); skips the registry
    #[arg(last = true)]
    command: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run_cli(cli.command) {
        error(format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "mcpget=debug,warn" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_cli(command: Commands) -> Result<()> {
    match command {
        Commands::Install(args) => run_install(args),
        Commands::Remove { name, yes } => run_remove(&name, yes),
        Commands::Update { name, check } => match (name, check) {
            (Some(name), false) => run_update_one(&name),
            (None, false) => run_update_all(),
            (name, true) => run_check(name.as_deref()),
        },
        Commands::List { json, config } => {
            if config {
                run_list_desktop(json)
            } else {
                run_list(json)
            }
        }
        Commands::Info { name, json } => run_info(&name, json),
        Commands::Search { query, page, limit } => run_search(&query, page, limit),
        Commands::Browse {
            category,
            sort,
            page,
            limit,
            featured,
        } => run_browse(
            ListQuery {
                search: None,
                category,
                sort,
                page: Some(page),
                limit: Some(limit),
            },
            featured,
        ),
        Commands::Status { json } => run_status(json),
        Commands::Config {
            api,
            config_path,
            list,
        } => run_config(api, config_path, list),
    }
}

fn run_install(args: InstallArgs) -> Result<()> {
    let ctx = AppContext::load()?;
    let registry = ctx.registry_client()?;
    let installer = Installer::new(&registry, ctx.desktop_config(), ctx.ledger());
    let env = parse_env_pairs(&args.env)?;

    let report = if let Some((command, rest)) = args.command.split_first() {
        let mut config = LaunchConfig::new(command).with_args(rest);
        config.merge_env(&env);
        installer.install_from_config(&args.name, config)?
    } else {
        let spec = PackageSpec::parse(&args.name, args.pkg_version.as_deref());
        info(format!(
            "Installing {}@{}...",
            style(&spec.name).cyan(),
            style(&spec.version).dim()
        ));
        let request = InstallRequest::from_spec(spec)
            .with_force(args.force)
            .with_env_map(env);
        installer.install(request)?
    };

    print_install_report(&report, ctx.desktop_config().path());
    Ok(())
}

fn print_install_report(report: &InstallReport, config_path: &Path) {
    success(format!(
        "Installed {}@{}",
        style(&report.name).cyan(),
        style(&report.version).green()
    ));

    if !report.required_env.is_empty() {
        println!();
        warning("Required environment variables:");
        for var in &report.required_env {
            println!("  {} - not set", style(var).yellow());
        }
        println!();
        info(format!(
            "Set these in your environment or use: mcp-get install {} --env {}=<value>",
            report.name, report.required_env[0]
        ));
    }

    println!();
    info(format!("Config updated: {}", config_path.display()));
    success(format!(
        "Restart Claude Desktop to activate {}!",
        report.name
    ));
}

fn run_remove(name: &str, yes: bool) -> Result<()> {
    let ctx = AppContext::load()?;

    let Some(installed) = ctx.ledger().get(name)? else {
        anyhow::bail!("MCP server '{}' is not installed", name);
    };

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Remove {}@{}?", name, installed.version))
            .default(false)
            .interact()?;
        if !confirmed {
            info("Cancelled");
            return Ok(());
        }
    }

    let report = remove_server(ctx.desktop_config(), ctx.ledger(), name)?;
    success(format!("Removed {}", style(&report.name).cyan()));
    if !report.removed_from_app_config {
        warning("It was already missing from the desktop config");
    }
    info(format!("Updated: {}", ctx.desktop_config().path().display()));
    success("Restart Claude Desktop to apply changes");
    Ok(())
}

fn run_update_one(name: &str) -> Result<()> {
    let ctx = AppContext::load()?;
    let registry = ctx.registry_client()?;
    let installer = Installer::new(&registry, ctx.desktop_config(), ctx.ledger());

    match installer.update(name)? {
        UpdateOutcome::AlreadyLatest { version, .. } => {
            info(format!(
                "{} is already at the latest version ({})",
                style(name).cyan(),
                version
            ));
        }
        UpdateOutcome::Updated {
            previous_version,
            report,
        } => {
            success(format!(
                "Updated {} {} → {}",
                style(name).cyan(),
                previous_version,
                style(&report.version).green()
            ));
            info(format!("Updated: {}", ctx.desktop_config().path().display()));
            success("Restart Claude Desktop to apply changes");
        }
    }
    Ok(())
}

fn run_update_all() -> Result<()> {
    let ctx = AppContext::load()?;
    let registry = ctx.registry_client()?;
    let installer = Installer::new(&registry, ctx.desktop_config(), ctx.ledger());

    let report = installer.update_all()?;
    if report.is_empty() {
        warning("No MCP servers installed");
        return Ok(());
    }

    for entry in &report.entries {
        match &entry.result {
            Ok(UpdateOutcome::Updated { report, .. }) => success(format!(
                "Updated {} to {}",
                style(&entry.name).cyan(),
                style(&report.version).green()
            )),
            Ok(UpdateOutcome::AlreadyLatest { .. }) => {}
            Err(err) => warning(format!("Failed to update {}: {}", entry.name, err)),
        }
    }

    if report.updated() == 0 && report.failed() == 0 {
        info("All MCP servers are up to date!");
        return Ok(());
    }
    if report.updated() > 0 {
        info(format!("Updated: {}", ctx.desktop_config().path().display()));
        success(format!(
            "Updated {} server(s). Restart Claude Desktop to apply changes.",
            report.updated()
        ));
    }
    if report.failed() > 0 {
        warning(format!("Failed to update {} server(s)", report.failed()));
    }
    Ok(())
}

fn run_check(name: Option<&str>) -> Result<()> {
    let ctx = AppContext::load()?;
    let registry = ctx.registry_client()?;
    let installer = Installer::new(&registry, ctx.desktop_config(), ctx.ledger());

    let checks = match name {
        Some(name) => vec![(name.to_string(), installer.check_update(name))],
        None => installer.check_all()?,
    };
    if checks.is_empty() {
        warning("No MCP servers installed");
        return Ok(());
    }

    let mut outdated = 0;
    for (name, check) in &checks {
        match check {
            Ok(check) if check.is_outdated() => {
                outdated += 1;
                info(format!(
                    "{}: {} → {}",
                    style(name).cyan(),
                    check.installed_version,
                    style(&check.latest_version).green()
                ));
            }
            Ok(check) => println!(
                "  {}: {} {}",
                name,
                check.installed_version,
                style("(latest)").dim()
            ),
            Err(err) => warning(format!("{}: {}", name, err)),
        }
    }

    if outdated == 0 {
        info("All MCP servers are up to date!");
    } else {
        info(format!(
            "{} update(s) available. Run {} to install.",
            outdated,
            style("mcp-get update").green()
        ));
    }
    Ok(())
}

fn run_list(json: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    let servers = ctx.ledger().get_all()?;

    if json {
        let list: Vec<_> = servers.values().collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    heading("Installed MCP Servers");
    if servers.is_empty() {
        warning("No MCP servers installed");
        info(format!(
            "Install servers with: {}",
            style("mcp-get install <name>").green()
        ));
        return Ok(());
    }

    for server in servers.values() {
        output::print_installed_server(server);
        println!();
    }
    println!(
        "{}",
        style(format!(
            "Config file: {}",
            ctx.desktop_config().path().display()
        ))
        .dim()
    );
    Ok(())
}

fn run_list_desktop(json: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    let desktop = ctx.desktop_config();

    if !desktop.exists() {
        warning("Claude Desktop config not found");
        info(format!("Expected at: {}", desktop.path().display()));
        return Ok(());
    }

    let servers = desktop.list();
    if json {
        let list: Vec<_> = servers
            .iter()
            .map(|(name, config)| serde_json::json!({ "name": name, "config": config }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    heading("MCP Servers in Claude Desktop Config");
    if servers.is_empty() {
        warning("No MCP servers configured");
        info(format!(
            "Install servers with: {}",
            style("mcp-get install <name>").green()
        ));
        return Ok(());
    }

    for (name, config) in &servers {
        println!("{}", style(name).bold().cyan());
        println!("   {}", style(config.command_line()).dim());
        if !config.env.is_empty() {
            let keys: Vec<&str> = config.env.keys().map(String::as_str).collect();
            println!("   {}", style(format!("env: {}", keys.join(", "))).dim());
        }
        println!();
    }
    println!(
        "{}",
        style(format!("Config file: {}", desktop.path().display())).dim()
    );
    Ok(())
}

fn run_info(name: &str, json: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    let registry = ctx.registry_client()?;
    let package = registry.get_package(name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&package)?);
        return Ok(());
    }

    output::print_package_detail(&package);

    if let Some(installed) = ctx.ledger().get(name)? {
        println!();
        success(format!("Installed: v{}", installed.version));
        output::print_launch_config(&installed.config);
        if let Some(latest) = &package.latest_version
            && *latest != installed.version
        {
            info(format!(
                "Update available: {} → {}",
                installed.version, latest
            ));
        }
    }
    Ok(())
}

fn run_search(query: &str, page: u32, limit: u32) -> Result<()> {
    let ctx = AppContext::load()?;
    let registry = ctx.registry_client()?;
    let results = registry.search(query, Some(page), Some(limit))?;

    if results.data.is_empty() {
        warning(format!("No MCP servers found for '{}'", query));
        return Ok(());
    }

    heading(&format!(
        "Found {} MCP server(s) for '{}'",
        results.pagination.total, query
    ));
    for package in &results.data {
        output::print_package_row(package);
    }
    if results.pagination.has_more {
        println!();
        info(format!(
            "More results: mcp-get search {} --page {}",
            query,
            results.pagination.page + 1
        ));
    }
    Ok(())
}

fn run_browse(query: ListQuery, featured: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    let registry = ctx.registry_client()?;
    let mut results = registry.list_packages(&query)?;
    if featured {
        results.retain_featured();
    }

    let kind = if featured { "Featured MCP Servers" } else { "MCP Servers" };
    let title = match &query.category {
        Some(category) => format!("{} in '{}'", kind, category),
        None => kind.to_string(),
    };
    heading(&title);

    if results.data.is_empty() {
        warning("No MCP servers found");
        return Ok(());
    }
    for package in &results.data {
        output::print_package_row(package);
    }
    println!();
    println!(
        "{}",
        style(format!(
            "Page {} · {} total",
            results.pagination.page, results.pagination.total
        ))
        .dim()
    );
    Ok(())
}

fn run_status(json: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    let desktop = ctx.desktop_config();
    let report = collect_status(desktop, ctx.ledger())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    heading("MCP Server Status");
    println!(
        "  {:<16} {} {}",
        style("Desktop config:").dim(),
        desktop.path().display(),
        if desktop.exists() {
            style("(found)").green()
        } else {
            style("(not found)").yellow()
        }
    );
    println!();

    if report.servers.is_empty() {
        warning("No MCP servers installed or configured");
        return Ok(());
    }

    for server in &report.servers {
        let marker = match server.state {
            DriftState::InSync => style("✓").green(),
            DriftState::Untracked => style("ℹ").blue(),
            DriftState::ConfigMismatch | DriftState::MissingFromAppConfig => style("⚠").yellow(),
        };
        let version = server
            .version
            .as_deref()
            .map(|v| format!("@{}", v))
            .unwrap_or_default();
        println!(
            "{} {}{} {}",
            marker,
            style(&server.name).cyan(),
            style(version).dim(),
            style(server.state.label()).dim()
        );
        if !server.required_env.is_empty() {
            println!(
                "    {} {}",
                style("missing env:").yellow(),
                server.required_env.join(", ")
            );
        }
    }

    let summary = &report.summary;
    println!();
    println!(
        "{}",
        style(format!(
            "{} tracked · {} in sync · {} drifted · {} untracked",
            summary.tracked, summary.in_sync, summary.drifted, summary.untracked
        ))
        .dim()
    );
    if report.has_drift() {
        info(format!(
            "Reinstall with {} to repair drift",
            style("mcp-get install <name> --force").green()
        ));
    }
    Ok(())
}

fn run_config(api: Option<String>, config_path: Option<PathBuf>, list: bool) -> Result<()> {
    let ctx = AppContext::load()?;
    let store = ctx.settings_store();

    if api.is_some() || config_path.is_some() {
        if let Some(url) = api {
            url::Url::parse(&url)
                .map_err(|err| anyhow::anyhow!("Invalid API URL '{}': {}", url, err))?;
            store.set_api_url(&url)?;
            success(format!("API URL set to {}", style(&url).cyan()));
        }
        if let Some(path) = config_path {
            store.set_config_path(&path)?;
            success(format!(
                "Desktop config path set to {}",
                style(path.display()).cyan()
            ));
        }
        return Ok(());
    }

    let settings = ctx.settings();
    if list {
        let output = serde_json::json!({
            "apiUrl": settings.api_url,
            "configPath": settings.config_path,
            "username": settings.username,
            "authenticated": settings.is_authenticated(),
            "installedServers": settings.installed_servers.len(),
            "settingsFile": ctx.settings_path(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    heading("mcp-get Configuration");
    let field = |label: &str, value: String| {
        println!("  {:<16} {}", style(label).dim(), value);
    };
    field("Platform:", platform_name().to_string());
    field(
        "Desktop config:",
        settings.config_path.display().to_string(),
    );
    field(
        "Config exists:",
        if ctx.desktop_config().exists() {
            style("yes").green().to_string()
        } else {
            style("no").yellow().to_string()
        },
    );
    field("API URL:", settings.api_url.clone());
    field(
        "Logged in:",
        match &settings.username {
            Some(user) if settings.is_authenticated() => style(user).green().to_string(),
            _ => style("no").dim().to_string(),
        },
    );
    field("Settings file:", ctx.settings_path().display().to_string());
    Ok(())
}
