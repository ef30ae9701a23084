//! Terminal output helpers.

use console::style;

use mcpget_core::registry::PackageInfo;
use mcpget_core::types::{InstalledServer, LaunchConfig};

pub fn success(message: impl AsRef<str>) {
    println!("{} {}", style("✓").green(), message.as_ref());
}

pub fn error(message: impl AsRef<str>) {
    eprintln!("{} {}", style("✗").red(), message.as_ref());
}

pub fn warning(message: impl AsRef<str>) {
    println!("{} {}", style("⚠").yellow(), message.as_ref());
}

pub fn info(message: impl AsRef<str>) {
    println!("{} {}", style("ℹ").blue(), message.as_ref());
}

pub fn heading(title: &str) {
    println!();
    println!("{}", style(title).bold().underlined());
    println!();
}

/// `1234` -> `1.2k`, `2500000` -> `2.5M`.
pub fn format_number(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}k", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

pub fn print_launch_config(config: &LaunchConfig) {
    println!("  {} {}", style("command:").dim(), config.command_line());
    for (key, value) in &config.env {
        println!("  {} {}={}", style("env:").dim(), key, value);
    }
}

/// One line per package, used by `search` and `browse`.
pub fn print_package_row(package: &PackageInfo) {
    let mut badges = String::new();
    if package.verified {
        badges.push_str(&format!(" {}", style("✓ verified").green()));
    }
    if package.featured {
        badges.push_str(&format!(" {}", style("★ featured").yellow()));
    }

    let version = package.latest_version.as_deref().unwrap_or("-");
    println!(
        "{}{} {}{}",
        style(&package.name).bold().cyan(),
        style(format!("@{}", version)).dim(),
        style(format!("({} downloads)", format_number(package.downloads))).dim(),
        badges
    );
    if let Some(description) = package.description.as_deref().filter(|d| !d.is_empty()) {
        println!("   {}", description);
    }
}

pub fn print_package_detail(package: &PackageInfo) {
    println!("{}", style(&package.name).bold().cyan());
    if let Some(description) = &package.description {
        println!("{}", description);
    }
    println!();

    let field = |label: &str, value: &str| {
        println!("  {:<12} {}", style(label).dim(), value);
    };
    field(
        "Version:",
        package.latest_version.as_deref().unwrap_or("unpublished"),
    );
    if let Some(author) = &package.author {
        field("Author:", &author.username);
    }
    if let Some(category) = &package.category {
        field("Category:", category);
    }
    if let Some(license) = &package.license {
        field("License:", license);
    }
    if let Some(repository) = &package.repository {
        field("Repository:", repository);
    }
    if let Some(homepage) = &package.homepage {
        field("Homepage:", homepage);
    }
    field("Downloads:", &format_number(package.downloads));
    if let Some(rating) = package.rating {
        field(
            "Rating:",
            &format!("{:.1} ({} ratings)", rating, package.rating_count),
        );
    }
    if !package.keywords.is_empty() {
        field("Keywords:", &package.keywords.join(", "));
    }
}

pub fn print_installed_server(server: &InstalledServer) {
    println!(
        "{}{} {}",
        style(&server.name).bold().cyan(),
        style(format!("@{}", server.version)).green(),
        style(format!("[{}]", server.source)).dim()
    );
    println!("   {}", style(server.config.command_line()).dim());
    if !server.config.env.is_empty() {
        let keys: Vec<&str> = server.config.env.keys().map(String::as_str).collect();
        println!("   {}", style(format!("env: {}", keys.join(", "))).dim());
    }
    println!(
        "   {}",
        style(format!(
            "installed {}",
            server.installed_at.format("%Y-%m-%d %H:%M")
        ))
        .dim()
    );
}
