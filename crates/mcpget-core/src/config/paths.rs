//! Platform path resolution for the desktop config and the settings file.

use std::path::{Path, PathBuf};

/// Environment variable overriding the settings directory.
pub const CONFIG_DIR_ENV: &str = "MCP_GET_CONFIG_DIR";

const DESKTOP_CONFIG_FILE: &str = "claude_desktop_config.json";
const SETTINGS_FILE: &str = "config.json";

/// Default location of the Claude Desktop config for the current platform.
pub fn default_desktop_config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    desktop_config_path_for(std::env::consts::OS, &home, dirs::config_dir().as_deref())
}

/// Desktop config path for `os`.
///
/// On Windows `roaming_dir` is `%APPDATA%`; when unknown it falls back to
/// `<home>/AppData/Roaming`.
pub fn desktop_config_path_for(os: &str, home: &Path, roaming_dir: Option<&Path>) -> PathBuf {
    match os {
        "macos" => home
            .join("Library")
            .join("Application Support")
            .join("Claude")
            .join(DESKTOP_CONFIG_FILE),
        "windows" => roaming_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| home.join("AppData").join("Roaming"))
            .join("Claude")
            .join(DESKTOP_CONFIG_FILE),
        _ => home.join(".config").join("claude").join(DESKTOP_CONFIG_FILE),
    }
}

/// Default settings file: `$MCP_GET_CONFIG_DIR/config.json` or `<config_dir>/mcp-get/config.json`.
pub fn default_settings_path() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join(SETTINGS_FILE));
        }
    }
    let base = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(base.join("mcp-get").join(SETTINGS_FILE))
}

/// Human-readable platform name.
pub fn platform_name() -> &'static str {
    match std::env::consts::OS {
        "macos" => "macOS",
        "windows" => "Windows",
        "linux" => "Linux",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macos_path_uses_application_support() {
        let path = desktop_config_path_for("macos", Path::new("/Users/dev"), None);
        assert_eq!(
            path,
            PathBuf::from("/Users/dev/Library/Application Support/Claude/claude_desktop_config.json")
        );
    }

    #[test]
    fn windows_path_prefers_roaming_dir() {
        let path = desktop_config_path_for(
            "windows",
            Path::new("/home/dev"),
            Some(Path::new("/appdata")),
        );
        assert_eq!(
            path,
            PathBuf::from("/appdata/Claude/claude_desktop_config.json")
        );

        let fallback = desktop_config_path_for("windows", Path::new("/home/dev"), None);
        assert_eq!(
            fallback,
            PathBuf::from("/home/dev/AppData/Roaming/Claude/claude_desktop_config.json")
        );
    }

    #[test]
    fn other_platforms_use_dot_config() {
        let path = desktop_config_path_for("linux", Path::new("/home/dev"), None);
        assert_eq!(
            path,
            PathBuf::from("/home/dev/.config/claude/claude_desktop_config.json")
        );
    }
}
