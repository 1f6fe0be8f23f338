//! Usage: Resolve per-client MCP config file locations.

use std::path::PathBuf;

use crate::clients::{self, CUSTOM_CLIENT_KEY};

fn home_dir() -> Result<PathBuf, String> {
    dirs::home_dir().ok_or_else(|| "CONFIG_IO: failed to resolve home dir".to_string())
}

fn config_dir() -> Result<PathBuf, String> {
    dirs::config_dir().ok_or_else(|| "CONFIG_IO: failed to resolve config dir".to_string())
}

fn vscode_global_storage(extension: &str, file: &str) -> Result<PathBuf, String> {
    Ok(config_dir()?
        .join("Code")
        .join("User")
        .join("globalStorage")
        .join(extension)
        .join("settings")
        .join(file))
}

/// An explicit path always wins. Without one, clients resolve to their
/// well-known location; `custom` (and clients without a stable location)
/// require the caller to supply the path.
pub(super) fn config_path(client_key: &str, path: Option<&str>) -> Result<PathBuf, String> {
    clients::validate_client_key(client_key)?;

    if let Some(path) = path.map(str::trim).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    match client_key {
        "claude" => Ok(config_dir()?
            .join("Claude")
            .join("claude_desktop_config.json")),
        "cursor" => Ok(home_dir()?.join(".cursor").join("mcp.json")),
        "windsurf" => Ok(home_dir()?
            .join(".codeium")
            .join("windsurf")
            .join("mcp_config.json")),
        "cline" => vscode_global_storage("saoudrizwan.claude-dev", "cline_mcp_settings.json"),
        "roo_code" => vscode_global_storage("rooveterinaryinc.roo-cline", "mcp_settings.json"),
        "vscode" => Ok(config_dir()?.join("Code").join("User").join("mcp.json")),
        "plux" => Ok(home_dir()?.join(".plux").join("mcp.json")),
        "codex" => Ok(home_dir()?.join(".codex").join("config.toml")),
        "claude_code" => Ok(home_dir()?.join(".claude.json")),
        "mcphub" => Ok(home_dir()?
            .join(".config")
            .join("mcphub")
            .join("servers.json")),
        CUSTOM_CLIENT_KEY | "cherrystudio" => Err(format!(
            "SEC_INVALID_INPUT: path is required for client={client_key}"
        )),
        other => Err(format!("SEC_INVALID_INPUT: unknown client_key={other}")),
    }
}
