//! Usage: Validation helpers for MCP server entries.

use super::types::ServerConfig;

pub(super) fn validate_server_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("SEC_INVALID_INPUT: server name is required".to_string());
    }
    if name.len() > 128 {
        return Err("SEC_INVALID_INPUT: server name too long (max 128)".to_string());
    }
    if name.chars().any(|c| c.is_control()) {
        return Err("SEC_INVALID_INPUT: server name contains control characters".to_string());
    }
    Ok(())
}

pub(super) fn validate_server_config(config: &ServerConfig) -> Result<(), String> {
    match config {
        ServerConfig::Stdio(stdio) => {
            if stdio.command.trim().is_empty() {
                return Err("SEC_INVALID_INPUT: stdio command is required".to_string());
            }
        }
        ServerConfig::Network(network) => {
            let url = network.url.trim();
            if url.is_empty() {
                return Err("SEC_INVALID_INPUT: server url is required".to_string());
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("SEC_INVALID_INPUT: unsupported server url={url}"));
            }
        }
    }
    Ok(())
}
