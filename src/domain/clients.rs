//! Usage: Static catalog of supported AI clients (tier gates, config flavor).

use crate::tier::Tier;

/// Pseudo-client selectable in the shell; has no catalog entry and no tier
/// requirement, but always needs an explicit config-file path.
pub const CUSTOM_CLIENT_KEY: &str = "custom";

/// How a client's config file represents the disabled half of the partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisabledStyle {
    /// Active servers under `mcpServers`, disabled ones under `__disabled`.
    SplitMap,
    /// One `mcpServers` map; disabled entries carry `"disabled": true`.
    DisabledFlag,
    /// One `mcpServers` map; disabled entries carry `"isActive": false`.
    ActiveFlag,
    /// TOML `[mcp_servers.<name>]` tables; disabled entries carry `enabled = false`.
    TomlEnabledFlag,
}

#[derive(Debug, Clone, Copy)]
pub struct ClientInfo {
    pub key: &'static str,
    pub label: &'static str,
    pub url: &'static str,
    pub required_tier: Tier,
    pub disabled_style: DisabledStyle,
}

const CLIENTS: &[ClientInfo] = &[
    ClientInfo {
        key: "claude",
        label: "Claude Desktop",
        url: "https://claude.ai/",
        required_tier: Tier::Free,
        disabled_style: DisabledStyle::SplitMap,
    },
    ClientInfo {
        key: "windsurf",
        label: "Windsurf",
        url: "https://codeium.com/windsurf",
        required_tier: Tier::Free,
        disabled_style: DisabledStyle::SplitMap,
    },
    ClientInfo {
        key: "cursor",
        label: "Cursor",
        url: "https://cursor.com/",
        required_tier: Tier::Lifetime,
        disabled_style: DisabledStyle::SplitMap,
    },
    ClientInfo {
        key: "cline",
        label: "Cline (In VSCode)",
        url: "https://github.com/cline/cline",
        required_tier: Tier::Lifetime,
        disabled_style: DisabledStyle::DisabledFlag,
    },
    ClientInfo {
        key: "roo_code",
        label: "Roo Code (In VSCode)",
        url: "https://github.com/RooVetGit/Roo-Code",
        required_tier: Tier::Lifetime,
        disabled_style: DisabledStyle::DisabledFlag,
    },
    ClientInfo {
        key: "vscode",
        label: "VSCode",
        url: "https://code.visualstudio.com/",
        required_tier: Tier::Lifetime,
        disabled_style: DisabledStyle::SplitMap,
    },
    ClientInfo {
        key: "plux",
        label: "Plux",
        url: "https://github.com/milisp/plux",
        required_tier: Tier::Lifetime,
        disabled_style: DisabledStyle::SplitMap,
    },
    ClientInfo {
        key: "cherrystudio",
        label: "Cherry Studio",
        url: "https://github.com/CherryHQ/cherry-studio",
        required_tier: Tier::Lifetime,
        disabled_style: DisabledStyle::ActiveFlag,
    },
    ClientInfo {
        key: "codex",
        label: "Codex",
        url: "https://github.com/openai/codex",
        required_tier: Tier::LifetimePro,
        disabled_style: DisabledStyle::TomlEnabledFlag,
    },
    ClientInfo {
        key: "claude_code",
        label: "Claude Code",
        url: "https://docs.anthropic.com/en/docs/claude-code",
        required_tier: Tier::LifetimePro,
        disabled_style: DisabledStyle::SplitMap,
    },
    ClientInfo {
        key: "mcphub",
        label: "mcphub.nvim",
        url: "https://github.com/robitx/mcphub.nvim",
        required_tier: Tier::Free,
        disabled_style: DisabledStyle::SplitMap,
    },
];

pub fn all() -> &'static [ClientInfo] {
    CLIENTS
}

pub fn find(client_key: &str) -> Option<&'static ClientInfo> {
    CLIENTS.iter().find(|c| c.key == client_key)
}

pub fn is_supported_client_key(client_key: &str) -> bool {
    client_key == CUSTOM_CLIENT_KEY || find(client_key).is_some()
}

pub fn validate_client_key(client_key: &str) -> Result<(), String> {
    if is_supported_client_key(client_key) {
        Ok(())
    } else {
        Err(format!("SEC_INVALID_INPUT: unknown client_key={client_key}"))
    }
}

/// Minimum tier needed to select this client. `custom` is ungated.
pub fn required_tier(client_key: &str) -> Tier {
    find(client_key)
        .map(|c| c.required_tier)
        .unwrap_or(Tier::Free)
}

pub fn disabled_style(client_key: &str) -> DisabledStyle {
    find(client_key)
        .map(|c| c.disabled_style)
        .unwrap_or(DisabledStyle::SplitMap)
}
