//! Usage: Domain logic (tier policy, client catalog, MCP config coordination).

pub mod clients;
pub mod mcp;
pub mod tier;
