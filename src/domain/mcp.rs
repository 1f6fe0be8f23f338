//! Usage: MCP server config coordination (partition ops, batches, sync).

mod batch;
mod cloud;
mod coordinator;
mod sync;
mod types;
mod validate;

pub use batch::{BatchOutcome, BatchReport, RowSelection};
pub use cloud::{CloudServerEntry, CloudStore};
pub use coordinator::McpCoordinator;
pub use types::{NetworkConfig, ServerConfig, ServerPartition, StdioConfig, SyncRequest};
