mod app;
mod domain;
mod infra;
mod shared;

pub use app::{logging, notice};
pub use domain::{clients, mcp, tier};
pub use infra::{cloud_api, config_store, registry};

pub use domain::mcp::{
    BatchOutcome, BatchReport, McpCoordinator, RowSelection, ServerConfig, ServerPartition,
    SyncRequest,
};
pub use domain::tier::{Tier, TierPolicy, UserRecord};
pub use infra::config_store::{ConfigStore, FileConfigStore};
