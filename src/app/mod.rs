//! Usage: Application layer (logging init, notification seam, startup wiring).

pub mod logging;
pub mod notice;
