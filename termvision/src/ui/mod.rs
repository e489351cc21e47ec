//! UI module root: exposes drawing functions for individual panels.

pub mod header;
pub mod logs;
pub mod metrics;
pub mod processes;
pub mod sysinfo;
pub mod theme;
pub mod util;
