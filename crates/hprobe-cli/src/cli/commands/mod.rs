//! CLI command handlers, one file per command family.

mod check_healthy;
mod check_running;
mod data;
mod exec;
mod name_node;
mod pods;

pub use check_healthy::run_check_healthy;
pub use check_running::run_check_running;
pub use data::{run_delete, run_read, run_write, run_write_large};
pub use exec::run_exec;
pub use name_node::{run_active_name_node, run_status};
pub use pods::run_pods;
