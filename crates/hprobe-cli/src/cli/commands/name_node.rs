//! `hprobe status|active-name-node` – name node HA state.

use anyhow::Result;
use hprobe_core::client::HdfsClient;
use hprobe_core::runner::CommandRunner;

pub fn run_status<R: CommandRunner>(client: &HdfsClient<R>, name_node: &str) -> Result<()> {
    let state = client.name_node_status(name_node)?;
    println!("{:<14} {}", name_node, state);
    Ok(())
}

pub fn run_active_name_node<R: CommandRunner>(client: &HdfsClient<R>) -> Result<()> {
    println!("{}", client.active_name_node()?);
    Ok(())
}
