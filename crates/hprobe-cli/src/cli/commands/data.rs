//! `hprobe write|read|delete|write-large` – HDFS data round trip.

use anyhow::{bail, Result};
use hprobe_core::client::HdfsClient;
use hprobe_core::runner::CommandRunner;

pub fn run_write<R: CommandRunner>(client: &HdfsClient<R>, file: &str, content: &str) -> Result<()> {
    if !client.write_data(file, content)? {
        bail!("write to {} did not succeed within {:?}", file, client.timing().budget);
    }
    println!("wrote {}", file);
    Ok(())
}

pub fn run_read<R: CommandRunner>(client: &HdfsClient<R>, file: &str, expected: &str) -> Result<()> {
    if !client.read_data(file, expected)? {
        bail!("{} could not be read or does not hold the expected content", file);
    }
    println!("read {}: content matches", file);
    Ok(())
}

pub fn run_delete<R: CommandRunner>(client: &HdfsClient<R>, file: &str) -> Result<()> {
    if !client.delete_data(file)? {
        bail!("delete of /{} did not succeed within {:?}", file, client.timing().budget);
    }
    println!("deleted /{}", file);
    Ok(())
}

pub fn run_write_large<R: CommandRunner>(client: &HdfsClient<R>, file: &str) -> Result<()> {
    if !client.write_large_data(file)? {
        bail!("large write to /{} did not succeed within {:?}", file, client.timing().budget);
    }
    println!("wrote /{}", file);
    Ok(())
}
