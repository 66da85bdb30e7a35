pub mod config;
pub mod logging;

pub mod client;
pub mod control;
pub mod hdfs;
pub mod plan;
pub mod retry;
pub mod runner;
pub mod tasks;
