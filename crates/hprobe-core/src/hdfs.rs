//! Shell command strings for the HDFS client container.
//!
//! These only format text; nothing here talks to HDFS. Commands are run inside
//! the client image, whose working directory holds `./bin/hdfs`.

/// Small payload written and read back by the data commands.
pub const TEST_CONTENT_SMALL: &str = "This is some test data";

/// Large input streamed into HDFS (long-read alignments to human chromosome 1, ~11GB).
pub const TEST_CONTENT_LARGE_SOURCE: &str = "http://s3.amazonaws.com/nanopore-human-wgs/chr1.sorted.bam";

pub const DEFAULT_DOCKER_IMAGE: &str = "elezar/hdfs-client:dev";

/// 3 data, 3 journal, 2 name and 2 zkfc tasks.
pub const DEFAULT_TASK_COUNT: usize = 10;

pub const NAME_NODES: [&str; 2] = ["name-0-node", "name-1-node"];

pub const POD_TYPES: [&str; 3] = ["journal", "name", "data"];

/// Script in the client image that writes the service's site configuration.
const CONFIGURE_SCRIPT: &str = "/configure-hdfs.sh";

/// `./bin/hdfs dfs -<cmd>`
pub fn dfs(cmd: &str) -> String {
    format!("./bin/hdfs dfs -{}", cmd)
}

pub fn write(content: &str, filename: &str) -> String {
    format!("echo {} | ./bin/hdfs dfs -put - {}", content, filename)
}

pub fn read(filename: &str) -> String {
    format!("./bin/hdfs dfs -cat {}", filename)
}

pub fn delete(filename: &str) -> String {
    format!("./bin/hdfs dfs -rm /{}", filename)
}

/// Stream a remote URL straight into HDFS without touching local disk.
pub fn write_from_url(url: &str, filename: &str) -> String {
    format!("wget {} -qO- | ./bin/hdfs dfs -put /{}", url, filename)
}

pub fn service_state(name_node: &str) -> String {
    format!("./bin/hdfs haadmin -getServiceState {}", name_node)
}

/// Wrap `cmd` for `bash -c`, optionally prefixed by an environment setup step.
pub fn bash(cmd: &str, environment: &str) -> String {
    if environment.is_empty() {
        format!("bash -c \"{}\"", cmd)
    } else {
        format!("bash -c \"{} && {}\"", environment, cmd)
    }
}

/// Full `docker run` invocation of the HDFS client image for one command.
pub fn docker_run(service_name: &str, image: &str, cmd: &str) -> String {
    let inner = format!("{} && {}", CONFIGURE_SCRIPT, cmd);
    format!(
        "docker run -e HDFS_SERVICE_NAME={} {} {}",
        service_name,
        image,
        bash(&inner, "")
    )
}
