use std::time::Duration;

use serial_test::serial;
use utils::EnvVarGuard;
use zsync_config::{ClientConfig, IntegrityPolicy, ReconstructionConfig, ZsyncConfig};

#[test]
fn test_env_var_names() {
    assert_eq!(ClientConfig::env_var_name("read_timeout"), "ZSYNC_CLIENT_READ_TIMEOUT");
    assert_eq!(ReconstructionConfig::env_var_name("integrity_policy"), "ZSYNC_RECONSTRUCTION_INTEGRITY_POLICY");
}

#[test]
#[serial(env)]
fn test_defaults_without_environment() {
    let _g1 = EnvVarGuard::remove("ZSYNC_RECONSTRUCTION_DOWNLOAD_CHUNK_SIZE");
    let _g2 = EnvVarGuard::remove("ZSYNC_RECONSTRUCTION_INTEGRITY_POLICY");
    let _g3 = EnvVarGuard::remove("ZSYNC_PLANNER_COMMAND");
    let _g4 = EnvVarGuard::remove("ZSYNC_PLANNER_ARGS");

    let config = ZsyncConfig::new();
    assert_eq!(config.reconstruction.download_chunk_size.as_u64(), 64 * 1024);
    assert_eq!(config.reconstruction.integrity_policy, IntegrityPolicy::Advisory);
    assert!(config.reconstruction.preserve_mtime);
    assert_eq!(config.planner.command, "zsyncranges");
    assert!(config.planner.args.is_empty());
    assert!(config.client.user_agent.starts_with("zsyncdownload/"));
}

#[test]
#[serial(env)]
fn test_environment_overrides() {
    let _g1 = EnvVarGuard::set("ZSYNC_RECONSTRUCTION_DOWNLOAD_CHUNK_SIZE", "1kb");
    let _g2 = EnvVarGuard::set("ZSYNC_RECONSTRUCTION_INTEGRITY_POLICY", "strict");
    let _g3 = EnvVarGuard::set("ZSYNC_CLIENT_READ_TIMEOUT", "5s");
    let _g4 = EnvVarGuard::set("ZSYNC_PLANNER_COMMAND", "/opt/bin/zsyncranges");
    let _g5 = EnvVarGuard::set("ZSYNC_LOG_DEST", "/tmp/zsync.log");
    let _g6 = EnvVarGuard::set("ZSYNC_PLANNER_ARGS", "--json --quiet");

    let config = ZsyncConfig::new();
    assert_eq!(config.reconstruction.download_chunk_size.as_u64(), 1024);
    assert_eq!(config.reconstruction.integrity_policy, IntegrityPolicy::Strict);
    assert_eq!(config.client.read_timeout, Duration::from_secs(5));
    assert_eq!(config.planner.command, "/opt/bin/zsyncranges");
    assert_eq!(config.planner.args, "--json --quiet");
    assert_eq!(config.log.dest.as_deref(), Some("/tmp/zsync.log"));
}

#[test]
#[serial(env)]
fn test_unparsable_override_keeps_default() {
    let _g = EnvVarGuard::set("ZSYNC_RECONSTRUCTION_PRESERVE_MTIME", "perhaps");

    let config = ZsyncConfig::new();
    assert!(config.reconstruction.preserve_mtime);
}
