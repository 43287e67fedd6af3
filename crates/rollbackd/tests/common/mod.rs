//! Shared fixtures: a scratch version store, compose file and a stub
//! orchestrator CLI, so the subprocess paths run without Docker.

#![allow(dead_code)]

use rollback_common::{RollbackRequest, ServiceName};
use rollbackd::config::Config;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Accepts the info/compose probes and pretends the restart worked.
pub const OK_STUB: &str = r#"case "$1" in
  info) exit 0 ;;
  compose)
    if [ "$2" = "version" ]; then exit 0; fi
    echo "Service restarted"
    exit 0
    ;;
esac
exit 0
"#;

/// Probes pass, but the restart itself exits non-zero.
pub const FAILING_RESTART_STUB: &str = r#"case "$1" in
  info) exit 0 ;;
  compose)
    if [ "$2" = "version" ]; then exit 0; fi
    echo "Container not found" >&2
    exit 1
    ;;
esac
exit 0
"#;

pub fn write_stub_docker(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("docker-stub");
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// One scratch environment per test. Keep the `TempDir` alive for the
/// duration of the test or the files vanish under the executor.
pub struct Workbench {
    pub dir: TempDir,
    pub config: Config,
}

pub fn workbench(env_content: &str, stub: &str) -> Workbench {
    let dir = TempDir::new().unwrap();

    let env_file = dir.path().join(".env");
    fs::write(&env_file, env_content).unwrap();

    let compose_file = dir.path().join("docker-compose.yml");
    fs::write(&compose_file, "services: {}\n").unwrap();

    let docker_bin = write_stub_docker(dir.path(), stub);

    let config = Config {
        env_file,
        compose_file,
        port: 0,
        environment: "test".to_string(),
        docker_bin: docker_bin.display().to_string(),
    };

    Workbench { dir, config }
}

pub fn request(service: ServiceName, target: &str) -> RollbackRequest {
    RollbackRequest {
        service,
        target_version: target.to_string(),
        alert_id: "slo-burn-rate".to_string(),
        alert_name: Some("SLO Burn Rate Alert".to_string()),
        reason: "SLO burn rate exceeded threshold".to_string(),
        triggered_at: None,
        additional_context: None,
    }
}
