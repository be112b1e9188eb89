use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};
use zsync_config::PlannerConfig;

use crate::error::{FileReconstructionError, Result};
use crate::plan::ReconstructionPlan;

/// Produces the reuse and download ranges for rebuilding the target described by a descriptor
/// from a local candidate file.
///
/// Planners must cover `[0, Length)` of the target between reuse and download ranges; the
/// reconstruction only checks that each range is in bounds.
#[async_trait]
pub trait RangePlanner: Send + Sync {
    async fn plan(&self, metadata_path: &Path, candidate_path: &Path) -> Result<ReconstructionPlan>;
}

/// Runs an external planner executable as `<program> [args...] <descriptor> <candidate>` and reads
/// the plan as JSON from its stdout.
#[derive(Debug, Clone)]
pub struct CommandRangePlanner {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandRangePlanner {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Arguments passed ahead of the descriptor and candidate paths.
    pub fn with_args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn from_config(config: impl AsRef<PlannerConfig>) -> Self {
        let config = config.as_ref();
        Self::new(&config.command).with_args(config.args.split_whitespace())
    }
}

#[async_trait]
impl RangePlanner for CommandRangePlanner {
    async fn plan(&self, metadata_path: &Path, candidate_path: &Path) -> Result<ReconstructionPlan> {
        let program = self.program.to_string_lossy();
        debug!(%program, metadata = %metadata_path.display(), candidate = %candidate_path.display(), "Running range planner");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(metadata_path)
            .arg(candidate_path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| FileReconstructionError::PlannerFailure(format!("could not run {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FileReconstructionError::PlannerFailure(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let plan: ReconstructionPlan = serde_json::from_str(stdout.trim())
            .map_err(|e| FileReconstructionError::PlannerFailure(format!("{program} printed an invalid plan: {e}")))?;

        info!(
            reuse_ranges = plan.reuse.len(),
            reuse_bytes = plan.total_reuse_bytes(),
            download_ranges = plan.download.len(),
            download_bytes = plan.total_download_bytes(),
            "Range planner finished"
        );

        Ok(plan)
    }
}

/// Hands out a fixed plan regardless of its inputs.
#[derive(Debug, Clone, Default)]
pub struct StaticRangePlanner(pub ReconstructionPlan);

#[async_trait]
impl RangePlanner for StaticRangePlanner {
    async fn plan(&self, _metadata_path: &Path, _candidate_path: &Path) -> Result<ReconstructionPlan> {
        Ok(self.0.clone())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::plan::{DownloadRange, ReuseRange};

    fn sh(script: &str) -> CommandRangePlanner {
        // `sh -c <script> <$0>` leaves the descriptor and candidate as $1 and $2.
        CommandRangePlanner::new("sh").with_args(["-c", script, "planner"])
    }

    #[tokio::test]
    async fn test_command_planner_reads_stdout() {
        let planner = sh(r#"echo '{"length": 10, "reuse": [[0, 0, 5]], "download": [[5, 9]]}'"#);
        let plan = planner.plan(Path::new("a.zsync"), Path::new("seed")).await.unwrap();

        assert_eq!(plan.length, Some(10));
        assert_eq!(plan.reuse, vec![ReuseRange::new(0, 0, 5)]);
        assert_eq!(plan.download, vec![DownloadRange::new(5, 9)]);
    }

    #[tokio::test]
    async fn test_command_planner_receives_paths() {
        let planner = sh(r#"[ "$1" = "a.zsync" ] && [ "$2" = "seed" ] && echo '{}'"#);
        let plan = planner.plan(Path::new("a.zsync"), Path::new("seed")).await.unwrap();
        assert_eq!(plan, ReconstructionPlan::default());
    }

    #[tokio::test]
    async fn test_command_planner_failures() {
        let err = sh("echo 'no candidate' >&2; exit 3")
            .plan(Path::new("a"), Path::new("b"))
            .await
            .unwrap_err();
        match err {
            FileReconstructionError::PlannerFailure(msg) => assert!(msg.contains("no candidate"), "{msg}"),
            e => panic!("unexpected error {e:?}"),
        }

        let err = sh("echo not-json").plan(Path::new("a"), Path::new("b")).await.unwrap_err();
        assert!(matches!(err, FileReconstructionError::PlannerFailure(_)));

        let err = CommandRangePlanner::new("/nonexistent/zsync-planner")
            .plan(Path::new("a"), Path::new("b"))
            .await
            .unwrap_err();
        assert!(matches!(err, FileReconstructionError::PlannerFailure(_)));
    }

    #[tokio::test]
    async fn test_static_planner() {
        let plan = ReconstructionPlan::new(vec![], vec![DownloadRange::new(0, 3)]);
        let planner = StaticRangePlanner(plan.clone());
        assert_eq!(planner.plan(Path::new("x"), Path::new("y")).await.unwrap(), plan);
    }

    #[test]
    fn test_from_config() {
        let config = PlannerConfig::default();
        let planner = CommandRangePlanner::from_config(&config);
        assert_eq!(planner.program, OsString::from("zsyncranges"));
        assert!(planner.args.is_empty());

        let mut config = PlannerConfig::default();
        config.command = "sh".to_owned();
        config.args = "  -c   exit\t".to_owned();
        let planner = CommandRangePlanner::from_config(&config);
        assert_eq!(planner.args, vec![OsString::from("-c"), OsString::from("exit")]);
    }

    #[tokio::test]
    async fn test_configured_args_precede_paths() {
        let dir = tempfile::tempdir().unwrap();
        let descriptor = dir.path().join("plan.json");
        std::fs::write(&descriptor, r#"{"reuse": [[0, 0, 4]], "download": []}"#).unwrap();

        let mut config = PlannerConfig::default();
        config.command = "sh".to_owned();
        config.args = "-c cat<$1 planner".to_owned();

        let plan = CommandRangePlanner::from_config(&config)
            .plan(&descriptor, Path::new("seed"))
            .await
            .unwrap();
        assert_eq!(plan.reuse, vec![ReuseRange::new(0, 0, 4)]);
    }
}
