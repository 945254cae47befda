//! Rsync-based transfer implementation.

use async_trait::async_trait;
use regex_lite::Regex;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use super::config::RsyncConfig;
use super::error::TransferError;
use super::traits::Transfer;
use super::types::{TransferOutcome, TransferRequest, TransferStats};

/// Rsync exit codes meaning "finished, but some files had errors".
/// 23 = partial transfer due to error, 24 = source files vanished mid-run.
const PARTIAL_EXIT_CODES: [i32; 2] = [23, 24];

/// Rsync-based transfer implementation.
pub struct RsyncTransfer {
    config: RsyncConfig,
}

impl RsyncTransfer {
    /// Creates a new rsync transfer with the given configuration.
    pub fn new(config: RsyncConfig) -> Self {
        Self { config }
    }

    /// Creates a transfer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RsyncConfig::default())
    }

    /// Builds the rsync argument list for one request.
    fn build_args(&self, request: &TransferRequest) -> Vec<String> {
        let mut args: Vec<String> = self
            .config
            .options
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if self.config.checksum {
            args.push("--checksum".to_string());
        }
        if request.purge {
            args.push("--delete".to_string());
        }
        if request.dry_run {
            args.push("--dry-run".to_string());
        }
        args.push("--stats".to_string());

        for pattern in &request.excludes {
            args.push(format!("--exclude={pattern}"));
        }

        // Trailing slash: copy the directory's contents, not the directory.
        let source = request.source.to_string_lossy();
        args.push(format!("{}/", source.trim_end_matches('/')));
        args.push(request.destination.to_string_lossy().to_string());

        args
    }
}

#[async_trait]
impl Transfer for RsyncTransfer {
    fn name(&self) -> &str {
        "rsync"
    }

    async fn transfer(&self, request: TransferRequest) -> Result<TransferOutcome, TransferError> {
        let args = self.build_args(&request);
        debug!(category = %request.category, ?args, "Invoking rsync");

        let child = Command::new(&self.config.rsync_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TransferError::ToolNotFound {
                        path: self.config.rsync_path.clone(),
                    }
                } else {
                    TransferError::SpawnFailed(e)
                }
            })?;

        let secs = self.config.timeout_secs;
        let output = match timeout(Duration::from_secs(secs), child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => return Err(TransferError::Timeout { secs }),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let outcome = classify_exit(output.status.code(), &stdout, &stderr)?;

        if let Some(stats) = outcome.stats() {
            info!(
                category = %request.category,
                files = stats.files_transferred,
                bytes = stats.bytes_transferred,
                clean = outcome.is_clean(),
                "Transfer finished"
            );
        }

        Ok(outcome)
    }
}

/// Classifies an rsync exit into the transfer outcome taxonomy.
pub(crate) fn classify_exit(
    code: Option<i32>,
    stdout: &str,
    stderr: &str,
) -> Result<TransferOutcome, TransferError> {
    let stats = parse_stats(stdout);
    match code {
        Some(0) => Ok(TransferOutcome::Completed { stats }),
        Some(code) if PARTIAL_EXIT_CODES.contains(&code) => {
            Ok(TransferOutcome::CompletedWithWarnings {
                stats,
                detail: last_line(stderr)
                    .unwrap_or_else(|| format!("rsync exited with code {code}")),
            })
        }
        Some(code) => Err(TransferError::Failed {
            code: Some(code),
            detail: last_line(stderr).unwrap_or_else(|| "no error output".to_string()),
        }),
        None => Err(TransferError::Failed {
            code: None,
            detail: "terminated by signal".to_string(),
        }),
    }
}

/// Extracts transfer statistics from `--stats` output.
fn parse_stats(stdout: &str) -> Option<TransferStats> {
    let files_re = Regex::new(r"Number of (?:regular )?files transferred: ([\d,]+)").ok()?;
    let bytes_re = Regex::new(r"Total transferred file size: ([\d,]+)").ok()?;

    let files = files_re
        .captures(stdout)
        .and_then(|c| parse_count(c.get(1)?.as_str()))?;
    let bytes = bytes_re
        .captures(stdout)
        .and_then(|c| parse_count(c.get(1)?.as_str()))
        .unwrap_or(0);

    Some(TransferStats {
        files_transferred: files,
        bytes_transferred: bytes,
    })
}

fn parse_count(s: &str) -> Option<u64> {
    s.replace(',', "").parse().ok()
}

fn last_line(s: &str) -> Option<String> {
    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .next_back()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn request() -> TransferRequest {
        TransferRequest {
            category: "snes".to_string(),
            source: PathBuf::from("/srv/roms/snes"),
            destination: PathBuf::from("/mnt/device/snes"),
            excludes: vec!["*.sav".to_string(), "*.tmp".to_string()],
            purge: false,
            dry_run: false,
        }
    }

    #[test]
    fn test_build_args_basic() {
        let transfer = RsyncTransfer::with_defaults();
        let args = transfer.build_args(&request());
        assert_eq!(
            args,
            vec![
                "-rtu",
                "--checksum",
                "--stats",
                "--exclude=*.sav",
                "--exclude=*.tmp",
                "/srv/roms/snes/",
                "/mnt/device/snes",
            ]
        );
    }

    #[test]
    fn test_build_args_purge_and_dry_run() {
        let transfer = RsyncTransfer::new(RsyncConfig::default().with_checksum(false));
        let mut req = request();
        req.excludes.clear();
        req.purge = true;
        req.dry_run = true;
        let args = transfer.build_args(&req);
        assert!(args.contains(&"--delete".to_string()));
        assert!(args.contains(&"--dry-run".to_string()));
        assert!(!args.contains(&"--checksum".to_string()));
    }

    #[test]
    fn test_build_args_source_trailing_slash_not_doubled() {
        let transfer = RsyncTransfer::with_defaults();
        let mut req = request();
        req.source = PathBuf::from("/srv/roms/snes/");
        let args = transfer.build_args(&req);
        assert!(args.contains(&"/srv/roms/snes/".to_string()));
    }

    #[test]
    fn test_classify_clean_exit() {
        let stdout = "\
Number of files: 120
Number of regular files transferred: 7
Total file size: 52,428,800 bytes
Total transferred file size: 1,048,576 bytes
";
        let outcome = classify_exit(Some(0), stdout, "").unwrap();
        assert!(outcome.is_clean());
        let stats = outcome.stats().unwrap();
        assert_eq!(stats.files_transferred, 7);
        assert_eq!(stats.bytes_transferred, 1_048_576);
    }

    #[test]
    fn test_classify_partial_exit_codes() {
        for code in [23, 24] {
            let outcome =
                classify_exit(Some(code), "", "rsync warning: some files vanished").unwrap();
            match outcome {
                TransferOutcome::CompletedWithWarnings { detail, .. } => {
                    assert!(detail.contains("vanished"));
                }
                other => panic!("expected warnings for code {code}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_classify_fatal_exit() {
        let err = classify_exit(Some(12), "", "rsync: connection unexpectedly closed").unwrap_err();
        match err {
            TransferError::Failed { code, detail } => {
                assert_eq!(code, Some(12));
                assert!(detail.contains("connection"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_signal_death() {
        let err = classify_exit(None, "", "").unwrap_err();
        assert!(matches!(err, TransferError::Failed { code: None, .. }));
    }

    #[test]
    fn test_parse_stats_older_rsync_wording() {
        let stdout = "Number of files transferred: 3\nTotal transferred file size: 300 bytes\n";
        let stats = parse_stats(stdout).unwrap();
        assert_eq!(stats.files_transferred, 3);
        assert_eq!(stats.bytes_transferred, 300);
    }

    #[test]
    fn test_parse_stats_absent() {
        assert!(parse_stats("no stats here").is_none());
    }

    #[tokio::test]
    async fn test_missing_tool_is_tool_not_found() {
        let transfer =
            RsyncTransfer::new(RsyncConfig::default().with_rsync_path("/nonexistent/rsync"));
        let err = transfer.transfer(request()).await.unwrap_err();
        assert!(matches!(err, TransferError::ToolNotFound { .. }));
    }
}
