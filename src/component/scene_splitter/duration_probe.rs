use super::oracle::DurationProbe;
use crate::error::ProbeError;
use crate::tools::{AvailableTools, ProcessRunner};
use log::debug;
use std::path::Path;
use std::process::Command;

/// 使用 ffprobe 讀取 format duration
pub struct FfprobeDurationProbe {
    ffprobe: String,
    runner: ProcessRunner,
}

impl FfprobeDurationProbe {
    #[must_use]
    pub fn new(tools: &AvailableTools, runner: ProcessRunner) -> Self {
        Self {
            ffprobe: tools.ffprobe().to_string(),
            runner,
        }
    }

    fn build_command(&self, source: &Path) -> Command {
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=nw=1:nk=1",
        ])
        .arg(source);
        cmd
    }
}

impl DurationProbe for FfprobeDurationProbe {
    fn probe(&self, source: &Path) -> Result<f64, ProbeError> {
        let output = self
            .runner
            .run(self.build_command(source))
            .map_err(|e| ProbeError::Tool {
                path: source.to_path_buf(),
                source: e,
            })?;

        let duration = parse_duration_output(&output.stdout).ok_or_else(|| {
            ProbeError::InvalidOutput {
                path: source.to_path_buf(),
                output: output.stdout.trim().to_string(),
            }
        })?;

        debug!("影片長度 {:.3}s: {}", duration, source.display());
        Ok(duration)
    }
}

/// 解析單一浮點數輸出（ffprobe 在無法取得時會印出 `N/A`）
fn parse_duration_output(stdout: &str) -> Option<f64> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_output() {
        assert!((parse_duration_output("12.345000\n").unwrap() - 12.345).abs() < 1e-9);
        assert!((parse_duration_output("\n  7\n").unwrap() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_output_invalid() {
        assert!(parse_duration_output("N/A\n").is_none());
        assert!(parse_duration_output("").is_none());
        assert!(parse_duration_output("-3.0").is_none());
        assert!(parse_duration_output("inf").is_none());
    }
}
