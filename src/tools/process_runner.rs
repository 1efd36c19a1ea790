use crate::error::ToolError;
use log::{debug, warn};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// 檢查子程序狀態的間隔
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// 執行外部程序並等待結束
///
/// 等待期間持續檢查中斷信號與逾時，任一成立就終止子程序。
/// stdout / stderr 由背景執行緒讀取，避免管線緩衝區塞滿卡住 ffmpeg。
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    shutdown_signal: Arc<AtomicBool>,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    #[must_use]
    pub const fn new(shutdown_signal: Arc<AtomicBool>, timeout: Option<Duration>) -> Self {
        Self {
            shutdown_signal,
            timeout,
        }
    }

    pub fn run(&self, mut command: Command) -> Result<ProcessOutput, ToolError> {
        let program = command.get_program().to_string_lossy().to_string();

        if self.shutdown_signal.load(Ordering::SeqCst) {
            return Err(ToolError::Cancelled { program });
        }

        debug!("執行外部程序: {command:?}");

        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| ToolError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdout_reader = spawn_pipe_reader(child.stdout.take());
        let stderr_reader = spawn_pipe_reader(child.stderr.take());
        let started = Instant::now();

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    terminate(&mut child, &program);
                    return Err(ToolError::Wait { program, source });
                }
            }

            if self.shutdown_signal.load(Ordering::SeqCst) {
                terminate(&mut child, &program);
                return Err(ToolError::Cancelled { program });
            }

            if let Some(limit) = self.timeout
                && started.elapsed() >= limit
            {
                terminate(&mut child, &program);
                return Err(ToolError::TimedOut {
                    program,
                    seconds: limit.as_secs(),
                });
            }

            thread::sleep(POLL_INTERVAL);
        };

        let stdout = join_pipe_reader(stdout_reader);
        let stderr = join_pipe_reader(stderr_reader);

        if !status.success() {
            return Err(ToolError::Failed {
                program,
                code: status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(ProcessOutput { stdout, stderr })
    }
}

fn spawn_pipe_reader<R>(pipe: Option<R>) -> Option<JoinHandle<String>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buffer = Vec::new();
            let _ = pipe.read_to_end(&mut buffer);
            String::from_utf8_lossy(&buffer).into_owned()
        })
    })
}

fn join_pipe_reader(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

fn terminate(child: &mut Child, program: &str) {
    warn!("終止程序 {program} [{}]", child.id());
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner() -> ProcessRunner {
        ProcessRunner::new(Arc::new(AtomicBool::new(false)), None)
    }

    fn shell(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", script]);
        cmd
    }

    #[test]
    fn test_captures_stdout() {
        let output = runner().run(shell("echo 12.5")).unwrap();
        assert_eq!(output.stdout.trim(), "12.5");
    }

    #[test]
    fn test_non_zero_exit_reports_stderr() {
        let err = runner()
            .run(shell("echo boom >&2; exit 3"))
            .unwrap_err();

        match err {
            ToolError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let err = runner()
            .run(Command::new("definitely-not-a-real-binary-4821"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[test]
    fn test_shutdown_before_start_is_cancelled() {
        let runner = ProcessRunner::new(Arc::new(AtomicBool::new(true)), None);
        let err = runner.run(shell("sleep 5")).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_timeout_kills_process() {
        let runner = ProcessRunner::new(
            Arc::new(AtomicBool::new(false)),
            Some(Duration::from_millis(200)),
        );

        let started = Instant::now();
        let err = runner.run(shell("sleep 10")).unwrap_err();

        assert!(matches!(err, ToolError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_shutdown_during_run_is_cancelled() {
        let signal = Arc::new(AtomicBool::new(false));
        let runner = ProcessRunner::new(Arc::clone(&signal), None);

        let trigger = {
            let signal = Arc::clone(&signal);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(150));
                signal.store(true, Ordering::SeqCst);
            })
        };

        let err = runner.run(shell("sleep 10")).unwrap_err();
        trigger.join().unwrap();
        assert!(err.is_cancelled());
    }
}
