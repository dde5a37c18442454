//! 本地 Python 进程作为执行桥。
//!
//! 工作区先镜像到会话的工作目录，再以 `python -u -` 运行目标文件的内容，
//! 源码从 stdin 传入，stdout/stderr 按行转发。

use crate::kernel::services::ports::{
    BoxFuture, BridgeError, ExecutionBridge, ExecutionError, FsError, OutputSink, RuntimeFs,
    RuntimeSettings,
};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, OnceLock};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Runtime file system rooted at the scratch directory. Paths that climb
/// out of it are rejected.
#[derive(Debug)]
pub struct ScratchFs {
    root: PathBuf,
}

impl ScratchFs {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, FsError> {
        let mut resolved = self.root.clone();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    return Err(FsError::Rejected(format!(
                        "{path} escapes the workspace"
                    )))
                }
                name => resolved.push(name),
            }
        }
        Ok(resolved)
    }
}

impl RuntimeFs for ScratchFs {
    fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let dir = self.resolve(path)?;
        match std::fs::create_dir(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(FsError::AlreadyExists),
            Err(e) => Err(FsError::Io(e.to_string())),
        }
    }

    fn write_file(&self, path: &str, contents: &[u8]) -> Result<(), FsError> {
        let file = self.resolve(path)?;
        std::fs::write(&file, contents).map_err(|e| FsError::Io(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Runs programs with a local Python interpreter.
///
/// stdout and stderr are separate pipes read by separate tasks. Lines keep
/// their order within one stream, but a stdout line and a stderr line written
/// close together may reach the sink in either order.
pub struct ProcessBridge {
    python: String,
    label: String,
    version: OnceLock<String>,
    scratch: PathBuf,
}

impl ProcessBridge {
    pub fn new(settings: &RuntimeSettings, scratch: PathBuf) -> Self {
        Self {
            python: settings.python.clone(),
            label: settings.label.clone(),
            version: OnceLock::new(),
            scratch,
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch
    }
}

impl ExecutionBridge for ProcessBridge {
    type Handle = ScratchFs;

    /// Interpreter version once started, the configured label before that.
    fn label(&self) -> &str {
        self.version.get().unwrap_or(&self.label)
    }

    fn start(&self) -> BoxFuture<'_, Result<Arc<ScratchFs>, BridgeError>> {
        Box::pin(async move {
            let output = Command::new(&self.python)
                .arg("--version")
                .output()
                .await
                .map_err(|e| BridgeError::new(format!("cannot run {}: {e}", self.python)))?;
            if !output.status.success() {
                return Err(BridgeError::new(format!(
                    "{} --version failed with {}",
                    self.python, output.status
                )));
            }

            // Python 2 prints its version on stderr.
            let raw = if output.stdout.is_empty() {
                &output.stderr
            } else {
                &output.stdout
            };
            let version = String::from_utf8_lossy(raw).trim().to_string();

            tokio::fs::create_dir_all(&self.scratch)
                .await
                .map_err(|e| {
                    BridgeError::new(format!(
                        "cannot create {}: {e}",
                        self.scratch.display()
                    ))
                })?;

            tracing::info!(
                version = %version,
                scratch = %self.scratch.display(),
                "python interpreter located"
            );
            if !version.is_empty() {
                let _ = self.version.set(version);
            }
            Ok(Arc::new(ScratchFs::new(self.scratch.clone())))
        })
    }

    fn execute<'a>(
        &'a self,
        handle: &'a ScratchFs,
        source: &'a str,
        sink: &'a mut dyn OutputSink,
    ) -> BoxFuture<'a, Result<(), ExecutionError>> {
        Box::pin(async move {
            let mut child = Command::new(&self.python)
                .arg("-u")
                .arg("-")
                .current_dir(handle.root())
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| ExecutionError::Io(e.to_string()))?;

            let io_error = |what: &str| ExecutionError::Io(format!("{what} unavailable"));
            let mut stdin = child.stdin.take().ok_or_else(|| io_error("stdin"))?;
            let stdout = child.stdout.take().ok_or_else(|| io_error("stdout"))?;
            let stderr = child.stderr.take().ok_or_else(|| io_error("stderr"))?;

            let (tx, mut rx) = mpsc::unbounded_channel();
            let stdout_task = tokio::spawn(forward_lines(stdout, Stream::Stdout, tx.clone()));
            let stderr_task = tokio::spawn(forward_lines(stderr, Stream::Stderr, tx));

            let program = source.to_owned();
            let writer = tokio::spawn(async move {
                stdin.write_all(program.as_bytes()).await?;
                stdin.shutdown().await
            });

            while let Some((stream, line)) = rx.recv().await {
                match stream {
                    Stream::Stdout => sink.stdout(&line),
                    Stream::Stderr => sink.stderr(&line),
                }
            }

            match writer.await {
                Ok(Ok(())) => {}
                // The program may exit before reading all of stdin.
                Ok(Err(e)) => tracing::debug!(error = %e, "writing program source failed"),
                Err(e) => tracing::debug!(error = %e, "stdin writer task failed"),
            }
            let _ = stdout_task.await;
            let _ = stderr_task.await;

            let status = child
                .wait()
                .await
                .map_err(|e| ExecutionError::Io(e.to_string()))?;
            tracing::debug!(%status, "python process finished");
            if status.success() {
                Ok(())
            } else {
                Err(ExecutionError::Exited {
                    code: status.code(),
                })
            }
        })
    }
}

async fn forward_lines<R>(reader: R, stream: Stream, tx: mpsc::UnboundedSender<(Stream, String)>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send((stream, line)).is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(?stream, error = %e, "output stream closed");
                break;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/python.rs"]
mod tests;
