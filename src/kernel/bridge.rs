//! Core side of the execution bridge: one-shot readiness and tree mirroring.

use crate::kernel::services::ports::{BridgeError, ExecutionBridge, FsError, RuntimeFs};
use crate::models::{FileTree, NodeId, NodeKind};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Wraps a bridge so that `start` runs once per session. Concurrent callers
/// wait on the same initialization and every later call gets the cached
/// handle or the cached failure.
pub struct RuntimeGate<B: ExecutionBridge> {
    bridge: B,
    ready: OnceCell<Result<Arc<B::Handle>, BridgeError>>,
}

impl<B: ExecutionBridge> RuntimeGate<B> {
    pub fn new(bridge: B) -> Self {
        Self {
            bridge,
            ready: OnceCell::new(),
        }
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub async fn ensure_ready(&self) -> Result<Arc<B::Handle>, BridgeError> {
        self.ready
            .get_or_init(|| async {
                tracing::info!(runtime = self.bridge.label(), "starting runtime");
                let result = self.bridge.start().await;
                match &result {
                    Ok(_) => tracing::info!(runtime = self.bridge.label(), "runtime ready"),
                    Err(e) => tracing::error!(error = %e, "runtime failed to start"),
                }
                result
            })
            .await
            .clone()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.ready.get(), Some(Ok(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub path: String,
    pub error: FsError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub folders: usize,
    pub files: usize,
    pub failures: Vec<SyncFailure>,
}

/// Mirrors `tree` into the runtime file system below `base`. The root folder
/// maps onto `base` itself. Best effort: an existing directory is not an
/// error, and a node that fails to write is logged and recorded while the
/// traversal carries on with its siblings.
pub fn sync_tree<F: RuntimeFs + ?Sized>(fs: &F, tree: &FileTree, base: &str) -> SyncReport {
    let mut report = SyncReport::default();
    let base = base.trim_end_matches('/');
    for &child in tree.children(tree.root()) {
        sync_node(fs, tree, child, base, &mut report);
    }
    tracing::debug!(
        folders = report.folders,
        files = report.files,
        failures = report.failures.len(),
        "workspace synced"
    );
    report
}

fn sync_node<F: RuntimeFs + ?Sized>(
    fs: &F,
    tree: &FileTree,
    id: NodeId,
    base: &str,
    report: &mut SyncReport,
) {
    let Some(node) = tree.get(id) else {
        return;
    };
    let path = format!("{base}/{}", node.name());

    match node.kind() {
        NodeKind::File => {
            let contents = node.content().unwrap_or_default();
            match fs.write_file(&path, contents.as_bytes()) {
                Ok(()) => report.files += 1,
                Err(error) => record_failure(report, path, error),
            }
        }
        NodeKind::Folder => {
            match fs.mkdir(&path) {
                Ok(()) => report.folders += 1,
                Err(FsError::AlreadyExists) => {}
                Err(error) => record_failure(report, path.clone(), error),
            }
            for &child in node.children() {
                sync_node(fs, tree, child, &path, report);
            }
        }
    }
}

fn record_failure(report: &mut SyncReport, path: String, error: FsError) {
    tracing::warn!(path = %path, error = %error, "failed to mirror node");
    report.failures.push(SyncFailure { path, error });
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/bridge.rs"]
mod tests;
