//! 从本地目录读取文件，作为 bulk import 的输入。
//!
//! 路径以目录自身的名字开头（`proj/src/main.py`），与浏览器上传文件夹时的
//! 相对路径一致。

use crate::models::ImportedFile;
use ignore::WalkBuilder;
use std::io;
use std::path::Path;

pub fn should_ignore(name: &str) -> bool {
    matches!(
        name,
        ".DS_Store"
            | ".Spotlight-V100"
            | ".Trashes"
            | ".fseventsd"
            | ".TemporaryItems"
            | "Thumbs.db"
            | "desktop.ini"
            | ".git"
            | "node_modules"
            | "__pycache__"
            | ".venv"
    )
}

fn is_likely_binary(content: &[u8]) -> bool {
    content.iter().take(8192).any(|&b| b == 0)
}

/// Reads every text file below `root`, sorted by path. Hidden files,
/// gitignored paths and binary files are skipped. `.gitignore` applies even
/// when `root` is not inside a git repository. Contents are decoded lossily
/// as UTF-8.
pub fn read_directory(root: &Path) -> io::Result<Vec<ImportedFile>> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a directory", root.display()),
        ));
    }

    let prefix = root
        .canonicalize()
        .ok()
        .and_then(|abs| abs.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_default();

    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true)
        .require_git(false)
        .filter_entry(|entry| !should_ignore(&entry.file_name().to_string_lossy()))
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let Ok(relative) = path.strip_prefix(root) else {
            continue;
        };
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read file");
                continue;
            }
        };
        if is_likely_binary(&bytes) {
            tracing::debug!(path = %path.display(), "binary file skipped");
            continue;
        }

        let mut segments: Vec<String> = Vec::new();
        if !prefix.is_empty() {
            segments.push(prefix.clone());
        }
        segments.extend(
            relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned()),
        );
        files.push(ImportedFile::new(
            segments.join("/"),
            String::from_utf8_lossy(&bytes).into_owned(),
        ));
    }

    tracing::info!(root = %root.display(), files = files.len(), "directory read");
    Ok(files)
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/import.rs"]
mod tests;
