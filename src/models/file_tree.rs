//! 虚拟工作区文件树
//!
//! 节点平坦存放在 arena 中，通过带代数的 `NodeId` 引用；父指针让
//! `find_parent` 为 O(1)。整棵树被替换时 arena 会被清空，旧 ID 随之失效。

use crate::kernel::language::LanguageId;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::fmt;

new_key_type! { pub struct NodeId; }

pub const DEFAULT_ROOT_NAME: &str = "project-root";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTreeError {
    DuplicateName { name: String },
    InvalidName { name: String },
    NotAFile,
    InvalidNodeId,
}

impl fmt::Display for FileTreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileTreeError::DuplicateName { name } => write!(f, "'{name}' already exists"),
            FileTreeError::InvalidName { name } => write!(f, "invalid entry name '{name}'"),
            FileTreeError::NotAFile => write!(f, "node is not a file"),
            FileTreeError::InvalidNodeId => write!(f, "invalid node id"),
        }
    }
}

impl std::error::Error for FileTreeError {}

#[derive(Debug, Clone)]
enum NodeBody {
    File {
        content: String,
        language: Option<LanguageId>,
    },
    Folder {
        children: Vec<NodeId>,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    parent: Option<NodeId>,
    body: NodeBody,
}

impl Node {
    fn new_file(
        name: String,
        parent: Option<NodeId>,
        content: String,
        language: Option<LanguageId>,
    ) -> Self {
        Self {
            name,
            parent,
            body: NodeBody::File { content, language },
        }
    }

    fn new_folder(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            body: NodeBody::Folder {
                children: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::File { .. } => NodeKind::File,
            NodeBody::Folder { .. } => NodeKind::Folder,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.body {
            NodeBody::File { content, .. } => Some(content),
            NodeBody::Folder { .. } => None,
        }
    }

    pub fn language(&self) -> Option<LanguageId> {
        match &self.body {
            NodeBody::File { language, .. } => *language,
            NodeBody::Folder { .. } => None,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.body {
            NodeBody::Folder { children } => children,
            NodeBody::File { .. } => &[],
        }
    }
}

/// Value form of a tree. Demo fixtures and JSON workspaces are written in it;
/// loading always copies, so a template is never aliased by a live tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeTemplate {
    File {
        name: String,
        #[serde(default)]
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<LanguageId>,
    },
    Folder {
        name: String,
        #[serde(default)]
        children: Vec<NodeTemplate>,
    },
}

impl NodeTemplate {
    pub fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        let language = Some(LanguageId::from_name(&name));
        NodeTemplate::File {
            name,
            content: content.into(),
            language,
        }
    }

    pub fn folder(name: impl Into<String>, children: Vec<NodeTemplate>) -> Self {
        NodeTemplate::Folder {
            name: name.into(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NodeTemplate::File { name, .. } | NodeTemplate::Folder { name, .. } => name,
        }
    }
}

/// Structure-only view of the tree handed to the chat collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeSnapshot>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry<'a> {
    pub id: NodeId,
    pub name: &'a str,
    pub kind: NodeKind,
}

/// One item of a bulk import: slash-delimited relative path plus text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFile {
    pub path: String,
    pub content: String,
}

impl ImportedFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

pub struct FileTree {
    arena: SlotMap<NodeId, Node>,
    root: NodeId,
    selected: Option<NodeId>,
}

impl FileTree {
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut arena = SlotMap::with_key();
        let root = arena.insert(Node::new_folder(root_name.into(), None));
        Self {
            arena,
            root,
            selected: None,
        }
    }

    /// `project-root` with `README.md` and `main.py`; `main.py` is selected.
    pub fn default_scaffold() -> Self {
        let mut tree = Self::from_template(&NodeTemplate::folder(
            DEFAULT_ROOT_NAME,
            vec![
                NodeTemplate::file(
                    "README.md",
                    "# New Project\nUpload a folder to begin or create a file.",
                ),
                NodeTemplate::file("main.py", "print(\"Hello from the Agent Editor!\")\n"),
            ],
        ));
        tree.selected = tree.child_named(tree.root, "main.py");
        tree
    }

    /// A file template becomes the sole child of a default root.
    pub fn from_template(template: &NodeTemplate) -> Self {
        let mut tree = Self::new(DEFAULT_ROOT_NAME);
        tree.replace_with(template);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected.filter(|id| self.arena.contains_key(*id))
    }

    pub fn set_selected(&mut self, id: Option<NodeId>) {
        self.selected = id.filter(|id| self.arena.contains_key(*id));
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children(self.root).is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains_key(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).map(Node::name)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.arena.get(id).map(Node::kind)
    }

    pub fn is_folder(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Folder)
    }

    pub fn content(&self, id: NodeId) -> Option<&str> {
        self.arena.get(id).and_then(Node::content)
    }

    pub fn language(&self, id: NodeId) -> Option<LanguageId> {
        self.arena.get(id).and_then(Node::language)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.arena.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn child_named(&self, folder: NodeId, name: &str) -> Option<NodeId> {
        self.children(folder)
            .iter()
            .copied()
            .find(|&child| self.name(child) == Some(name))
    }

    /// Slash-joined path below the root; empty for the root itself.
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        let mut components = Vec::new();
        let mut current = self.arena.get(id)?;
        while let Some(parent) = current.parent {
            components.push(current.name.as_str());
            current = self.arena.get(parent)?;
        }
        components.reverse();
        Some(components.join("/"))
    }
}

// ==================== 查找 ====================

impl FileTree {
    /// Folder whose children hold `target`. `None` for the root and for ids
    /// that are not (or no longer) part of this tree.
    pub fn find_parent(&self, target: NodeId) -> Option<NodeId> {
        let parent = self.arena.get(target)?.parent?;
        self.children(parent).contains(&target).then_some(parent)
    }

    /// First file named `name` in pre-order. Folders never match.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            if node.kind() == NodeKind::File && node.name == name {
                return Some(id);
            }
            stack.extend(node.children().iter().rev().copied());
        }
        None
    }

    /// Resolves a slash-separated path below the root, e.g. `src/lib`.
    pub fn find_by_path(&self, path: &str) -> Option<NodeId> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root, |level, segment| self.child_named(level, segment))
    }

    pub fn list_children(&self, id: NodeId) -> Vec<ChildEntry<'_>> {
        self.children(id)
            .iter()
            .filter_map(|&child| {
                let node = self.arena.get(child)?;
                Some(ChildEntry {
                    id: child,
                    name: &node.name,
                    kind: node.kind(),
                })
            })
            .collect()
    }

    pub fn snapshot(&self) -> TreeSnapshot {
        self.snapshot_node(self.root)
    }

    fn snapshot_node(&self, id: NodeId) -> TreeSnapshot {
        let node = &self.arena[id];
        match &node.body {
            NodeBody::File { language, .. } => TreeSnapshot {
                name: node.name.clone(),
                kind: NodeKind::File,
                language: language.map(LanguageId::language_id),
                children: None,
            },
            NodeBody::Folder { children } => TreeSnapshot {
                name: node.name.clone(),
                kind: NodeKind::Folder,
                language: None,
                children: Some(
                    children
                        .iter()
                        .map(|&child| self.snapshot_node(child))
                        .collect(),
                ),
            },
        }
    }
}

// ==================== 修改 ====================

impl FileTree {
    /// Folder a new entry lands in for the given hint: a folder hint is used
    /// as-is, a file hint resolves to its parent, anything else to the root.
    pub fn resolve_target_folder(&self, hint: Option<NodeId>) -> NodeId {
        let Some(hint) = hint else {
            return self.root;
        };
        match self.kind(hint) {
            Some(NodeKind::Folder) => hint,
            Some(NodeKind::File) => self.find_parent(hint).unwrap_or_else(|| {
                tracing::warn!("parent of selected file not found, falling back to root");
                self.root
            }),
            None => self.root,
        }
    }

    pub fn create_entry(
        &mut self,
        hint: Option<NodeId>,
        name: &str,
        kind: NodeKind,
    ) -> Result<NodeId, FileTreeError> {
        validate_name(name)?;
        let folder = self.resolve_target_folder(hint);
        if self.child_named(folder, name).is_some() {
            return Err(FileTreeError::DuplicateName {
                name: name.to_string(),
            });
        }

        let node = match kind {
            NodeKind::File => Node::new_file(
                name.to_string(),
                Some(folder),
                String::new(),
                Some(LanguageId::from_name(name)),
            ),
            NodeKind::Folder => Node::new_folder(name.to_string(), Some(folder)),
        };
        let id = self.attach(folder, node)?;
        tracing::debug!(name, ?kind, "entry created");
        Ok(id)
    }

    pub fn set_content(
        &mut self,
        id: NodeId,
        new_content: impl Into<String>,
    ) -> Result<(), FileTreeError> {
        let node = self.arena.get_mut(id).ok_or(FileTreeError::InvalidNodeId)?;
        match &mut node.body {
            NodeBody::File { content, .. } => {
                *content = new_content.into();
                Ok(())
            }
            NodeBody::Folder { .. } => Err(FileTreeError::NotAFile),
        }
    }

    /// Merges a flat file list under the root and returns how many items were
    /// applied, overwrites included. The active selection is cleared.
    pub fn bulk_import<I>(&mut self, files: I) -> usize
    where
        I: IntoIterator<Item = ImportedFile>,
    {
        self.selected = None;
        let mut applied = 0;
        for file in files {
            match self.import_one(&file) {
                Ok(()) => applied += 1,
                Err(reason) => {
                    tracing::warn!(path = %file.path, reason, "import item skipped");
                }
            }
        }
        applied
    }

    fn import_one(&mut self, file: &ImportedFile) -> Result<(), &'static str> {
        let mut segments: Vec<&str> = file.path.split('/').filter(|s| !s.is_empty()).collect();
        let Some(file_name) = segments.pop() else {
            return Err("empty path");
        };

        let mut level = self.root;
        for segment in segments {
            level = match self.child_named(level, segment) {
                Some(existing) if self.is_folder(existing) => existing,
                Some(_) => return Err("a file already uses a folder name on this path"),
                None => self
                    .attach(level, Node::new_folder(segment.to_string(), Some(level)))
                    .map_err(|_| "invalid folder")?,
            };
        }

        match self.child_named(level, file_name) {
            Some(existing) => self
                .set_content(existing, file.content.clone())
                .map_err(|_| "a folder already uses this file name"),
            None => {
                let node = Node::new_file(
                    file_name.to_string(),
                    Some(level),
                    file.content.clone(),
                    Some(LanguageId::from_name(file_name)),
                );
                self.attach(level, node).map(|_| ()).map_err(|_| "invalid folder")
            }
        }
    }

    /// Throws away every node and rebuilds from `template`. Ids handed out
    /// before the call stop resolving.
    pub fn replace_with(&mut self, template: &NodeTemplate) {
        self.arena.clear();
        self.selected = None;
        match template {
            NodeTemplate::Folder { name, children } => {
                self.root = self.arena.insert(Node::new_folder(name.clone(), None));
                for child in children {
                    self.insert_template(self.root, child);
                }
            }
            NodeTemplate::File { .. } => {
                self.root = self
                    .arena
                    .insert(Node::new_folder(DEFAULT_ROOT_NAME.to_string(), None));
                self.insert_template(self.root, template);
            }
        }
    }

    fn insert_template(&mut self, parent: NodeId, template: &NodeTemplate) {
        if self.child_named(parent, template.name()).is_some() {
            tracing::warn!(name = template.name(), "duplicate template entry skipped");
            return;
        }
        let node = match template {
            NodeTemplate::File {
                name,
                content,
                language,
            } => Node::new_file(
                name.clone(),
                Some(parent),
                content.clone(),
                language.or_else(|| Some(LanguageId::from_name(name))),
            ),
            NodeTemplate::Folder { name, .. } => Node::new_folder(name.clone(), Some(parent)),
        };
        let Ok(id) = self.attach(parent, node) else {
            return;
        };
        if let NodeTemplate::Folder { children, .. } = template {
            for child in children {
                self.insert_template(id, child);
            }
        }
    }

    fn attach(&mut self, parent: NodeId, node: Node) -> Result<NodeId, FileTreeError> {
        if !self.is_folder(parent) {
            return Err(FileTreeError::InvalidNodeId);
        }
        let id = self.arena.insert(node);
        if let Some(NodeBody::Folder { children }) = self.arena.get_mut(parent).map(|n| &mut n.body) {
            children.push(id);
            return Ok(id);
        }
        self.arena.remove(id);
        Err(FileTreeError::InvalidNodeId)
    }
}

fn validate_name(name: &str) -> Result<(), FileTreeError> {
    if name.is_empty() || name.contains('/') {
        return Err(FileTreeError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/models/file_tree.rs"]
mod tests;
