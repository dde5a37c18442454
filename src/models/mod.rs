//! 数据模型层

pub mod file_tree;

pub use file_tree::{
    ChildEntry, FileTree, FileTreeError, ImportedFile, Node, NodeId, NodeKind, NodeTemplate,
    TreeSnapshot, DEFAULT_ROOT_NAME,
};
