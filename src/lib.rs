//! zagent - 虚拟工作区 + 终端 + Agent 会话核心库
//!
//! 模块结构：
//! - models: 数据模型（FileTree）
//! - kernel: 会话核心（命令解释、执行桥、chat 契约、Agent 状态）
//! - kernel::services: ports（契约）与 adapters（Python 进程、Gemini、配置）

pub mod kernel;
pub mod models;

#[cfg(test)]
#[path = "../tests/unit/support.rs"]
pub(crate) mod test_support;
