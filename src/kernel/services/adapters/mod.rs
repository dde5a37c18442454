//! Service adapters: OS/runtime specific implementations (IO/async).

pub mod gemini;
pub mod import;
pub mod paths;
pub mod python;
pub mod settings;

pub use gemini::GeminiClient;
pub use import::{read_directory, should_ignore};
pub use paths::{ensure_log_dir, ensure_scratch_dir, get_log_dir, get_scratch_dir};
pub use python::{ProcessBridge, ScratchFs};
pub use settings::{ensure_settings_file, get_settings_path, load_settings, load_settings_from};
