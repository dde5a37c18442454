//! Services layer (ports + adapters).
//!
//! - `ports`: contracts and data types the kernel depends on.
//! - `adapters`: OS/runtime specific implementations (processes, HTTP, files).

pub mod adapters;
pub mod ports;
