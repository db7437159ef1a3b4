//! Runtime surface: evaluation cycle, timer trigger and HTTP API

pub mod http;
pub mod runtime;
pub mod scheduler;

pub use http::*;
pub use runtime::*;
pub use scheduler::*;
