//! Compile recorded browser sessions into exact-replay action plans.
//!
//! A recorder extension posts one JSON event per interaction (task boundaries,
//! clicks, form submissions, field edits, history navigation). The
//! [`compiler`] turns such a stream into a flat list of executor actions, and
//! [`store`] / [`api`] handle getting events in and bundles out.

pub mod api;
pub mod compiler;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use compiler::{compile, compile_task, Compilation, SkippedEvent};
pub use error::{AppError, CompileError, SkipReason, StoreError};
pub use models::{Action, ActionPlan, RecordedEvent, ReplayBundle};
