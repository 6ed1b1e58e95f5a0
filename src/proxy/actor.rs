//! Background tasks owned by a running subprocess.
//!
//! # Components
//!
//! - `ResponseRouter`: Routes responses to pending requests via oneshot channels
//! - `Reader`: Background task that reads subprocess stdout and routes responses
//! - `Stderr`: Background task that drains subprocess stderr into the log

mod reader;
mod response_router;
mod stderr;

pub(crate) use reader::{ReaderTaskHandle, spawn_reader_task};
pub(crate) use response_router::{PendingGuard, ResponseRouter, RouteResult};
pub(crate) use stderr::{StderrTaskHandle, spawn_stderr_task};
