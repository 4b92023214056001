//! # campusbell-worker
//!
//! The dispatcher side of the notification queue. [`Dispatcher::tick`]
//! claims a bounded batch of due jobs and delivers each one;
//! [`WorkerRunner`] drives ticks on an interval until shutdown.
//!
//! Several processes may run a dispatcher against the same database: the
//! conditional claim in the queue store guarantees each job has exactly one
//! owner at a time.

pub mod dispatcher;
pub mod queue;
pub mod runner;

pub use dispatcher::{Dispatcher, JobOutcome, TickSummary};
pub use queue::DispatchQueue;
pub use runner::WorkerRunner;
