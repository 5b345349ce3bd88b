//! Post-compile injection of literal strings into compiled classes.
//!
//! A run takes a list of injections (a value plus one or more pointcuts),
//! locates the compiled class for each pointcut on the configured search
//! path, decides whether the targeted member is a field or a method, and
//! rewrites just that member's bound value before writing the class back
//! out. Everything is sequential and fail-fast: the first bad pointcut
//! aborts the run.

pub mod artifact;
pub mod classify;
pub mod config;
pub mod error;
pub mod locator;
pub mod pointcut;
pub mod run;
pub mod strategy;
pub mod writer;

pub use config::{Injection, StrategyKind};
pub use error::InjectError;
pub use run::{execute, RunConfig};
