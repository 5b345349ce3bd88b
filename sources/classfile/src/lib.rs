//! Parsing, in-memory mutation and re-encoding of JVM class files.
//!
//! The representation is deliberately shallow: attribute payloads that the
//! patch engine never touches are kept as raw bytes so they round-trip
//! unchanged through a parse / encode cycle.

pub mod attributes;
pub mod bytes_ext;
pub mod classfile;
pub mod constants;
pub mod flags;
pub mod parser;
pub mod pool;
pub mod writer;
