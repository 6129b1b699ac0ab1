//! Encoder for the attributes of JVM class files
//!
//! See the [`jvm`] module for the attribute model and the writer which frames attributes into
//! their exact binary layout.

pub mod jvm;
mod util;
