//! Client-side services for the composer
//!
//! This module contains the two on-device services the composer talks to,
//! and the storage and clock seams they are built on.

pub mod crisis;
pub mod recovery;
pub mod storage;
pub mod time_source;
#[cfg(feature = "runtime")]
pub mod tracing_setup;
