// Composer library - local crash recovery and crisis language detection

pub mod composer;
pub mod config;
#[cfg(feature = "runtime")]
pub mod config_io;
pub mod services;
