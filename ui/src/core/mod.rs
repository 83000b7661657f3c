//! Platform-agnostic building blocks shared by the tool views.

pub mod config;
pub mod downsample;
pub mod fence;
pub mod format;
pub mod platform;
pub mod status;
pub mod timing;
pub mod trace;
