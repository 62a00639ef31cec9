//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod cache;
pub(crate) mod render;

pub(crate) use build::BuildArgs;
pub(crate) use cache::CacheCommand;
pub(crate) use render::RenderArgs;
