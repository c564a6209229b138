//! Core building blocks: the `RenderJob` aggregate, option compilation and the
//! serializable job description. These are consumed by the high-level `api` module.
pub mod command;
pub mod job;
pub mod params;
