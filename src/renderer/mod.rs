//! Renderer backend probing and selection.
//!
//! The backend decision is made exactly once at startup: the capability
//! probe checks whether an accelerated graphics context can be created,
//! and [`backend::select_renderer`] turns the verdict into a concrete
//! backend instance that the composition root threads through the rest of
//! the application. A context lost later is the accelerated backend's own
//! problem; the decision is never revisited.
//!
//! Submodules overview
//! - [`probe`] – failure-absorbing check for an accelerated context
//! - [`backend`] – backend sum type, selection, and per-frame sprite sync

pub mod backend;
pub mod probe;
