//! ECS components for entities.
//!
//! This module groups the component types that can be attached to entities
//! in the scene world.
//!
//! Submodules overview:
//! - [`sprite`] – textured display entity with deferred texture binding

pub mod sprite;
