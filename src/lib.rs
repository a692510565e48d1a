//! Ember Engine renderable layer.
//!
//! This module exposes the engine's ECS components, resources, systems, and
//! renderer backends for use in integration tests and as a reusable library.

pub mod components;
pub mod events;
pub mod renderer;
pub mod resources;
pub mod systems;
