//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution. Each submodule documents the
//! semantics and intended usage of its resource(s).
//!
//! Overview
//! - `atlas` – serializable atlas manifests mapping frame keys to regions
//! - `loader` – bridge and channels for the background texture loader thread
//! - `renderconfig` – viewport and backend settings loaded from config.ini
//! - `texturestore` – base resources and texture bindings keyed by handle

pub mod atlas;
pub mod loader;
pub mod renderconfig;
pub mod texturestore;
