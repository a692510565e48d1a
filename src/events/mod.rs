//! Event and message types used by the engine.
//!
//! This module groups the messages exchanged across systems and with the
//! background loader thread. Messages provide a decoupled way for systems
//! to communicate without direct dependencies.
//!
//! Submodules:
//! - [`texture`] – commands and messages for the background texture loader

pub mod texture;
