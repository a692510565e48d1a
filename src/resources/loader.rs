//! ECS resources that bridge the main thread with the background texture
//! loader thread.
//!
//! Use [`setup_loader`] once during initialization to spawn the loader
//! thread and insert the [`TextureLoader`] bridge plus the message
//! mailboxes. Call [`shutdown_loader`] during teardown to stop the thread
//! and join it.

use crate::events::texture::{DecodeCmd, TextureMessage, TextureReady};
use crate::resources::texturestore::BaseResourceId;
use crate::systems::loader::loader_thread;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};

/// Shared bridge between the ECS world and the loader thread.
///
/// This resource is created by [`setup_loader`]. Decode requests go out via
/// [`TextureLoader::request_decode`]; results come back on
/// [`TextureLoader::rx_msg`] and are drained into the ECS mailbox by
/// [`poll_texture_messages`](crate::systems::loader::poll_texture_messages).
#[derive(Resource)]
pub struct TextureLoader {
    /// Sender for [`DecodeCmd`] messages (ECS -> loader thread).
    pub tx_cmd: Sender<DecodeCmd>,
    /// Receiver for [`TextureMessage`] messages (loader thread -> ECS).
    pub rx_msg: Receiver<TextureMessage>,
    /// Join handle for the background loader thread.
    pub handle: std::thread::JoinHandle<()>,
}

impl TextureLoader {
    /// Queue an asynchronous decode for a base resource.
    ///
    /// Send errors are ignored; they only occur during shutdown.
    pub fn request_decode(&self, base: BaseResourceId, location: impl Into<String>) {
        let _ = self.tx_cmd.send(DecodeCmd::Decode {
            base,
            location: location.into(),
        });
    }
}

/// Spawn the loader thread and register bridge resources.
///
/// This function:
/// - Creates command/message channels.
/// - Spawns the background thread running [`loader_thread`].
/// - Inserts [`TextureLoader`] and initializes the
///   `Messages<TextureMessage>` / `Messages<TextureReady>` mailboxes.
pub fn setup_loader(world: &mut World) {
    let (tx_cmd, rx_cmd) = unbounded::<DecodeCmd>();
    let (tx_msg, rx_msg) = unbounded::<TextureMessage>();

    let handle = std::thread::spawn(move || loader_thread(rx_cmd, tx_msg));

    world.insert_resource(TextureLoader {
        tx_cmd,
        rx_msg,
        handle,
    });
    world.insert_resource(Messages::<TextureMessage>::default());
    world.insert_resource(Messages::<TextureReady>::default());
}

/// Gracefully request shutdown of the loader thread and join it.
///
/// If the bridge resource exists, sends [`DecodeCmd::Shutdown`], waits for
/// the thread to exit, and removes the resource from the world.
pub fn shutdown_loader(world: &mut World) {
    if let Some(bridge) = world.remove_resource::<TextureLoader>() {
        let _ = bridge.tx_cmd.send(DecodeCmd::Shutdown);
        let _ = bridge.handle.join();
    }
}
