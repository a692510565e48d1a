//! Commands and messages for the background texture loader thread.

use bevy_ecs::message::Message;

use crate::resources::texturestore::{BaseResourceId, TextureHandle};

/// Commands sent *to* the loader thread
#[derive(Debug, Clone)]
pub enum DecodeCmd {
    Decode {
        base: BaseResourceId,
        location: String,
    },
    Shutdown,
}

/// Messages sent *back* from the loader thread
#[derive(Message, Debug, Clone)]
pub enum TextureMessage {
    Decoded {
        base: BaseResourceId,
        width: f32,
        height: f32,
    },
    DecodeFailed {
        base: BaseResourceId,
        error: String,
    },
}

/// In-world notification that a texture binding finished loading.
///
/// Written once per binding when its base resource completes, by
/// [`apply_texture_messages`](crate::systems::loader::apply_texture_messages).
#[derive(Message, Debug, Clone)]
pub struct TextureReady {
    pub texture: TextureHandle,
}
