//! Texture loader implementation backed by a dedicated thread.
//!
//! This module hosts the background loader thread and the systems that
//! bridge it with the ECS world:
//! - [`loader_thread`] runs on its own OS thread and processes
//!   [`DecodeCmd`](crate::events::texture::DecodeCmd) messages, emitting
//!   [`TextureMessage`](crate::events::texture::TextureMessage) responses.
//! - [`poll_texture_messages`] non-blockingly drains the loader thread's
//!   receiver into the ECS message queue each frame.
//! - [`update_texture_messages`] / [`update_texture_ready`] advance the
//!   mailboxes so newly written messages become readable.
//! - [`apply_texture_messages`] applies decode results to the
//!   [`TextureStore`], emitting one
//!   [`TextureReady`](crate::events::texture::TextureReady) per binding
//!   that became loaded.
//!
//! The loader probes image dimensions from the file header; the pixel
//! decode proper belongs to the image pipeline downstream of this crate,
//! which only needs the extent and a completion signal. All store mutation
//! happens here on the main thread, never on the loader thread.

use crate::events::texture::{DecodeCmd, TextureMessage, TextureReady};
use crate::resources::loader::TextureLoader;
use crate::resources::texturestore::TextureStore;
use bevy_ecs::prelude::Messages;
use bevy_ecs::prelude::{MessageReader, MessageWriter, Res, ResMut};
use crossbeam_channel::{Receiver, Sender};
use std::fs::File;
use std::io::Read;

/// Drain any pending messages from the loader thread and enqueue them into
/// the ECS [`Messages<TextureMessage>`] mailbox.
///
/// Non-blocking; intended to run each frame on the main thread.
pub fn poll_texture_messages(
    bridge: Res<TextureLoader>,
    mut writer: MessageWriter<TextureMessage>,
) {
    writer.write_batch(bridge.rx_msg.try_iter());
}

/// Advance the ECS message queue for [`TextureMessage`].
///
/// Run this after [`poll_texture_messages`] so messages written this frame
/// are visible to [`apply_texture_messages`] in the same frame.
pub fn update_texture_messages(mut msgs: ResMut<Messages<TextureMessage>>) {
    msgs.update();
}

/// Advance the ECS message queue for [`TextureReady`].
pub fn update_texture_ready(mut msgs: ResMut<Messages<TextureReady>>) {
    msgs.update();
}

/// Apply decode results to the texture store.
///
/// Completions finalize the base resource and announce every binding that
/// became loaded; failures mark the base as failed and are not retried.
pub fn apply_texture_messages(
    mut store: ResMut<TextureStore>,
    mut reader: MessageReader<TextureMessage>,
    mut ready: MessageWriter<TextureReady>,
) {
    for msg in reader.read() {
        match msg {
            TextureMessage::Decoded {
                base,
                width,
                height,
            } => {
                for texture in store.complete_base(*base, *width, *height) {
                    log::debug!("texture binding {:?} ready", texture);
                    ready.write(TextureReady { texture });
                }
            }
            TextureMessage::DecodeFailed { base, error } => {
                store.fail_base(*base, error);
            }
        }
    }
}

/// Entry point of the dedicated loader thread.
///
/// Blocks on the command channel, probing image dimensions for each decode
/// request and reporting the outcome. Exits on [`DecodeCmd::Shutdown`] or
/// when the command channel disconnects.
pub fn loader_thread(rx_cmd: Receiver<DecodeCmd>, tx_msg: Sender<TextureMessage>) {
    log::debug!(
        "texture loader thread starting (id={:?})",
        std::thread::current().id()
    );
    while let Ok(cmd) = rx_cmd.recv() {
        match cmd {
            DecodeCmd::Decode { base, location } => {
                let msg = match probe_image_dimensions(&location) {
                    Ok((width, height)) => {
                        log::info!("decoded '{}': {}x{}", location, width, height);
                        TextureMessage::Decoded {
                            base,
                            width,
                            height,
                        }
                    }
                    Err(error) => TextureMessage::DecodeFailed { base, error },
                };
                if tx_msg.send(msg).is_err() {
                    break;
                }
            }
            DecodeCmd::Shutdown => break,
        }
    }
    log::debug!("texture loader thread exiting");
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Read an image's pixel dimensions from its header.
///
/// PNG stores width and height big-endian in the IHDR chunk, which the
/// format requires to come first.
fn probe_image_dimensions(path: &str) -> Result<(f32, f32), String> {
    let mut file = File::open(path).map_err(|e| format!("{path}: {e}"))?;
    let mut header = [0u8; 24];
    file.read_exact(&mut header)
        .map_err(|e| format!("{path}: {e}"))?;

    if header[0..8] != PNG_SIGNATURE {
        return Err(format!("{path}: not a PNG file"));
    }
    if &header[12..16] != b"IHDR" {
        return Err(format!("{path}: missing IHDR chunk"));
    }
    let width = u32::from_be_bytes([header[16], header[17], header[18], header[19]]);
    let height = u32::from_be_bytes([header[20], header[21], header[22], header[23]]);
    if width == 0 || height == 0 {
        return Err(format!("{path}: degenerate image dimensions"));
    }
    Ok((width as f32, height as f32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_png_header(name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&PNG_SIGNATURE);
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        let mut file = File::create(&path).expect("create temp png");
        file.write_all(&bytes).expect("write temp png");
        path
    }

    #[test]
    fn probe_reads_png_dimensions() {
        let path = write_png_header("emberengine_probe_ok.png", 320, 200);
        let (width, height) = probe_image_dimensions(path.to_str().unwrap()).unwrap();
        assert_eq!((width, height), (320.0, 200.0));
    }

    #[test]
    fn probe_rejects_missing_file() {
        let err = probe_image_dimensions("/nonexistent/missing.png").unwrap_err();
        assert!(err.contains("missing.png"));
    }

    #[test]
    fn probe_rejects_non_png_data() {
        let path = std::env::temp_dir().join("emberengine_probe_bad.png");
        std::fs::write(&path, [0u8; 24]).expect("write temp file");
        let err = probe_image_dimensions(path.to_str().unwrap()).unwrap_err();
        assert!(err.contains("not a PNG file"));
    }
}
