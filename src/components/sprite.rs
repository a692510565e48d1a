//! Sprite component: a textured display entity.
//!
//! A sprite is bound to exactly one texture binding at a time and mirrors
//! that binding's frame extent in `width`/`height`. Construction against a
//! binding whose base resource is still decoding leaves the sprite at the
//! 1x1 placeholder in the `AwaitingLoad` state; the
//! [`resolve_pending_bindings`](crate::systems::binding::resolve_pending_bindings)
//! system finalizes its geometry once the binding loads. There is no
//! callback registration to leak: the sprite's own state is the pending
//! obligation, and despawning or rebinding the sprite releases it.
//!
//! The `pending_*` flags are sticky change markers for a renderer backend.
//! This component only ever sets them; clearing them is the renderer's job
//! (see [`crate::renderer::backend`]).

use bevy_ecs::prelude::Component;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::resources::loader::TextureLoader;
use crate::resources::texturestore::{Frame, MissingResourceError, TextureHandle, TextureStore};

/// Blend mode applied when compositing a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Screen,
}

/// Relationship between a sprite and its current texture binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    /// The binding's base resource has not loaded; geometry is the 1x1
    /// placeholder.
    AwaitingLoad,
    /// Geometry is synchronized with the binding's frame.
    Bound,
}

/// A textured display entity.
///
/// `width`/`height` track the bound texture's frame and must not be edited
/// independently; rebind with [`Sprite::retexture`] instead. The anchor is
/// an origin offset in the unit range interpreted by the renderer, never
/// applied here.
#[derive(Component, Clone, Debug)]
pub struct Sprite {
    /// Origin offset in the unit range. (0,0) is the top-left corner,
    /// (0.5,0.5) the center, (1,1) the bottom-right corner.
    pub anchor: Vec2,
    /// Width in pixels, mirroring the bound frame once resolved.
    pub width: f32,
    /// Height in pixels, mirroring the bound frame once resolved.
    pub height: f32,
    /// Blend mode consumed by the renderer.
    pub blend_mode: BlendMode,
    /// Geometry changed since a renderer last consumed it.
    pub pending_frame_update: bool,
    /// The underlying base resource changed on the last rebind, so
    /// renderer-side cached resource bindings must be rebuilt, not just
    /// frame coordinates. Never set by construction.
    pub pending_base_change: bool,
    /// Visibility flag interpreted by the owning scene graph.
    pub renderable: bool,
    texture: TextureHandle,
    binding: BindingState,
}

impl Sprite {
    /// Construct a sprite bound to `texture`.
    ///
    /// If the binding is already loaded the geometry is final on return and
    /// `pending_frame_update` is set. Otherwise the sprite starts at 1x1 in
    /// `AwaitingLoad` and is finalized by the binding-resolution system.
    pub fn from_texture(store: &TextureStore, texture: TextureHandle) -> Self {
        let mut sprite = Sprite {
            anchor: Vec2::ZERO,
            width: 1.0,
            height: 1.0,
            blend_mode: BlendMode::default(),
            pending_frame_update: false,
            pending_base_change: false,
            renderable: true,
            texture,
            binding: BindingState::AwaitingLoad,
        };
        if let Some(frame) = store.frame_if_loaded(texture) {
            sprite.apply_frame(frame);
        }
        sprite
    }

    /// Construct a sprite from a binding registered in the store under
    /// `key`.
    ///
    /// Fails with [`MissingResourceError`] when the key is absent; on
    /// success the sprite is bound to exactly the cached binding.
    pub fn from_cache_key(
        store: &TextureStore,
        key: impl AsRef<str>,
    ) -> Result<Self, MissingResourceError> {
        let texture = store.lookup(key)?;
        Ok(Self::from_texture(store, texture))
    }

    /// Construct a sprite for an image location, resolving or lazily
    /// creating its binding and queueing a decode if it was not cached.
    ///
    /// Never fails synchronously; a decode failure surfaces through the
    /// loader's message channel and leaves the sprite awaiting load.
    pub fn from_image_location(
        store: &mut TextureStore,
        loader: &TextureLoader,
        location: impl Into<String>,
    ) -> Self {
        let texture = store.resolve_location(loader, location);
        Self::from_texture(store, texture)
    }

    /// Rebind the sprite to another texture binding.
    ///
    /// A rebind is always a geometry-touching event: the frame extent is
    /// copied synchronously and `pending_frame_update` is set even when the
    /// binding is unchanged. `pending_base_change` is additionally set when
    /// the new binding sits on a different base resource.
    ///
    /// The new binding must already be loaded; rebinding to a pending
    /// binding copies its placeholder extent, which is not meaningful
    /// geometry. Rebinding while awaiting load abandons the pending
    /// resolution.
    pub fn retexture(&mut self, store: &TextureStore, texture: TextureHandle) {
        if store.base_of(texture) != store.base_of(self.texture) {
            self.pending_base_change = true;
        }
        self.texture = texture;
        let frame = store.frame(texture);
        self.width = frame.width;
        self.height = frame.height;
        self.pending_frame_update = true;
        self.binding = BindingState::Bound;
    }

    /// The currently bound texture binding.
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Current binding relationship.
    pub fn binding_state(&self) -> BindingState {
        self.binding
    }

    pub fn with_anchor(mut self, anchor: Vec2) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }

    /// Adopt a now-final frame extent, marking the geometry dirty.
    pub(crate) fn apply_frame(&mut self, frame: Frame) {
        self.width = frame.width;
        self.height = frame.height;
        self.pending_frame_update = true;
        self.binding = BindingState::Bound;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_loaded(width: f32, height: f32) -> (TextureStore, TextureHandle) {
        let mut store = TextureStore::new();
        let base = store.add_base_loaded(width, height);
        let handle = store.add_binding(base, None);
        (store, handle)
    }

    #[test]
    fn construct_with_loaded_binding_is_immediately_sized() {
        let (store, handle) = store_with_loaded(48.0, 64.0);
        let sprite = Sprite::from_texture(&store, handle);

        assert_eq!(sprite.width, 48.0);
        assert_eq!(sprite.height, 64.0);
        assert!(sprite.pending_frame_update);
        assert!(!sprite.pending_base_change);
        assert!(sprite.renderable);
        assert_eq!(sprite.binding_state(), BindingState::Bound);
    }

    #[test]
    fn construct_with_pending_binding_starts_at_placeholder() {
        let mut store = TextureStore::new();
        let base = store.add_base_pending("hero.png");
        let handle = store.add_binding(base, None);

        let sprite = Sprite::from_texture(&store, handle);

        assert_eq!(sprite.width, 1.0);
        assert_eq!(sprite.height, 1.0);
        assert!(!sprite.pending_frame_update);
        assert_eq!(sprite.binding_state(), BindingState::AwaitingLoad);
    }

    #[test]
    fn retexture_same_base_keeps_base_change_clear() {
        let mut store = TextureStore::new();
        let base = store.add_base_loaded(256.0, 256.0);
        let a = store.add_binding(base, Some(Frame::new(16.0, 16.0)));
        let b = store.add_binding(base, Some(Frame::new(32.0, 24.0)));

        let mut sprite = Sprite::from_texture(&store, a);
        sprite.pending_frame_update = false;
        sprite.retexture(&store, b);

        assert_eq!(sprite.width, 32.0);
        assert_eq!(sprite.height, 24.0);
        assert!(sprite.pending_frame_update);
        assert!(!sprite.pending_base_change);
    }

    #[test]
    fn retexture_different_base_sets_base_change() {
        let mut store = TextureStore::new();
        let first = store.add_base_loaded(32.0, 32.0);
        let second = store.add_base_loaded(64.0, 64.0);
        let a = store.add_binding(first, None);
        let b = store.add_binding(second, None);

        let mut sprite = Sprite::from_texture(&store, a);
        sprite.retexture(&store, b);

        assert!(sprite.pending_base_change);
        assert_eq!(sprite.texture(), b);
        assert_eq!(sprite.width, 64.0);
    }

    #[test]
    fn retexture_to_current_binding_still_touches_geometry() {
        let (store, handle) = store_with_loaded(48.0, 64.0);
        let mut sprite = Sprite::from_texture(&store, handle);
        sprite.pending_frame_update = false;

        sprite.retexture(&store, handle);

        assert_eq!(sprite.width, 48.0);
        assert_eq!(sprite.height, 64.0);
        assert!(sprite.pending_frame_update);
        assert!(!sprite.pending_base_change);
    }

    #[test]
    fn base_change_is_sticky_across_further_rebinds() {
        let mut store = TextureStore::new();
        let first = store.add_base_loaded(32.0, 32.0);
        let second = store.add_base_loaded(64.0, 64.0);
        let a = store.add_binding(first, None);
        let b = store.add_binding(second, None);

        let mut sprite = Sprite::from_texture(&store, a);
        sprite.retexture(&store, b);
        assert!(sprite.pending_base_change);

        // Only a renderer clears the flag; a same-base rebind leaves it.
        let b2 = store.add_binding(second, Some(Frame::new(8.0, 8.0)));
        sprite.retexture(&store, b2);
        assert!(sprite.pending_base_change);
    }

    #[test]
    fn from_cache_key_binds_the_cached_binding() {
        let (mut store, handle) = store_with_loaded(20.0, 30.0);
        store.insert_key("hero", handle);

        let sprite = Sprite::from_cache_key(&store, "hero").unwrap();
        assert_eq!(sprite.texture(), handle);
        assert_eq!(sprite.width, 20.0);

        let err = Sprite::from_cache_key(&store, "villain").unwrap_err();
        assert_eq!(err.key, "villain");
    }
}
