//! Texture store: base resources, texture bindings, and cache keys.
//!
//! The store owns every decoded (or still-decoding) image as a *base
//! resource* and every rectangular view onto one as a *texture binding*.
//! Entities never hold references into the store; they hold copyable
//! [`TextureHandle`]s, so the store can be mutated by the loading pipeline
//! while any number of sprites point at the same binding.
//!
//! Load-state transitions are one-way: a base resource goes from `Pending`
//! to `Loaded` (via [`TextureStore::complete_base`]) or to `Failed` (via
//! [`TextureStore::fail_base`]) exactly once, and stays there.

use bevy_ecs::prelude::Resource;
use log::{info, warn};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::resources::atlas::AtlasManifest;
use crate::resources::loader::TextureLoader;

/// Raised when a cache-key lookup finds no registered texture binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no texture binding registered for cache key '{key}'")]
pub struct MissingResourceError {
    /// The key that missed.
    pub key: String,
}

/// Visible extent of a texture binding, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
}

impl Frame {
    /// Placeholder extent used before a binding's base resource has loaded.
    pub const UNIT: Frame = Frame {
        width: 1.0,
        height: 1.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Frame { width, height }
    }
}

/// Identity of one underlying image. Two bindings with the same id share
/// pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaseResourceId(u32);

/// Lightweight handle to a texture binding inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

/// Load state of a base resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Decode requested but not finished; dimensions unknown.
    #[default]
    Pending,
    /// Pixel data available; dimensions final.
    Loaded,
    /// Decode failed; dependent bindings will never resolve.
    Failed,
}

#[derive(Debug)]
struct BaseResource {
    /// Source location for asynchronously decoded images, for diagnostics.
    location: Option<String>,
    state: LoadState,
    width: f32,
    height: f32,
}

#[derive(Debug)]
struct Binding {
    base: BaseResourceId,
    frame: Frame,
    /// Explicit frames (atlas sub-regions) keep their extent when the base
    /// loads; implicit ones are finalized to the full image extent.
    explicit_frame: bool,
}

/// Registry of base resources and texture bindings, with string cache keys.
///
/// Insert as an ECS resource; sprites and the loader systems look bindings
/// up by handle. Handles are arena indices and stay valid for the life of
/// the store (nothing is ever evicted).
#[derive(Resource, Debug, Default)]
pub struct TextureStore {
    bases: Vec<BaseResource>,
    bindings: Vec<Binding>,
    keys: FxHashMap<String, TextureHandle>,
    locations: FxHashMap<String, TextureHandle>,
}

impl TextureStore {
    /// Create an empty store.
    pub fn new() -> Self {
        TextureStore::default()
    }

    /// Register a base resource whose pixel data is already available.
    pub fn add_base_loaded(&mut self, width: f32, height: f32) -> BaseResourceId {
        let id = BaseResourceId(self.bases.len() as u32);
        self.bases.push(BaseResource {
            location: None,
            state: LoadState::Loaded,
            width,
            height,
        });
        id
    }

    /// Register a base resource that is still decoding.
    pub fn add_base_pending(&mut self, location: impl Into<String>) -> BaseResourceId {
        let id = BaseResourceId(self.bases.len() as u32);
        self.bases.push(BaseResource {
            location: Some(location.into()),
            state: LoadState::Pending,
            width: 0.0,
            height: 0.0,
        });
        id
    }

    /// Create a texture binding onto `base`.
    ///
    /// With `Some(frame)` the binding is an explicit sub-region (its extent
    /// is final). With `None` the binding covers the whole image: if the
    /// base is already loaded the extent is taken from it now, otherwise it
    /// stays at the placeholder until [`complete_base`](Self::complete_base).
    pub fn add_binding(&mut self, base: BaseResourceId, frame: Option<Frame>) -> TextureHandle {
        let handle = TextureHandle(self.bindings.len() as u32);
        let binding = match frame {
            Some(frame) => Binding {
                base,
                frame,
                explicit_frame: true,
            },
            None => {
                let frame = match self.bases.get(base.0 as usize) {
                    Some(entry) if entry.state == LoadState::Loaded => {
                        Frame::new(entry.width, entry.height)
                    }
                    _ => Frame::UNIT,
                };
                Binding {
                    base,
                    frame,
                    explicit_frame: false,
                }
            }
        };
        self.bindings.push(binding);
        handle
    }

    /// Register a cache key for a binding.
    pub fn insert_key(&mut self, key: impl Into<String>, handle: TextureHandle) {
        self.keys.insert(key.into(), handle);
    }

    /// Get a binding by cache key, if present.
    pub fn get(&self, key: impl AsRef<str>) -> Option<TextureHandle> {
        self.keys.get(key.as_ref()).copied()
    }

    /// Get a binding by cache key, failing with the offending key.
    pub fn lookup(&self, key: impl AsRef<str>) -> Result<TextureHandle, MissingResourceError> {
        let key = key.as_ref();
        self.get(key).ok_or_else(|| MissingResourceError {
            key: key.to_string(),
        })
    }

    /// Resolve or lazily create the whole-image binding for an image
    /// location, queueing an asynchronous decode on first sight.
    ///
    /// Repeated calls with the same location return the same handle. The
    /// location doubles as a cache key, so [`lookup`](Self::lookup) finds
    /// it too. This path never fails synchronously; a decode failure is
    /// reported later through the loader's message channel.
    pub fn resolve_location(
        &mut self,
        loader: &TextureLoader,
        location: impl Into<String>,
    ) -> TextureHandle {
        let location = location.into();
        if let Some(&handle) = self.locations.get(&location) {
            return handle;
        }
        let base = self.add_base_pending(location.clone());
        let handle = self.add_binding(base, None);
        self.locations.insert(location.clone(), handle);
        self.keys.insert(location.clone(), handle);
        loader.request_decode(base, location);
        handle
    }

    /// Register one explicit-frame binding per manifest entry, all sharing
    /// `base`, each reachable under its frame key.
    ///
    /// Returns the number of bindings created.
    pub fn register_atlas(&mut self, base: BaseResourceId, manifest: &AtlasManifest) -> usize {
        for frame in &manifest.frames {
            let handle = self.add_binding(base, Some(Frame::new(frame.width, frame.height)));
            self.insert_key(frame.key.clone(), handle);
        }
        info!(
            "registered {} atlas frames for '{}'",
            manifest.frames.len(),
            manifest.image
        );
        manifest.frames.len()
    }

    /// Whether the binding's base resource has finished loading.
    pub fn is_loaded(&self, handle: TextureHandle) -> bool {
        self.frame_if_loaded(handle).is_some()
    }

    /// The binding's current extent.
    ///
    /// For a binding whose base has not loaded this is the placeholder
    /// extent, which is not meaningful geometry.
    pub fn frame(&self, handle: TextureHandle) -> Frame {
        match self.bindings.get(handle.0 as usize) {
            Some(binding) => binding.frame,
            None => {
                warn!("frame queried for unknown texture handle {:?}", handle);
                Frame::UNIT
            }
        }
    }

    /// The binding's extent, but only once its base resource has loaded.
    pub fn frame_if_loaded(&self, handle: TextureHandle) -> Option<Frame> {
        let binding = self.bindings.get(handle.0 as usize)?;
        let base = self.bases.get(binding.base.0 as usize)?;
        (base.state == LoadState::Loaded).then_some(binding.frame)
    }

    /// Identity of the image underlying a binding.
    pub fn base_of(&self, handle: TextureHandle) -> Option<BaseResourceId> {
        self.bindings.get(handle.0 as usize).map(|b| b.base)
    }

    /// Load state of a base resource.
    pub fn base_state(&self, base: BaseResourceId) -> LoadState {
        self.bases
            .get(base.0 as usize)
            .map(|b| b.state)
            .unwrap_or_default()
    }

    /// Finalize a pending base resource with its decoded dimensions.
    ///
    /// Whole-image bindings onto it take the full extent; explicit atlas
    /// frames are left untouched. Returns the handles of every binding
    /// that became loaded, so callers can notify their consumers. Calling
    /// this on a base that is not `Pending` is a no-op (the transition is
    /// terminal).
    pub fn complete_base(
        &mut self,
        base: BaseResourceId,
        width: f32,
        height: f32,
    ) -> Vec<TextureHandle> {
        let Some(entry) = self.bases.get_mut(base.0 as usize) else {
            warn!("load completion for unknown base resource {:?}", base);
            return Vec::new();
        };
        if entry.state != LoadState::Pending {
            return Vec::new();
        }
        entry.state = LoadState::Loaded;
        entry.width = width;
        entry.height = height;

        let mut ready = Vec::new();
        for (index, binding) in self.bindings.iter_mut().enumerate() {
            if binding.base != base {
                continue;
            }
            if !binding.explicit_frame {
                binding.frame = Frame::new(width, height);
            }
            ready.push(TextureHandle(index as u32));
        }
        ready
    }

    /// Mark a pending base resource as failed.
    ///
    /// Bindings onto it keep their placeholder extent and never resolve;
    /// sprites bound to them stay at 1x1. Not retried.
    pub fn fail_base(&mut self, base: BaseResourceId, error: &str) {
        let Some(entry) = self.bases.get_mut(base.0 as usize) else {
            warn!("load failure for unknown base resource {:?}", base);
            return;
        };
        if entry.state != LoadState::Pending {
            return;
        }
        entry.state = LoadState::Failed;
        warn!(
            "base resource {:?} ({}) failed to load: {}",
            base,
            entry.location.as_deref().unwrap_or("<memory>"),
            error
        );
    }

    /// Number of registered base resources.
    pub fn base_count(&self) -> usize {
        self.bases.len()
    }

    /// Number of registered texture bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_missing_key_carries_the_key() {
        let store = TextureStore::new();
        let err = store.lookup("nonexistent").unwrap_err();
        assert_eq!(err.key, "nonexistent");
    }

    #[test]
    fn lookup_present_key_returns_the_registered_handle() {
        let mut store = TextureStore::new();
        let base = store.add_base_loaded(64.0, 32.0);
        let handle = store.add_binding(base, None);
        store.insert_key("hero", handle);

        assert_eq!(store.lookup("hero").unwrap(), handle);
    }

    #[test]
    fn binding_on_loaded_base_takes_full_extent() {
        let mut store = TextureStore::new();
        let base = store.add_base_loaded(128.0, 96.0);
        let handle = store.add_binding(base, None);

        assert!(store.is_loaded(handle));
        assert_eq!(store.frame(handle), Frame::new(128.0, 96.0));
    }

    #[test]
    fn binding_on_pending_base_keeps_placeholder_until_completion() {
        let mut store = TextureStore::new();
        let base = store.add_base_pending("hero.png");
        let handle = store.add_binding(base, None);

        assert!(!store.is_loaded(handle));
        assert_eq!(store.frame(handle), Frame::UNIT);

        let ready = store.complete_base(base, 40.0, 56.0);
        assert_eq!(ready, vec![handle]);
        assert!(store.is_loaded(handle));
        assert_eq!(store.frame(handle), Frame::new(40.0, 56.0));
    }

    #[test]
    fn complete_base_preserves_explicit_frames() {
        let mut store = TextureStore::new();
        let base = store.add_base_pending("sheet.png");
        let sub = store.add_binding(base, Some(Frame::new(16.0, 16.0)));

        store.complete_base(base, 256.0, 256.0);

        assert!(store.is_loaded(sub));
        assert_eq!(store.frame(sub), Frame::new(16.0, 16.0));
    }

    #[test]
    fn complete_base_is_terminal() {
        let mut store = TextureStore::new();
        let base = store.add_base_pending("hero.png");
        let handle = store.add_binding(base, None);

        let first = store.complete_base(base, 40.0, 56.0);
        assert_eq!(first.len(), 1);

        // A second completion must not fire again or alter the extent.
        let second = store.complete_base(base, 999.0, 999.0);
        assert!(second.is_empty());
        assert_eq!(store.frame(handle), Frame::new(40.0, 56.0));
    }

    #[test]
    fn fail_base_never_resolves_bindings() {
        let mut store = TextureStore::new();
        let base = store.add_base_pending("broken.png");
        let handle = store.add_binding(base, None);

        store.fail_base(base, "truncated file");

        assert_eq!(store.base_state(base), LoadState::Failed);
        assert!(!store.is_loaded(handle));
        assert_eq!(store.frame(handle), Frame::UNIT);

        // Failure is terminal too; a late completion is ignored.
        assert!(store.complete_base(base, 10.0, 10.0).is_empty());
        assert!(!store.is_loaded(handle));
    }

    #[test]
    fn bindings_can_share_a_base_resource() {
        let mut store = TextureStore::new();
        let base = store.add_base_loaded(256.0, 256.0);
        let a = store.add_binding(base, Some(Frame::new(16.0, 16.0)));
        let b = store.add_binding(base, Some(Frame::new(32.0, 32.0)));

        assert_eq!(store.base_of(a), store.base_of(b));
        assert_ne!(a, b);
    }
}
