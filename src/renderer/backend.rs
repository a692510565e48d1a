//! Renderer backends and one-time backend selection.
//!
//! Both backends are driven the same way each frame: `prepare_frame` walks
//! the world's sprites and consumes their sticky pending flags, refreshing
//! whatever the backend caches. The accelerated backend additionally
//! tracks which base resources have live GPU-side bindings, rebuilding one
//! when a sprite reports a base-resource change. Clearing the pending
//! flags happens here and nowhere else.
//!
//! Draw-call submission, batching, and shaders live in the concrete
//! renderer implementations downstream; this layer owns only the
//! sprite/resource synchronization they depend on.

use bevy_ecs::prelude::{Mut, World};
use log::{debug, info};
use rustc_hash::FxHashSet;

use crate::components::sprite::Sprite;
use crate::resources::texturestore::{BaseResourceId, TextureStore};

use super::probe::supports_accelerated;

const DEFAULT_VIEWPORT_WIDTH: u32 = 800;
const DEFAULT_VIEWPORT_HEIGHT: u32 = 600;

/// Which backend family a renderer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    Accelerated,
    Software,
}

/// Backend targeting an accelerated graphics context.
#[derive(Debug)]
pub struct AcceleratedRenderer {
    width: u32,
    height: u32,
    /// Base resources with a live GPU-side binding.
    uploaded: FxHashSet<BaseResourceId>,
    geometry_refreshes: u64,
}

impl AcceleratedRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        AcceleratedRenderer {
            width,
            height,
            uploaded: FxHashSet::default(),
            geometry_refreshes: 0,
        }
    }

    /// Number of base resources currently uploaded.
    pub fn uploaded_count(&self) -> usize {
        self.uploaded.len()
    }

    /// Number of sprite geometry refreshes performed so far.
    pub fn geometry_refreshes(&self) -> u64 {
        self.geometry_refreshes
    }

    fn sync_sprite(&mut self, store: &TextureStore, sprite: &mut Sprite) {
        let base = store.base_of(sprite.texture());

        if sprite.pending_base_change {
            // The sprite moved to a different image: drop the cached
            // binding so the upload below recreates it.
            if let Some(base) = base {
                self.uploaded.remove(&base);
            }
            sprite.pending_base_change = false;
        }

        if let Some(base) = base {
            if store.is_loaded(sprite.texture()) && self.uploaded.insert(base) {
                debug!("uploading base resource {:?}", base);
            }
        }

        if sprite.pending_frame_update {
            self.geometry_refreshes += 1;
            sprite.pending_frame_update = false;
        }
    }
}

/// Backend rasterizing on the CPU.
///
/// Caches no GPU state, so a base-resource change costs nothing here; the
/// flag is still consumed so it does not linger.
#[derive(Debug)]
pub struct SoftwareRenderer {
    width: u32,
    height: u32,
    geometry_refreshes: u64,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        SoftwareRenderer {
            width,
            height,
            geometry_refreshes: 0,
        }
    }

    /// Number of sprite geometry refreshes performed so far.
    pub fn geometry_refreshes(&self) -> u64 {
        self.geometry_refreshes
    }

    fn sync_sprite(&mut self, sprite: &mut Sprite) {
        sprite.pending_base_change = false;
        if sprite.pending_frame_update {
            self.geometry_refreshes += 1;
            sprite.pending_frame_update = false;
        }
    }
}

/// The backend chosen at startup.
///
/// Decided once by [`select_renderer`] and threaded explicitly through the
/// composition root.
#[derive(Debug)]
pub enum Renderer {
    Accelerated(AcceleratedRenderer),
    Software(SoftwareRenderer),
}

impl Renderer {
    pub fn kind(&self) -> RendererKind {
        match self {
            Renderer::Accelerated(_) => RendererKind::Accelerated,
            Renderer::Software(_) => RendererKind::Software,
        }
    }

    /// Viewport dimensions the backend was sized to.
    pub fn viewport(&self) -> (u32, u32) {
        match self {
            Renderer::Accelerated(r) => (r.width, r.height),
            Renderer::Software(r) => (r.width, r.height),
        }
    }

    /// Consume every renderable sprite's pending flags, refreshing the
    /// backend's cached state for the coming draw.
    pub fn prepare_frame(&mut self, world: &mut World) {
        world.resource_scope(|world, store: Mut<TextureStore>| {
            let mut sprites = world.query::<&mut Sprite>();
            for mut sprite in sprites.iter_mut(world) {
                if !sprite.renderable {
                    continue;
                }
                match self {
                    Renderer::Accelerated(r) => r.sync_sprite(&store, &mut sprite),
                    Renderer::Software(r) => r.sync_sprite(&mut sprite),
                }
            }
        });
    }
}

/// Select the renderer backend for this run.
///
/// Viewport dimensions default to 800x600 when unset or zero. The
/// capability probe runs once; a positive verdict yields the accelerated
/// backend, anything else the software fallback. Never raises.
pub fn select_renderer(width: Option<u32>, height: Option<u32>) -> Renderer {
    let width = width.filter(|w| *w > 0).unwrap_or(DEFAULT_VIEWPORT_WIDTH);
    let height = height.filter(|h| *h > 0).unwrap_or(DEFAULT_VIEWPORT_HEIGHT);

    let renderer = if supports_accelerated() {
        Renderer::Accelerated(AcceleratedRenderer::new(width, height))
    } else {
        Renderer::Software(SoftwareRenderer::new(width, height))
    };
    info!(
        "selected {:?} renderer at {}x{}",
        renderer.kind(),
        width,
        height
    );
    renderer
}
