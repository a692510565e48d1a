//! Ember Engine main entry point.
//!
//! The renderable layer of a 2D scene-graph engine written in Rust using:
//! - **bevy_ecs** for entity-component-system architecture
//! - **wgpu** for the accelerated-context capability probe
//! - **crossbeam-channel** for the background texture loader bridge
//!
//! This executable is the composition root: it selects the renderer
//! backend once at startup and runs a short headless demonstration of the
//! texture binding lifecycle (synchronous atlas bindings, asynchronous
//! image-location bindings, rebinds).
//!
//! # Project Structure
//!
//! - [`components`] – ECS components (the sprite entity)
//! - [`events`] – loader commands/messages and readiness notifications
//! - [`resources`] – ECS resources (texture store, loader bridge, config)
//! - [`systems`] – ECS systems (loader polling, binding resolution)
//! - [`renderer`] – capability probe and backend selection
//!
//! # Main Loop
//!
//! 1. Load configuration, parse CLI overrides, select the backend
//! 2. Build the ECS world, texture store, and loader thread
//! 3. Spawn demo sprites through the cache-key and image-location paths
//! 4. Each frame: pump loader messages, resolve pending bindings, let the
//!    backend consume the sprites' pending flags
//! 5. Shut the loader thread down on exit
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --width 1280 --height 720
//! ```

mod components;
mod events;
mod renderer;
mod resources;
mod systems;

use bevy_ecs::prelude::*;
use clap::Parser;
use glam::Vec2;

use crate::components::sprite::Sprite;
use crate::renderer::backend::{Renderer, SoftwareRenderer, select_renderer};
use crate::resources::atlas::{AtlasFrame, AtlasManifest};
use crate::resources::loader::{TextureLoader, setup_loader, shutdown_loader};
use crate::resources::renderconfig::RenderConfig;
use crate::resources::texturestore::TextureStore;
use crate::systems::binding::resolve_pending_bindings;
use crate::systems::loader::{
    apply_texture_messages, poll_texture_messages, update_texture_messages, update_texture_ready,
};

/// Ember Engine renderable layer
#[derive(Parser)]
#[command(version, about = "Ember Engine renderable layer demo")]
struct Cli {
    /// Viewport width in pixels (overrides config.ini).
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height in pixels (overrides config.ini).
    #[arg(long)]
    height: Option<u32>,

    /// Skip the capability probe and use the software backend.
    #[arg(long)]
    force_software: bool,

    /// Number of frames to simulate before exiting.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Image location to bind a sprite to through the asynchronous path.
    #[arg(long, default_value = "./assets/textures/title.png")]
    image: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // --------------- Configuration & backend selection ---------------
    let mut config = RenderConfig::new();
    config.load_from_file().ok(); // ignore errors, use defaults

    let width = cli.width.unwrap_or(config.viewport_width);
    let height = cli.height.unwrap_or(config.viewport_height);

    let mut renderer = if cli.force_software || config.force_software {
        log::info!("software backend forced, skipping capability probe");
        Renderer::Software(SoftwareRenderer::new(width, height))
    } else {
        select_renderer(Some(width), Some(height))
    };

    // --------------- ECS world + resources ---------------
    let mut world = World::new();
    world.insert_resource(config);
    setup_loader(&mut world);

    let mut tex_store = TextureStore::new();

    // The windowing layer upstream would hand us decoded atlases; stand in
    // for it with one synthetic 256x256 sheet.
    let sheet = tex_store.add_base_loaded(256.0, 256.0);
    let manifest = AtlasManifest {
        image: "demo-sheet".into(),
        frames: vec![
            AtlasFrame {
                key: "hero_idle".into(),
                x: 0.0,
                y: 0.0,
                width: 32.0,
                height: 48.0,
            },
            AtlasFrame {
                key: "hero_walk".into(),
                x: 32.0,
                y: 0.0,
                width: 32.0,
                height: 48.0,
            },
            AtlasFrame {
                key: "title_banner".into(),
                x: 0.0,
                y: 48.0,
                width: 256.0,
                height: 64.0,
            },
        ],
    };
    tex_store.register_atlas(sheet, &manifest);

    // Sprite bound synchronously through the cache.
    let hero = Sprite::from_cache_key(&tex_store, "hero_idle")
        .expect("demo atlas frame missing from store")
        .with_anchor(Vec2::new(0.5, 1.0));
    let hero_entity = world.spawn(hero).id();

    // Sprite bound asynchronously; starts at 1x1 until the decode lands
    // (or stays there if the file is absent).
    let loader = world.resource::<TextureLoader>();
    let splash = Sprite::from_image_location(&mut tex_store, loader, cli.image.clone());
    let splash_entity = world.spawn(splash).id();
    log::info!(
        "spawned splash sprite {:?} awaiting '{}'",
        splash_entity,
        cli.image
    );
    world.insert_resource(tex_store);

    // --------------- Schedule ---------------
    let mut update = Schedule::default();
    update.add_systems(
        // loader systems must be together
        (
            poll_texture_messages,
            update_texture_messages,
            apply_texture_messages,
            update_texture_ready,
            resolve_pending_bindings,
        )
            .chain(),
    );
    update
        .initialize(&mut world)
        .expect("Failed to initialize schedule");

    // --------------- Main loop ---------------
    for frame in 0..cli.frames {
        update.run(&mut world);
        renderer.prepare_frame(&mut world);
        world.clear_trackers();

        // Halfway through, swap the hero to its walk frame; same sheet, so
        // only the geometry is dirtied.
        if frame == cli.frames / 2 {
            world.resource_scope(|world, store: Mut<TextureStore>| {
                if let Some(mut sprite) = world.get_mut::<Sprite>(hero_entity) {
                    let walk = store.get("hero_walk").expect("demo atlas frame missing");
                    sprite.retexture(&store, walk);
                }
            });
        }

        std::thread::sleep(std::time::Duration::from_millis(16));
    }

    // --------------- Summary ---------------
    {
        let store = world.resource::<TextureStore>();
        log::info!(
            "simulated {} frames: {} base resources, {} bindings, viewport {:?} {:?}",
            cli.frames,
            store.base_count(),
            store.binding_count(),
            renderer.kind(),
            renderer.viewport()
        );
        let mut sprites = world.query::<&Sprite>();
        for sprite in sprites.iter(&world) {
            log::info!(
                "sprite {:?} {}x{} ({:?})",
                sprite.texture(),
                sprite.width,
                sprite.height,
                sprite.binding_state()
            );
        }
    }

    shutdown_loader(&mut world);
}
