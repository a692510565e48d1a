//! Deferred texture binding resolution.
//!
//! Sprites constructed against a still-decoding texture binding wait in
//! `AwaitingLoad` with placeholder geometry. Instead of registering
//! callbacks on the binding, this system polls the store once per frame
//! and finalizes every sprite whose binding has loaded since. A sprite
//! that was despawned or rebound in the meantime is simply no longer in
//! that state, so nothing stale can fire.

use bevy_ecs::prelude::{Query, Res};

use crate::components::sprite::{BindingState, Sprite};
use crate::resources::texturestore::TextureStore;

/// Finalize geometry for sprites whose texture binding finished loading.
///
/// Each sprite transitions `AwaitingLoad` -> `Bound` at most once per
/// binding; already-bound sprites are left untouched. Sprites whose
/// binding failed to load stay in `AwaitingLoad` at the placeholder
/// extent.
pub fn resolve_pending_bindings(store: Res<TextureStore>, mut sprites: Query<&mut Sprite>) {
    for mut sprite in sprites.iter_mut() {
        if sprite.binding_state() != BindingState::AwaitingLoad {
            continue;
        }
        if let Some(frame) = store.frame_if_loaded(sprite.texture()) {
            log::debug!(
                "resolved sprite binding {:?} to {}x{}",
                sprite.texture(),
                frame.width,
                frame.height
            );
            sprite.apply_frame(frame);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Schedule, World};

    #[test]
    fn awaiting_sprites_resolve_once_the_base_loads() {
        let mut world = World::new();
        let mut store = TextureStore::new();
        let base = store.add_base_pending("hero.png");
        let handle = store.add_binding(base, None);

        let entity = world.spawn(Sprite::from_texture(&store, handle)).id();
        world.insert_resource(store);

        let mut schedule = Schedule::default();
        schedule.add_systems(resolve_pending_bindings);

        // Binding still pending: nothing happens.
        schedule.run(&mut world);
        let sprite = world.get::<Sprite>(entity).unwrap();
        assert_eq!(sprite.binding_state(), BindingState::AwaitingLoad);
        assert_eq!(sprite.width, 1.0);

        world
            .resource_mut::<TextureStore>()
            .complete_base(base, 80.0, 60.0);

        schedule.run(&mut world);
        let sprite = world.get::<Sprite>(entity).unwrap();
        assert_eq!(sprite.binding_state(), BindingState::Bound);
        assert_eq!(sprite.width, 80.0);
        assert_eq!(sprite.height, 60.0);
        assert!(sprite.pending_frame_update);
    }

    #[test]
    fn bound_sprites_are_not_touched_again() {
        let mut world = World::new();
        let mut store = TextureStore::new();
        let base = store.add_base_loaded(32.0, 32.0);
        let handle = store.add_binding(base, None);

        let entity = world.spawn(Sprite::from_texture(&store, handle)).id();
        world.insert_resource(store);

        // Pretend a renderer consumed the construction-time update.
        world
            .get_mut::<Sprite>(entity)
            .unwrap()
            .pending_frame_update = false;

        let mut schedule = Schedule::default();
        schedule.add_systems(resolve_pending_bindings);
        schedule.run(&mut world);

        let sprite = world.get::<Sprite>(entity).unwrap();
        assert!(!sprite.pending_frame_update);
    }

    #[test]
    fn failed_bindings_leave_sprites_awaiting() {
        let mut world = World::new();
        let mut store = TextureStore::new();
        let base = store.add_base_pending("broken.png");
        let handle = store.add_binding(base, None);
        store.fail_base(base, "decode error");

        let entity = world.spawn(Sprite::from_texture(&store, handle)).id();
        world.insert_resource(store);

        let mut schedule = Schedule::default();
        schedule.add_systems(resolve_pending_bindings);
        schedule.run(&mut world);

        let sprite = world.get::<Sprite>(entity).unwrap();
        assert_eq!(sprite.binding_state(), BindingState::AwaitingLoad);
        assert_eq!((sprite.width, sprite.height), (1.0, 1.0));
    }
}
