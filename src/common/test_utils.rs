//! Test helpers.
//!
//! Systems that use `Commands` enqueue structural changes; we call `world.flush()` after
//! running so queued commands are applied before assertions.

use std::time::Duration;

use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Insert a generic `Time` whose last delta is `dt` seconds.
pub fn insert_time_with_delta(world: &mut World, dt: f32) {
    let mut t = Time::<()>::default();
    t.advance_by(Duration::from_secs_f32(dt));
    world.insert_resource(t);
}

/// Collect every message of type `M` still buffered in the world.
pub fn read_messages<M>(world: &mut World) -> Vec<M>
where
    M: bevy::ecs::message::Message + Clone,
{
    run_system_once(world, |mut reader: bevy::ecs::message::MessageReader<M>| {
        reader.read().cloned().collect::<Vec<M>>()
    })
}
