//! Copies world queries into the presenter's scene snapshot.

use glam::Vec2;
use yogo_rendering::{Hud, Scene, SceneBuilding, ScenePlayer, SceneProjectile};
use yogo_world::{query, World};

/// Overwrites `scene` with the current state of `world`.
///
/// Buffers are reused so the per-frame refresh does not allocate once the
/// scene has grown to its working size.
pub(crate) fn refresh(world: &World, scene: &mut Scene) {
    let player = query::player(world);
    scene.player = ScenePlayer {
        position: player.position,
        altitude: player.altitude,
        heading: player.heading,
    };

    let objective = query::objective(world);
    scene.objective = Some(Vec2::new(objective.x as f32, objective.y as f32));

    scene.buildings.clear();
    scene
        .buildings
        .extend(query::buildings(world).iter().map(|building| SceneBuilding {
            min: Vec2::new(building.x, building.y),
            max: Vec2::new(building.x_end, building.y_end),
            height: building.height,
        }));

    scene.enemies.clear();
    scene
        .enemies
        .extend(query::enemy_view(world).iter().map(|enemy| enemy.position));

    scene.projectiles.clear();
    scene
        .projectiles
        .extend(
            query::projectile_view(world)
                .iter()
                .map(|projectile| SceneProjectile {
                    position: projectile.position,
                    alive_time: projectile.alive_time,
                }),
        );

    let metrics = query::run_metrics(world);
    scene.elapsed = metrics.elapsed.as_secs_f32();
    scene.hud = Hud {
        score: metrics.score,
        seed: metrics.active_seed,
    };
}
