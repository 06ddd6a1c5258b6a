//! Translates scene snapshots into backend-agnostic draw commands.

use glam::{Vec2, Vec3};
use yogo_core::{GRID_HALF_EXTENT, LEVEL_DURATION, MIN_ALTITUDE};

use crate::{Color, DrawCommand, Scene};

const GRID_PLANE: f32 = -0.1;
const OBJECTIVE_PLANE: f32 = -0.01;
const RING_PLANE: f32 = 0.01;
const GRID_BRIGHTNESS: f32 = 5.0;
const OBJECTIVE_HALF_EXTENT: f32 = 1.0;
const AVATAR_HALF_EXTENT: f32 = 0.1;
const AIM_LINE_LENGTH: f32 = 5.0;
const POINTER_MAX_LENGTH: f32 = 5.0;
const RING_RADIUS: f32 = 0.5;
const RING_STEP_DEGREES: f32 = 6.0;
const HUD_MARGIN: f32 = 10.0;
const HUD_FONT_SIZE: f32 = 20.0;

const OBJECTIVE_COLOR: Color = Color::rgb(0.0, 1.0, 0.0);
const BUILDING_FILL: Color = Color::rgb(0.5, 0.5, 0.5);
const BUILDING_EDGE: Color = Color::rgb(0.2, 0.2, 0.2);
const ENEMY_COLOR: Color = Color::rgb(1.0, 0.0, 0.0);
const AVATAR_COLOR: Color = Color::rgb(0.4, 0.6, 1.0);
const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

/// Builds the frame's draw list from a [`Scene`].
///
/// The presenter keeps its command buffer between frames so steady-state
/// presentation does not allocate.
#[derive(Debug, Default)]
pub struct Presenter {
    commands: Vec<DrawCommand>,
}

impl Presenter {
    /// Creates a presenter with an empty command buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the draw list for `scene`, back to front.
    pub fn present(&mut self, scene: &Scene) -> &[DrawCommand] {
        self.commands.clear();
        self.push_objective(scene);
        self.push_grid(scene);
        self.push_enemies(scene);
        self.push_projectiles(scene);
        self.push_buildings(scene);
        self.push_player(scene);
        self.push_timer_ring(scene);
        self.push_hud(scene);
        &self.commands
    }

    fn push_objective(&mut self, scene: &Scene) {
        if let Some(objective) = scene.objective {
            self.commands.push(DrawCommand::Quad {
                center: on_plane(objective, OBJECTIVE_PLANE),
                half_extents: Vec2::splat(OBJECTIVE_HALF_EXTENT),
                color: OBJECTIVE_COLOR,
            });
        }
    }

    fn push_grid(&mut self, scene: &Scene) {
        let color = Color::grey(GRID_BRIGHTNESS / scene.player.altitude.max(MIN_ALTITUDE));
        let extent = GRID_HALF_EXTENT as f32;
        for line in -GRID_HALF_EXTENT..GRID_HALF_EXTENT {
            let at = line as f32;
            self.commands.push(DrawCommand::Line {
                start: Vec3::new(at, GRID_PLANE, -extent),
                end: Vec3::new(at, GRID_PLANE, extent),
                color,
            });
            self.commands.push(DrawCommand::Line {
                start: Vec3::new(-extent, GRID_PLANE, at),
                end: Vec3::new(extent, GRID_PLANE, at),
                color,
            });
        }
    }

    fn push_enemies(&mut self, scene: &Scene) {
        self.commands
            .extend(scene.enemies.iter().map(|enemy| DrawCommand::Quad {
                center: on_plane(*enemy, 0.0),
                half_extents: Vec2::splat(AVATAR_HALF_EXTENT),
                color: ENEMY_COLOR,
            }));
    }

    fn push_projectiles(&mut self, scene: &Scene) {
        self.commands
            .extend(scene.projectiles.iter().map(|projectile| {
                let fade = (1.0 / projectile.alive_time).min(1.0);
                DrawCommand::Point {
                    position: on_plane(projectile.position, 0.0),
                    color: Color::rgb(1.0, fade, fade),
                }
            }));
    }

    fn push_buildings(&mut self, scene: &Scene) {
        self.commands
            .extend(scene.buildings.iter().map(|building| DrawCommand::Box {
                min: Vec3::new(building.min.x, GRID_PLANE, building.min.y),
                max: Vec3::new(building.max.x, building.height, building.max.y),
                fill: BUILDING_FILL,
                edge: BUILDING_EDGE,
            }));
    }

    fn push_player(&mut self, scene: &Scene) {
        let player = scene.player;
        let origin = on_plane(player.position, 0.0);
        self.commands.push(DrawCommand::Quad {
            center: origin,
            half_extents: Vec2::splat(AVATAR_HALF_EXTENT),
            color: AVATAR_COLOR,
        });

        let radians = (-player.heading).to_radians();
        let aim = Vec2::new(radians.cos(), radians.sin());
        self.commands.push(DrawCommand::Line {
            start: origin,
            end: on_plane(player.position + aim * AIM_LINE_LENGTH, 0.0),
            color: WHITE,
        });

        if let Some(objective) = scene.objective {
            let offset = objective - player.position;
            let distance = offset.length();
            if distance > f32::EPSILON {
                let reach = offset / distance * distance.min(POINTER_MAX_LENGTH);
                self.commands.push(DrawCommand::Line {
                    start: origin,
                    end: on_plane(player.position + reach, 0.0),
                    color: OBJECTIVE_COLOR,
                });
            }
        }
    }

    fn push_timer_ring(&mut self, scene: &Scene) {
        let remaining = 1.0 - scene.elapsed / LEVEL_DURATION.as_secs_f32();
        let sweep = 360.0 * remaining;
        let centre = scene.player.position;

        let mut previous: Option<Vec3> = None;
        let mut step = 0u32;
        loop {
            let degrees = step as f32 * RING_STEP_DEGREES;
            if degrees >= sweep {
                break;
            }
            let radians = degrees.to_radians();
            // Quarter turn so the ring starts at screen-up.
            let point = centre + Vec2::new(radians.sin(), -radians.cos()) * RING_RADIUS;
            let point = on_plane(point, RING_PLANE);
            if let Some(start) = previous {
                self.commands.push(DrawCommand::Line {
                    start,
                    end: point,
                    color: WHITE,
                });
            }
            previous = Some(point);
            step += 1;
        }
    }

    fn push_hud(&mut self, scene: &Scene) {
        let seconds_left = (LEVEL_DURATION.as_secs_f32() - scene.elapsed).max(0.0);
        let lines = [
            format!("Score: {}", scene.hud.score),
            format!("Time: {seconds_left:.1}"),
            format!("Seed: {}", scene.hud.seed),
        ];
        for (row, text) in lines.into_iter().enumerate() {
            self.commands.push(DrawCommand::Text {
                text,
                position: Vec2::new(HUD_MARGIN, HUD_FONT_SIZE * (row as f32 + 1.0)),
                size: HUD_FONT_SIZE,
                color: WHITE,
            });
        }
    }
}

fn on_plane(point: Vec2, height: f32) -> Vec3 {
    Vec3::new(point.x, height, point.y)
}
