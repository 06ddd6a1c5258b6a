#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for You Only Get One adapters.
//!
//! Adapters receive a [`Scene`] snapshot assembled from world queries and turn
//! it into [`DrawCommand`]s through the [`Presenter`]. Backends only need to
//! know how to execute draw commands and how to sample input; they never see
//! the world itself.

mod presenter;

pub use presenter::Presenter;

use anyhow::Result as AnyResult;
use glam::{Vec2, Vec3};
use std::{error::Error, fmt, time::Duration};
use yogo_core::{LevelSeed, PlayerIntent};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque black, used to clear the frame.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from floating point channels.
    #[must_use]
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::new(red, green, blue, 1.0)
    }

    /// Creates an opaque grey where every channel shares `level`.
    #[must_use]
    pub fn grey(level: f32) -> Self {
        let level = level.clamp(0.0, 1.0);
        Self::rgb(level, level, level)
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Held movement and zoom keys.
    pub intent: PlayerIntent,
    /// Whether the keyboard fire key is held.
    pub fire_key: bool,
    /// Whether the primary mouse button is held.
    pub fire_button: bool,
    /// Raw mouse movement since the previous frame, in pixels.
    pub cursor_delta: Vec2,
    /// Vertical wheel movement since the previous frame.
    pub wheel: f32,
    /// `R` was pressed on this frame.
    pub regenerate_level: bool,
    /// `Q` was pressed on this frame.
    pub report_position: bool,
}

/// Player state shown by the presenter.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ScenePlayer {
    /// Position on the game plane.
    pub position: Vec2,
    /// Camera height above the ground.
    pub altitude: f32,
    /// Heading in degrees.
    pub heading: f32,
}

/// Axis-aligned building footprint extruded to `height`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBuilding {
    /// Lower corner of the footprint on the game plane.
    pub min: Vec2,
    /// Upper corner of the footprint on the game plane.
    pub max: Vec2,
    /// Height of the box.
    pub height: f32,
}

/// Live projectile shown by the presenter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Position on the game plane.
    pub position: Vec2,
    /// Seconds the projectile has been in flight.
    pub alive_time: f32,
}

/// Values printed in the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Hud {
    /// Score accumulated over the run.
    pub score: u64,
    /// Seed of the level being played.
    pub seed: LevelSeed,
}

/// Scene description consumed by rendering backends.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Scene {
    /// The player avatar.
    pub player: ScenePlayer,
    /// Objective cell, if a level is loaded.
    pub objective: Option<Vec2>,
    /// Buildings of the current level.
    pub buildings: Vec<SceneBuilding>,
    /// Positions of live enemies.
    pub enemies: Vec<Vec2>,
    /// Live projectiles.
    pub projectiles: Vec<SceneProjectile>,
    /// Seconds elapsed on the level timer.
    pub elapsed: f32,
    /// Heads-up display values.
    pub hud: Hud,
}

impl Scene {
    /// Overhead camera following the player.
    pub fn camera(&self) -> Result<Camera, RenderingError> {
        Camera::overhead(self.player.position, self.player.altitude)
    }
}

/// Perspective camera description in world coordinates.
///
/// World `y` is up; the game plane's `y` axis maps onto world `z`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    /// Eye position.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Screen-up direction.
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fovy_degrees: f32,
    /// Near clipping distance.
    pub near: f32,
    /// Far clipping distance.
    pub far: f32,
}

impl Camera {
    /// Vertical field of view used by the overhead camera.
    pub const FOVY_DEGREES: f32 = 60.0;
    /// Near clipping distance used by the overhead camera.
    pub const NEAR: f32 = 0.01;
    /// Far clipping distance used by the overhead camera.
    pub const FAR: f32 = 1000.0;

    /// Camera hovering `altitude` units above `focus`, looking straight down
    /// with world `-z` as screen-up.
    pub fn overhead(focus: Vec2, altitude: f32) -> Result<Self, RenderingError> {
        if !altitude.is_finite() || altitude <= Self::NEAR {
            return Err(RenderingError::InvalidAltitude { altitude });
        }

        Ok(Self {
            position: Vec3::new(focus.x, altitude, focus.y),
            target: Vec3::new(focus.x, 0.0, focus.y),
            up: Vec3::NEG_Z,
            fovy_degrees: Self::FOVY_DEGREES,
            near: Self::NEAR,
            far: Self::FAR,
        })
    }
}

/// Primitive emitted by the presenter, in world coordinates unless noted.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Line segment between two points.
    Line {
        /// Segment start.
        start: Vec3,
        /// Segment end.
        end: Vec3,
        /// Line color.
        color: Color,
    },
    /// Single point rendered with a small screen footprint.
    Point {
        /// Point position.
        position: Vec3,
        /// Point color.
        color: Color,
    },
    /// Flat quad lying on a horizontal plane.
    Quad {
        /// Centre of the quad.
        center: Vec3,
        /// Half extents along world `x` and `z`.
        half_extents: Vec2,
        /// Fill color.
        color: Color,
    },
    /// Solid axis-aligned box with outlined edges.
    Box {
        /// Lower corner.
        min: Vec3,
        /// Upper corner.
        max: Vec3,
        /// Face color.
        fill: Color,
        /// Edge color.
        edge: Color,
    },
    /// Screen-space text anchored at its baseline, in pixels from the top-left corner.
    Text {
        /// Text to print.
        text: String,
        /// Screen-space anchor.
        position: Vec2,
        /// Font size in pixels.
        size: f32,
        /// Text color.
        color: Color,
    },
}

/// Tells the backend whether to keep presenting frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Render the scene and request another frame.
    Continue,
    /// Stop the render loop and return from [`RenderingBackend::run`].
    Exit,
}

/// Rendering configuration for a scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used for the window.
    pub window_title: String,
    /// Background clear color.
    pub clear_color: Color,
    /// Scene shown before the first update.
    pub scene: Scene,
}

impl Presentation {
    /// Creates a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the real frame delta and
    /// the input sampled by the adapter, refreshes the scene from the
    /// simulation and reports whether the loop should keep going.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The camera must sit above the near clipping plane.
    InvalidAltitude {
        /// Provided altitude that failed validation.
        altitude: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAltitude { altitude } => {
                write!(
                    f,
                    "camera altitude must be finite and above the near plane (received {altitude})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
