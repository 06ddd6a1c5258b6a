#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for You Only Get One.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The backend samples the keyboard and mouse into a [`FrameInput`], lets the
//! caller refresh the [`Scene`], and executes the [`Presenter`]'s draw list
//! under an overhead 3D camera.

use anyhow::Result;
use glam::{Vec2, Vec3};
use macroquad::{
    camera::{set_camera, set_default_camera, Camera3D},
    input::{
        is_key_down, is_key_pressed, is_mouse_button_down, mouse_position, mouse_wheel,
        set_cursor_grab, show_mouse, KeyCode, MouseButton,
    },
    math::{vec2 as mq_vec2, vec3 as mq_vec3, Vec3 as MacroquadVec3},
    models::{draw_cube, draw_cube_wires, draw_line_3d, draw_plane},
    text::draw_text,
};
use std::time::Duration;
use yogo_core::PlayerIntent;
use yogo_rendering::{
    Camera, Color, DrawCommand, FrameControl, FrameInput, Presentation, Presenter,
    RenderingBackend, Scene,
};

/// Edge length of the cube used to draw a point.
const POINT_SIZE: f32 = 0.04;

/// One-shot keys sampled once per rendered frame.
struct KeyboardShortcuts {
    /// `Escape` quits the game loop.
    quit_requested: bool,
    /// `E` releases or recaptures the mouse.
    toggle_capture: bool,
    /// `R` abandons the level.
    regenerate_level: bool,
    /// `Q` prints the player position.
    report_position: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            toggle_capture: is_key_pressed(KeyCode::E),
            regenerate_level: is_key_pressed(KeyCode::R),
            report_position: is_key_pressed(KeyCode::Q),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints the frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Counts rendered frames and reports the frame rate once per second.
#[derive(Debug, Default)]
struct FrameRate {
    elapsed: Duration,
    frames: u32,
}

impl FrameRate {
    fn record(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let rate = self.frames as f32 / self.elapsed.as_secs_f32();
        *self = Self::default();
        Some(rate)
    }
}

/// Converts raw cursor positions into per-frame deltas while the mouse is captured.
#[derive(Debug)]
struct CursorCapture {
    captured: bool,
    last: Option<Vec2>,
}

impl CursorCapture {
    fn new() -> Self {
        Self {
            captured: true,
            last: None,
        }
    }

    fn toggle(&mut self) {
        self.captured = !self.captured;
        self.last = None;
        apply_capture(self.captured);
    }

    fn delta(&mut self, position: Vec2) -> Vec2 {
        if !self.captured {
            return Vec2::ZERO;
        }
        let delta = self.last.map_or(Vec2::ZERO, |last| position - last);
        self.last = Some(position);
        delta
    }
}

fn apply_capture(captured: bool) {
    set_cursor_grab(captured);
    show_mouse(!captured);
}

fn gather_frame_input(keyboard: &KeyboardShortcuts, cursor: &mut CursorCapture) -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    let (_, wheel_y) = mouse_wheel();

    FrameInput {
        intent: PlayerIntent {
            north: is_key_down(KeyCode::W),
            south: is_key_down(KeyCode::S),
            west: is_key_down(KeyCode::A),
            east: is_key_down(KeyCode::D),
            advance: is_mouse_button_down(MouseButton::Right),
            zoom_in: is_key_down(KeyCode::LeftShift),
            zoom_out: is_key_down(KeyCode::LeftControl),
        },
        fire_key: is_key_down(KeyCode::Space),
        fire_button: is_mouse_button_down(MouseButton::Left),
        cursor_delta: cursor.delta(Vec2::new(cursor_x, cursor_y)),
        wheel: wheel_signum(wheel_y),
        regenerate_level: keyboard.regenerate_level,
        report_position: keyboard.report_position,
    }
}

/// Platforms report wheel movement in wildly different units; only the direction is kept.
fn wheel_signum(raw: f32) -> f32 {
    if raw > 0.0 {
        1.0
    } else if raw < 0.0 {
        -1.0
    } else {
        0.0
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 960,
            sample_count: 4,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let mut presenter = Presenter::new();
            let background = to_macroquad_color(clear_color);
            let mut frame_rate = FrameRate::default();
            let mut cursor = CursorCapture::new();
            apply_capture(true);

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }
                if keyboard.toggle_capture {
                    cursor.toggle();
                }

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(&keyboard, &mut cursor);

                let control = update_scene(frame_dt, frame_input, &mut scene);
                if control == FrameControl::Exit {
                    break;
                }

                macroquad::window::clear_background(background);
                match scene.camera() {
                    Ok(camera) => set_camera(&to_macroquad_camera(camera)),
                    Err(error) => log::warn!("skipping world pass: {error}"),
                }
                for command in presenter.present(&scene) {
                    draw_command(command);
                }
                set_default_camera();

                if let Some(rate) = frame_rate.record(frame_dt) {
                    if show_fps {
                        println!("FPS: {rate:.1}");
                    }
                }

                macroquad::window::next_frame().await;
            }

            apply_capture(false);
        });

        Ok(())
    }
}

fn draw_command(command: &DrawCommand) {
    match command {
        DrawCommand::Line { start, end, color } => {
            draw_line_3d(to_mq(*start), to_mq(*end), to_macroquad_color(*color));
        }
        DrawCommand::Point { position, color } => {
            draw_cube(
                to_mq(*position),
                mq_vec3(POINT_SIZE, POINT_SIZE, POINT_SIZE),
                None,
                to_macroquad_color(*color),
            );
        }
        DrawCommand::Quad {
            center,
            half_extents,
            color,
        } => {
            draw_plane(
                to_mq(*center),
                mq_vec2(half_extents.x, half_extents.y),
                None,
                to_macroquad_color(*color),
            );
        }
        DrawCommand::Box {
            min,
            max,
            fill,
            edge,
        } => {
            let center = to_mq((*min + *max) * 0.5);
            let size = to_mq(*max - *min);
            draw_cube(center, size, None, to_macroquad_color(*fill));
            draw_cube_wires(center, size, to_macroquad_color(*edge));
        }
        DrawCommand::Text {
            text,
            position,
            size,
            color,
        } => {
            set_default_camera();
            let _ = draw_text(text, position.x, position.y, *size, to_macroquad_color(*color));
        }
    }
}

fn to_macroquad_camera(camera: Camera) -> Camera3D {
    Camera3D {
        position: to_mq(camera.position),
        target: to_mq(camera.target),
        up: to_mq(camera.up),
        fovy: camera.fovy_degrees.to_radians(),
        ..Camera3D::default()
    }
}

fn to_mq(vector: Vec3) -> MacroquadVec3 {
    mq_vec3(vector.x, vector.y, vector.z)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
