//! Animated background: one particle effect per weather theme.
//!
//! [`Atmosphere`] holds the simulation and draws onto any [`Canvas`].
//! [`run`] drives it at display rate until cancelled, following theme and
//! viewport changes published on a `watch` channel.

use std::f64::consts::PI;
use std::time::Duration;

use clima_weather::Theme;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Roughly 60 frames per second
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub type Rgb = [u8; 3];

/// Minimal 2D drawing surface
pub trait Canvas: Send {
    fn resize(&mut self, width: f64, height: f64);
    fn clear(&mut self);
    /// Filled circle fading from `opacity` at the centre to transparent at `radius`
    fn radial_glow(&mut self, x: f64, y: f64, radius: f64, color: Rgb, opacity: f64);
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb, opacity: f64);
    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgb, opacity: f64);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Glow {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgb,
        opacity: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        color: Rgb,
        opacity: f64,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        color: Rgb,
        opacity: f64,
    },
}

/// Canvas that records the commands of the latest frame
#[derive(Debug, Clone, Default)]
pub struct DisplayList {
    pub width: f64,
    pub height: f64,
    pub frames: u64,
    pub commands: Vec<DrawCommand>,
}

impl Canvas for DisplayList {
    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.frames += 1;
    }

    fn radial_glow(&mut self, x: f64, y: f64, radius: f64, color: Rgb, opacity: f64) {
        self.commands.push(DrawCommand::Glow {
            x,
            y,
            radius,
            color,
            opacity,
        });
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: Rgb, opacity: f64) {
        self.commands.push(DrawCommand::Circle {
            x,
            y,
            radius,
            color,
            opacity,
        });
    }

    fn stroke_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgb, opacity: f64) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
            opacity,
        });
    }
}

/// One particle. `size` is a radius for round shapes and a length for streaks.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub opacity: f64,
    pub speed: f64,
    pub drift: f64,
    pub angle: f64,
    pub wobble: f64,
}

/// Number of particles spawned for `theme`
pub fn particle_count(theme: Theme) -> usize {
    match theme {
        Theme::Sunny => 18,
        Theme::Cloudy => 8,
        Theme::Foggy => 6,
        Theme::Drizzle => 60,
        Theme::Rainy => 120,
        Theme::Snowy => 80,
        Theme::Stormy => 150,
    }
}

fn color(theme: Theme) -> Rgb {
    match theme {
        Theme::Sunny => [255, 210, 60],
        Theme::Cloudy => [200, 210, 220],
        Theme::Foggy => [200, 215, 225],
        Theme::Drizzle => [150, 200, 255],
        Theme::Rainy => [100, 160, 255],
        Theme::Snowy => [230, 245, 255],
        Theme::Stormy => [80, 120, 200],
    }
}

/// Streak parameters: (slant angle, lateral factor, wrap margin)
fn streak(theme: Theme) -> Option<(f64, f64, f64)> {
    match theme {
        Theme::Drizzle => Some((0.1, 0.2, 10.0)),
        Theme::Rainy => Some((0.2, 0.3, 20.0)),
        Theme::Stormy => Some((0.35, 0.4, 20.0)),
        _ => None,
    }
}

fn between(rng: &mut StdRng, low: f64, span: f64) -> f64 {
    low + rng.gen::<f64>() * span
}

fn spawn(theme: Theme, rng: &mut StdRng, width: f64, height: f64) -> Particle {
    let x = rng.gen::<f64>() * width;
    let y = rng.gen::<f64>() * height;
    let base = Particle {
        x,
        y,
        size: 0.0,
        opacity: 0.0,
        speed: 0.0,
        drift: 0.0,
        angle: 0.0,
        wobble: 0.0,
    };

    match theme {
        Theme::Sunny => Particle {
            size: between(rng, 2.0, 5.0),
            opacity: between(rng, 0.08, 0.18),
            speed: between(rng, 0.08, 0.15),
            drift: (rng.gen::<f64>() - 0.5) * 0.2,
            ..base
        },
        Theme::Cloudy => Particle {
            y: rng.gen::<f64>() * height * 0.5,
            size: between(rng, 60.0, 100.0),
            opacity: between(rng, 0.04, 0.08),
            speed: between(rng, 0.15, 0.25),
            ..base
        },
        Theme::Foggy => Particle {
            size: between(rng, 150.0, 200.0),
            opacity: between(rng, 0.03, 0.07),
            speed: between(rng, 0.1, 0.2),
            ..base
        },
        Theme::Rainy => Particle {
            size: between(rng, 8.0, 18.0),
            opacity: between(rng, 0.25, 0.4),
            speed: between(rng, 12.0, 10.0),
            angle: 0.2,
            ..base
        },
        Theme::Drizzle => Particle {
            size: between(rng, 4.0, 8.0),
            opacity: between(rng, 0.15, 0.3),
            speed: between(rng, 5.0, 5.0),
            angle: 0.1,
            ..base
        },
        Theme::Stormy => Particle {
            size: between(rng, 10.0, 25.0),
            opacity: between(rng, 0.2, 0.5),
            speed: between(rng, 18.0, 14.0),
            angle: 0.35,
            ..base
        },
        Theme::Snowy => Particle {
            size: between(rng, 2.0, 5.0),
            opacity: between(rng, 0.4, 0.5),
            speed: between(rng, 0.4, 1.0),
            drift: (rng.gen::<f64>() - 0.5) * 0.6,
            wobble: rng.gen::<f64>() * PI * 2.0,
            ..base
        },
    }
}

fn draw(theme: Theme, p: &Particle, canvas: &mut dyn Canvas) {
    let rgb = color(theme);
    match theme {
        Theme::Sunny => canvas.radial_glow(p.x, p.y, p.size * 4.0, rgb, p.opacity),
        Theme::Cloudy | Theme::Foggy => canvas.radial_glow(p.x, p.y, p.size, rgb, p.opacity),
        Theme::Snowy => canvas.fill_circle(p.x, p.y, p.size, rgb, p.opacity),
        Theme::Drizzle => canvas.stroke_line(
            (p.x, p.y),
            (p.x + p.size * p.angle.sin(), p.y + p.size),
            0.8,
            rgb,
            p.opacity,
        ),
        Theme::Rainy | Theme::Stormy => {
            let width = if theme == Theme::Stormy { 1.2 } else { 1.0 };
            canvas.stroke_line(
                (p.x, p.y),
                (p.x + p.size * p.angle.sin(), p.y + p.size * p.angle.cos()),
                width,
                rgb,
                p.opacity,
            );
        }
    }
}

fn update(theme: Theme, p: &mut Particle, rng: &mut StdRng, width: f64, height: f64) {
    match theme {
        Theme::Sunny => {
            p.y -= p.speed;
            p.x += p.drift;
            if p.y < -20.0 {
                p.y = height + 20.0;
                p.x = rng.gen::<f64>() * width;
            }
        }
        Theme::Cloudy | Theme::Foggy => {
            p.x += p.speed;
            if p.x > width + p.size {
                p.x = -p.size;
            }
        }
        Theme::Snowy => {
            p.wobble += 0.02;
            p.y += p.speed;
            p.x += p.drift + p.wobble.sin() * 0.5;
            if p.y > height + 10.0 {
                p.y = -10.0;
                p.x = rng.gen::<f64>() * width;
            }
        }
        Theme::Drizzle | Theme::Rainy | Theme::Stormy => {
            let (angle, factor, margin) = streak(theme).unwrap_or((p.angle, 0.3, 20.0));
            p.y += p.speed;
            p.x += p.speed * angle.tan() * factor;
            if p.y > height + margin {
                p.y = -margin;
                p.x = rng.gen::<f64>() * width;
            }
        }
    }
}

/// Particle simulation for the active theme
#[derive(Debug)]
pub struct Atmosphere {
    theme: Option<Theme>,
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    rng: StdRng,
}

impl Atmosphere {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_rng(width, height, StdRng::from_entropy())
    }

    /// Deterministic particles, for tests and reproducible output
    pub fn with_seed(width: f64, height: f64, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: f64, height: f64, rng: StdRng) -> Self {
        Self {
            theme: None,
            particles: Vec::new(),
            width,
            height,
            rng,
        }
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Switch to `theme`, replacing every particle. Returns false (and keeps
    /// the current particles) when the theme is already active.
    pub fn activate(&mut self, theme: Theme) -> bool {
        if self.theme == Some(theme) {
            return false;
        }
        self.theme = Some(theme);
        let (w, h) = (self.width, self.height);
        let rng = &mut self.rng;
        self.particles = (0..particle_count(theme))
            .map(|_| spawn(theme, rng, w, h))
            .collect();
        tracing::debug!("Atmosphere switched to {} ({} particles)", theme, self.particles.len());
        true
    }

    /// New viewport size; existing particles keep their positions
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Clear the canvas, then draw and step every particle once
    pub fn frame(&mut self, canvas: &mut dyn Canvas) {
        canvas.clear();
        let Some(theme) = self.theme else {
            return;
        };
        let (w, h) = (self.width, self.height);
        for p in &mut self.particles {
            draw(theme, p, canvas);
            update(theme, p, &mut self.rng, w, h);
        }
    }
}

/// What the background should currently show
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    pub theme: Option<Theme>,
    pub width: f64,
    pub height: f64,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            theme: None,
            width,
            height,
        }
    }
}

/// Redraw loop. Follows `scene` and stops when `cancel` fires or the scene
/// sender is dropped, handing the canvas back.
pub async fn run<C: Canvas>(
    mut atmosphere: Atmosphere,
    mut canvas: C,
    mut scene: watch::Receiver<Scene>,
    cancel: CancellationToken,
) -> C {
    let initial = *scene.borrow_and_update();
    canvas.resize(initial.width, initial.height);
    apply_scene(&mut atmosphere, &mut canvas, initial);

    let mut ticker = tokio::time::interval(FRAME_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = scene.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = *scene.borrow_and_update();
                apply_scene(&mut atmosphere, &mut canvas, next);
            }
            _ = ticker.tick() => atmosphere.frame(&mut canvas),
        }
    }

    tracing::debug!("Atmosphere loop stopped");
    canvas
}

fn apply_scene<C: Canvas>(atmosphere: &mut Atmosphere, canvas: &mut C, scene: Scene) {
    if atmosphere.size() != (scene.width, scene.height) {
        atmosphere.resize(scene.width, scene.height);
        canvas.resize(scene.width, scene.height);
    }
    if let Some(theme) = scene.theme {
        atmosphere.activate(theme);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_particle_counts_per_theme() {
        for theme in Theme::ALL {
            let mut atmosphere = Atmosphere::with_seed(800.0, 600.0, 7);
            assert!(atmosphere.activate(theme));
            let n = atmosphere.particles().len();
            assert_eq!(n, particle_count(theme));
            assert!((6..=150).contains(&n));
        }
    }

    #[test]
    fn test_spawn_is_bounded_by_viewport() {
        for theme in Theme::ALL {
            let mut atmosphere = Atmosphere::with_seed(800.0, 600.0, 42);
            atmosphere.activate(theme);
            for p in atmosphere.particles() {
                assert!((0.0..800.0).contains(&p.x), "{theme}: x={}", p.x);
                assert!((0.0..600.0).contains(&p.y), "{theme}: y={}", p.y);
                assert!(p.opacity > 0.0 && p.opacity < 1.0);
            }
        }
    }

    #[test]
    fn test_cloud_particles_stay_in_upper_half() {
        let mut atmosphere = Atmosphere::with_seed(800.0, 600.0, 1);
        atmosphere.activate(Theme::Cloudy);
        assert!(atmosphere.particles().iter().all(|p| p.y < 300.0));
    }

    #[test]
    fn test_activate_same_theme_is_noop() {
        let mut atmosphere = Atmosphere::with_seed(800.0, 600.0, 3);
        atmosphere.activate(Theme::Snowy);
        let before = atmosphere.particles().to_vec();
        assert!(!atmosphere.activate(Theme::Snowy));
        assert_eq!(atmosphere.particles(), before.as_slice());

        assert!(atmosphere.activate(Theme::Rainy));
        assert_eq!(atmosphere.particles().len(), 120);
    }

    #[test]
    fn test_resize_keeps_particles() {
        let mut atmosphere = Atmosphere::with_seed(800.0, 600.0, 3);
        atmosphere.activate(Theme::Foggy);
        let before = atmosphere.particles().to_vec();
        atmosphere.resize(1920.0, 1080.0);
        assert_eq!(atmosphere.particles(), before.as_slice());
        assert_eq!(atmosphere.size(), (1920.0, 1080.0));
    }

    #[test]
    fn test_frame_without_theme_only_clears() {
        let mut atmosphere = Atmosphere::with_seed(800.0, 600.0, 3);
        let mut canvas = DisplayList::default();
        atmosphere.frame(&mut canvas);
        assert_eq!(canvas.frames, 1);
        assert!(canvas.commands.is_empty());
    }

    #[test]
    fn test_frame_draws_every_particle() {
        let mut atmosphere = Atmosphere::with_seed(800.0, 600.0, 9);
        atmosphere.activate(Theme::Stormy);
        let mut canvas = DisplayList::default();
        atmosphere.frame(&mut canvas);
        assert_eq!(canvas.commands.len(), 150);
        assert!(canvas
            .commands
            .iter()
            .all(|c| matches!(c, DrawCommand::Line { width, .. } if *width == 1.2)));
    }

    #[test]
    fn test_rain_wraps_to_top() {
        let mut atmosphere = Atmosphere::with_seed(800.0, 600.0, 5);
        atmosphere.activate(Theme::Rainy);
        atmosphere.particles[0].y = 619.0;
        atmosphere.particles[0].speed = 12.0;
        atmosphere.frame(&mut DisplayList::default());
        let p = &atmosphere.particles()[0];
        assert_eq!(p.y, -20.0);
        assert!((0.0..800.0).contains(&p.x));
    }

    #[test]
    fn test_sun_motes_rise_and_wrap_to_bottom() {
        let mut atmosphere = Atmosphere::with_seed(800.0, 600.0, 5);
        atmosphere.activate(Theme::Sunny);
        let y0 = atmosphere.particles()[1].y;
        atmosphere.particles[0].y = -19.99;
        atmosphere.frame(&mut DisplayList::default());
        assert_eq!(atmosphere.particles()[0].y, 620.0);
        assert!(atmosphere.particles()[1].y < y0);
    }

    #[test]
    fn test_clouds_wrap_horizontally() {
        let mut atmosphere = Atmosphere::with_seed(800.0, 600.0, 5);
        atmosphere.activate(Theme::Cloudy);
        let r = atmosphere.particles[0].size;
        atmosphere.particles[0].x = 800.0 + r;
        atmosphere.frame(&mut DisplayList::default());
        assert_eq!(atmosphere.particles()[0].x, -r);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_follows_scene_until_cancelled() {
        let (tx, rx) = watch::channel(Scene::new(640.0, 480.0));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            Atmosphere::with_seed(640.0, 480.0, 11),
            DisplayList::default(),
            rx,
            cancel.clone(),
        ));

        tx.send_replace(Scene {
            theme: Some(Theme::Drizzle),
            width: 1024.0,
            height: 768.0,
        });
        tokio::time::sleep(FRAME_INTERVAL * 10).await;
        cancel.cancel();

        let canvas = handle.await.unwrap();
        assert_eq!((canvas.width, canvas.height), (1024.0, 768.0));
        assert!(canvas.frames >= 5);
        assert_eq!(canvas.commands.len(), 60);
    }
}
