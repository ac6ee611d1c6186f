//! Damped harmonic oscillator in three dimensions.

use glam::Vec3;

/// Largest integration step, regardless of how stiff the spring is.
const MAX_STEP: f32 = 1.0 / 120.0;

/// Upper bound on sub-steps per advance, for pathological constants.
const MAX_SUBSTEPS: u32 = 10_000;

/// Distance and speed below which a spring counts as at rest.
pub const REST_EPSILON: f32 = 1e-4;

/// Physical constants shared by a set of springs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub mass: f32,
    /// Spring stiffness.
    pub tension: f32,
    /// Damping coefficient.
    pub friction: f32,
}

impl SpringConfig {
    /// Create a new spring configuration. Mass is kept strictly positive.
    pub fn new(mass: f32, tension: f32, friction: f32) -> Self {
        Self {
            mass: if mass > 0.0 { mass } else { 1.0 },
            tension: tension.max(0.0),
            friction: friction.max(0.0),
        }
    }

    /// Slow and soft
    pub fn gentle() -> Self {
        Self::new(1.0, 120.0, 14.0)
    }

    /// Visible overshoot
    pub fn wobbly() -> Self {
        Self::new(1.0, 180.0, 12.0)
    }

    /// Quick with little overshoot
    pub fn stiff() -> Self {
        Self::new(1.0, 210.0, 20.0)
    }

    /// Heavily overdamped
    pub fn molasses() -> Self {
        Self::new(1.0, 280.0, 120.0)
    }

    /// Damping at which the spring stops oscillating.
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.tension * self.mass).sqrt()
    }

    pub fn is_underdamped(&self) -> bool {
        self.friction < self.critical_damping()
    }

    pub fn is_overdamped(&self) -> bool {
        self.friction > self.critical_damping()
    }

    /// Largest step for which semi-implicit Euler stays stable with these constants.
    pub fn stable_step(&self) -> f32 {
        let mut step = MAX_STEP;
        if self.friction > 0.0 {
            step = step.min(0.5 * self.mass / self.friction);
        }
        if self.tension > 0.0 {
            step = step.min(0.5 * (self.mass / self.tension).sqrt());
        }
        step
    }
}

impl Default for SpringConfig {
    /// Just under critical damping: settles fast with a barely visible overshoot.
    fn default() -> Self {
        Self::new(1.0, 170.0, 26.0)
    }
}

/// Live state of one animated component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub target: Vec3,
}

impl SpringState {
    /// A spring resting at `position`.
    pub fn at_rest(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            target: position,
        }
    }

    /// Retarget. Position and velocity carry over untouched.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn is_settled(&self) -> bool {
        self.position.distance(self.target) < REST_EPSILON && self.velocity.length() < REST_EPSILON
    }

    pub fn acceleration(&self, config: &SpringConfig) -> Vec3 {
        (config.tension * (self.target - self.position) - config.friction * self.velocity)
            / config.mass
    }

    /// One semi-implicit Euler step of `h` seconds.
    pub fn step(&mut self, h: f32, config: &SpringConfig) {
        let acceleration = self.acceleration(config);
        self.velocity += acceleration * h;
        self.position += self.velocity * h;
    }

    /// Advance by `dt` seconds, sub-stepping as the constants require.
    /// Snaps to the target once at rest.
    pub fn advance(&mut self, dt: f32, config: &SpringConfig) {
        if dt <= 0.0 {
            return;
        }
        if self.is_settled() {
            self.position = self.target;
            self.velocity = Vec3::ZERO;
            return;
        }

        let substeps = (dt / config.stable_step()).ceil().clamp(1.0, MAX_SUBSTEPS as f32) as u32;
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            self.step(h, config);
        }

        if self.is_settled() {
            self.position = self.target;
            self.velocity = Vec3::ZERO;
        }
    }
}
