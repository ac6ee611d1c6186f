//! Per-component spring transitions between closed and exploded positions.
//!
//! The state map is only ever mutated inside [`SpringTransitionEngine::tick`].
//! Configuration changes go through [`SpringTransitionEngine::schedule`], which
//! records the new target set; the next tick reconciles it (retarget live
//! springs, create new ones at rest, drop vanished ones) before integrating.

use super::spring::{SpringConfig, SpringState};
use crate::layout::{ComponentDescriptor, PartId};
use glam::Vec3;
use std::collections::HashMap;

/// Frame time used before any valid frame was seen.
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Longest frame the integrator will accept (backgrounded tabs, debugger pauses).
pub const MAX_DT: f32 = 0.1;

/// Drives every animatable component toward its current target.
#[derive(Debug, Clone)]
pub struct SpringTransitionEngine {
    config: SpringConfig,
    states: HashMap<PartId, SpringState>,
    pending: Option<Vec<(PartId, Vec3)>>,
    last_dt: f32,
}

impl Default for SpringTransitionEngine {
    fn default() -> Self {
        Self::new(SpringConfig::default())
    }
}

impl SpringTransitionEngine {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
            pending: None,
            last_dt: DEFAULT_DT,
        }
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    /// Replace the complete set of animated components and their targets.
    /// Takes effect at the start of the next tick.
    pub fn schedule(&mut self, targets: impl IntoIterator<Item = (PartId, [f32; 3])>) {
        self.pending = Some(
            targets
                .into_iter()
                .map(|(id, target)| (id, Vec3::from(target)))
                .collect(),
        );
    }

    /// Schedule targets for every animatable descriptor.
    pub fn schedule_from(&mut self, descriptors: &[ComponentDescriptor], exploded: bool) {
        self.schedule(
            descriptors
                .iter()
                .filter(|d| d.is_animatable())
                .map(|d| (d.id, d.target(exploded))),
        );
    }

    /// Whether a schedule is waiting for the next tick.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Advance all springs by `dt` seconds of wall-clock time.
    pub fn tick(&mut self, dt: f32) {
        let dt = self.sanitize_dt(dt);
        self.apply_pending();
        if dt == 0.0 {
            return;
        }
        let config = self.config;
        for state in self.states.values_mut() {
            state.advance(dt, &config);
        }
    }

    pub fn state(&self, id: &PartId) -> Option<&SpringState> {
        self.states.get(id)
    }

    pub fn position(&self, id: &PartId) -> Option<[f32; 3]> {
        self.states.get(id).map(|s| s.position.to_array())
    }

    pub fn states(&self) -> impl Iterator<Item = (&PartId, &SpringState)> {
        self.states.iter()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// True when nothing is pending and every spring is at rest.
    pub fn is_settled(&self) -> bool {
        self.pending.is_none() && self.states.values().all(SpringState::is_settled)
    }

    fn sanitize_dt(&mut self, dt: f32) -> f32 {
        if !dt.is_finite() {
            log::warn!("Non-finite frame time {}, reusing {}s", dt, self.last_dt);
            return self.last_dt;
        }
        if dt <= 0.0 {
            return 0.0;
        }
        let clamped = dt.min(MAX_DT);
        if clamped < dt {
            log::debug!("Clamped frame time {}s to {}s", dt, clamped);
        }
        self.last_dt = clamped;
        clamped
    }

    fn apply_pending(&mut self) {
        let Some(targets) = self.pending.take() else {
            return;
        };

        let before = self.states.len();
        let mut live: HashMap<PartId, SpringState> = HashMap::with_capacity(targets.len());
        let mut created = 0;
        for (id, target) in targets {
            let state = match self.states.remove(&id) {
                Some(mut state) => {
                    state.set_target(target);
                    state
                }
                None => {
                    created += 1;
                    SpringState::at_rest(target)
                }
            };
            live.insert(id, state);
        }
        let dropped = self.states.len();
        self.states = live;

        log::trace!(
            "Spring reconcile: {} before, {} created, {} dropped, {} live",
            before,
            created,
            dropped,
            self.states.len()
        );
    }
}
