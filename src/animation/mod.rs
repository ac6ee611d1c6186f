//! Spring-driven transitions for the exploded view.

mod engine;
pub mod spring;

pub use engine::{SpringTransitionEngine, DEFAULT_DT, MAX_DT};
pub use spring::{SpringConfig, SpringState, REST_EPSILON};
