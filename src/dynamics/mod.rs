//! Peak limiting.
//!
//! The limiter is built from two pieces:
//! - `EnvelopeFollower`, an attack/hold/release amplitude tracker
//! - `SafetyLimiter`, which turns the tracked amplitude into a gain that
//!   never lets the output leave [-1, 1]
//!
//! `limit` runs the limiter over a whole buffer and records every trace;
//! `Limiter` wraps it around any `Signal` for streaming use.

mod follower;
mod limiter;
mod settings;

pub use follower::{EnvelopeFollower, FollowerPhase, sanitize};
pub use limiter::{Limiter, LimiterFrame, LimiterOutput, SafetyLimiter, limit};
pub use settings::{DEFAULT_HOLD_TIME, DEFAULT_RELEASE_TIME, LimiterSettings, RELEASE_FLOOR_DB};
