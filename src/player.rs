//! Player module: the aggregate root of the playback core.
//!
//! The `Player` owns the catalog, the single live playback handle and the
//! volume/feedback state, and applies commands synchronously within the
//! presentation layer's frame tick.

mod model;

pub use model::{
    Command, FEEDBACK_TTL, Player, PlayerError, PlayerState, Snapshot, VOLUME_STEP,
};

#[cfg(test)]
mod tests;
