//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the track list, the
//! cursor, liked songs and the handle to the player's snapshot.

mod model;

pub use model::*;
