//! Reactive Primitives
//!
//! The session and its renderer live on opposite sides of a redraw loop:
//! the session mutates the tree, the renderer draws it. A [`Signal`]
//! carrying the tree version connects the two. Each build or expansion
//! bumps the version and every subscriber is told to redraw.

mod signal;

pub use signal::{Signal, SubscriberId};
