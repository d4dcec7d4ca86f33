//! Terminal front end: event loop, key routing, rendering.

mod input;
mod loop_runner;
mod render;

pub use loop_runner::{run, Action};
