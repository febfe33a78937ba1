/// Terminal front-end: keyboard state tracking and the diff-based
/// renderer.

pub mod input;
pub mod renderer;
