/// Simulation layer: level sources, tick events and the session
/// controller that drives phases, lives and progression.

pub mod event;
pub mod level;
pub mod session;
