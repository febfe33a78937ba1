/// Events emitted during a tick.
/// The session consumes these for scoring and phase transitions;
/// the presentation layer consumes them for HUD messages.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    CoinCollected { col: i32, row: i32 },
    JetpackCollected,
    WingsCollected,
    SpringBounce,
    GoalReached,
    ExtraLife,
    PlayerDied,
}
