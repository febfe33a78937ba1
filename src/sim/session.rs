/// Session controller: phase machine, progression, hazard, camera.
///
/// Owns everything above a single player tick: lives, the coin counter,
/// level/world progression, the rising hazard plane, the smoothed camera
/// and the HUD message line. The player reports what happened through
/// `GameEvent`s; the session decides what it means.
///
/// Level resets restore a pristine clone of the grid taken at load time,
/// which also discards any pending vanish countdowns.

use crate::config::{GameConfig, WorldConfig};
use crate::domain::grid::{LevelDataError, TileGrid};
use crate::domain::player::{FrameInput, Player, PLAYER_HEIGHT, PLAYER_WIDTH};
use crate::sim::event::GameEvent;
use crate::sim::level;

/// Visible world height, world units.
pub const VIEW_HEIGHT: f64 = 600.0;
/// Camera aims this far above the player.
const CAMERA_LEAD: f64 = 300.0;
/// Fraction of the remaining distance the camera covers per tick.
const CAMERA_SMOOTHING: f64 = 0.1;
/// Camera offset above the spawn point on reset.
const CAMERA_SPAWN_LEAD: f64 = 400.0;
/// How far below the world bottom the hazard starts.
const HAZARD_START_BELOW: f64 = 200.0;
/// Spawn search scans this many bottom rows.
const SPAWN_SCAN_ROWS: i32 = 20;
/// Fallback spawn when no standable cell is found.
const FALLBACK_SPAWN_X: f64 = 300.0;
const FALLBACK_SPAWN_ABOVE_BOTTOM: f64 = 100.0;
/// Input is ignored for this long after a reset / on terminal screens.
const DEBOUNCE_MS: f64 = 500.0;
const TERMINAL_DEBOUNCE_MS: f64 = 1000.0;
/// Coins wrap to an extra life at this count.
const COINS_PER_LIFE: u32 = 10;
/// HUD messages linger this long.
const MESSAGE_MS: f64 = 2000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Menu,
    Playing,
    LevelComplete,
    GameOver,
    Win,
}

pub struct Session {
    pub config: GameConfig,
    pub phase: Phase,

    pub grid: TileGrid,
    /// Pristine copy taken at load; restored wholesale on reset.
    base_grid: TileGrid,
    pub player: Player,

    pub lives: u32,
    pub coins: u32,
    /// Checkpoint: what `coins` rolls back to on death.
    coins_at_level_start: u32,

    /// 1-based.
    pub current_world: u32,
    pub current_level: u32,

    /// Top edge of the rising hazard plane, world units.
    pub hazard_y: f64,
    pub camera_y: f64,

    pub level_elapsed_ms: f64,
    input_cooldown_ms: f64,

    pub message: String,
    message_timer_ms: f64,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        // Placeholder 1x1 grid until a level loads; Menu never reads it.
        let grid = TileGrid::load("0", config.cell_size)
            .unwrap_or_else(|_| unreachable!("static placeholder grid"));
        let lives = config.general.starting_lives;
        Session {
            config,
            phase: Phase::Menu,
            base_grid: grid.clone(),
            grid,
            player: Player::new(0.0, 0.0),
            lives,
            coins: 0,
            coins_at_level_start: 0,
            current_world: 1,
            current_level: 1,
            hazard_y: 0.0,
            camera_y: 0.0,
            level_elapsed_ms: 0.0,
            input_cooldown_ms: 0.0,
            message: String::new(),
            message_timer_ms: 0.0,
        }
    }

    /// Advance the whole session one tick.
    pub fn update(&mut self, dt_ms: f64, input: FrameInput) -> Vec<GameEvent> {
        if self.input_cooldown_ms > 0.0 {
            self.input_cooldown_ms -= dt_ms;
        }
        if self.message_timer_ms > 0.0 {
            self.message_timer_ms -= dt_ms;
            if self.message_timer_ms <= 0.0 {
                self.message.clear();
            }
        }

        match self.phase {
            Phase::Playing => self.tick_playing(dt_ms, input),
            Phase::Menu => {
                if input.jump && self.input_cooldown_ms <= 0.0 {
                    self.start_new_game();
                }
                Vec::new()
            }
            Phase::LevelComplete => {
                if input.jump && self.input_cooldown_ms <= 0.0 {
                    self.advance_level();
                }
                Vec::new()
            }
            Phase::GameOver | Phase::Win => {
                if input.jump && self.input_cooldown_ms <= 0.0 {
                    self.return_to_menu();
                }
                Vec::new()
            }
        }
    }

    fn tick_playing(&mut self, dt_ms: f64, input: FrameInput) -> Vec<GameEvent> {
        self.level_elapsed_ms += dt_ms;

        let world_cfg = self.active_world_config().clone();

        // Hazard rises every frame, never pauses, per-frame like velocities.
        self.hazard_y -= world_cfg.hazard_speed;

        self.grid.tick_vanishes(dt_ms);

        // The debounce only gates state-transition inputs; movement and
        // jump stay live from the first tick after a spawn.
        let mut events =
            self.player
                .update(dt_ms, input, &self.config.physics, &world_cfg, &mut self.grid);

        let mut reached_goal = false;
        let mut extra_lives = 0u32;
        for event in &events {
            match event {
                GameEvent::CoinCollected { .. } => {
                    if self.collect_coin() {
                        extra_lives += 1;
                    }
                }
                GameEvent::JetpackCollected => self.set_message("Jetpack fuel!"),
                GameEvent::WingsCollected => self.set_message("Wings! Press jump in the air"),
                GameEvent::GoalReached => reached_goal = true,
                _ => {}
            }
        }
        for _ in 0..extra_lives {
            events.push(GameEvent::ExtraLife);
            self.set_message("Extra life!");
        }

        // Hazard contact kills, even on a goal frame: dying and winning at
        // once resolves in the hazard's favor.
        if self.player.y + self.player.height > self.hazard_y {
            events.push(GameEvent::PlayerDied);
            self.die();
            return events;
        }

        if reached_goal {
            self.complete_level();
            return events;
        }

        // Camera eases toward a point above the player, clamped to the
        // world's vertical extent.
        let max_camera = (self.grid.world_height() - VIEW_HEIGHT).max(0.0);
        let target = (self.player.y - CAMERA_LEAD).clamp(0.0, max_camera);
        self.camera_y += (target - self.camera_y) * CAMERA_SMOOTHING;

        events
    }

    // ── Progression ──

    fn start_new_game(&mut self) {
        self.lives = self.config.general.starting_lives;
        self.coins = 0;
        self.coins_at_level_start = 0;
        self.current_world = 1;
        self.current_level = 1;
        self.load_current_level();
    }

    /// Abandon the current run: back to the menu with a fresh counter
    /// state. Also used by the binary for Esc during play.
    pub fn return_to_menu(&mut self) {
        self.lives = self.config.general.starting_lives;
        self.coins = 0;
        self.coins_at_level_start = 0;
        self.phase = Phase::Menu;
        self.input_cooldown_ms = DEBOUNCE_MS;
    }

    fn complete_level(&mut self) {
        self.input_cooldown_ms = TERMINAL_DEBOUNCE_MS;
        if self.has_next_level() {
            self.phase = Phase::LevelComplete;
        } else {
            self.phase = Phase::Win;
        }
    }

    fn has_next_level(&self) -> bool {
        if self.current_level < self.active_world_config().level_count {
            return true;
        }
        (self.current_world as usize) < self.config.worlds.len()
    }

    fn advance_level(&mut self) {
        if self.current_level < self.active_world_config().level_count {
            self.current_level += 1;
        } else {
            self.current_world += 1;
            self.current_level = 1;
        }
        // Checkpoint before load so a death in the new level keeps the
        // coins earned in the finished one.
        self.coins_at_level_start = self.coins;
        self.load_current_level();
    }

    /// Load the current (world, level), walking the fallback chain:
    /// a missing first level of a world ends the run back at the menu, a
    /// missing later level skips to the next world's first level.
    fn load_current_level(&mut self) {
        loop {
            if self.current_world as usize > self.config.worlds.len() {
                self.phase = Phase::Menu;
                self.input_cooldown_ms = DEBOUNCE_MS;
                return;
            }
            let text = level::level_text(
                &self.config.levels_dir,
                self.current_world,
                self.current_level,
            );
            match text {
                Some(text) => match self.start_level_from_text(&text) {
                    Ok(()) => {
                        self.phase = Phase::Playing;
                        return;
                    }
                    Err(e) => {
                        eprintln!(
                            "Error: level {}-{} is malformed: {e}",
                            self.current_world, self.current_level
                        );
                        self.phase = Phase::Menu;
                        self.input_cooldown_ms = DEBOUNCE_MS;
                        return;
                    }
                },
                None if self.current_level > 1 => {
                    eprintln!(
                        "Warning: level {}-{} not found, skipping to next world",
                        self.current_world, self.current_level
                    );
                    self.current_world += 1;
                    self.current_level = 1;
                }
                None => {
                    self.phase = Phase::Menu;
                    self.input_cooldown_ms = DEBOUNCE_MS;
                    return;
                }
            }
        }
    }

    /// Install a level from raw CSV text and reset into it. Used by the
    /// binary's level-file argument and by tests.
    pub fn start_level_from_text(&mut self, text: &str) -> Result<(), LevelDataError> {
        let grid = TileGrid::load(text, self.config.cell_size)?;
        self.base_grid = grid.clone();
        self.grid = grid;
        self.level_elapsed_ms = 0.0;
        self.reset_level(false);
        Ok(())
    }

    /// Place the player back at spawn. `restore` additionally rolls the
    /// grid and coin counter back to their level-start state (death path).
    fn reset_level(&mut self, restore: bool) {
        if restore {
            // Replacing the grid drops pending vanish countdowns with it.
            self.grid = self.base_grid.clone();
            self.coins = self.coins_at_level_start;
            self.level_elapsed_ms = 0.0;
        }

        let (x, y) = self.spawn_point();
        self.player = Player::new(x, y);
        self.player.grounded = true;

        let max_camera = (self.grid.world_height() - VIEW_HEIGHT).max(0.0);
        self.camera_y = (y - CAMERA_SPAWN_LEAD).clamp(0.0, max_camera);
        self.hazard_y = self.grid.world_height() + HAZARD_START_BELOW;
        self.input_cooldown_ms = DEBOUNCE_MS;
    }

    /// Bottom-up, center-outward scan of the lowest rows for a standable
    /// cell with free air above it.
    fn spawn_point(&self) -> (f64, f64) {
        let rows = self.grid.rows as i32;
        let cols = self.grid.columns as i32;
        let cell = self.grid.cell_size;
        let window = rows.min(SPAWN_SCAN_ROWS);

        for row in ((rows - window)..rows).rev() {
            for col in center_out(cols) {
                if self.grid.get(col, row).is_standable() && !self.grid.get(col, row - 1).is_solid()
                {
                    let x = col as f64 * cell + (cell - PLAYER_WIDTH) / 2.0;
                    let y = row as f64 * cell - PLAYER_HEIGHT;
                    return (x, y);
                }
            }
        }

        eprintln!(
            "Warning: level {}-{} has no standable spawn cell, using fallback",
            self.current_world, self.current_level
        );
        let x = FALLBACK_SPAWN_X.min(self.grid.world_width() - PLAYER_WIDTH);
        (x, self.grid.world_height() - FALLBACK_SPAWN_ABOVE_BOTTOM)
    }

    // ── Lives and coins ──

    /// Bank a coin; returns true when the counter wrapped into a life.
    fn collect_coin(&mut self) -> bool {
        self.coins += 1;
        if self.coins >= COINS_PER_LIFE {
            self.coins = 0;
            self.lives += 1;
            return true;
        }
        false
    }

    fn die(&mut self) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.phase = Phase::GameOver;
            self.input_cooldown_ms = TERMINAL_DEBOUNCE_MS;
        } else {
            self.reset_level(true);
            self.set_message("Ouch! Try again");
        }
    }

    // ── Misc ──

    /// Config of the world the session is currently in. An out-of-range
    /// world index falls back to world 1 rather than panicking.
    pub fn active_world_config(&self) -> &WorldConfig {
        let idx = self.current_world.saturating_sub(1) as usize;
        self.config.worlds.get(idx).unwrap_or(&self.config.worlds[0])
    }

    fn set_message(&mut self, text: &str) {
        self.message = text.to_string();
        self.message_timer_ms = MESSAGE_MS;
    }
}

/// Column visit order: middle first, then alternating outward.
fn center_out(cols: i32) -> impl Iterator<Item = i32> {
    let mid = cols / 2;
    (0..cols).map(move |i| {
        let step = (i + 1) / 2;
        if i % 2 == 1 {
            mid - step
        } else {
            mid + step
        }
    })
}
