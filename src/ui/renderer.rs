/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws.
///
/// World mapping: one tile cell = 2 terminal columns x 1 terminal row.
/// The camera's continuous y offset is snapped to whole rows.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::tile::Tile;
use crate::sim::session::{Phase, Session, VIEW_HEIGHT};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap pixels on VTE terminals match the cell color and no
    /// horizontal seams show.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 14, b: 20 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real
    /// cell, so every position gets diff'd on the next flush.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    /// Normalize bg: Color::Reset → BASE_BG so that every cell carries an
    /// explicit background, never the terminal default.
    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y); each char occupies one column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell::new(ch, fg, bg));
            cx += 1;
        }
    }
}

// ── Renderer ──

/// Each tile cell spans 2 terminal columns.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;
/// HUD + gap above the map, message + help below it.
const RESERVED_ROWS: usize = MAP_ROW + 4;

const HUD_BG: Color = Color::Rgb { r: 40, g: 16, b: 10 };
const MSG_FG: Color = Color::Black;
const MSG_BG: Color = Color::Rgb { r: 230, g: 180, b: 40 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const GREEN: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const RED: Color = Color::Rgb { r: 255, g: 70, b: 40 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    /// Frame counter driving blink effects and the lava shimmer.
    tick: u32,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            tick: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &Session) -> io::Result<()> {
        self.tick = self.tick.wrapping_add(1);

        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change → clear for a clean transition
        if self.last_phase != Some(session.phase) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(session.phase);
        }

        self.front.clear();

        match session.phase {
            Phase::Menu => self.compose_menu(session),
            Phase::Playing => self.compose_game(session, None),
            Phase::LevelComplete => {
                self.compose_game(session, Some("LEVEL CLEARED"));
            }
            Phase::GameOver => self.compose_game_over(session),
            Phase::Win => self.compose_win(session),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors at the start of the frame. Not ResetColor:
        // that goes to the terminal's own default, which may differ from
        // BASE_BG and cause line artifacts.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Playing view ──

    fn compose_game(&mut self, s: &Session, overlay: Option<&str>) {
        let buf_w = self.front.width;
        let cell = s.grid.cell_size;
        let world = s.active_world_config();

        let view_rows = ((VIEW_HEIGHT / cell) as usize)
            .min(self.term_h.saturating_sub(RESERVED_ROWS).max(1));
        let view_cols = s.grid.columns.min(buf_w / CELL_W);
        let cam_row = (s.camera_y / cell).floor() as i32;
        let hazard_row = (s.hazard_y / cell).floor() as i32;

        // ── HUD row ──
        let secs = (s.level_elapsed_ms / 1000.0) as u64;
        let hud = format!(
            " {}  {}-{} {}  ♥×{}  ●{}/10  {}:{:02} {}",
            s.config.general.game_title,
            s.current_world,
            s.current_level,
            world.name,
            s.lives,
            s.coins,
            secs / 60,
            secs % 60,
            self.powerup_status(s),
        );
        for x in 0..buf_w {
            self.front.set(x, HUD_ROW, Cell::new(' ', Color::White, HUD_BG));
        }
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // ── Map viewport ──
        let (lava_fg, lava_bg, lava_surface_bg) = hazard_palette(&world.hazard_color);
        let empty_bg = background_tint(&world.background);
        let player_col = s.grid.world_to_cell(s.player.x + s.player.width / 2.0);
        let player_row = s.grid.world_to_cell(s.player.y + s.player.height / 2.0);

        for vy in 0..view_rows {
            let wrow = cam_row + vy as i32;
            let row = MAP_ROW + vy;
            if row >= self.front.height {
                break;
            }

            for vx in 0..view_cols {
                let wcol = vx as i32;
                let col = vx * CELL_W;
                if col + 1 >= buf_w {
                    break;
                }

                if wrow >= hazard_row {
                    // Lava plane: a bright churning surface row, solid below.
                    let surface = wrow == hazard_row;
                    let shimmer = (self.tick / 4 + vx as u32 + wrow as u32) % 2 == 0;
                    let (ch, bg) = if surface {
                        (if shimmer { '▒' } else { '░' }, lava_surface_bg)
                    } else {
                        ('▓', lava_bg)
                    };
                    self.front.set(col, row, Cell::new(ch, lava_fg, bg));
                    self.front.set(col + 1, row, Cell::new(ch, lava_fg, bg));
                    continue;
                }

                if wcol == player_col && wrow == player_row {
                    self.compose_player(s, col, row);
                    continue;
                }

                self.compose_tile(s.grid.get(wcol, wrow), col, row, empty_bg);
            }
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + view_rows + 1;
        if msg_row < self.front.height && !s.message.is_empty() {
            let msg = format!(" ◈ {} ", s.message);
            for x in 0..buf_w {
                self.front.set(x, msg_row, Cell::new(' ', MSG_FG, MSG_BG));
            }
            self.front.put_str(0, msg_row, &msg, MSG_FG, MSG_BG);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + view_rows + 3;
        if help_row < self.front.height {
            let help = " A/D or ←→: Move   SPACE: Jump   ESC: Menu";
            self.front.put_str(0, help_row, help, Color::DarkGrey, Color::Reset);
        }

        // ── Level-complete overlay ──
        if let Some(text) = overlay {
            let cy = MAP_ROW + view_rows / 2;
            let border_top = "╔══════════════════════════════╗";
            let middle = format!("║   ★ {text:^20} ★   ║");
            let prompt = "║    SPACE: Onwards and up     ║";
            let border_bot = "╚══════════════════════════════╝";
            let width_cols = view_cols * CELL_W;
            let cx = width_cols.saturating_sub(border_top.chars().count()) / 2;
            let bg = Color::Rgb { r: 20, g: 60, b: 20 };
            self.front.put_str(cx, cy - 1, border_top, GOLD, bg);
            self.front.put_str(cx, cy, &middle, GOLD, bg);
            self.front.put_str(cx, cy + 1, prompt, GREEN, bg);
            self.front.put_str(cx, cy + 2, border_bot, GOLD, bg);
        }
    }

    fn powerup_status(&self, s: &Session) -> String {
        let p = &s.player;
        if p.has_jetpack {
            format!("JET {:.0}s", (p.jetpack_timer / 1000.0).ceil())
        } else if p.has_wings {
            format!("WINGS {:.0}s", (p.wings_timer / 1000.0).ceil())
        } else {
            String::new()
        }
    }

    fn compose_player(&mut self, s: &Session, col: usize, row: usize) {
        let fg = if s.player.has_jetpack {
            Color::Rgb { r: 120, g: 220, b: 255 }
        } else if s.player.has_wings {
            Color::Rgb { r: 230, g: 230, b: 255 }
        } else {
            GREEN
        };
        let (c0, c1) = if s.player.facing_right { ('█', '▌') } else { ('▐', '█') };
        self.front.set(col, row, Cell::new(c0, fg, Color::Reset));
        self.front.set(col + 1, row, Cell::new(c1, fg, Color::Reset));
    }

    fn compose_tile(&mut self, tile: Tile, col: usize, row: usize, empty_bg: Color) {
        let (c0, c1, fg, bg) = match tile {
            Tile::Empty => (' ', ' ', Color::Reset, empty_bg),
            Tile::Ground => ('█', '█', Color::Rgb { r: 150, g: 90, b: 50 }, Color::Rgb { r: 90, g: 55, b: 30 }),
            Tile::Ice => ('░', '░', Color::Rgb { r: 190, g: 225, b: 255 }, Color::Rgb { r: 60, g: 110, b: 170 }),
            Tile::Mud => ('▓', '▓', Color::Rgb { r: 90, g: 65, b: 35 }, Color::Rgb { r: 55, g: 40, b: 20 }),
            Tile::Spring => ('╱', '╲', Color::Rgb { r: 210, g: 210, b: 230 }, Color::Rgb { r: 60, g: 60, b: 80 }),
            Tile::VanishingGround => ('▒', '▒', Color::Rgb { r: 200, g: 160, b: 90 }, Color::Rgb { r: 100, g: 80, b: 45 }),
            Tile::Goal => ('◈', '◈', GOLD, Color::Rgb { r: 20, g: 60, b: 20 }),
            Tile::CoinPickup => ('●', ' ', GOLD, Color::Reset),
            Tile::JetpackPickup => ('♦', '♦', Color::Rgb { r: 120, g: 220, b: 255 }, Color::Reset),
            Tile::WingsPickup => ('«', '»', Color::Rgb { r: 230, g: 230, b: 255 }, Color::Reset),
        };
        self.front.set(col, row, Cell::new(c0, fg, bg));
        self.front.set(col + 1, row, Cell::new(c1, fg, bg));
    }

    // ── Static screens ──

    fn compose_menu(&mut self, s: &Session) {
        let title = [
            r" __   __    _                     ___                       ",
            r" \ \ / /__ | | __ __ _ _ _  ___  | __| ___ __  __ _  _ __  ___ ",
            r"  \ V / _ \| |/ _/ _` | ' \/ _ \ | _| (_-</ _|/ _` || '_ \/ -_)",
            r"   \_/\___/|_|\__\__,_|_||_\___/ |___|/__/\__|\__,_|| .__/\___|",
            r"                                                    |_|        ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_str(2, 2 + i, line, GOLD, Color::Reset);
        }

        let subtitle = "━━━  Outrun the rising lava  ━━━";
        let sx = 2 + title[1].chars().count().saturating_sub(subtitle.chars().count()) / 2;
        self.front.put_str(sx, 8, subtitle, RED, Color::Reset);

        let worlds: usize = s.config.worlds.len();
        let info = format!("      {} worlds  ♥×{} lives", worlds, s.config.general.starting_lives);
        self.front.put_str(8, 11, &info, Color::DarkGrey, Color::Reset);

        let help = [
            "Controls",
            "  A/D or ←→    Run",
            "  SPACE        Jump (hold for height)",
            "  ESC / Q      Quit",
            "",
            "  ● coins: 10 for an extra life",
            "  ♦ jetpack: hold SPACE to fly",
            "  «» wings: jump again in the air",
        ];
        for (i, line) in help.iter().enumerate() {
            let color = if i == 0 { GOLD } else { Color::White };
            self.front.put_str(8, 13 + i, line, color, Color::Reset);
        }

        // Blinking start prompt
        if (self.tick / 15) % 2 == 0 {
            let prompt = " ▸▸▸ PRESS SPACE TO START ◂◂◂ ";
            let row = (13 + help.len() + 2).min(self.front.height.saturating_sub(1));
            self.front.put_str(8, row, prompt, MSG_FG, MSG_BG);
        }
    }

    fn compose_game_over(&mut self, s: &Session) {
        let box_art = [
            "╔═══════════════════════════════╗",
            "║   ✕ THE LAVA GOT YOU ✕        ║",
            "╚═══════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(6, 4 + i, l, RED, Color::Reset);
        }
        let reached = format!("◈ Reached: {} (level {})", s.active_world_config().name, s.current_level);
        self.front.put_str(8, 9, &reached, Color::White, Color::Reset);
        self.front.put_str(8, 11, "▸ SPACE: Back to menu", GREEN, Color::Reset);
    }

    fn compose_win(&mut self, s: &Session) {
        let box_art = [
            "╔═══════════════════════════════════════╗",
            "║   ★ YOU ESCAPED THE VOLCANO! ★        ║",
            "╚═══════════════════════════════════════╝",
        ];
        for (i, l) in box_art.iter().enumerate() {
            self.front.put_str(4, 4 + i, l, GOLD, Color::Reset);
        }
        let worlds = s.config.worlds.len();
        let cleared = format!("◈ All {worlds} worlds climbed!");
        self.front.put_str(6, 9, &cleared, GREEN, Color::Reset);
        self.front.put_str(6, 11, "▸ SPACE: Back to menu", GREEN, Color::Reset);
    }
}

/// Per-world background asset id → a flat tint for open air. Unknown ids
/// degrade to the base background, never an error.
fn background_tint(name: &str) -> Color {
    match name {
        "1" => Color::Rgb { r: 32, g: 16, b: 12 },
        "2" => Color::Rgb { r: 12, g: 18, b: 32 },
        _ => Cell::BASE_BG,
    }
}

/// (foreground, deep bg, surface bg) for the named hazard color.
fn hazard_palette(name: &str) -> (Color, Color, Color) {
    match name {
        "blue" => (
            Color::Rgb { r: 150, g: 200, b: 255 },
            Color::Rgb { r: 20, g: 50, b: 140 },
            Color::Rgb { r: 60, g: 110, b: 220 },
        ),
        "green" => (
            Color::Rgb { r: 170, g: 255, b: 140 },
            Color::Rgb { r: 20, g: 90, b: 20 },
            Color::Rgb { r: 60, g: 170, b: 40 },
        ),
        "purple" => (
            Color::Rgb { r: 220, g: 160, b: 255 },
            Color::Rgb { r: 70, g: 20, b: 110 },
            Color::Rgb { r: 140, g: 60, b: 220 },
        ),
        // "red" and anything unrecognized
        _ => (
            Color::Rgb { r: 255, g: 200, b: 80 },
            Color::Rgb { r: 140, g: 20, b: 10 },
            Color::Rgb { r: 230, g: 80, b: 20 },
        ),
    }
}
