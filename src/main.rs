/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use config::GameConfig;
use sim::session::{Phase, Session};
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(16);

fn main() {
    let config = GameConfig::load();
    let title = config.general.game_title.clone();

    let mut session = Session::new(config);

    // Optional: a level file argument jumps straight into that level.
    if let Some(path) = std::env::args().nth(1) {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error: could not read {path}: {e}");
                return;
            }
        };
        if let Err(e) = session.start_level_from_text(&text) {
            eprintln!("Error: {path}: {e}");
            return;
        }
        session.phase = Phase::Playing;
    }

    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut session, &mut renderer);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing {title}!");
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();

        if kb.ctrl_c_pressed() {
            break;
        }
        if kb.quit_pressed() {
            // Esc in the menu quits; anywhere else it abandons the run.
            if session.phase == Phase::Menu {
                break;
            }
            session.return_to_menu();
        }

        // Wall-clock dt in ms; timers scale with it, velocities stay
        // per-frame.
        let now = Instant::now();
        let dt_ms = now.duration_since(last_frame).as_secs_f64() * 1000.0;
        last_frame = now;

        session.update(dt_ms, kb.frame_input());

        renderer.render(session)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}
