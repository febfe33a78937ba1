/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to built-in defaults if the file is missing or incomplete;
/// the defaults carry the game's built-in tuning.
///
/// The loaded `GameConfig` is immutable and injected into the session at
/// construction; nothing reads configuration through globals.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public config structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub general: GeneralConfig,
    pub physics: PhysicsConfig,
    /// Ordered: worlds[0] is world 1.
    pub worlds: Vec<WorldConfig>,
    /// Edge length of a square tile cell in world units.
    pub cell_size: f64,
    pub levels_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub game_title: String,
    pub starting_lives: u32,
    pub levels_dir: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub friction: f64,
    pub move_speed: f64,
    pub acceleration_factor: f64,
    /// Negative = upward.
    pub jump_force: f64,
    pub max_fall_speed: f64,
    pub gravity: f64,
    pub spring_force: f64,
    pub jetpack_duration_ms: f64,
    pub jetpack_force: f64,
    pub wings_duration_ms: f64,
    pub ice_friction: f64,
    pub mud_friction: f64,
    pub mud_jump_modifier: f64,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub name: String,
    /// Named color for the lava plane, mapped by the renderer.
    pub hazard_color: String,
    /// World units per frame the hazard rises (frame-coupled on purpose).
    pub hazard_speed: f64,
    pub gravity_modifier: f64,
    pub background: String,
    pub level_count: u32,
}

// ── Defaults (built-in tuning) ──

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            game_title: "Volcano Escape".to_string(),
            starting_lives: 5,
            levels_dir: "levels".to_string(),
        }
    }
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            friction: 0.8,
            move_speed: 4.0,
            acceleration_factor: 0.2,
            jump_force: -12.0,
            max_fall_speed: 6.0,
            gravity: 0.3,
            spring_force: -18.0,
            jetpack_duration_ms: 3000.0,
            jetpack_force: -0.95,
            wings_duration_ms: 5000.0,
            ice_friction: 0.96,
            mud_friction: 0.4,
            mud_jump_modifier: 0.67,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            name: "Unnamed World".to_string(),
            hazard_color: "red".to_string(),
            hazard_speed: 0.1,
            gravity_modifier: 1.0,
            background: String::new(),
            level_count: 1,
        }
    }
}

fn default_worlds() -> Vec<WorldConfig> {
    vec![
        WorldConfig {
            name: "The Volcanic Core".to_string(),
            hazard_color: "red".to_string(),
            hazard_speed: 0.1,
            gravity_modifier: 1.0,
            background: "1".to_string(),
            level_count: 2,
        },
        WorldConfig {
            name: "The Icy Depths".to_string(),
            hazard_color: "blue".to_string(),
            hazard_speed: 0.15,
            gravity_modifier: 1.0,
            background: "2".to_string(),
            level_count: 1,
        },
    ]
}

fn default_cell_size() -> f64 {
    40.0
}

// ── TOML schema ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    general: GeneralConfig,
    #[serde(default)]
    physics: PhysicsConfig,
    #[serde(default = "default_worlds")]
    worlds: Vec<WorldConfig>,
    #[serde(default)]
    tiles: TomlTiles,
}

#[derive(Deserialize, Debug)]
struct TomlTiles {
    #[serde(default = "default_cell_size")]
    size: f64,
}

impl Default for TomlTiles {
    fn default() -> Self {
        TomlTiles { size: default_cell_size() }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[PathBuf::from(".")])
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse config from TOML text (used by tests; never panics on
    /// unknown keys, falls back per-field).
    pub fn from_str(text: &str) -> Result<Self, toml::de::Error> {
        let toml_cfg: TomlConfig = toml::from_str(text)?;
        Ok(GameConfig::from_toml(toml_cfg, &[PathBuf::from(".")]))
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve the levels directory against the search dirs.
        let dir_name = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(dir_name).is_absolute() {
            PathBuf::from(dir_name)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(dir_name))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(dir_name))
        };

        let worlds = if toml_cfg.worlds.is_empty() {
            default_worlds()
        } else {
            toml_cfg.worlds
        };

        GameConfig {
            general: toml_cfg.general,
            physics: toml_cfg.physics,
            worlds,
            cell_size: toml_cfg.tiles.size,
            levels_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
