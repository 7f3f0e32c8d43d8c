//! Build script for pixeltag-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates badge.toml and generates the compiled-in `BADGE_CONFIG`

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Panel limits of the SSD1680 (gates x sources)
const MAX_PANEL_WIDTH: i64 = 296;
const MAX_PANEL_HEIGHT: i64 = 128;

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    generate_config(&config);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Print a boxed error banner and abort the build
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        lines
            .iter()
            .map(|e| format_error_line(e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Format one error line with box drawing
fn format_error_line(line: &str) -> String {
    let truncated = if line.chars().count() > 62 {
        format!("{}...", line.chars().take(59).collect::<String>())
    } else {
        line.to_string()
    };
    format!("║  • {:<62} ║", truncated)
}

/// Read and parse badge.toml
fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=badge.toml");

    let config_path = Path::new("badge.toml");
    if !config_path.exists() {
        fail(
            "badge.toml not found!",
            &[
                "The firmware requires a badge.toml configuration file.".to_string(),
                "Create one in the pixeltag-firmware directory.".to_string(),
            ],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read badge.toml", &[e.to_string()]),
    };

    match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in badge.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    }
}

fn integer(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn string<'a>(config: &'a toml::Value, section: &str, key: &str) -> Option<&'a str> {
    config.get(section)?.get(key)?.as_str()
}

/// Map a badge.toml action name to its `ButtonAction` variant
fn action_variant(name: &str) -> Option<&'static str> {
    match name {
        "none" => Some("None"),
        "cycle" => Some("CycleMode"),
        "halt" => Some("Halt"),
        "blank_and_halt" => Some("BlankAndHalt"),
        _ => None,
    }
}

/// Required integer fields with their allowed ranges
const INTEGER_FIELDS: &[(&str, &str, i64, i64)] = &[
    ("timing", "debounce_ms", 1, 1_000),
    ("timing", "double_click_ms", 50, 5_000),
    ("timing", "cooldown_ms", 0, 60_000),
    ("timing", "awake_timeout_ms", 1_000, 86_400_000),
    ("timing", "advertise_window_ms", 0, 86_400_000),
    ("timing", "battery_notify_ms", 1_000, 3_600_000),
    ("timing", "sleep_wake_ms", 0, 86_400_000),
    ("panel", "width", 8, MAX_PANEL_WIDTH),
    ("panel", "height", 8, MAX_PANEL_HEIGHT),
];

/// Validate badge.toml contents
fn validate_config(config: &toml::Value) {
    let mut errors = Vec::new();

    for section in ["timing", "buttons", "panel"] {
        if config.get(section).and_then(|s| s.as_table()).is_none() {
            errors.push(format!("Missing [{}] section", section));
        }
    }

    for &(section, key, min, max) in INTEGER_FIELDS {
        match integer(config, section, key) {
            Some(v) if v < min || v > max => {
                errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
            }
            Some(_) => {}
            None => errors.push(format!("[{}] missing integer '{}'", section, key)),
        }
    }

    for key in ["single", "double"] {
        match string(config, "buttons", key) {
            Some(name) if action_variant(name).is_none() => errors.push(format!(
                "[buttons] {} must be none, cycle, halt or blank_and_halt",
                key
            )),
            Some(_) => {}
            None => errors.push(format!("[buttons] missing '{}'", key)),
        }
    }

    // A debounced press must fit inside the double-click window
    if let (Some(debounce), Some(window)) = (
        integer(config, "timing", "debounce_ms"),
        integer(config, "timing", "double_click_ms"),
    ) {
        if debounce >= window {
            errors.push("[timing] debounce_ms must be below double_click_ms".to_string());
        }
    }

    if !errors.is_empty() {
        fail("Invalid badge.toml configuration", &errors);
    }

    println!("cargo:warning=badge.toml validated successfully");
}

/// Write `badge_config.rs` into OUT_DIR
fn generate_config(config: &toml::Value) {
    let timing = |key| integer(config, "timing", key).unwrap_or_default();
    let action = |key| {
        string(config, "buttons", key)
            .and_then(action_variant)
            .unwrap_or("None")
    };

    let source = format!(
        "/// Compiled-in badge configuration (from badge.toml)\n\
         pub const BADGE_CONFIG: BadgeConfig = BadgeConfig {{\n\
         \x20   debounce_ms: {},\n\
         \x20   double_click_ms: {},\n\
         \x20   cooldown_ms: {},\n\
         \x20   awake_timeout_ms: {},\n\
         \x20   advertise_window_ms: {},\n\
         \x20   battery_notify_ms: {},\n\
         \x20   actions: ButtonActions {{\n\
         \x20       single: ButtonAction::{},\n\
         \x20       double: ButtonAction::{},\n\
         \x20   }},\n\
         \x20   panel_width: {},\n\
         \x20   panel_height: {},\n\
         }};\n\
         \n\
         /// Timer wake period while asleep; 0 disables timer wakes\n\
         pub const SLEEP_WAKE_MS: u64 = {};\n",
        timing("debounce_ms"),
        timing("double_click_ms"),
        timing("cooldown_ms"),
        timing("awake_timeout_ms"),
        timing("advertise_window_ms"),
        timing("battery_notify_ms"),
        action("single"),
        action("double"),
        integer(config, "panel", "width").unwrap_or_default(),
        integer(config, "panel", "height").unwrap_or_default(),
        timing("sleep_wake_ms"),
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("badge_config.rs")).unwrap();
    f.write_all(source.as_bytes()).unwrap();
}
