use flight_hud::{GlyphAtlas, HudSettings};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of the baked atlas, relative to the working directory.
const DEFAULT_OUTPUT: &str = "assets/textures/flight_hud_atlas.png";

/// Print CLI usage.
fn print_usage(program: &str) {
    eprintln!(
        "Usage: {program} [--output <path>] [--set <key>=<value>]...\n\
         Default output: {DEFAULT_OUTPUT}\n\
         --set accepts the same keys as the HUD settings, e.g. rectPrograde=64,128,0,64."
    );
}

/// Parsed command line.
struct BakeArgs {
    /// Destination PNG path.
    output: PathBuf,
    /// Settings overrides as `(key, value)` pairs.
    overrides: Vec<(String, String)>,
}

/// Parse simple CLI args for output path and settings overrides.
fn parse_args() -> Result<BakeArgs, String> {
    let mut args = BakeArgs {
        output: PathBuf::from(DEFAULT_OUTPUT),
        overrides: Vec::new(),
    };

    let mut it = env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--output" => {
                let value = it
                    .next()
                    .ok_or_else(|| "--output requires a value".to_string())?;
                args.output = PathBuf::from(value);
            }
            "--set" => {
                let value = it
                    .next()
                    .ok_or_else(|| "--set requires a value".to_string())?;
                let (key, value) = value
                    .split_once('=')
                    .ok_or_else(|| format!("--set expects key=value, got {value}"))?;
                args.overrides.push((key.to_string(), value.to_string()));
            }
            "--help" | "-h" => {
                let program = env::args()
                    .next()
                    .unwrap_or_else(|| "bake_glyph_atlas".to_string());
                print_usage(&program);
                std::process::exit(0);
            }
            _ => return Err(format!("Unknown argument: {arg}")),
        }
    }

    Ok(args)
}

/// Ensure output parent directory exists.
fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    fs::create_dir_all(parent)
        .map_err(|e| format!("Failed to create output directory {}: {e}", parent.display()))
}

fn main() -> Result<(), String> {
    let args = parse_args()?;

    let mut settings = HudSettings::default();
    for (key, value) in &args.overrides {
        settings.apply(key, value).map_err(|e| e.to_string())?;
    }
    let atlas = GlyphAtlas::with_overrides(&settings.glyph_rects);
    let image = atlas.render_image();

    ensure_parent_dir(&args.output)?;
    image
        .save(&args.output)
        .map_err(|e| format!("Failed to write {}: {e}", args.output.display()))?;

    println!(
        "Glyph atlas generated: {} ({}x{})",
        args.output.display(),
        image.width(),
        image.height()
    );
    Ok(())
}
