/// kview terminal viewer
///
/// Shows the letter K in a perspective view and three orthographic
/// projections, driven from a keyboard panel.
/// Controls:
///   - Tab / Up / Down: Select a transform control
///   - Left / Right: Move the selected slider
///   - 0-9, '-', '.': Type a value, Enter to apply
///   - P: Toggle projections, R: Reset, Y: Copy matrix
///   - WASD / Z / X / C: Orbit, zoom and reset the main camera
///   - Q/ESC: Quit
use clap::Parser;
use kview_core::{Geometry, ViewerConfig};
use kview_terminal::TerminalApp;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "kview-terminal")]
#[command(about = "Interactive transform viewer for a 3D letter K", long_about = None)]
struct Args {
    /// Draw the letter as a wireframe outline instead of a lit solid
    #[arg(long)]
    wireframe: bool,

    /// Start with the orthographic projections hidden
    #[arg(long)]
    hide_projections: bool,

    /// Vertical field of view of the main view, in degrees
    #[arg(long, default_value = "45")]
    fov: f32,

    /// Ambient light level between 0 and 1
    #[arg(long, default_value = "0.18")]
    ambient: f32,

    /// Delay before a terminal resize is applied, in milliseconds
    #[arg(long, default_value = "120")]
    debounce_ms: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = ViewerConfig {
        fov_degrees: args.fov,
        ambient: args.ambient,
        resize_debounce: Duration::from_millis(args.debounce_ms),
        ..ViewerConfig::default()
    };

    let geometry = if args.wireframe {
        Geometry::wireframe(&config)
    } else {
        Geometry::solid(&config)
    };
    log::info!(
        "starting with {} vertices, projections {}",
        geometry.vertex_count(),
        if args.hide_projections { "hidden" } else { "shown" }
    );

    let mut app = TerminalApp::new(geometry, config, !args.hide_projections)?;
    app.run()?;

    println!("Final transform:\n{}", app.matrix_text());
    Ok(())
}
