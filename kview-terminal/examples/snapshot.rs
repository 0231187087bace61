//! Render one frame without a terminal session and print it as text.
//!
//! Usage: cargo run --example snapshot -- [rx] [ry] [rz]

use kview_core::{Control, Controller, Geometry, MultiViewRenderer, ViewKind, ViewerConfig};
use kview_terminal::renderer::ascii_frame;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = ViewerConfig::default();
    let renderer = MultiViewRenderer::uniform(&config, 72, 48);
    let mut controller = Controller::new(Geometry::solid(&config), renderer);

    let rotations = [Control::RotateX, Control::RotateY, Control::RotateZ];
    for (control, arg) in rotations.into_iter().zip(std::env::args().skip(1)) {
        controller.submit_text(control, &arg)?;
    }
    controller.flush();

    for kind in ViewKind::ALL {
        if let Some(viewport) = controller.renderer().viewport(kind) {
            println!("== {} ==", kind.label());
            print!("{}", ascii_frame(viewport.framebuffer()));
        }
    }
    println!("{}", controller.matrix_text());
    Ok(())
}
