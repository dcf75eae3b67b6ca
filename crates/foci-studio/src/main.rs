use anyhow::Result;

use foci_editor::{Editor, EditorConfig, Scene};
use foci_engine::logging::{init_logging, LoggingConfig};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    println!();
    println!("  foci - circles and two-focus ellipses");
    println!();
    println!("  left drag     move a circle / resize an ellipse");
    println!("  right click   add a circle");
    println!("  E             ellipse through the two newest circles");
    println!("  wheel, + / -  zoom");
    println!("  Esc           quit");
    println!();

    let mut scene = Scene::new();
    let a = scene.add_circle(0.3, 0.2, 0.05);
    let b = scene.add_circle(0.7, 0.5, 0.05);
    scene.add_ellipse(a, b, 1.0)?;

    let mut config = EditorConfig::default();
    config.render.lit_circles = std::env::var_os("FOCI_LIT_CIRCLES").is_some();

    Editor::new()
        .title("foci studio")
        .size(1024.0, 768.0)
        .config(config)
        .scene(scene)
        .run()?;

    log::info!("editor closed");
    Ok(())
}
