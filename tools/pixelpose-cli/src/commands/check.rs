//! Check the scene tool setup.

use pixelpose_common::AppConfig;
use pixelpose_render_engine::{command_exists, SceneRenderer, SceneToolBackend};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("PixelPose System Check");
    println!("{}", "=".repeat(50));

    let (program, args) = match config.scene_tool.program() {
        Ok(parts) => parts,
        Err(e) => {
            println!("[WARN] {e}");
            return Ok(());
        }
    };
    println!("     Scene tool: {} {}", program, args.join(" "));

    if command_exists(program) {
        println!("[OK] {program} found");
    } else {
        println!("[WARN] {program} not found on PATH");
    }

    match config.scene_tool.script() {
        Some(script) if script.is_file() => println!("[OK] Script {} found", script.display()),
        Some(script) => println!(
            "[WARN] Script {} not found. PixelPose does not ship one; point scene_tool.command at your own.",
            script.display()
        ),
        None => {}
    }

    let backend = SceneToolBackend::new(config.scene_tool.clone());
    println!();
    if backend.is_available() {
        println!("Scene tool is available. PixelPose is ready.");
    } else {
        println!("Scene tool is missing. Install it or set scene_tool.command in the config.");
    }

    Ok(())
}
