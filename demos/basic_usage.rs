use next_cvar::{CVarFlags, CVarGroup, Error, Handle, Registry};

/// Render settings declared together.
#[derive(CVarGroup)]
#[cvar(prefix = "render")]
struct RenderSettings {
    #[cvar(default = 90.0, description = "Field of view", archive, min = 30, max = 120)]
    fov: Handle<f64>,
    #[cvar(default = true, description = "Wait for vertical sync", archive)]
    vsync: Handle<bool>,
    #[cvar(default = [0.1, 0.1, 0.1, 1.0], advanced)]
    clear_color: Handle<[f64; 4]>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = Registry::new();

    // Declare a group of entries; the handles cache their slots
    let render = RenderSettings::bind(&registry)?;

    // Or declare a single entry
    let build = registry.declare("build.id", 1042_i64, "Build number", CVarFlags::READ_ONLY)?;

    render.fov.set(105.0)?;
    render.clear_color.update(|c| c[3] = 0.5)?;
    println!("fov = {}", render.fov.get()?);
    println!("vsync = {}", render.vsync.get()?);

    // Tooling reaches the same entries by name
    registry.set("render.vsync", false)?;
    println!("vsync via handle = {}", render.vsync.get()?);

    // Entries keep their declared type
    match registry.set("render.fov", "wide") {
        Err(Error::TypeMismatch { .. }) => println!("type mismatch rejected (expected)"),
        other => println!("unexpected result: {other:?}"),
    }

    // Read-only entries reject writes
    match build.set(1) {
        Err(e) => println!("write rejected (expected): {e}"),
        Ok(()) => println!("unexpected write"),
    }

    println!("All entries:");
    print!("{}", registry.debug_dump());

    Ok(())
}
