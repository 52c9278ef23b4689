use next_cvar::{CVarDef, CVarFlags, DirectorySelector, Format, Registry};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempfile::tempdir()?;
    let selector = DirectorySelector::new(temp_dir.path());

    let registry = Registry::new();
    let fov = registry.declare("render.fov", 90.0, "Field of view", CVarFlags::ARCHIVE)?;
    registry.declare("player.name", "ranger".to_string(), "", CVarFlags::ARCHIVE)?;
    registry.create(
        &CVarDef::builder()
            .name("net.token")
            .initial("secret")
            .flags(CVarFlags::ARCHIVE | CVarFlags::HIDDEN)
            .build()?,
    )?;
    fov.set(110.0)?;

    // Each format appends its extension when the name has none
    for format in [Format::Ini, Format::Json, Format::Toml] {
        let path = registry.save_selected(&selector, "settings", format)?;
        println!("--- {} ---", path.display());
        println!("{}", std::fs::read_to_string(&path)?);
    }

    // Loading into a fresh registry creates placeholders for unknown names
    let restored = Registry::new();
    let report = restored.load_selected(&selector, "settings", Format::Ini)?;
    println!("ini load: {report:?}");
    println!("render.fov = {}", restored.get("render.fov")?);

    // A later declaration adopts the loaded value
    let fov = restored.declare("render.fov", 90.0, "Field of view", CVarFlags::ARCHIVE)?;
    println!("declared render.fov = {}", fov.get()?);

    // JSON carries full metadata, hidden entries included
    let exact = Registry::new();
    exact.load_selected(&selector, "settings", Format::Json)?;
    println!("net.token flags = {:?}", exact.descriptor("net.token")?.flags);

    Ok(())
}
