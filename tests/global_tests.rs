//! The global registry is process-wide, so its whole lifecycle runs in one
//! test.

use next_cvar::{CVarFlags, Format, Registry, Value, global};

#[test]
fn test_global_lifecycle() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("settings");

    assert!(!global::is_initialized());
    let registry = global::init(16).expect("init");
    assert!(global::is_initialized());
    assert_eq!(registry.capacity(), 16);

    let volume = registry
        .declare("audio.volume", 1.0, "", CVarFlags::ARCHIVE)
        .expect("declare");

    // A second init keeps the existing registry.
    let again = global::init(4).expect("second init");
    assert_eq!(again.capacity(), 16);
    assert_eq!(
        global::registry().expect("registry").get("audio.volume").expect("get"),
        Value::Float(1.0)
    );

    volume.set(0.5).expect("set");
    drop(registry);
    drop(again);

    global::shutdown(Some((&path, Format::Json))).expect("shutdown");
    assert!(!global::is_initialized());
    assert!(dir.path().join("settings.json").exists());
    assert!(volume.get().is_err());

    let restored = Registry::new();
    restored
        .load(dir.path().join("settings.json"), Format::Json)
        .expect("load saved globals");
    assert_eq!(restored.get("audio.volume").expect("get"), Value::Float(0.5));

    // Lazily recreated, empty, on next use.
    let fresh = global::registry().expect("lazy registry");
    assert!(!fresh.contains("audio.volume"));
    global::shutdown(None).expect("final shutdown");
}
