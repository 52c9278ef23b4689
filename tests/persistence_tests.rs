use std::fs;

use next_cvar::{
    Bound, CVarDef, CVarFlags, DirectorySelector, Error, Format, LoadReport, Registry, TypeTag,
    Value,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

fn temp_config_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

fn declare(registry: &Registry, name: &str, initial: impl Into<Value>, flags: CVarFlags) {
    let mut def = CVarDef::new(name, initial);
    def.flags = flags;
    registry.create(&def).expect("declaration");
}

/// `a.b` Int 5, `a.c` Bool true and a hidden `x` String "hi", all archived.
fn sample_registry() -> Registry {
    let registry = Registry::new();
    declare(&registry, "a.b", 5, CVarFlags::ARCHIVE);
    declare(&registry, "a.c", true, CVarFlags::ARCHIVE);
    declare(&registry, "x", "hi", CVarFlags::ARCHIVE | CVarFlags::HIDDEN);
    registry
}

#[test]
fn test_json_round_trip_restores_entries_exactly() {
    let text = sample_registry()
        .save_to_string(Format::Json)
        .expect("save json");

    let restored = Registry::new();
    let report = restored
        .load_from_str(&text, Format::Json)
        .expect("load json");
    assert_eq!(
        report,
        LoadReport {
            updated: 0,
            created: 3,
            skipped: Vec::new(),
        }
    );

    assert_eq!(restored.get("a.b").expect("a.b"), Value::Int(5));
    assert_eq!(restored.get("a.c").expect("a.c"), Value::Bool(true));
    assert_eq!(restored.get("x").expect("x"), Value::String("hi".into()));

    let hidden = restored.descriptor("x").expect("descriptor");
    assert_eq!(hidden.flags, CVarFlags::ARCHIVE | CVarFlags::HIDDEN);
    assert_eq!(hidden.declared_type, TypeTag::String);
    assert_eq!(
        restored.descriptor("a.b").expect("descriptor").flags,
        CVarFlags::ARCHIVE
    );
}

#[test]
fn test_json_keeps_metadata() {
    let registry = Registry::new();
    let def = CVarDef::builder()
        .name("render.fov")
        .initial(90.0)
        .description("Field of view")
        .flags(CVarFlags::ARCHIVE | CVarFlags::ADVANCED)
        .min(30)
        .max(120.0)
        .build()
        .expect("valid def");
    registry.create(&def).expect("create");
    registry.set("render.fov", 75.0).expect("set");

    let text = registry.save_to_string(Format::Json).expect("save");
    let restored = Registry::new();
    restored
        .load_from_str(&text, Format::Json)
        .expect("load");

    let descriptor = restored.descriptor("render.fov").expect("descriptor");
    assert_eq!(descriptor.description, "Field of view");
    assert_eq!(descriptor.flags, CVarFlags::ARCHIVE | CVarFlags::ADVANCED);
    assert_eq!(descriptor.min, Some(Bound::Float(30.0)));
    assert_eq!(descriptor.max, Some(Bound::Float(120.0)));
    assert_eq!(restored.get("render.fov").expect("get"), Value::Float(75.0));
}

#[test]
fn test_ini_skips_hidden_entries() {
    let text = sample_registry()
        .save_to_string(Format::Ini)
        .expect("save ini");
    assert_eq!(text, "[a]\nb = 5\nc = true\n");
}

#[test]
fn test_ini_writes_sections_in_order() {
    let registry = Registry::new();
    declare(&registry, "render.fov", 90.0, CVarFlags::ARCHIVE);
    declare(&registry, "audio.volume", 0.5, CVarFlags::ARCHIVE);
    declare(&registry, "fullscreen", false, CVarFlags::ARCHIVE);
    declare(&registry, "render.clear", [0.1, 0.2, 0.3, 1.0], CVarFlags::ARCHIVE);
    declare(&registry, "render.scratch", 1, CVarFlags::empty());

    let text = registry.save_to_string(Format::Ini).expect("save ini");
    assert_eq!(
        text,
        "[audio]\nvolume = 0.5\n\n[global]\nfullscreen = false\n\n[render]\nfov = 90.0\nclear = 0.1, 0.2, 0.3, 1.0\n"
    );
}

#[test]
fn test_ini_load_guesses_types() {
    let registry = Registry::new();
    let text = "[section]\ncount=5\nratio=2.5\nflag=true\nname=hello\npos=1.0, 2.0, 3.0\n";
    let report = registry.load_from_str(text, Format::Ini).expect("load");
    assert_eq!(report.created, 5);

    assert_eq!(registry.get("section.count").expect("count"), Value::Int(5));
    assert_eq!(registry.get("section.ratio").expect("ratio"), Value::Float(2.5));
    assert_eq!(registry.get("section.flag").expect("flag"), Value::Bool(true));
    assert_eq!(
        registry.get("section.name").expect("name"),
        Value::String("hello".into())
    );
    assert_eq!(
        registry.get("section.pos").expect("pos"),
        Value::Vec3([1.0, 2.0, 3.0])
    );

    for name in ["section.count", "section.pos"] {
        let flags = registry.descriptor(name).expect("descriptor").flags;
        assert_eq!(flags, CVarFlags::ARCHIVE | CVarFlags::UNINITIALIZED);
    }
}

#[rstest]
#[case("true", Value::Bool(true))]
#[case("false", Value::Bool(false))]
#[case("-12", Value::Int(-12))]
#[case("2.5", Value::Float(2.5))]
#[case("1e3", Value::Float(1000.0))]
#[case("1, 2", Value::Vec2([1.0, 2.0]))]
#[case("0.5,0.5,0.5,1", Value::Vec4([0.5, 0.5, 0.5, 1.0]))]
#[case("hello world", Value::String("hello world".into()))]
#[case("", Value::String(String::new()))]
fn test_guess_value_ladder(#[case] text: &str, #[case] expected: Value) {
    assert_eq!(next_cvar::guess_value(text), expected);
}

#[test]
fn test_ini_global_section_maps_to_bare_names() {
    let registry = Registry::new();
    declare(&registry, "fullscreen", false, CVarFlags::ARCHIVE);

    let report = registry
        .load_from_str("[global]\nfullscreen = true\n", Format::Ini)
        .expect("load");
    assert_eq!(report.updated, 1);
    assert_eq!(registry.get("fullscreen").expect("get"), Value::Bool(true));
}

#[test]
fn test_ini_type_mismatch_is_skipped() {
    let registry = Registry::new();
    declare(&registry, "render.vsync", true, CVarFlags::ARCHIVE);
    declare(&registry, "render.fov", 90.0, CVarFlags::ARCHIVE);

    let report = registry
        .load_from_str("[render]\nvsync = 3\nfov = 75.5\n", Format::Ini)
        .expect("load");

    assert_eq!(report.skipped, vec!["render.vsync".to_string()]);
    assert_eq!(report.updated, 1);
    assert_eq!(registry.get("render.vsync").expect("get"), Value::Bool(true));
    assert_eq!(registry.get("render.fov").expect("get"), Value::Float(75.5));
}

#[test]
fn test_ini_malformed_lines_are_skipped() {
    let registry = Registry::new();
    let text = "\
; settings
[net]
port = 8080
this line has no equals
[broken
 = orphan
retries = 3
";
    let report = registry.load_from_str(text, Format::Ini).expect("load");
    assert_eq!(report.created, 2);
    assert_eq!(registry.get("net.port").expect("port"), Value::Int(8080));
    assert_eq!(registry.get("net.retries").expect("retries"), Value::Int(3));
}

#[test]
fn test_load_overwrites_read_only_entries() {
    let registry = Registry::new();
    declare(
        &registry,
        "build.channel",
        "stable",
        CVarFlags::ARCHIVE | CVarFlags::READ_ONLY,
    );

    registry
        .load_from_str("[build]\nchannel = beta\n", Format::Ini)
        .expect("load");
    assert_eq!(
        registry.get("build.channel").expect("get"),
        Value::String("beta".into())
    );
    assert!(matches!(
        registry.set("build.channel", "nightly"),
        Err(Error::ReadOnly(_))
    ));
}

#[test]
fn test_placeholder_is_adopted_by_declaration() {
    let registry = Registry::new();
    registry
        .load_from_str("[render]\nfov = 75\nmode = fast\n", Format::Ini)
        .expect("load");
    assert_eq!(registry.get("render.fov").expect("placeholder"), Value::Int(75));

    // Loaded as an int, declared as a float: the value is widened.
    let fov = registry
        .declare("render.fov", 90.0, "Field of view", CVarFlags::ARCHIVE)
        .expect("declare fov");
    assert_eq!(fov.get().expect("get"), 75.0);
    assert_eq!(fov.initial().expect("initial"), 90.0);

    let descriptor = fov.descriptor().expect("descriptor");
    assert_eq!(descriptor.flags, CVarFlags::ARCHIVE);
    assert_eq!(descriptor.declared_type, TypeTag::Float);
    assert_eq!(descriptor.description, "Field of view");

    // Loaded as a string, declared as an int: the default wins.
    let mode = registry
        .declare("render.mode", 2_i64, "", CVarFlags::ARCHIVE)
        .expect("declare mode");
    assert_eq!(mode.get().expect("get"), 2);

    assert_eq!(registry.len(), 2);
}

#[test]
fn test_toml_round_trip() {
    let registry = Registry::new();
    declare(&registry, "render.fov", 90.0, CVarFlags::ARCHIVE);
    declare(&registry, "render.vsync", true, CVarFlags::ARCHIVE);
    declare(&registry, "player.name", "ranger", CVarFlags::ARCHIVE);
    declare(&registry, "player.spawn", [1.0, 0.0, -4.5], CVarFlags::ARCHIVE);
    declare(&registry, "lives", 3, CVarFlags::ARCHIVE);
    declare(&registry, "debug.secret", 1, CVarFlags::ARCHIVE | CVarFlags::HIDDEN);

    let text = registry.save_to_string(Format::Toml).expect("save toml");
    assert!(!text.contains("secret"));

    let restored = Registry::new();
    let report = restored
        .load_from_str(&text, Format::Toml)
        .expect("load toml");
    assert_eq!(report.created, 5);

    assert_eq!(restored.get("render.fov").expect("fov"), Value::Float(90.0));
    assert_eq!(restored.get("render.vsync").expect("vsync"), Value::Bool(true));
    assert_eq!(
        restored.get("player.name").expect("name"),
        Value::String("ranger".into())
    );
    assert_eq!(
        restored.get("player.spawn").expect("spawn"),
        Value::Vec3([1.0, 0.0, -4.5])
    );
    assert_eq!(restored.get("lives").expect("lives"), Value::Int(3));
}

#[test]
fn test_save_and_load_file_appends_extension() {
    let dir = temp_config_dir();
    let registry = sample_registry();
    registry.set("a.b", 42).expect("set");

    let written = registry
        .save(dir.path().join("settings"), Format::Ini)
        .expect("save");
    assert_eq!(written, dir.path().join("settings.ini"));
    assert!(written.exists());
    assert_eq!(
        fs::read_to_string(&written).expect("read back"),
        "[a]\nb = 42\nc = true\n"
    );

    let fresh = Registry::new();
    declare(&fresh, "a.b", 5, CVarFlags::ARCHIVE);
    let report = fresh
        .load(dir.path().join("settings"), Format::Ini)
        .expect("load");
    assert_eq!(report.updated, 1);
    assert_eq!(report.created, 1);
    assert_eq!(fresh.get("a.b").expect("get"), Value::Int(42));
}

#[test]
fn test_save_creates_missing_directories() {
    let dir = temp_config_dir();
    let path = dir.path().join("nested").join("deeper").join("settings.json");

    let written = sample_registry().save(&path, Format::Json).expect("save");
    assert_eq!(written, path);
    assert!(path.exists());
}

#[test]
fn test_save_overwrites_previous_file() {
    let dir = temp_config_dir();
    let path = dir.path().join("settings.toml");
    let registry = Registry::new();
    declare(&registry, "volume", 1.0, CVarFlags::ARCHIVE);

    registry.save(&path, Format::Toml).expect("first save");
    registry.set("volume", 0.25).expect("set");
    registry.save(&path, Format::Toml).expect("second save");

    let restored = Registry::new();
    restored.load(&path, Format::Toml).expect("load");
    assert_eq!(restored.get("volume").expect("get"), Value::Float(0.25));
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = temp_config_dir();
    let registry = Registry::new();
    let result = registry.load(dir.path().join("missing"), Format::Json);
    assert!(matches!(result, Err(Error::Io(_))));
    assert!(registry.is_empty());
}

#[test]
fn test_unreadable_json_document_is_an_error() {
    let registry = Registry::new();
    let result = registry.load_from_str("{ not json", Format::Json);
    assert!(matches!(result, Err(Error::Json(_))));
    assert!(registry.is_empty());
}

#[test]
fn test_selected_paths() {
    let dir = temp_config_dir();
    let selector = DirectorySelector::new(dir.path());
    let registry = sample_registry();

    let written = registry
        .save_selected(&selector, "profile", Format::Json)
        .expect("save selected");
    assert_eq!(written, dir.path().join("profile.json"));

    let restored = Registry::new();
    restored
        .load_selected(&selector, "profile.json", Format::Json)
        .expect("load selected");
    assert_eq!(restored.get("a.b").expect("get"), Value::Int(5));

    assert!(matches!(
        registry.save_selected(&selector, "../escape", Format::Json),
        Err(Error::NotFound(_))
    ));
}

#[rstest]
#[case("settings.ini", Format::Ini)]
#[case("settings.toml", Format::Toml)]
#[case("settings.json", Format::Json)]
#[case("settings", Format::Json)]
fn test_format_from_path(#[case] path: &str, #[case] expected: Format) {
    assert_eq!(Format::from_path(path), expected);
}

#[rstest]
#[case(Format::Ini)]
#[case(Format::Toml)]
fn test_global_category_is_not_confused_with_bare_names(#[case] format: Format) {
    let registry = Registry::new();
    declare(&registry, "volume", 1.0, CVarFlags::ARCHIVE);
    declare(&registry, "global.volume", 0.5, CVarFlags::ARCHIVE);

    let text = registry.save_to_string(format).expect("save");
    assert_eq!(text.matches("volume").count(), 1);

    let restored = Registry::new();
    let report = restored.load_from_str(&text, format).expect("load");
    assert_eq!(report.created, 1);
    assert_eq!(restored.get("volume").expect("bare name"), Value::Float(1.0));
    assert!(!restored.contains("global.volume"));
}

#[test]
fn test_json_keeps_global_category() {
    let registry = Registry::new();
    declare(&registry, "volume", 1.0, CVarFlags::ARCHIVE);
    declare(&registry, "global.volume", 0.5, CVarFlags::ARCHIVE);

    let text = registry.save_to_string(Format::Json).expect("save");
    let restored = Registry::new();
    restored.load_from_str(&text, Format::Json).expect("load");

    assert_eq!(restored.get("volume").expect("bare"), Value::Float(1.0));
    assert_eq!(
        restored.get("global.volume").expect("prefixed"),
        Value::Float(0.5)
    );
}

fn assert_close(actual: &Value, expected: &Value) {
    assert_eq!(actual.type_tag(), expected.type_tag());
    let floats = |value: &Value| match value {
        Value::Float(x) => Some(vec![*x]),
        other => other.components().map(<[f64]>::to_vec),
    };
    match (floats(actual), floats(expected)) {
        (Some(actual), Some(expected)) => {
            assert_eq!(actual.len(), expected.len());
            for (a, e) in actual.iter().zip(&expected) {
                assert!((a - e).abs() < 1e-9, "{a} differs from {e}");
            }
        }
        _ => assert_eq!(actual, expected),
    }
}

#[rstest]
#[case("flag", Value::Bool(false))]
#[case("count", Value::Int(-7))]
#[case("ratio", Value::Float(0.1))]
#[case("whole", Value::Float(90.0))]
#[case("title", Value::String("hello world".into()))]
#[case("offset", Value::Vec2([1.5, -2.0]))]
#[case("position", Value::Vec3([0.1, 0.2, 0.3]))]
#[case("tint", Value::Vec4([0.0, 0.5, 1.0, 1e-3]))]
fn test_ini_round_trip_into_empty_registry(#[case] key: &str, #[case] value: Value) {
    let dir = temp_config_dir();
    let name = format!("round.{key}");
    let registry = Registry::new();
    declare(&registry, &name, value.clone(), CVarFlags::ARCHIVE);

    let path = registry
        .save(dir.path().join("settings"), Format::Ini)
        .expect("save");

    let restored = Registry::new();
    let report = restored.load(&path, Format::Ini).expect("load");
    assert_eq!(report.created, 1);
    assert_close(&restored.get(&name).expect("restored"), &value);
}

#[test]
fn test_load_does_not_create_lock_file() {
    let dir = temp_config_dir();
    let path = dir.path().join("handwritten.ini");
    fs::write(&path, "[net]\nport = 8080\n").expect("write settings");

    let registry = Registry::new();
    registry.load(&path, Format::Ini).expect("load");

    assert_eq!(registry.get("net.port").expect("port"), Value::Int(8080));
    assert!(!dir.path().join("handwritten.ini.lock").exists());
}
