mod util;

use engine::{config::StrategyKind, error::InjectError};
use tempfile::TempDir;
use util::builder::ClassBuilder;
use util::{field_constant, method_code, output_path, parse_output, returned_string, run_one};

#[test]
fn overlay_redefines_a_static_final_field_in_place() {
    let classes = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    ClassBuilder::new("com.example.BuildInfo")
        .static_final_string_field("VERSION", "1.0")
        .static_final_string_field("VENDOR", "example")
        .write_to(classes.path());

    run_one(
        classes.path(),
        out.path(),
        StrategyKind::Overlay,
        "com.example.BuildInfo.VERSION",
        "2.0.0",
    )
    .unwrap();

    let patched = parse_output(out.path(), "com.example.BuildInfo");
    assert_eq!(field_constant(&patched, "VERSION").as_deref(), Some("2.0.0"));
    assert_eq!(field_constant(&patched, "VENDOR").as_deref(), Some("example"));

    // Redefinition binds in place; the field keeps its slot in the table
    assert_eq!(patched.field_index("VERSION").unwrap(), Some(0));
}

#[test]
fn overlay_on_a_non_final_instance_field_injects_the_declared_initialiser_only() {
    let classes = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let builder = ClassBuilder::new("com.example.Config")
        .instance_string_field("endpoint")
        .constructor_assigning("endpoint", "http://localhost");
    builder.write_to(classes.path());
    let original = builder.build();

    run_one(
        classes.path(),
        out.path(),
        StrategyKind::Overlay,
        "com.example.Config.endpoint",
        "http://injected",
    )
    .unwrap();

    let patched = parse_output(out.path(), "com.example.Config");

    // The declared initialiser now carries the injected value ...
    assert_eq!(
        field_constant(&patched, "endpoint").as_deref(),
        Some("http://injected")
    );

    // ... but the constructor still assigns the original literal, which is
    // what a fresh instance observes at runtime
    let original_init = method_code(&original, "<init>");
    let patched_init = method_code(&patched, "<init>");
    assert_eq!(original_init.code, patched_init.code);
}

#[test]
fn overlay_refuses_ambiguous_method_targets_without_mutation() {
    let classes = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    ClassBuilder::new("com.example.Overloads")
        .string_method("getValue", "()Ljava/lang/String;", "a")
        .string_method("getValue", "(I)Ljava/lang/String;", "b")
        .write_to(classes.path());

    let err = run_one(
        classes.path(),
        out.path(),
        StrategyKind::Overlay,
        "com.example.Overloads.getValue",
        "c",
    )
    .unwrap_err();

    assert!(matches!(err, InjectError::AmbiguousMethodTarget { .. }));
    assert!(!output_path(out.path(), "com.example.Overloads").exists());
}

#[test]
fn both_strategies_agree_on_method_patches() {
    for strategy in [StrategyKind::Pool, StrategyKind::Overlay] {
        let classes = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();

        ClassBuilder::new("com.example.BuildInfo")
            .string_method("getVersion", "()Ljava/lang/String;", "dev")
            .write_to(classes.path());

        run_one(
            classes.path(),
            out.path(),
            strategy,
            "com.example.BuildInfo.getVersion",
            "7.7.7",
        )
        .unwrap();

        let patched = parse_output(out.path(), "com.example.BuildInfo");
        let code = method_code(&patched, "getVersion");
        assert_eq!(returned_string(&patched, &code), "7.7.7");
    }
}
