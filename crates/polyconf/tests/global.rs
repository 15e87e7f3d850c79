//! Process-wide registry
//!
//! One test function: the registry is shared by everything in this binary.

use polyconf::{global, DecodeError, RegistryError, Value};
use polyconf_test_utils::{init_tracing, Config, PlugA, PlugB, Plugin};
use pretty_assertions::assert_eq;

fn yaml(text: &str) -> Value {
    Value::from_yaml_str(text).unwrap()
}

#[test]
fn global_registry_lifecycle() {
    init_tracing();
    global::reset_registry();

    global::register_interface::<dyn Plugin>("kind1").unwrap();
    assert!(matches!(
        global::register_interface::<dyn Plugin>("other"),
        Err(RegistryError::DuplicateInterface { .. })
    ));
    global::register::<dyn Plugin, _>("kindA", || Box::new(PlugA::default())).unwrap();
    global::register::<dyn Plugin, _>("kindB", || Box::new(PlugB::default())).unwrap();
    assert!(global::with_registry(|registry| !registry.is_sealed()));

    let mut config = Config::default();
    global::decode(yaml("items:\n  one:\n    kind1: kindA\n    a: x\n"), &mut config).unwrap();
    assert_eq!(config.item::<PlugA>("one").unwrap().a, "x");

    // first decode closes registration
    assert!(global::with_registry(|registry| registry.is_sealed()));
    assert!(matches!(
        global::register::<dyn Plugin, _>("kindC", || Box::new(PlugA::default())),
        Err(RegistryError::Sealed { .. })
    ));

    global::reset_registry();
    assert!(global::with_registry(|registry| registry.is_empty()));

    let mut config = Config::default();
    let err = global::decode(yaml("items:\n  one:\n    kind1: kindA\n"), &mut config).unwrap_err();
    assert!(matches!(err, DecodeError::UnresolvedInterface { .. }));

    // decoding sealed the empty registry again
    assert!(matches!(
        global::register_interface::<dyn Plugin>("kind1"),
        Err(RegistryError::Sealed { .. })
    ));
    global::reset_registry();
    global::register_interface::<dyn Plugin>("kind").unwrap();
    global::register::<dyn Plugin, _>("b", || Box::new(PlugB::default())).unwrap();

    // factories may inspect the registry while a decode holds it
    global::register::<dyn Plugin, _>("a", || {
        let kinds = global::with_registry(|registry| {
            registry
                .descriptor::<dyn Plugin>()
                .map_or(0, |descriptor| descriptor.kind_count())
        });
        Box::new(PlugA { a: format!("{kinds} kinds") })
    })
    .unwrap();

    let mut config = Config::default();
    global::decode(
        yaml("items:\n  two:\n    kind: b\n    b: y\n  three:\n    kind: a\n"),
        &mut config,
    )
    .unwrap();
    assert_eq!(config.item::<PlugB>("two").unwrap().b, "y");
    assert_eq!(config.item::<PlugA>("three").unwrap().a, "2 kinds");
    assert_eq!(global::with_registry(|registry| registry.len()), 1);
}
