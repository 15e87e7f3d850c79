//! Logger configuration with a list of handlers and nested formatters

use std::path::Path;

use polyconf::{decode, DecodeError, Value};
use polyconf_test_utils::{
    init_tracing, logging_registry, FileConfig, GelfConfig, LogLevel, LoggerConfig,
    LOGGER_CONFIG_YAML,
};
use pretty_assertions::assert_eq;

fn decode_logger(text: &str) -> Result<LoggerConfig, DecodeError> {
    let registry = logging_registry();
    let mut config = LoggerConfig::default();
    decode(&registry, Value::from_yaml_str(text).unwrap(), &mut config)?;
    Ok(config)
}

#[test]
fn handlers_decode_in_order() {
    init_tracing();
    let config = decode_logger(LOGGER_CONFIG_YAML).unwrap();

    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.handlers.len(), 2);
    assert_eq!(
        config.handler::<GelfConfig>(0).unwrap().url,
        "udp://myawesomehost:12201"
    );
    assert_eq!(
        config.handler::<FileConfig>(1).unwrap().path,
        Path::new("/var/log/awesomeapp.log")
    );

    let destinations: Vec<String> = config.handlers.iter().map(|h| h.destination()).collect();
    assert_eq!(
        destinations,
        vec!["udp://myawesomehost:12201", "/var/log/awesomeapp.log"]
    );
}

#[test]
fn handler_without_kind_reports_its_index() {
    let err = decode_logger("handlers:\n  - kind: gelf\n    url: u\n  - path: /tmp/x\n").unwrap_err();
    assert!(err.is_discriminator_error());
    assert_eq!(err.path().to_string(), "handlers[1]");
}

#[test]
fn nested_interfaces_resolve_with_their_own_key() {
    let text = r#"
level: debug
handlers:
  - kind: file
    path: /tmp/app.log
    format:
      type: text
      template: "{msg}"
  - kind: file
    path: /tmp/app.json
    format:
      type: json
"#;
    let config = decode_logger(text).unwrap();
    assert_eq!(config.level, LogLevel::Debug);

    let text_file = config.handler::<FileConfig>(0).unwrap();
    let format = text_file.format.as_ref().unwrap();
    assert_eq!(format.name(), "text");
    assert!(format!("{format:?}").contains("{msg}"));

    let json_file = config.handler::<FileConfig>(1).unwrap();
    assert_eq!(json_file.format.as_ref().unwrap().name(), "json");
}

#[test]
fn absent_nested_interface_stays_none() {
    let config = decode_logger("handlers:\n  - kind: file\n    path: /tmp/a\n").unwrap();
    assert!(config.handler::<FileConfig>(0).unwrap().format.is_none());
}

#[test]
fn nested_errors_carry_the_full_path() {
    let unknown = "handlers:\n  - kind: file\n    path: /tmp/a\n    format:\n      type: xml\n";
    let err = decode_logger(unknown).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownKind { ref kind, .. } if kind == "xml"));
    assert_eq!(err.path().to_string(), "handlers[0].format");

    let unused = "handlers:\n  - kind: file\n    path: /tmp/a\n    format:\n      type: json\n      indent: 2\n";
    let err = decode_logger(unused).unwrap_err();
    match err {
        DecodeError::UnusedKeys { path, target, keys } => {
            assert_eq!(path.to_string(), "handlers[0].format");
            assert!(target.ends_with("JsonFormatter"));
            assert_eq!(keys, vec!["indent".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn level_goes_through_its_parser() {
    let err = decode_logger("level: LOUD\n").unwrap_err();
    assert!(matches!(err, DecodeError::Parse { .. }));
    assert_eq!(err.path().to_string(), "level");
    assert!(err.to_string().contains("unknown log level 'LOUD'"));
}

#[test]
fn extra_handler_keys_are_rejected() {
    let err = decode_logger("handlers:\n  - kind: gelf\n    url: u\n    kind2: x\n").unwrap_err();
    match err {
        DecodeError::UnusedKeys { path, keys, .. } => {
            assert_eq!(path.to_string(), "handlers[0]");
            assert_eq!(keys, vec!["kind2".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}
