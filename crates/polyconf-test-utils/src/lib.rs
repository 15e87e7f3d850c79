//! Testing utilities for polyconf workspace
//!
//! Shared fixtures: plugin and logging interfaces with concrete variants,
//! registration helpers and tracing setup.

#![allow(missing_docs)]

use std::any::Any;
use std::collections::HashMap;
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Duration;

use polyconf::{decode_from_str, decode_struct, DecodeFields, Registry, RegistryError};

/// Install a test-friendly subscriber; `RUST_LOG` controls the filter
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// Plugins

pub trait Plugin: DecodeFields + Debug + Send + Sync {
    fn init(&self) -> String;
    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlugA {
    pub a: String,
}

impl Default for PlugA {
    fn default() -> Self {
        Self {
            a: "default a".to_string(),
        }
    }
}

decode_struct!(PlugA { a });

impl Plugin for PlugA {
    fn init(&self) -> String {
        self.a.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlugB {
    pub b: String,
    pub t: Duration,
    pub extra: HashMap<String, i64>,
}

impl Default for PlugB {
    fn default() -> Self {
        Self {
            b: "default".to_string(),
            t: Duration::ZERO,
            extra: HashMap::from([("dflt".to_string(), 42)]),
        }
    }
}

decode_struct!(PlugB { b, t, extra });

impl Plugin for PlugB {
    fn init(&self) -> String {
        self.b.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct Config {
    pub global_name: String,
    pub freq: Duration,
    pub reconnect_interval: Duration,
    pub items: HashMap<String, Box<dyn Plugin>>,
}

decode_struct!(Config {
    global_name => "globalname",
    freq,
    reconnect_interval => "reconnectinterval",
    items,
});

impl Config {
    /// Concrete plugin behind `items[name]`
    pub fn item<P: Plugin + 'static>(&self, name: &str) -> Option<&P> {
        self.items.get(name)?.as_any().downcast_ref::<P>()
    }
}

pub fn register_plugins(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_interface::<dyn Plugin>("kind1")?;
    registry.register::<dyn Plugin, _>("kindA", || Box::new(PlugA::default()))?;
    registry.register::<dyn Plugin, _>("kindB", || Box::new(PlugB::default()))?;
    Ok(())
}

pub const PLUGIN_CONFIG_YAML: &str = r#"
globalname: hugo
freq: 10ms
reconnectinterval: 100us

items:
  aaa:
    kind1: kindA
    a: "Aa"
  bbb:
    a: "Ab"
    kind1: kindA
  ccc:
    t: 42s
    kind1: kindB
    extra:
      X1: 1
      x2: 2
"#;

// Logging

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            _ => Err(format!("unknown log level '{s}'")),
        }
    }
}

decode_from_str!(LogLevel);

pub trait HandlerConfig: DecodeFields + Debug + Send + Sync {
    /// Where the handler writes
    fn destination(&self) -> String;
    fn as_any(&self) -> &dyn Any;
}

pub trait Formatter: DecodeFields + Debug + Send + Sync {
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GelfConfig {
    pub url: String,
}

decode_struct!(GelfConfig { url });

impl HandlerConfig for GelfConfig {
    fn destination(&self) -> String {
        self.url.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Default)]
pub struct FileConfig {
    pub path: PathBuf,
    pub format: Option<Box<dyn Formatter>>,
}

decode_struct!(FileConfig { path, format });

impl HandlerConfig for FileConfig {
    fn destination(&self) -> String {
        self.path.display().to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonFormatter {
    pub pretty: bool,
}

decode_struct!(JsonFormatter { pretty });

impl Formatter for JsonFormatter {
    fn name(&self) -> &'static str {
        "json"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextFormatter {
    pub template: String,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            template: "{level} {msg}".to_string(),
        }
    }
}

decode_struct!(TextFormatter { template });

impl Formatter for TextFormatter {
    fn name(&self) -> &'static str {
        "text"
    }
}

#[derive(Debug, Default)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub handlers: Vec<Box<dyn HandlerConfig>>,
}

decode_struct!(LoggerConfig { level, handlers });

impl LoggerConfig {
    /// Concrete handler at `index`
    pub fn handler<H: HandlerConfig + 'static>(&self, index: usize) -> Option<&H> {
        self.handlers.get(index)?.as_any().downcast_ref::<H>()
    }
}

pub fn register_logging(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_interface::<dyn HandlerConfig>("kind")?;
    registry.register::<dyn HandlerConfig, _>("gelf", || Box::new(GelfConfig::default()))?;
    registry.register::<dyn HandlerConfig, _>("file", || Box::new(FileConfig::default()))?;

    registry.register_interface::<dyn Formatter>("type")?;
    registry.register::<dyn Formatter, _>("json", || Box::new(JsonFormatter::default()))?;
    registry.register::<dyn Formatter, _>("text", || Box::new(TextFormatter::default()))?;
    Ok(())
}

pub const LOGGER_CONFIG_YAML: &str = r#"
level: INFO
handlers:
  - kind: gelf
    url: udp://myawesomehost:12201
  - kind: file
    path: /var/log/awesomeapp.log
"#;

pub fn plugin_registry() -> Registry {
    let mut registry = Registry::new();
    register_plugins(&mut registry).expect("plugin registration");
    registry
}

pub fn logging_registry() -> Registry {
    let mut registry = Registry::new();
    register_logging(&mut registry).expect("logging registration");
    registry
}
