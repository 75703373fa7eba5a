//! Shared test helpers for integration tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use hatch::{
    Block, ClassId, ConfigLayer, HatchError, HatchOptions, HatchResult, HookResolver, HookSet,
    LayeredConfig, Plugin, Tap, Value,
};
use hatch_plugin::plugin::plugin_list;

/// Class identity of [`Server`].
pub const SERVER: ClassId = ClassId::new("server");

/// Ordered record of what ran.
pub type Log = Arc<Mutex<Vec<String>>>;

pub fn log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Plugin that records its `apply` and, optionally, listens on the server's
/// `created` hook.
#[derive(Debug)]
pub struct Recording {
    pub name: &'static str,
    pub watch_server: bool,
    pub fail: bool,
    pub log: Log,
}

impl Recording {
    pub fn shared(name: &'static str, log: &Log) -> Arc<dyn Plugin> {
        Arc::new(Self {
            name,
            watch_server: false,
            fail: false,
            log: log.clone(),
        })
    }

    pub fn watching(name: &'static str, log: &Log) -> Arc<dyn Plugin> {
        Arc::new(Self {
            name,
            watch_server: true,
            fail: false,
            log: log.clone(),
        })
    }
}

impl Plugin for Recording {
    fn name(&self) -> &str {
        self.name
    }

    fn class(&self) -> Option<ClassId> {
        self.watch_server.then_some(SERVER)
    }

    fn hooks(&self) -> Option<HookSet> {
        if !self.watch_server {
            return None;
        }
        let log = self.log.clone();
        let name = self.name;
        Some(HookSet::new().on(
            "created",
            Tap::sync(name, move |args| {
                let outlet = args.get("outlet").and_then(Value::as_str).unwrap_or("?");
                log.lock().unwrap().push(format!("{name}:created:{outlet}"));
                Ok(())
            }),
        ))
    }

    fn apply(&self, _hooks: &HookResolver<'_>) -> HatchResult<()> {
        self.log.lock().unwrap().push(format!("{}:apply", self.name));
        if self.fail {
            return Err(HatchError::plugin(format!("{} refused to apply", self.name)));
        }
        Ok(())
    }
}

/// Block whose outlet is its configured address.
pub struct Server {
    pub log: Log,
}

#[async_trait]
impl Block for Server {
    fn class(&self) -> ClassId {
        SERVER
    }

    fn config_key(&self) -> Option<&str> {
        Some("server")
    }

    fn create(&self, config: &Value, _options: &HatchOptions) -> HatchResult<Value> {
        let host = config
            .lookup(["host"])
            .and_then(Value::as_str)
            .unwrap_or("localhost");
        let port = config.lookup(["port"]).and_then(Value::as_i64).unwrap_or(80);
        Ok(Value::from(format!("{host}:{port}")))
    }

    async fn run(&self, _config: &Value, options: &HatchOptions) -> HatchResult<Value> {
        self.log.lock().unwrap().push("server:run".to_string());
        Ok(Value::from(format!("served in {}", options.phase)))
    }
}

/// A `hatch.plugins` layer.
pub fn plugin_layer(origin: &str, plugins: Vec<Arc<dyn Plugin>>) -> ConfigLayer {
    ConfigLayer::empty(origin).with("hatch.plugins", plugin_list(plugins))
}

pub fn stack(layers: Vec<ConfigLayer>) -> LayeredConfig {
    LayeredConfig::new(layers)
}
