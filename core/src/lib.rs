//! Harness contract shared by every environment crate in the workspace.
//! An agent loop talks to environments only through these types: it sends
//! `ToolCall`s, gets `Observation`s back, and can ask for a `Snapshot`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Canonical tool call: tool name and JSON-serializable arguments.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: Json,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, args: Json) -> Self {
        Self { tool: tool.into(), args }
    }
}

/// Observation contract. Enforces presence of terminated/truncated; additional fields live in `data`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub terminated: bool,
    pub truncated: bool,
    /// Per-environment fields (grid_array, reward_last, etc.).
    #[serde(default)]
    pub data: Json,
}

impl Observation {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Snapshot contract for checkpoint/restore.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub version: u32,
    pub engine: String,
    pub data: Json,
}

/// Environment errors mapped to HTTP responses by services.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Core async environment trait.
#[async_trait]
pub trait Environment: Send + Sync {
    async fn initialize(&mut self) -> Result<Observation, EngineError>;
    async fn step(&mut self, tool_calls: Vec<ToolCall>) -> Result<Observation, EngineError>;
    async fn checkpoint(&self) -> Result<Snapshot, EngineError>;
    async fn terminate(&mut self) -> Result<Observation, EngineError>;
}

// ---------------------------------
// Environment factory + registry
// ---------------------------------

/// Config-aware factory for constructing environment instances.
pub type EnvConfigFactory = Arc<dyn Fn(Option<Json>) -> Result<Box<dyn Environment>, EngineError> + Send + Sync + 'static>;

/// Name → factory table. Built once at startup by whoever hosts the
/// environments and then shared read-only.
#[derive(Clone, Default)]
pub struct EnvRegistry {
    factories: HashMap<String, EnvConfigFactory>,
}

impl EnvRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a config-aware factory. Overwrites any existing entry.
    pub fn register(&mut self, name: &str, factory: EnvConfigFactory) {
        if self.factories.insert(name.to_string(), factory).is_some() {
            tracing::warn!(name, "environment factory replaced");
        } else {
            tracing::debug!(name, "environment factory registered");
        }
    }

    /// Instantiate a registered environment by name with optional JSON config.
    pub fn create(&self, name: &str, config: Option<Json>) -> Result<Box<dyn Environment>, EngineError> {
        let f = self
            .factories
            .get(name)
            .ok_or_else(|| EngineError::NotFound(format!("unsupported environment: {name}")))?;
        f(config)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for EnvRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvRegistry").field("names", &self.names()).finish()
    }
}

// -----------------------
// Reproducibility traits
// -----------------------

/// Engines that support snapshotting and restoration.
#[async_trait]
pub trait ReproducibleEngine: Send + Sync {
    async fn serialize_engine(&self) -> Result<Json, EngineError>;
    fn engine_name(&self) -> String;
}

/// Helper to build Snapshots from a ReproducibleEngine.
pub async fn make_snapshot(engine: &dyn ReproducibleEngine, version: u32) -> Result<Snapshot, EngineError> {
    let data = engine.serialize_engine().await?;
    let engine_name = engine.engine_name();
    Ok(Snapshot { version, engine: engine_name, data })
}

// -----------------------
// Tests
// -----------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NopEnv;
    #[async_trait]
    impl Environment for NopEnv {
        async fn initialize(&mut self) -> Result<Observation, EngineError> { Ok(Observation { terminated: false, truncated: false, data: Json::Null }) }
        async fn step(&mut self, _tool_calls: Vec<ToolCall>) -> Result<Observation, EngineError> { Ok(Observation { terminated: false, truncated: false, data: Json::Null }) }
        async fn checkpoint(&self) -> Result<Snapshot, EngineError> { Ok(Snapshot { version: 1, engine: "nop".into(), data: Json::Null }) }
        async fn terminate(&mut self) -> Result<Observation, EngineError> { Ok(Observation { terminated: true, truncated: false, data: Json::Null }) }
    }

    struct Counter(u32);
    #[async_trait]
    impl ReproducibleEngine for Counter {
        async fn serialize_engine(&self) -> Result<Json, EngineError> { Ok(json!({ "count": self.0 })) }
        fn engine_name(&self) -> String { "counter".into() }
    }

    #[test]
    fn env_registry_registers_and_lists() {
        let mut reg = EnvRegistry::new();
        assert!(reg.is_empty());
        reg.register("nop", Arc::new(|_cfg: Option<Json>| Ok(Box::new(NopEnv) as Box<dyn Environment>)));
        reg.register("alpha", Arc::new(|_cfg: Option<Json>| Ok(Box::new(NopEnv) as Box<dyn Environment>)));
        assert_eq!(reg.names(), vec!["alpha".to_string(), "nop".to_string()]);
        assert!(reg.contains("nop"));
        assert!(reg.create("nop", None).is_ok());
    }

    #[test]
    fn unknown_environment_is_not_found() {
        let reg = EnvRegistry::new();
        match reg.create("missing", None) {
            Err(EngineError::NotFound(msg)) => assert!(msg.contains("missing")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected NotFound"),
        }
    }

    #[test]
    fn factory_sees_config() {
        let mut reg = EnvRegistry::new();
        reg.register(
            "picky",
            Arc::new(|cfg: Option<Json>| match cfg {
                Some(_) => Ok(Box::new(NopEnv) as Box<dyn Environment>),
                None => Err(EngineError::Validation("config required".into())),
            }),
        );
        assert!(reg.create("picky", Some(json!({}))).is_ok());
        assert!(matches!(reg.create("picky", None), Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn snapshot_wraps_engine_payload() {
        let snap = make_snapshot(&Counter(3), 2).await.unwrap();
        assert_eq!(snap.version, 2);
        assert_eq!(snap.engine, "counter");
        assert_eq!(snap.data, json!({ "count": 3 }));
    }

    #[test]
    fn observation_done_combines_flags() {
        let o = Observation { terminated: false, truncated: true, data: Json::Null };
        assert!(o.done());
        let o = Observation { terminated: false, truncated: false, data: Json::Null };
        assert!(!o.done());
    }
}
