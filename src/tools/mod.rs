//! Tool registry and the tools shipped with the agent.
//!
//! A tool takes one string input and returns one string output. The
//! registry is built once and is read-only while turns run, so it can be
//! shared across concurrent turns behind an `Arc`.

mod weather;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

pub use weather::{GetWeather, DEFAULT_WEATHER_URL};

/// A named function the model can ask the agent to run.
///
/// Implementations may be invoked from several turns at once.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn execute(&self, input: &str) -> anyhow::Result<String>;
}

/// Tool name and description, for prompts and listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

type ToolFn = dyn Fn(&str) -> anyhow::Result<String> + Send + Sync;

/// Adapter turning a plain closure into a [`Tool`].
pub struct FnTool {
    name: String,
    description: String,
    func: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            func: Box::new(func),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn execute(&self, input: &str) -> anyhow::Result<String> {
        (self.func)(input)
    }
}

/// Name-keyed set of tools.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in tools.
    pub fn with_defaults(weather_url: &str) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GetWeather::new(weather_url)));
        registry
    }

    /// Register a tool. A tool with the same name is replaced.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::warn!("Replacing already registered tool: {}", name);
        }
    }

    pub fn register_fn<F>(&mut self, name: &str, description: &str, func: F)
    where
        F: Fn(&str) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.register(Arc::new(FnTool::new(name, description, func)));
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Tool listing sorted by name.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        let mut tools: Vec<ToolInfo> = self
            .tools
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.tools.keys().collect();
        names.sort();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_tool_is_invoked_through_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register_fn("shout", "Uppercases input", |input| Ok(input.to_uppercase()));

        let tool = registry.lookup("shout").expect("tool registered");
        assert_eq!(tool.execute("hi").await.unwrap(), "HI");
        assert!(registry.lookup("whisper").is_none());
    }

    #[tokio::test]
    async fn pure_tool_gives_same_output_for_same_input() {
        let mut registry = ToolRegistry::new();
        registry.register_fn("len", "Counts bytes", |input| Ok(input.len().to_string()));

        let first = registry.lookup("len").unwrap().execute("Lisbon").await.unwrap();
        let second = registry.lookup("len").unwrap().execute("Lisbon").await.unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn duplicate_name_replaces_previous_tool() {
        let mut registry = ToolRegistry::new();
        registry.register_fn("t", "first", |_| Ok("1".into()));
        registry.register_fn("t", "second", |_| Ok("2".into()));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list_tools()[0].description, "second");
    }

    #[test]
    fn list_tools_is_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register_fn("zeta", "z", |_| Ok(String::new()));
        registry.register_fn("alpha", "a", |_| Ok(String::new()));

        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn defaults_include_weather() {
        let registry = ToolRegistry::with_defaults("https://wttr.in");
        assert!(registry.lookup("get_weather").is_some());
        assert!(!registry.is_empty());
    }
}
