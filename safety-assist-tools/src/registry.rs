use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::persona::{Persona, ToolCategory};
use crate::tools::{FunctionDeclaration, Tool};

#[derive(Clone)]
struct Entry {
    tool: Arc<dyn Tool>,
    category: ToolCategory,
}

/// In-memory tool catalogue keyed by name and tagged by category.
///
/// Shared process-wide behind an `Arc`; reads take a shared lock and
/// registration replaces entries by name.
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Entry>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    /// Register `tool` under `category`. A tool with the same name is replaced.
    pub fn register(&self, tool: Arc<dyn Tool>, category: ToolCategory) -> &Self {
        let name = tool.name().to_string();
        debug!(tool = %name, %category, "registering tool");
        self.tools.write().insert(name, Entry { tool, category });
        self
    }

    pub fn register_many<I>(&self, tools: I) -> &Self
    where
        I: IntoIterator<Item = (Arc<dyn Tool>, ToolCategory)>,
    {
        let mut map = self.tools.write();
        for (tool, category) in tools {
            map.insert(tool.name().to_string(), Entry { tool, category });
        }
        self
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).map(|e| e.tool.clone())
    }

    pub fn category_of(&self, name: &str) -> Option<ToolCategory> {
        self.tools.read().get(name).map(|e| e.category)
    }

    /// Tool and category under a single read of the catalogue.
    pub fn resolve(&self, name: &str) -> Option<(Arc<dyn Tool>, ToolCategory)> {
        self.tools
            .read()
            .get(name)
            .map(|e| (e.tool.clone(), e.category))
    }

    /// Tools in `category`, sorted by name.
    pub fn get_by_category(&self, category: ToolCategory) -> Vec<Arc<dyn Tool>> {
        self.select(|c| c == category)
    }

    /// Tools visible to `persona`, sorted by name.
    pub fn get_for_persona(&self, persona: Persona) -> Vec<Arc<dyn Tool>> {
        self.select(|c| persona.allows(c))
    }

    /// Function declarations for the tools visible to `persona`.
    pub fn declarations_for_persona(&self, persona: Persona) -> Vec<FunctionDeclaration> {
        self.get_for_persona(persona)
            .iter()
            .map(|tool| tool.declaration())
            .collect()
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn count(&self) -> usize {
        self.tools.read().len()
    }

    /// Remove every registration.
    pub fn clear(&self) {
        self.tools.write().clear();
    }

    fn select(&self, keep: impl Fn(ToolCategory) -> bool) -> Vec<Arc<dyn Tool>> {
        let map = self.tools.read();
        let mut entries: Vec<(&String, &Entry)> =
            map.iter().filter(|(_, e)| keep(e.category)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, e)| e.tool.clone()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
