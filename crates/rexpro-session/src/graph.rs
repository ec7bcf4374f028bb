use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A graph object that can be bound into a session.
pub trait Graph: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;
}

/// The application context: the catalogue of graphs a session may bind.
pub trait GraphProvider: Send + Sync {
    fn graph(&self, name: &str) -> Option<Arc<dyn Graph>>;

    /// Names of all configured graphs, sorted.
    fn graph_names(&self) -> Vec<String>;
}

/// Graph known only by name; the storage behind it lives elsewhere.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedGraph {
    name: String,
}

impl NamedGraph {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Graph for NamedGraph {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Graph catalogue fixed at startup.
#[derive(Debug, Default)]
pub struct StaticGraphs {
    graphs: HashMap<String, Arc<dyn Graph>>,
}

impl StaticGraphs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogue with one [`NamedGraph`] per name.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graphs = Self::new();
        for name in names {
            graphs.register(Arc::new(NamedGraph::new(name)));
        }
        graphs
    }

    /// Register a graph under its own name, replacing any previous one.
    pub fn register(&mut self, graph: Arc<dyn Graph>) {
        let _ = self.graphs.insert(graph.name().to_owned(), graph);
    }
}

impl GraphProvider for StaticGraphs {
    fn graph(&self, name: &str) -> Option<Arc<dyn Graph>> {
        self.graphs.get(name).cloned()
    }

    fn graph_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.graphs.keys().cloned().collect();
        names.sort();
        names
    }
}
