//! Plugin activations and their apply order.
//!
//! Build plugins are applied in sequence, and some only work when others
//! ran first (the framework plugin must come after the Android and Kotlin
//! plugins). An activation lists those prerequisites in `after`; the apply
//! order is the topological order of that graph with ties broken by name,
//! so it depends only on the set of activations and never on how they were
//! written down.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

/// Plugin activation as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginSpec {
    /// Bare plugin id: `"com.android.application"`
    Simple(String),

    /// Detailed specification with ordering constraints
    Detailed(DetailedPluginSpec),
}

/// Detailed plugin activation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DetailedPluginSpec {
    /// Plugin id
    pub name: String,

    /// Plugins that must be applied before this one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,
}

impl PluginSpec {
    /// The plugin id.
    pub fn name(&self) -> &str {
        match self {
            PluginSpec::Simple(name) => name,
            PluginSpec::Detailed(d) => &d.name,
        }
    }

    /// Convert to an activation.
    pub fn to_activation(&self) -> PluginActivation {
        match self {
            PluginSpec::Simple(name) => PluginActivation::new(name.clone()),
            PluginSpec::Detailed(d) => {
                PluginActivation::new(d.name.clone()).with_after(d.after.clone())
            }
        }
    }
}

/// A named build-system extension enabled for this build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginActivation {
    name: String,
    after: Vec<String>,
}

impl PluginActivation {
    /// Create an activation with no ordering constraints.
    pub fn new(name: impl Into<String>) -> Self {
        PluginActivation {
            name: name.into(),
            after: Vec::new(),
        }
    }

    /// Set the plugins that must be applied first. Sorted and de-duplicated.
    pub fn with_after(mut self, mut after: Vec<String>) -> Self {
        after.sort();
        after.dedup();
        self.after = after;
        self
    }

    /// Get the plugin id.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the prerequisites.
    pub fn after(&self) -> &[String] {
        &self.after
    }

    /// Canonical document form: a bare string when unconstrained.
    pub fn to_spec(&self) -> PluginSpec {
        if self.after.is_empty() {
            PluginSpec::Simple(self.name.clone())
        } else {
            PluginSpec::Detailed(DetailedPluginSpec {
                name: self.name.clone(),
                after: self.after.clone(),
            })
        }
    }
}

/// Reason an apply order could not be computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// `plugin` lists `missing` in `after`, but `missing` is not activated.
    UnknownReference { plugin: String, missing: String },

    /// The listed plugins wait on each other.
    Cycle { members: Vec<String> },
}

/// Compute the apply order of a set of activations.
///
/// Repeated names collapse onto their first activation. All unknown
/// references and cycles are reported together.
pub fn apply_order(plugins: &[PluginActivation]) -> Result<Vec<String>, Vec<OrderError>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    let mut errors = Vec::new();

    for plugin in plugins {
        index
            .entry(plugin.name())
            .or_insert_with(|| graph.add_node(plugin.name()));
    }

    for plugin in plugins {
        let to = index[plugin.name()];
        for prereq in plugin.after() {
            match index.get(prereq.as_str()) {
                Some(&from) => {
                    if !graph.contains_edge(from, to) {
                        graph.add_edge(from, to, ());
                    }
                }
                None => errors.push(OrderError::UnknownReference {
                    plugin: plugin.name().to_string(),
                    missing: prereq.clone(),
                }),
            }
        }
    }

    // Kahn's algorithm over a min-heap of names keeps the order stable.
    let mut in_degree: HashMap<NodeIndex, usize> = graph
        .node_indices()
        .map(|n| (n, graph.neighbors_directed(n, Direction::Incoming).count()))
        .collect();
    let mut ready: BinaryHeap<Reverse<(&str, NodeIndex)>> = in_degree
        .iter()
        .filter(|(_, d)| **d == 0)
        .map(|(&n, _)| Reverse((graph[n], n)))
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse((name, node))) = ready.pop() {
        order.push(name.to_string());
        for next in graph.neighbors_directed(node, Direction::Outgoing) {
            if let Some(d) = in_degree.get_mut(&next) {
                *d -= 1;
                if *d == 0 {
                    ready.push(Reverse((graph[next], next)));
                }
            }
        }
    }

    if order.len() < graph.node_count() {
        for scc in tarjan_scc(&graph) {
            let self_loop = scc.len() == 1 && graph.contains_edge(scc[0], scc[0]);
            if scc.len() > 1 || self_loop {
                let mut members: Vec<String> = scc.iter().map(|&n| graph[n].to_string()).collect();
                members.sort();
                errors.push(OrderError::Cycle { members });
            }
        }
    }

    if errors.is_empty() {
        Ok(order)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activation(name: &str, after: &[&str]) -> PluginActivation {
        PluginActivation::new(name).with_after(after.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_unconstrained_order_is_by_name() {
        let plugins = vec![activation("zeta", &[]), activation("alpha", &[]), activation("mid", &[])];
        assert_eq!(apply_order(&plugins).unwrap(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_framework_after_android_and_kotlin() {
        let plugins = vec![
            activation("dev.flutter.flutter-gradle-plugin", &["com.android.application", "org.jetbrains.kotlin.android"]),
            activation("org.jetbrains.kotlin.android", &["com.android.application"]),
            activation("com.android.application", &[]),
            activation("com.google.gms.google-services", &[]),
        ];
        let order = apply_order(&plugins).unwrap();
        let pos = |n: &str| order.iter().position(|o| o == n).unwrap();
        assert!(pos("com.android.application") < pos("org.jetbrains.kotlin.android"));
        assert!(pos("org.jetbrains.kotlin.android") < pos("dev.flutter.flutter-gradle-plugin"));
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn test_order_ignores_declaration_order() {
        let a = vec![activation("b", &["a"]), activation("a", &[]), activation("c", &[])];
        let b = vec![activation("c", &[]), activation("a", &[]), activation("b", &["a"])];
        assert_eq!(apply_order(&a).unwrap(), apply_order(&b).unwrap());
    }

    #[test]
    fn test_unknown_reference() {
        let plugins = vec![activation("kotlin", &["android"])];
        let errors = apply_order(&plugins).unwrap_err();
        assert_eq!(
            errors,
            vec![OrderError::UnknownReference {
                plugin: "kotlin".into(),
                missing: "android".into()
            }]
        );
    }

    #[test]
    fn test_cycle_detection() {
        let plugins = vec![
            activation("a", &["b"]),
            activation("b", &["a"]),
            activation("c", &["a"]),
            activation("d", &[]),
        ];
        let errors = apply_order(&plugins).unwrap_err();
        assert_eq!(
            errors,
            vec![OrderError::Cycle {
                members: vec!["a".into(), "b".into()]
            }]
        );
    }

    #[test]
    fn test_self_reference_is_cycle() {
        let errors = apply_order(&[activation("a", &["a"])]).unwrap_err();
        assert!(matches!(&errors[0], OrderError::Cycle { members } if members == &vec!["a".to_string()]));
    }

    #[test]
    fn test_duplicates_collapse() {
        let plugins = vec![activation("a", &[]), activation("a", &[])];
        assert_eq!(apply_order(&plugins).unwrap(), vec!["a"]);
    }

    #[test]
    fn test_to_spec_canonical_form() {
        assert_eq!(activation("a", &[]).to_spec(), PluginSpec::Simple("a".into()));
        let spec = activation("c", &["b", "a", "b"]).to_spec();
        match spec {
            PluginSpec::Detailed(d) => assert_eq!(d.after, vec!["a", "b"]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
