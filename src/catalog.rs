//! Named schema catalogs
//!
//! A catalog declares several schemas at once; they may refer to each other
//! by name through [`SchemaRef::Named`](crate::SchemaRef::Named). Building the catalog:
//!
//! 1. rejects duplicate declarations, then checks each declaration's own
//!    shape (type, population, distinct entry names, entry element schemas)
//! 2. rejects references to undeclared names
//! 3. walks the reference graph depth-first, failing on any schema that is
//!    reached again while still on the traversal stack
//! 4. builds every schema after the schemas it refers to, so each reference
//!    becomes a shared `Arc<Schema>`

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, warn};

use crate::error::{Result, SchemaError};
use crate::schema::{Schema, SchemaBuilder};

/// Built schemas, addressable by name
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    schemas: Vec<(String, Arc<Schema>)>,
    index: HashMap<String, usize>,
}

impl SchemaCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.index.get(name).map(|&i| &self.schemas[i].1)
    }

    /// Names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Schema>)> {
        self.schemas.iter().map(|(name, schema)| (name.as_str(), schema))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

/// Accumulates named schema declarations
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    declared: Vec<(String, SchemaBuilder)>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(mut self, name: impl Into<String>, schema: SchemaBuilder) -> Self {
        self.declared.push((name.into(), schema));
        self
    }

    pub fn build(self) -> Result<SchemaCatalog> {
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

        for (name, _) in &self.declared {
            if nodes.contains_key(name) {
                return Err(SchemaError::DuplicateSchema { name: name.clone() });
            }
            nodes.insert(name.clone(), graph.add_node(name.clone()));
        }

        for (name, builder) in &self.declared {
            builder
                .check_declaration()
                .map_err(|source| SchemaError::Declaration {
                    name: name.clone(),
                    source: Box::new(source),
                })?;
        }

        for (name, builder) in &self.declared {
            let from = nodes[name];
            for target in builder.references() {
                let Some(&to) = nodes.get(target) else {
                    return Err(SchemaError::Declaration {
                        name: name.clone(),
                        source: Box::new(SchemaError::UnresolvedReference {
                            name: target.to_string(),
                        }),
                    });
                };
                graph.add_edge(from, to, ());
            }
        }

        let order = match dependency_order(&graph) {
            Ok(order) => order,
            Err(e) => {
                warn!(error = %e, "catalog rejected");
                return Err(e);
            }
        };

        let mut pending: Vec<Option<(String, SchemaBuilder)>> =
            self.declared.into_iter().map(Some).collect();
        let mut built: HashMap<String, Arc<Schema>> = HashMap::with_capacity(pending.len());

        for node in order {
            let Some((name, builder)) = pending[node.index()].take() else {
                continue;
            };
            let schema = builder
                .build_with(&|target: &str| built.get(target).cloned())
                .map_err(|source| SchemaError::Declaration {
                    name: name.clone(),
                    source: Box::new(source),
                })?;
            built.insert(name, Arc::new(schema));
        }

        let schemas: Vec<(String, Arc<Schema>)> = graph
            .node_indices()
            .filter_map(|node| {
                let name = &graph[node];
                built.remove(name).map(|schema| (name.clone(), schema))
            })
            .collect();
        let index = schemas
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();

        debug!(schemas = schemas.len(), edges = graph.edge_count(), "catalog built");
        Ok(SchemaCatalog { schemas, index })
    }
}

/// Post-order of a depth-first walk: every schema after the ones it references
///
/// The walk keeps its own stack of `(node, pending targets)` frames so long
/// reference chains do not recurse.
fn dependency_order(graph: &DiGraph<String, ()>) -> Result<Vec<NodeIndex>> {
    let mut marks = vec![Mark::Unvisited; graph.node_count()];
    let mut order = Vec::with_capacity(graph.node_count());

    for root in graph.node_indices() {
        if marks[root.index()] != Mark::Unvisited {
            continue;
        }
        marks[root.index()] = Mark::OnStack;
        let mut stack = vec![(root, targets(graph, root))];

        while let Some((node, pending)) = stack.last_mut() {
            let node = *node;
            let Some(target) = pending.pop() else {
                stack.pop();
                marks[node.index()] = Mark::Done;
                order.push(node);
                continue;
            };
            match marks[target.index()] {
                Mark::OnStack => {
                    let start = stack.iter().position(|(n, _)| *n == target).unwrap_or(0);
                    let mut path: Vec<String> =
                        stack[start..].iter().map(|(n, _)| graph[*n].clone()).collect();
                    path.push(graph[target].clone());
                    return Err(SchemaError::Cycle { path });
                }
                Mark::Unvisited => {
                    marks[target.index()] = Mark::OnStack;
                    stack.push((target, targets(graph, target)));
                }
                Mark::Done => {}
            }
        }
    }
    Ok(order)
}

/// Targets of `node`, oldest edge last so it is popped first
fn targets(graph: &DiGraph<String, ()>, node: NodeIndex) -> Vec<NodeIndex> {
    // petgraph yields neighbors newest edge first
    graph.neighbors(node).collect()
}
