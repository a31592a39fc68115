//! Depth-first topological ordering with cycle and missing-node detection.
//!
//! Used for both mod load order and system execution order. Each node is
//! visited with a three-colour scheme: unvisited, in progress (its
//! dependencies are being resolved), done. Reaching an in-progress node again
//! is a cycle; a dependency that is not among the nodes is missing. Both are
//! fatal and name the offending id.
//!
//! The result is deterministic: roots are visited in the order given and
//! dependencies in their declared order.

use std::collections::HashMap;

use crate::error::GraphError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Visitor<'a> {
    edges: HashMap<&'a str, &'a [&'a str]>,
    marks: HashMap<&'a str, Mark>,
    /// Nodes currently in progress, outermost first.
    stack: Vec<&'a str>,
    sorted: Vec<&'a str>,
}

impl<'a> Visitor<'a> {
    fn visit(&mut self, id: &'a str, required_by: Option<&'a str>) -> Result<(), GraphError> {
        match self.marks.get(id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = self.stack.iter().position(|n| *n == id).unwrap_or(0);
                let mut path: Vec<String> =
                    self.stack[start..].iter().map(|n| (*n).to_string()).collect();
                path.push(id.to_string());
                return Err(GraphError::Cycle {
                    id: id.to_string(),
                    path,
                });
            }
            None => {}
        }

        let Some(&deps) = self.edges.get(id) else {
            return Err(GraphError::Missing {
                id: id.to_string(),
                required_by: required_by.unwrap_or_default().to_string(),
            });
        };

        self.marks.insert(id, Mark::InProgress);
        self.stack.push(id);
        for &dep in deps {
            self.visit(dep, Some(id))?;
        }
        self.stack.pop();
        self.marks.insert(id, Mark::Done);
        self.sorted.push(id);
        Ok(())
    }
}

/// Order `nodes` so that every node comes after all of its dependencies.
///
/// `nodes` pairs each id with the ids it depends on. Duplicate ids keep the
/// first entry.
///
/// # Errors
///
/// Returns [`GraphError::Cycle`] or [`GraphError::Missing`]. On error no
/// partial order is returned.
pub fn dependency_order<'a>(nodes: &'a [(&'a str, Vec<&'a str>)]) -> Result<Vec<&'a str>, GraphError> {
    let mut edges = HashMap::with_capacity(nodes.len());
    for (id, deps) in nodes {
        edges.entry(*id).or_insert(deps.as_slice());
    }

    let mut visitor = Visitor {
        edges,
        marks: HashMap::with_capacity(nodes.len()),
        stack: Vec::new(),
        sorted: Vec::with_capacity(nodes.len()),
    };
    for (id, _) in nodes {
        visitor.visit(*id, None)?;
    }
    Ok(visitor.sorted)
}
