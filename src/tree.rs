//! Rooted cell lineage tree carrying genotype calls on its nodes
//!
//! Nodes live in one arena and are addressed by their index, which doubles as the node id.

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// One genotype call as it was attached to a tree node
///
/// Tree parsers hand over numbers in whatever shape they found them in. Only values that are
/// integral numbers can be turned into genotype states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GenotypeValue {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl GenotypeValue {
    /// The value as an integer, if it is one
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            GenotypeValue::Integer(i) => Some(*i),
            GenotypeValue::Real(r) => real_to_integer(*r),
            GenotypeValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(real_to_integer))
            }
        }
    }
}

fn real_to_integer(r: f64) -> Option<i64> {
    if r.is_finite() && r.fract() == 0.0 && r.abs() <= i64::MAX as f64 {
        Some(r as i64)
    } else {
        None
    }
}

impl From<i64> for GenotypeValue {
    fn from(i: i64) -> Self {
        GenotypeValue::Integer(i)
    }
}

impl From<i32> for GenotypeValue {
    fn from(i: i32) -> Self {
        GenotypeValue::Integer(i64::from(i))
    }
}

impl From<usize> for GenotypeValue {
    fn from(state: usize) -> Self {
        GenotypeValue::Integer(state as i64)
    }
}

impl From<f64> for GenotypeValue {
    fn from(r: f64) -> Self {
        GenotypeValue::Real(r)
    }
}

impl From<&str> for GenotypeValue {
    fn from(s: &str) -> Self {
        GenotypeValue::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// One call per variant site, `None` if the tree did not carry genotypes for this node
    pub genotypes: Option<Vec<GenotypeValue>>,
}

impl Node {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: usize,
}

impl Tree {
    /// Build a tree from the parent index of every node (`None` for the root)
    ///
    /// Children are stored in the order in which they appear in `parents`.
    pub fn from_parents(parents: &[Option<usize>]) -> Result<Self, ParseError> {
        let mut nodes: Vec<Node> = parents
            .iter()
            .enumerate()
            .map(|(id, parent)| Node {
                id,
                parent: *parent,
                children: Vec::new(),
                genotypes: None,
            })
            .collect();

        let mut root = None;
        for (id, parent) in parents.iter().enumerate() {
            match parent {
                None if root.is_some() => {
                    return Err(ParseError::item(
                        "tree node",
                        id,
                        "a single root",
                        "a second node without parent".to_string(),
                    ))
                }
                None => root = Some(id),
                Some(p) if *p >= parents.len() || *p == id => {
                    return Err(ParseError::item(
                        "tree node",
                        id,
                        "index of an existing parent node",
                        p.to_string(),
                    ))
                }
                Some(p) => nodes[*p].children.push(id),
            }
        }
        let root = root.ok_or_else(|| {
            ParseError::somewhere("a root node without parent", "no root".to_string())
        })?;

        let tree = Self { nodes, root };
        let reachable = tree.preorder().len();
        if reachable != tree.nodes.len() {
            return Err(ParseError::somewhere(
                "all nodes to descend from the root",
                format!("{} of {} nodes reachable", reachable, tree.nodes.len()),
            ));
        }
        Ok(tree)
    }

    /// Attach the genotype calls of a node
    pub fn set_genotypes<V>(&mut self, node: usize, genotypes: Vec<V>)
    where
        V: Into<GenotypeValue>,
    {
        self.nodes[node].genotypes = Some(genotypes.into_iter().map(Into::into).collect());
    }

    pub fn root(&self) -> &Node {
        &self.nodes[self.root]
    }

    pub fn node(&self, id: usize) -> &Node {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node ids with every parent before its children
    pub fn preorder(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            // reversed, so that the first child is visited first
            stack.extend(self.nodes[id].children.iter().rev());
        }
        order
    }
}
