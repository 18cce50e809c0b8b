//! Ontology index over an is-a DAG of phenotype terms.
//!
//! Terms live in an arena and are addressed by integer index; parent and
//! child adjacency lists are stored per index. Closure queries are
//! breadth-first expansions with a hop counter, so `depth = 1` returns direct
//! neighbors and `usize::MAX` the full transitive closure.
//!
//! The graph is validated once at build time and is read-only afterwards,
//! so it can be shared across sampling threads without locking.

use rc_common::{Error, Result, TermId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::Path;
use tracing::debug;

/// Unbounded closure depth.
pub const FULL_DEPTH: usize = usize::MAX;

/// One ontology term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

/// The DAG-provider seam used by the patient sampler.
pub trait OntologyQuery: Sync {
    /// Terms reachable from `ids` via parent edges within `depth` hops.
    fn ancestors(&self, ids: &[TermId], depth: usize) -> BTreeSet<TermId>;

    /// Terms reachable from `ids` via child edges within `depth` hops.
    fn descendants(&self, ids: &[TermId], depth: usize) -> BTreeSet<TermId>;

    /// Ancestors of one term ordered by hop distance, then by id.
    fn ancestors_ranked(&self, id: &TermId, depth: usize) -> Vec<TermId>;

    fn label(&self, id: &str) -> Option<&str>;

    fn root(&self) -> &TermId;

    /// Drop every id that is a proper ancestor of another id in the set.
    ///
    /// Ids unknown to the ontology are kept: they are nobody's ancestor.
    fn simplify(&self, ids: &[TermId]) -> BTreeSet<TermId> {
        let ancestors = self.ancestors(ids, FULL_DEPTH);
        ids.iter()
            .filter(|id| !ancestors.contains(*id))
            .cloned()
            .collect()
    }
}

/// Validated, immutable ontology DAG.
#[derive(Debug, Clone)]
pub struct Ontology {
    terms: Vec<Term>,
    index: HashMap<TermId, usize>,
    parents: Vec<Vec<usize>>,
    children: Vec<Vec<usize>>,
    root: usize,
}

#[derive(Clone, Copy)]
enum Direction {
    Up,
    Down,
}

impl Ontology {
    /// Load a node-link JSON document.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let graph: OntologyGraph = serde_json::from_str(json)?;
        graph.into_ontology()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn term(&self, id: &str) -> Option<&Term> {
        self.index.get(id).map(|&i| &self.terms[i])
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter()
    }

    /// Export as a node-link document.
    pub fn to_graph(&self) -> OntologyGraph {
        let mut edges = Vec::new();
        for (parent, kids) in self.children.iter().enumerate() {
            for &child in kids {
                edges.push(GraphEdge {
                    parent: self.terms[parent].id.clone(),
                    child: self.terms[child].id.clone(),
                });
            }
        }
        OntologyGraph {
            nodes: self.terms.clone(),
            edges,
        }
    }

    fn seeds(&self, ids: &[TermId]) -> Vec<usize> {
        ids.iter()
            .filter_map(|id| match self.index.get(id) {
                Some(&i) => Some(i),
                None => {
                    debug!(term = %id, "term not in ontology; ignored");
                    None
                }
            })
            .collect()
    }

    /// Breadth-first expansion returning each reached node with its hop count.
    fn expand(&self, seeds: &[usize], depth: usize, direction: Direction) -> HashMap<usize, usize> {
        let adjacency = match direction {
            Direction::Up => &self.parents,
            Direction::Down => &self.children,
        };
        let mut reached: HashMap<usize, usize> = HashMap::new();
        let mut frontier: Vec<usize> = seeds.to_vec();
        let mut hop = 0usize;

        while !frontier.is_empty() && hop < depth {
            hop += 1;
            let mut next = Vec::new();
            for &node in &frontier {
                for &neighbor in &adjacency[node] {
                    if let std::collections::hash_map::Entry::Vacant(slot) = reached.entry(neighbor)
                    {
                        slot.insert(hop);
                        next.push(neighbor);
                    }
                }
            }
            frontier = next;
        }
        reached
    }

    fn collect_ids(&self, reached: HashMap<usize, usize>) -> BTreeSet<TermId> {
        reached
            .into_keys()
            .map(|i| self.terms[i].id.clone())
            .collect()
    }
}

impl OntologyQuery for Ontology {
    fn ancestors(&self, ids: &[TermId], depth: usize) -> BTreeSet<TermId> {
        let seeds = self.seeds(ids);
        self.collect_ids(self.expand(&seeds, depth, Direction::Up))
    }

    fn descendants(&self, ids: &[TermId], depth: usize) -> BTreeSet<TermId> {
        let seeds = self.seeds(ids);
        self.collect_ids(self.expand(&seeds, depth, Direction::Down))
    }

    fn ancestors_ranked(&self, id: &TermId, depth: usize) -> Vec<TermId> {
        let seeds = self.seeds(std::slice::from_ref(id));
        let mut ranked: Vec<(usize, &TermId)> = self
            .expand(&seeds, depth, Direction::Up)
            .into_iter()
            .map(|(i, hop)| (hop, &self.terms[i].id))
            .collect();
        ranked.sort();
        ranked.into_iter().map(|(_, id)| id.clone()).collect()
    }

    fn label(&self, id: &str) -> Option<&str> {
        self.term(id).map(|t| t.label.as_str())
    }

    fn root(&self) -> &TermId {
        &self.terms[self.root].id
    }
}

/// Incrementally collects terms and edges, then validates the DAG.
#[derive(Debug, Default)]
pub struct OntologyBuilder {
    terms: Vec<Term>,
    edges: Vec<(TermId, TermId)>,
}

impl OntologyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.add_term(Term {
            id: TermId::new(id),
            label: label.into(),
            definition: None,
        });
        self
    }

    /// Add an is-a edge: `child` is-a `parent`.
    pub fn edge(mut self, parent: impl Into<String>, child: impl Into<String>) -> Self {
        self.add_edge(TermId::new(parent), TermId::new(child));
        self
    }

    pub fn add_term(&mut self, term: Term) {
        self.terms.push(term);
    }

    pub fn add_edge(&mut self, parent: TermId, child: TermId) {
        self.edges.push((parent, child));
    }

    /// Validate and freeze the graph.
    ///
    /// Fails on duplicate terms, edges naming unknown terms, zero or several
    /// roots, nodes unreachable from the root, and cycles.
    pub fn build(self) -> Result<Ontology> {
        let mut index = HashMap::with_capacity(self.terms.len());
        for (i, term) in self.terms.iter().enumerate() {
            if index.insert(term.id.clone(), i).is_some() {
                return Err(Error::OntologyDuplicateTerm {
                    id: term.id.to_string(),
                });
            }
        }

        let n = self.terms.len();
        let mut parents = vec![Vec::new(); n];
        let mut children = vec![Vec::new(); n];
        let mut seen_edges = HashSet::new();
        for (parent, child) in &self.edges {
            let p = *index.get(parent).ok_or_else(|| Error::OntologyUnknownTerm {
                id: parent.to_string(),
            })?;
            let c = *index.get(child).ok_or_else(|| Error::OntologyUnknownTerm {
                id: child.to_string(),
            })?;
            if p == c {
                return Err(Error::OntologyCycle {
                    id: parent.to_string(),
                });
            }
            if seen_edges.insert((p, c)) {
                children[p].push(c);
                parents[c].push(p);
            }
        }

        let mut roots: Vec<&TermId> = (0..n)
            .filter(|&i| parents[i].is_empty())
            .map(|i| &self.terms[i].id)
            .collect();
        if roots.len() != 1 {
            roots.sort();
            return Err(Error::OntologyRoots {
                count: roots.len(),
                roots: roots
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
        let root = index[roots[0]];

        // Reachability from the root.
        let mut reachable = vec![false; n];
        reachable[root] = true;
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            for &c in &children[node] {
                if !reachable[c] {
                    reachable[c] = true;
                    queue.push_back(c);
                }
            }
        }
        if let Some(orphan) = smallest_id(&self.terms, (0..n).filter(|&i| !reachable[i])) {
            return Err(Error::OntologyUnreachable { id: orphan });
        }

        // Kahn's algorithm; nodes left with in-degree > 0 sit on a cycle.
        let mut in_degree: Vec<usize> = parents.iter().map(Vec::len).collect();
        let mut queue = VecDeque::from([root]);
        let mut visited = 0usize;
        while let Some(node) = queue.pop_front() {
            visited += 1;
            for &c in &children[node] {
                in_degree[c] -= 1;
                if in_degree[c] == 0 {
                    queue.push_back(c);
                }
            }
        }
        if visited < n {
            if let Some(id) = smallest_id(&self.terms, (0..n).filter(|&i| in_degree[i] > 0)) {
                return Err(Error::OntologyCycle { id });
            }
        }

        Ok(Ontology {
            terms: self.terms,
            index,
            parents,
            children,
            root,
        })
    }
}

fn smallest_id(terms: &[Term], indices: impl Iterator<Item = usize>) -> Option<String> {
    indices.map(|i| &terms[i].id).min().map(TermId::to_string)
}

/// Node-link serialization of an ontology.
///
/// Also accepts `links` with `source`/`target` keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyGraph {
    pub nodes: Vec<Term>,
    #[serde(alias = "links")]
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(alias = "source")]
    pub parent: TermId,
    #[serde(alias = "target")]
    pub child: TermId,
}

impl OntologyGraph {
    pub fn into_ontology(self) -> Result<Ontology> {
        let mut builder = OntologyBuilder::new();
        for node in self.nodes {
            builder.add_term(node);
        }
        for edge in self.edges {
            builder.add_edge(edge.parent, edge.child);
        }
        builder.build()
    }
}
