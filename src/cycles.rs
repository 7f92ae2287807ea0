//! Cycle Detector - depth-first search over any directed graph
//!
//! Every node not yet visited starts a search. A neighbor already on the
//! current path closes a cycle; a neighbor visited by an earlier branch is
//! never entered again. Consequently a cycle reachable only through an
//! alternate route into an already explored node is not reported.
//!
//! Nodes and successors are visited in sorted order so the output is
//! reproducible, and the search keeps its own frame stack instead of
//! recursing.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{BuildHasher, Hash};
use crate::graph::DependencyGraph;

/// A closed path; the first and last elements are the same node
pub type Cycle<N = String> = Vec<N>;

/// A directed graph the detector can traverse
pub trait Successors {
    type Node: Ord + Clone;

    /// Nodes to start searches from
    fn nodes(&self) -> Vec<Self::Node>;

    /// Direct successors of `node`; unknown nodes have none
    fn successors(&self, node: &Self::Node) -> Vec<Self::Node>;
}

impl Successors for DependencyGraph {
    type Node = String;

    fn nodes(&self) -> Vec<String> {
        self.keys().map(str::to_string).collect()
    }

    fn successors(&self, node: &String) -> Vec<String> {
        DependencyGraph::successors(self, node)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl<N: Ord + Clone> Successors for BTreeMap<N, Vec<N>> {
    type Node = N;

    fn nodes(&self) -> Vec<N> {
        self.keys().cloned().collect()
    }

    fn successors(&self, node: &N) -> Vec<N> {
        self.get(node).cloned().unwrap_or_default()
    }
}

impl<N: Ord + Clone + Hash, S: BuildHasher> Successors for HashMap<N, Vec<N>, S> {
    type Node = N;

    fn nodes(&self) -> Vec<N> {
        self.keys().cloned().collect()
    }

    fn successors(&self, node: &N) -> Vec<N> {
        self.get(node).cloned().unwrap_or_default()
    }
}

struct Frame<N> {
    node: N,
    successors: Vec<N>,
    next: usize,
}

impl<N: Clone> Frame<N> {
    fn advance(&mut self) -> Option<N> {
        let successor = self.successors.get(self.next).cloned();
        self.next += 1;
        successor
    }
}

fn sorted_successors<G: Successors + ?Sized>(graph: &G, node: &G::Node) -> Vec<G::Node> {
    let mut successors = graph.successors(node);
    successors.sort();
    successors.dedup();
    successors
}

/// Find cycles in discovery order, without deduplication
pub fn find_cycles<G: Successors + ?Sized>(graph: &G) -> Vec<Cycle<G::Node>> {
    let mut roots = graph.nodes();
    roots.sort();
    roots.dedup();

    let mut visited: BTreeSet<G::Node> = BTreeSet::new();
    let mut on_path: BTreeMap<G::Node, usize> = BTreeMap::new();
    let mut path: Vec<Frame<G::Node>> = Vec::new();
    let mut cycles = Vec::new();

    for root in roots {
        if !visited.insert(root.clone()) {
            continue;
        }
        on_path.insert(root.clone(), 0);
        let successors = sorted_successors(graph, &root);
        path.push(Frame { node: root, successors, next: 0 });

        while let Some(frame) = path.last_mut() {
            let Some(next) = frame.advance() else {
                if let Some(done) = path.pop() {
                    on_path.remove(&done.node);
                }
                continue;
            };

            if let Some(&start) = on_path.get(&next) {
                let mut cycle: Vec<G::Node> = path[start..].iter().map(|f| f.node.clone()).collect();
                cycle.push(next);
                cycles.push(cycle);
            } else if visited.insert(next.clone()) {
                on_path.insert(next.clone(), path.len());
                let successors = sorted_successors(graph, &next);
                path.push(Frame { node: next, successors, next: 0 });
            }
        }
    }

    tracing::debug!("Cycle search finished: {} cycles over {} nodes", cycles.len(), visited.len());
    cycles
}

/// Rotate the open part of a cycle so its smallest node comes first
pub fn canonical_rotation<N: Ord + Clone>(cycle: &[N]) -> Vec<N> {
    let open = match cycle.split_last() {
        Some((_, rest)) if !rest.is_empty() => rest,
        _ => return cycle.to_vec(),
    };

    let start = open
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
        .unwrap_or(0);

    let mut rotated: Vec<N> = open[start..].iter().chain(open[..start].iter()).cloned().collect();
    if let Some(first) = rotated.first().cloned() {
        rotated.push(first);
    }
    rotated
}

/// Drop cycles that are rotations of an earlier cycle, keeping order
pub fn dedup_rotations<N: Ord + Clone>(cycles: Vec<Cycle<N>>) -> Vec<Cycle<N>> {
    let mut seen = BTreeSet::new();
    cycles
        .into_iter()
        .filter(|cycle| seen.insert(canonical_rotation(cycle)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        edges
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_three_node_cycle() {
        let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &["A"])]);

        let cycles = find_cycles(&g);
        assert_eq!(cycles, vec![vec!["A", "B", "C", "A"]]);
    }

    #[test]
    fn test_acyclic_graph() {
        let g = graph(&[("A", &["B"]), ("B", &[])]);

        assert!(find_cycles(&g).is_empty());
    }

    #[test]
    fn test_self_loop() {
        let g = graph(&[("A", &["A"])]);

        assert_eq!(find_cycles(&g), vec![vec!["A", "A"]]);
    }

    #[test]
    fn test_cycle_slice_starts_at_reentered_node() {
        let g = graph(&[("A", &["B"]), ("B", &["C"]), ("C", &["B"])]);

        assert_eq!(find_cycles(&g), vec![vec!["B", "C", "B"]]);
    }

    #[test]
    fn test_successors_outside_keys_are_leaves() {
        let g = graph(&[("A", &["external", "B"]), ("B", &["A"])]);

        assert_eq!(find_cycles(&g), vec![vec!["A", "B", "A"]]);
    }

    #[test]
    fn test_visited_nodes_are_not_reentered() {
        // C→D→C is found from B; reaching C again via E must not report it twice.
        let g = graph(&[
            ("A", &["B", "E"]),
            ("B", &["C"]),
            ("C", &["D"]),
            ("D", &["C"]),
            ("E", &["C"]),
        ]);

        assert_eq!(find_cycles(&g), vec![vec!["C", "D", "C"]]);
    }

    #[test]
    fn test_alternate_route_limitation() {
        // C is finished while exploring B→C→B, so B→D→C→B is never closed.
        let g = graph(&[("B", &["C", "D"]), ("C", &["B"]), ("D", &["C"])]);
        assert_eq!(find_cycles(&g), vec![vec!["B", "C", "B"]]);
    }

    #[test]
    fn test_order_independent_of_insertion() {
        let mut forward: HashMap<&str, Vec<&str>> = HashMap::new();
        forward.insert("x", vec!["z", "y"]);
        forward.insert("y", vec!["x"]);
        forward.insert("z", vec!["x"]);

        let mut reversed: HashMap<&str, Vec<&str>> = HashMap::new();
        reversed.insert("z", vec!["x"]);
        reversed.insert("y", vec!["x"]);
        reversed.insert("x", vec!["y", "z", "y"]);

        let expected = vec![vec!["x", "y", "x"], vec!["x", "z", "x"]];
        assert_eq!(find_cycles(&forward), expected);
        assert_eq!(find_cycles(&reversed), expected);
    }

    #[test]
    fn test_dependency_graph_input() {
        let g: DependencyGraph = [("m.a", "m.b"), ("m.b", "m.a")].into_iter().collect();

        assert_eq!(find_cycles(&g), vec![vec!["m.a".to_string(), "m.b".into(), "m.a".into()]]);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let n = 100_000;
        let mut g: BTreeMap<usize, Vec<usize>> = (0..n).map(|i| (i, vec![i + 1])).collect();
        g.insert(n, vec![0]);

        let cycles = find_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), n + 2);
    }

    #[test]
    fn test_canonical_rotation() {
        assert_eq!(canonical_rotation(&["c", "a", "b", "c"]), vec!["a", "b", "c", "a"]);
        assert_eq!(canonical_rotation(&["a", "a"]), vec!["a", "a"]);
        assert_eq!(canonical_rotation::<&str>(&[]), Vec::<&str>::new());
    }

    #[test]
    fn test_dedup_rotations_keeps_first() {
        let cycles = vec![
            vec!["b", "c", "b"],
            vec!["c", "b", "c"],
            vec!["a", "a"],
        ];

        assert_eq!(dedup_rotations(cycles), vec![vec!["b", "c", "b"], vec!["a", "a"]]);
    }
}
