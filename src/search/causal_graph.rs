use itertools::Itertools;
use petgraph::graph::{DiGraph, NodeIndex};

/// The causal graph of a task: an arc u -> v records that some operator has
/// u in a condition and affects v (as read from the input's `begin_CG`
/// block, weights and all).
///
/// Successor and predecessor lists are cached because the heuristics walk
/// them in inner loops; the graph itself is kept for the weights and for
/// future structural queries.
#[derive(Debug)]
pub struct CausalGraph {
    graph: DiGraph<(), i32>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
}

impl CausalGraph {
    /// Builds the graph from per-variable `(successor, weight)` lists.
    pub fn new(arcs: Vec<Vec<(usize, i32)>>) -> Self {
        let num_vars = arcs.len();
        let mut graph = DiGraph::with_capacity(num_vars, 0);
        for _ in 0..num_vars {
            graph.add_node(());
        }
        for (from, succ) in arcs.iter().enumerate() {
            for &(to, weight) in succ {
                graph.add_edge(NodeIndex::new(from), NodeIndex::new(to), weight);
            }
        }

        let mut successors = vec![Vec::new(); num_vars];
        let mut predecessors = vec![Vec::new(); num_vars];
        for (from, succ) in arcs.iter().enumerate() {
            for &(to, _) in succ {
                successors[from].push(to);
                predecessors[to].push(from);
            }
        }
        for list in successors.iter_mut().chain(predecessors.iter_mut()) {
            list.sort_unstable();
            list.dedup();
        }

        Self {
            graph,
            successors,
            predecessors,
        }
    }

    pub fn num_variables(&self) -> usize {
        self.graph.node_count()
    }

    pub fn successors(&self, var: usize) -> &[usize] {
        &self.successors[var]
    }

    pub fn predecessors(&self, var: usize) -> &[usize] {
        &self.predecessors[var]
    }

    /// Ancestor sets in the *reduced* causal graph, where arcs to variables
    /// with lower index are dropped. The reduction makes the graph acyclic
    /// with the variables in topological order, so the transitive closure is
    /// a single forward sweep.
    ///
    /// `ancestors[v]` is sorted and does not contain `v` itself.
    pub fn reduced_ancestors(&self) -> Vec<Vec<usize>> {
        let num_vars = self.num_variables();
        let mut depends_on: Vec<Vec<usize>> = vec![Vec::new(); num_vars];
        for var in 0..num_vars {
            for &succ in self.successors(var) {
                if succ > var {
                    depends_on[succ].push(var);
                }
            }
        }

        for var in 0..num_vars {
            let direct: Vec<usize> = depends_on[var].clone();
            for affector in direct {
                debug_assert!(affector < var);
                let transitive = depends_on[affector].clone();
                depends_on[var].extend(transitive);
            }
            depends_on[var] = depends_on[var].iter().copied().sorted().dedup().collect();
        }
        depends_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successors_and_predecessors() {
        let cg = CausalGraph::new(vec![vec![(1, 3)], vec![(2, 1)], vec![]]);

        assert_eq!(cg.successors(0), &[1]);
        let empty: &[usize] = &[];
        assert_eq!(cg.successors(2), empty);
        assert_eq!(cg.predecessors(2), &[1]);
    }

    #[test]
    fn reduced_ancestors_are_transitive() {
        // 0 -> 1 -> 2, plus a back arc 2 -> 0 that the reduction drops.
        let cg = CausalGraph::new(vec![vec![(1, 1)], vec![(2, 1)], vec![(0, 1)]]);

        let ancestors = cg.reduced_ancestors();
        assert_eq!(ancestors[0], Vec::<usize>::new());
        assert_eq!(ancestors[1], vec![0]);
        assert_eq!(ancestors[2], vec![0, 1]);
    }
}
