use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
};

use anyhow::Result;
use tracing::info;

use super::utils::{parse_token, read_tokens};
use crate::error::DataError;

pub type Edge = (u32, u32);

/// Undirected graph built from the train edges, plus the held-out test edges.
///
/// Every node seen in either edge list has an adjacency entry, possibly empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Graph {
    pub n_node: usize,
    pub adjacency: BTreeMap<u32, BTreeSet<u32>>,
    pub nodes: BTreeSet<u32>,
    pub test_edges: Vec<Edge>,
}

impl Graph {
    pub fn from_edges(train_edges: &[Edge], test_edges: &[Edge]) -> Self {
        let mut adjacency: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
        for &(u, v) in train_edges {
            adjacency.entry(u).or_default().insert(v);
            adjacency.entry(v).or_default().insert(u);
        }
        for &(u, v) in test_edges {
            adjacency.entry(u).or_default();
            adjacency.entry(v).or_default();
        }
        let nodes: BTreeSet<u32> = adjacency.keys().copied().collect();
        let n_node = nodes.last().map_or(0, |&max| max as usize + 1);
        Self {
            n_node,
            adjacency,
            nodes,
            test_edges: test_edges.to_vec(),
        }
    }

    pub fn neighbors(&self, node: u32) -> impl Iterator<Item = u32> + '_ {
        self.adjacency.get(&node).into_iter().flatten().copied()
    }

    pub fn has_edge(&self, u: u32, v: u32) -> bool {
        self.adjacency.get(&u).is_some_and(|nbrs| nbrs.contains(&v))
    }
}

/// Read one edge per line: two whitespace separated node ids.
pub fn read_edge_list<P: AsRef<Path>>(path: P) -> Result<Vec<Edge>> {
    let path = path.as_ref();
    let mut edges = Vec::new();
    for (line, tokens) in read_tokens(path)? {
        if tokens.len() != 2 {
            return Err(DataError::malformed(
                path,
                line,
                format!("expected two node ids, found {} fields", tokens.len()),
            )
            .into());
        }
        let u = parse_token(path, line, &tokens[0], "node id")?;
        let v = parse_token(path, line, &tokens[1], "node id")?;
        edges.push((u, v));
    }
    Ok(edges)
}

pub fn read_edges<P: AsRef<Path>, Q: AsRef<Path>>(train_filename: P, test_filename: Q) -> Result<Graph> {
    let train_edges = read_edge_list(train_filename)?;
    let test_edges = read_edge_list(test_filename)?;
    let graph = Graph::from_edges(&train_edges, &test_edges);
    info!(
        n_node = graph.n_node,
        train_edges = train_edges.len(),
        test_edges = test_edges.len(),
        "loaded graph"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_edges() {
        let graph = Graph::from_edges(&[(0, 1), (1, 2), (1, 2)], &[(2, 5)]);
        assert_eq!(graph.n_node, 6);
        assert_eq!(graph.nodes, BTreeSet::from([0, 1, 2, 5]));
        assert_eq!(graph.neighbors(1).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(graph.neighbors(5).count(), 0);
        assert_eq!(graph.neighbors(4).count(), 0);
        assert!(graph.has_edge(2, 1));
        assert!(!graph.has_edge(2, 5));
        assert_eq!(graph.test_edges, vec![(2, 5)]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::from_edges(&[], &[]);
        assert_eq!(graph.n_node, 0);
        assert!(graph.nodes.is_empty());
    }

    #[test]
    fn test_read_edges() {
        let dir = tempfile::tempdir().unwrap();
        let train = dir.path().join("train_edges.txt");
        let test = dir.path().join("test_edges.txt");
        std::fs::write(&train, "0\t1\n1 3\n").unwrap();
        std::fs::write(&test, "3 4\n").unwrap();

        let graph = read_edges(&train, &test).unwrap();
        assert_eq!(graph.n_node, 5);
        assert!(graph.has_edge(3, 1));
        assert_eq!(graph.test_edges, vec![(3, 4)]);
    }

    #[test]
    fn test_read_edges_malformed_line() {
        let dir = tempfile::tempdir().unwrap();
        let train = dir.path().join("train_edges.txt");
        let test = dir.path().join("test_edges.txt");
        std::fs::write(&train, "0 1\n1 2 3\n").unwrap();
        std::fs::write(&test, "").unwrap();

        let err = read_edges(&train, &test).unwrap_err();
        let err = err.downcast::<DataError>().unwrap();
        assert!(matches!(err, DataError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_read_edges_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let test = dir.path().join("test_edges.txt");
        std::fs::write(&test, "0 1\n").unwrap();
        assert!(read_edges(dir.path().join("train_edges.txt"), &test).is_err());
    }
}
