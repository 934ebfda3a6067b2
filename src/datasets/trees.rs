use std::{
    collections::{BTreeMap, VecDeque},
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::graph::Graph;

/// BFS trees of the train graph, one per root node.
///
/// `trees[root][node]` is `[parent, child_1, ..., child_n]`; a root is its own parent.
/// The generator walks these trees to sample neighbors during training.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trees(BTreeMap<u32, BTreeMap<u32, Vec<u32>>>);

impl Trees {
    /// Load trees written by [`Trees::save`]. A missing file is an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("cannot open sampling trees {}", path.display()))?;
        let trees: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse sampling trees {}", path.display()))?;
        info!(roots = trees.len(), "loaded sampling trees from {}", path.display());
        Ok(trees)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn get(&self, root: u32) -> Option<&BTreeMap<u32, Vec<u32>>> {
        self.0.get(&root)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Build a BFS tree rooted at each of `roots`.
pub fn construct_trees<I: IntoIterator<Item = u32>>(graph: &Graph, roots: I) -> Trees {
    let mut trees = BTreeMap::new();
    for root in roots {
        let mut tree: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
        tree.insert(root, vec![root]);
        let mut queue = VecDeque::from([root]);
        while let Some(cur) = queue.pop_front() {
            for nbr in graph.neighbors(cur) {
                if tree.contains_key(&nbr) {
                    continue;
                }
                tree.insert(nbr, vec![cur]);
                if let Some(children) = tree.get_mut(&cur) {
                    children.push(nbr);
                }
                queue.push_back(nbr);
            }
        }
        trees.insert(root, tree);
    }
    Trees(trees)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> Graph {
        // 0 - 1 - 2 - 3, and 4 isolated
        Graph::from_edges(&[(0, 1), (1, 2), (2, 3)], &[(4, 0)])
    }

    #[test]
    fn test_construct_trees() {
        let graph = path_graph();
        let trees = construct_trees(&graph, graph.nodes.iter().copied());
        assert_eq!(trees.len(), 5);

        let tree = trees.get(1).unwrap();
        assert_eq!(tree[&1], vec![1, 0, 2]);
        assert_eq!(tree[&0], vec![1]);
        assert_eq!(tree[&2], vec![1, 3]);
        assert_eq!(tree[&3], vec![2]);
        assert!(!tree.contains_key(&4));

        let isolated = trees.get(4).unwrap();
        assert_eq!(isolated.len(), 1);
        assert_eq!(isolated[&4], vec![4]);
    }

    #[test]
    fn test_cycle_visits_each_node_once() {
        let graph = Graph::from_edges(&[(0, 1), (1, 2), (2, 0)], &[]);
        let trees = construct_trees(&graph, [0]);
        let tree = trees.get(0).unwrap();
        assert_eq!(tree[&0], vec![0, 1, 2]);
        assert_eq!(tree[&1], vec![0]);
        assert_eq!(tree[&2], vec![0]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train_trees.json");
        let graph = path_graph();
        let trees = construct_trees(&graph, [0, 3]);
        trees.save(&path).unwrap();

        assert_eq!(Trees::load(&path).unwrap(), trees);
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = Trees::load(dir.path().join("train_trees.json")).unwrap_err();
        assert!(err.to_string().contains("cannot open sampling trees"));
    }
}
