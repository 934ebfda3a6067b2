use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Result};
use candle_core::Tensor;
use itertools::Itertools;
use tracing::debug;

use crate::{datasets::Graph, hparams::HParams};

/// Mean precision and recall of the top-K lists over all evaluated nodes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Recommendation {
    pub precision: f64,
    pub recall: f64,
    pub n_evaluated: usize,
}

/// Evaluate a `[n_node, n_node]` similarity matrix against the test edges.
pub fn eval_recommend(all_score: &Tensor, graph: &Graph, params: &HParams) -> Result<Recommendation> {
    let scores = all_score.to_vec2::<f32>()?;
    eval_recommend_scores(&scores, graph, params.n_movies, params.top_k)
}

/// Top-K recommendation metrics on a dense score matrix.
///
/// Nodes with an id below `n_movies` are the recommendable items; every other node
/// is a user. A test edge between a user and an item makes the item a ground truth
/// recommendation for the user. With `n_movies == 0` or `n_movies >= n_node` all
/// nodes are items and every test-edge endpoint is evaluated.
///
/// For each evaluated node the candidates are all items except the node itself and
/// its train neighbors, ranked by descending score with ties going to the smaller id.
pub fn eval_recommend_scores(
    scores: &[Vec<f32>],
    graph: &Graph,
    n_movies: usize,
    top_k: usize,
) -> Result<Recommendation> {
    if top_k == 0 {
        bail!("top_k must be positive");
    }
    let n_node = scores.len();
    if let Some(row) = scores.iter().find(|row| row.len() != n_node) {
        bail!("score matrix is not square: {} rows, a row of {}", n_node, row.len());
    }
    let n_items = if n_movies == 0 || n_movies >= n_node {
        n_node
    } else {
        n_movies
    };
    let bipartite = n_items < n_node;
    let is_item = |v: u32| (v as usize) < n_items;

    let mut truth: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    for &(a, b) in &graph.test_edges {
        if a as usize >= n_node || b as usize >= n_node {
            bail!("test edge ({}, {}) is outside the {} scored nodes", a, b, n_node);
        }
        for (u, v) in [(a, b), (b, a)] {
            if is_item(v) && !(bipartite && is_item(u)) {
                truth.entry(u).or_default().insert(v);
            }
        }
    }

    let mut result = Recommendation::default();
    for (&u, relevant) in &truth {
        let row = &scores[u as usize];
        let top: Vec<u32> = (0..n_items as u32)
            .filter(|&v| v != u && !graph.has_edge(u, v))
            .sorted_unstable_by(|&a, &b| {
                row[b as usize]
                    .total_cmp(&row[a as usize])
                    .then(a.cmp(&b))
            })
            .take(top_k)
            .collect();
        let hits = top.iter().filter(|&&v| relevant.contains(&v)).count();
        debug!(node = u, hits, relevant = relevant.len(), "evaluated node");

        result.precision += hits as f64 / top_k as f64;
        result.recall += hits as f64 / relevant.len() as f64;
        result.n_evaluated += 1;
    }
    if result.n_evaluated > 0 {
        result.precision /= result.n_evaluated as f64;
        result.recall /= result.n_evaluated as f64;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_bipartite() {
        // items 0, 1, 2; users 3, 4
        let graph = Graph::from_edges(&[(3, 0)], &[(3, 1), (3, 2), (4, 2)]);
        let scores = vec![
            vec![0.0; 5],
            vec![0.0; 5],
            vec![0.0; 5],
            // user 3 prefers 0 (train neighbor, excluded), then 1, then 2
            vec![9.0, 5.0, 1.0, 0.0, 0.0],
            // user 4 prefers 0, then 2
            vec![3.0, 1.0, 2.0, 0.0, 0.0],
        ];

        let result = eval_recommend_scores(&scores, &graph, 3, 1).unwrap();
        assert_eq!(result.n_evaluated, 2);
        // user 3: top-1 = [1], hit 1 of 2; user 4: top-1 = [0], no hit
        assert!(close(result.precision, 0.5));
        assert!(close(result.recall, 0.25));

        let result = eval_recommend_scores(&scores, &graph, 3, 2).unwrap();
        // user 3: [1, 2] both hit; user 4: [0, 2] one hit
        assert!(close(result.precision, (1.0 + 0.5) / 2.0));
        assert!(close(result.recall, (1.0 + 1.0) / 2.0));
    }

    #[test]
    fn test_all_nodes_are_items() {
        let graph = Graph::from_edges(&[(0, 1)], &[(0, 2)]);
        let scores = vec![
            vec![5.0, 4.0, 1.0],
            vec![0.0, 0.0, 0.0],
            vec![3.0, 2.0, 1.0],
        ];
        let result = eval_recommend_scores(&scores, &graph, 0, 1).unwrap();
        // node 0: candidates [2] -> hit; node 2: candidates [0, 1] -> top [0], hit
        assert_eq!(result.n_evaluated, 2);
        assert!(close(result.precision, 1.0));
        assert!(close(result.recall, 1.0));

        let same = eval_recommend_scores(&scores, &graph, 3953, 1).unwrap();
        assert_eq!(same, result);
    }

    #[test]
    fn test_ties_prefer_smaller_id() {
        let graph = Graph::from_edges(&[], &[(3, 2)]);
        let scores = vec![vec![1.0; 4]; 4];
        let result = eval_recommend_scores(&scores, &graph, 3, 1).unwrap();
        // top-1 for user 3 is item 0
        assert!(close(result.precision, 0.0));

        let result = eval_recommend_scores(&scores, &graph, 3, 3).unwrap();
        assert!(close(result.precision, 1.0 / 3.0));
        assert!(close(result.recall, 1.0));
    }

    #[test]
    fn test_no_test_edges() {
        let graph = Graph::from_edges(&[(0, 1)], &[]);
        let scores = vec![vec![0.0; 2]; 2];
        let result = eval_recommend_scores(&scores, &graph, 0, 10).unwrap();
        assert_eq!(result, Recommendation::default());
    }

    #[test]
    fn test_errors() {
        let graph = Graph::from_edges(&[], &[(0, 5)]);
        let scores = vec![vec![0.0; 3]; 3];
        assert!(eval_recommend_scores(&scores, &graph, 0, 0).is_err());
        assert!(eval_recommend_scores(&scores, &graph, 0, 1).is_err());
        assert!(eval_recommend_scores(&[vec![0.0; 2]], &graph, 0, 1).is_err());
    }

    #[test]
    fn test_eval_recommend_tensor() {
        let graph = Graph::from_edges(&[], &[(0, 1)]);
        let score = Tensor::new(&[[0f32, 1.], [1., 0.]], &Device::Cpu).unwrap();
        let params = HParams {
            n_movies: 0,
            top_k: 1,
            ..HParams::default()
        };
        let result = eval_recommend(&score, &graph, &params).unwrap();
        assert_eq!(result.n_evaluated, 2);
        assert!(close(result.recall, 1.0));
    }
}
