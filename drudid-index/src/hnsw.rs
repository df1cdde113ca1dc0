//! Approximate HNSW index.
//!
//! Hierarchical navigable small world graph, one subgraph per model
//! version so versions stay invisible to each other. Two departures from
//! the textbook structure keep the ordering contract honest:
//!
//! - Level assignment derives from the entry's insertion sequence via
//!   splitmix64, not an RNG — identical insert sequences build identical
//!   graphs, so results are reproducible and snapshot-stable.
//! - Removal tombstones the node. Tombstones keep routing traffic through
//!   the graph but never appear in results, and they are dropped from
//!   snapshots (a reload rebuilds a clean graph).
//!
//! `ann_effort` maps to the ef beam width. If the beam comes back with
//! fewer live hits than the caller is owed, a full scan of the subgraph
//! backstops the contract: fewer than k results only ever means the index
//! holds fewer than k live entries of that version.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::debug;

use drudid_core::errors::IndexError;
use drudid_core::issue::{IssueId, ModelVersion};
use drudid_core::metric::DistanceMetric;
use drudid_core::traits::VectorIndex;

use crate::entry::{IndexEntry, VersionKey};
use crate::snapshot;

/// Out-degree bound per layer (doubled at layer 0).
const M: usize = 16;
/// Hard cap on assigned levels.
const MAX_LEVEL: usize = 16;

/// Search-frontier element ordered by (distance, node index) so equal
/// distances resolve deterministically.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Neighbor {
    dist: f32,
    idx: u32,
}

impl Eq for Neighbor {}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist.total_cmp(&other.dist).then(self.idx.cmp(&other.idx))
    }
}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

struct Node {
    entry: IndexEntry,
    /// Adjacency per layer, `neighbors[0]` is the base layer.
    neighbors: Vec<Vec<u32>>,
    deleted: bool,
}

impl Node {
    fn level(&self) -> usize {
        self.neighbors.len() - 1
    }
}

#[derive(Default)]
struct VersionGraph {
    nodes: Vec<Node>,
    entry_point: Option<u32>,
    /// Count of non-tombstoned nodes.
    live: usize,
}

impl VersionGraph {
    fn distance(&self, metric: DistanceMetric, query: &[f32], idx: u32) -> f32 {
        metric.distance(query, &self.nodes[idx as usize].entry.vector)
    }

    /// Greedy hill-descent at one layer: step to the closest neighbor
    /// until no neighbor improves.
    fn greedy_at_level(
        &self,
        metric: DistanceMetric,
        query: &[f32],
        mut cur: u32,
        level: usize,
    ) -> u32 {
        let mut cur_dist = self.distance(metric, query, cur);
        loop {
            let mut improved = false;
            for &n in &self.nodes[cur as usize].neighbors[level] {
                let d = self.distance(metric, query, n);
                if (Neighbor { dist: d, idx: n }) < (Neighbor { dist: cur_dist, idx: cur }) {
                    cur = n;
                    cur_dist = d;
                    improved = true;
                }
            }
            if !improved {
                return cur;
            }
        }
    }

    /// Beam search at one layer, returning up to `ef` nearest nodes in
    /// ascending (distance, index) order. Tombstones participate — they
    /// route — and are filtered by the caller.
    fn search_layer(
        &self,
        metric: DistanceMetric,
        query: &[f32],
        start: u32,
        ef: usize,
        level: usize,
    ) -> Vec<Neighbor> {
        let start_neighbor = Neighbor {
            dist: self.distance(metric, query, start),
            idx: start,
        };

        let mut visited: HashSet<u32> = HashSet::from([start]);
        let mut frontier = BinaryHeap::from([Reverse(start_neighbor)]);
        let mut found = BinaryHeap::from([start_neighbor]);

        while let Some(Reverse(candidate)) = frontier.pop() {
            if let Some(worst) = found.peek() {
                if found.len() >= ef && candidate > *worst {
                    break;
                }
            }
            for &n in &self.nodes[candidate.idx as usize].neighbors[level] {
                if !visited.insert(n) {
                    continue;
                }
                let neighbor = Neighbor {
                    dist: self.distance(metric, query, n),
                    idx: n,
                };
                let admit = found.len() < ef
                    || found.peek().map(|w| neighbor < *w).unwrap_or(true);
                if admit {
                    frontier.push(Reverse(neighbor));
                    found.push(neighbor);
                    if found.len() > ef {
                        found.pop();
                    }
                }
            }
        }

        found.into_sorted_vec()
    }

    /// Trim a node's adjacency at one layer to the `max_degree` nearest.
    fn prune_neighbors(&mut self, metric: DistanceMetric, idx: u32, level: usize, max_degree: usize) {
        if self.nodes[idx as usize].neighbors[level].len() <= max_degree {
            return;
        }
        let anchor = self.nodes[idx as usize].entry.vector.clone();
        let mut ranked: Vec<Neighbor> = self.nodes[idx as usize].neighbors[level]
            .iter()
            .map(|&n| Neighbor {
                dist: metric.distance(&anchor, &self.nodes[n as usize].entry.vector),
                idx: n,
            })
            .collect();
        ranked.sort_unstable();
        ranked.truncate(max_degree);
        self.nodes[idx as usize].neighbors[level] = ranked.into_iter().map(|n| n.idx).collect();
    }
}

/// Approximate nearest-neighbor index.
pub struct HnswIndex {
    dimensions: usize,
    metric: DistanceMetric,
    ef_construction: usize,
    ef_search: usize,
    graphs: HashMap<ModelVersion, VersionGraph>,
    by_key: HashMap<VersionKey, u32>,
    next_seq: u64,
}

impl HnswIndex {
    /// `ann_effort` sets the search beam width (ef); construction uses at
    /// least 2·M so the graph stays navigable at low effort.
    pub fn new(dimensions: usize, metric: DistanceMetric, ann_effort: usize) -> Self {
        Self {
            dimensions,
            metric,
            ef_construction: ann_effort.max(2 * M),
            ef_search: ann_effort.max(1),
            graphs: HashMap::new(),
            by_key: HashMap::new(),
            next_seq: 0,
        }
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                got: vector.len(),
            });
        }
        Ok(())
    }

    /// Deterministic level draw: splitmix64 over the insertion sequence
    /// mapped to (0, 1], then the usual exponential quantile.
    fn level_for_seq(seq: u64) -> usize {
        let mut z = seq.wrapping_add(0x9e3779b97f4a7c15);
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^= z >> 31;
        let unit = ((z >> 11) as f64 + 1.0) / (1u64 << 53) as f64;
        let level = (-unit.ln() / (M as f64).ln()) as usize;
        level.min(MAX_LEVEL)
    }

    fn max_degree(level: usize) -> usize {
        if level == 0 {
            2 * M
        } else {
            M
        }
    }

    /// Wire an already-sequenced entry into its version's subgraph.
    fn insert_entry(&mut self, entry: IndexEntry) -> Result<(), IndexError> {
        let key = entry.key();
        if self.by_key.contains_key(&key) {
            return Err(IndexError::DuplicateId {
                issue_id: entry.issue_id,
                model_version: entry.model_version.clone(),
            });
        }

        let level = Self::level_for_seq(entry.seq);
        let query = entry.vector.clone();
        let graph = self.graphs.entry(entry.model_version.clone()).or_default();

        let idx = graph.nodes.len() as u32;
        graph.nodes.push(Node {
            entry,
            neighbors: vec![Vec::new(); level + 1],
            deleted: false,
        });
        graph.live += 1;
        self.by_key.insert(key, idx);

        let Some(ep) = graph.entry_point else {
            graph.entry_point = Some(idx);
            return Ok(());
        };

        let top = graph.nodes[ep as usize].level();
        let mut cur = ep;

        // Descend through layers above the new node's level.
        for l in (level + 1..=top).rev() {
            cur = graph.greedy_at_level(self.metric, &query, cur, l);
        }

        // Link into every layer the node occupies.
        for l in (0..=level.min(top)).rev() {
            let beam = graph.search_layer(self.metric, &query, cur, self.ef_construction, l);
            let selected: Vec<u32> = beam
                .iter()
                .filter(|n| n.idx != idx)
                .take(M)
                .map(|n| n.idx)
                .collect();

            graph.nodes[idx as usize].neighbors[l] = selected.clone();
            for &n in &selected {
                graph.nodes[n as usize].neighbors[l].push(idx);
                graph.prune_neighbors(self.metric, n, l, Self::max_degree(l));
            }

            if let Some(nearest) = beam.first() {
                cur = nearest.idx;
            }
        }

        if level > top {
            graph.entry_point = Some(idx);
        }
        Ok(())
    }

    /// Exact scan over one subgraph's live nodes. Backstop for when the
    /// beam undershoots k (tombstone-heavy neighborhoods, tiny effort).
    fn scan_graph(graph: &VersionGraph, metric: DistanceMetric, query: &[f32], k: usize) -> Vec<(IssueId, f32)> {
        let mut scored: Vec<(IssueId, f32, u64)> = graph
            .nodes
            .iter()
            .filter(|n| !n.deleted)
            .map(|n| {
                (
                    n.entry.issue_id,
                    metric.distance(query, &n.entry.vector),
                    n.entry.seq,
                )
            })
            .collect();
        scored.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));
        scored.truncate(k);
        scored.into_iter().map(|(id, d, _)| (id, d)).collect()
    }
}

impl VectorIndex for HnswIndex {
    fn insert(
        &mut self,
        issue_id: IssueId,
        vector: Vec<f32>,
        model_version: &ModelVersion,
    ) -> Result<(), IndexError> {
        self.check_dimensions(&vector)?;
        let entry = IndexEntry {
            issue_id,
            model_version: model_version.clone(),
            vector,
            seq: self.next_seq,
        };
        self.insert_entry(entry)?;
        self.next_seq += 1;
        Ok(())
    }

    fn remove(
        &mut self,
        issue_id: IssueId,
        model_version: &ModelVersion,
    ) -> Result<(), IndexError> {
        let key = (issue_id, model_version.clone());
        let not_found = || IndexError::NotFound {
            issue_id,
            model_version: model_version.clone(),
        };
        let graph = self.graphs.get_mut(model_version).ok_or_else(not_found)?;
        let idx = self.by_key.remove(&key).ok_or_else(not_found)?;

        // Tombstone: the node keeps routing searches but leaves results.
        graph.nodes[idx as usize].deleted = true;
        graph.live -= 1;
        Ok(())
    }

    fn query(
        &self,
        vector: &[f32],
        k: usize,
        model_version: &ModelVersion,
    ) -> Result<Vec<(IssueId, f32)>, IndexError> {
        self.check_dimensions(vector)?;
        let Some(graph) = self.graphs.get(model_version) else {
            return Ok(Vec::new());
        };
        if graph.live == 0 || k == 0 {
            return Ok(Vec::new());
        }

        let Some(ep) = graph.entry_point else {
            return Ok(Vec::new());
        };
        let top = graph.nodes[ep as usize].level();

        let mut cur = ep;
        for l in (1..=top).rev() {
            cur = graph.greedy_at_level(self.metric, vector, cur, l);
        }

        let ef = self.ef_search.max(k);
        let beam = graph.search_layer(self.metric, vector, cur, ef, 0);

        let mut results: Vec<(IssueId, f32, u64)> = beam
            .into_iter()
            .filter(|n| !graph.nodes[n.idx as usize].deleted)
            .map(|n| {
                let entry = &graph.nodes[n.idx as usize].entry;
                (entry.issue_id, n.dist, entry.seq)
            })
            .collect();
        results.sort_unstable_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));
        results.truncate(k);

        // The contract owes min(k, live) results; fall back to an exact
        // scan rather than come up short.
        if results.len() < k.min(graph.live) {
            debug!(
                found = results.len(),
                owed = k.min(graph.live),
                "beam undershot, falling back to exact scan"
            );
            return Ok(Self::scan_graph(graph, self.metric, vector, k));
        }

        Ok(results.into_iter().map(|(id, d, _)| (id, d)).collect())
    }

    fn len(&self, model_version: &ModelVersion) -> usize {
        self.graphs.get(model_version).map(|g| g.live).unwrap_or(0)
    }

    fn total_len(&self) -> usize {
        self.graphs.values().map(|g| g.live).sum()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn export_snapshot(&self) -> Result<Vec<u8>, IndexError> {
        let entries: Vec<IndexEntry> = self
            .graphs
            .values()
            .flat_map(|g| g.nodes.iter())
            .filter(|n| !n.deleted)
            .map(|n| n.entry.clone())
            .collect();
        snapshot::encode(self.dimensions, self.metric, entries)
    }

    fn load_snapshot(&mut self, blob: &[u8]) -> Result<(), IndexError> {
        let entries = snapshot::decode(blob, self.dimensions, self.metric)?;

        // Rebuild into a fresh index first; self stays intact if the
        // decoded entries are unusable for any reason.
        let mut fresh = Self::new(self.dimensions, self.metric, self.ef_search);
        fresh.ef_construction = self.ef_construction;
        fresh.next_seq = entries.last().map(|e| e.seq + 1).unwrap_or(0);
        for entry in entries {
            fresh.insert_entry(entry)?;
        }

        *self = fresh;
        Ok(())
    }
}
