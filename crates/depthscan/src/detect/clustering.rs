// ABOUTME: DBSCAN spatial clustering of words as (word index, depth) points.
// ABOUTME: Each dense cluster becomes a candidate spanning its lowest to highest member index.

use std::collections::VecDeque;
use std::f64::consts::PI;

use super::{BlockCandidate, Evidence};
use crate::dom::words::WordNode;
use crate::options::ClusteringParams;

// Both axes share one unscaled Euclidean radius. Word indices span the
// whole document while depths stay small, so in practice clusters follow
// index proximity almost exclusively.
fn distance(a: &WordNode, b: &WordNode) -> f64 {
    let dx = a.word_index as f64 - b.word_index as f64;
    let dy = a.depth as f64 - b.depth as f64;
    (dx * dx + dy * dy).sqrt()
}

/// Indices of all points within `epsilon` of point `p`, itself included.
///
/// Only positions within `epsilon` along the index axis can qualify, so the
/// scan is limited to that band.
fn region_query(words: &[WordNode], p: usize, epsilon: f64) -> Vec<usize> {
    let reach = epsilon.floor() as usize;
    let lo = p.saturating_sub(reach);
    let hi = (p.saturating_add(reach)).min(words.len() - 1);
    (lo..=hi)
        .filter(|&q| distance(&words[p], &words[q]) <= epsilon)
        .collect()
}

/// Run DBSCAN and return cluster membership (`None` is noise).
pub fn dbscan(words: &[WordNode], params: &ClusteringParams) -> Vec<Option<usize>> {
    let n = words.len();
    let mut visited = vec![false; n];
    let mut cluster_of: Vec<Option<usize>> = vec![None; n];
    let mut next_cluster = 0;

    if n == 0 {
        return cluster_of;
    }

    for p in 0..n {
        if visited[p] {
            continue;
        }
        visited[p] = true;

        let neighbors = region_query(words, p, params.epsilon);
        if neighbors.len() < params.min_points {
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;
        cluster_of[p] = Some(cluster);

        let mut queue: VecDeque<usize> = neighbors.into();
        while let Some(q) = queue.pop_front() {
            if !visited[q] {
                visited[q] = true;
                let expanded = region_query(words, q, params.epsilon);
                if expanded.len() >= params.min_points {
                    queue.extend(expanded);
                }
            }
            if cluster_of[q].is_none() {
                cluster_of[q] = Some(cluster);
            }
        }
    }

    cluster_of
}

pub fn detect(words: &[WordNode], params: &ClusteringParams) -> Vec<BlockCandidate> {
    let membership = dbscan(words, params);

    // (min index, max index, size) per cluster id
    let count = membership.iter().flatten().max().map_or(0, |max| max + 1);
    let mut clusters: Vec<Option<(usize, usize, usize)>> = vec![None; count];
    for (i, cluster) in membership.iter().enumerate() {
        if let Some(id) = *cluster {
            let entry = clusters[id].get_or_insert((i, i, 0));
            entry.0 = entry.0.min(i);
            entry.1 = entry.1.max(i);
            entry.2 += 1;
        }
    }

    let area = params.epsilon * params.epsilon * PI;
    let candidates: Vec<BlockCandidate> = clusters
        .into_iter()
        .enumerate()
        .filter_map(|(id, span)| span.map(|span| (id, span)))
        .filter(|(_, (_, _, size))| *size >= params.min_points)
        .map(|(id, (start, end, size))| {
            BlockCandidate::new(
                start,
                end,
                Evidence::Clustering {
                    score: (size as f64 / area).min(1.0),
                    cluster_id: id,
                    size,
                },
            )
        })
        .collect();

    tracing::trace!(clusters = candidates.len(), "dbscan");
    candidates
}
