// Set and sequence similarity between two texts

use crate::text::{normalize_text, tokenize};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Default character cap applied before sequence matching.
pub const DEFAULT_SEQUENCE_CAP: usize = 50_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentMetrics {
    pub jaccard: f64,
    pub overlap: f64,
    pub dice: f64,
    pub sequence_ratio: f64,
    pub word_count_a: usize,
    pub word_count_b: usize,
    pub common_words: usize,
    pub unique_to_a: usize,
    pub unique_to_b: usize,
}

impl ContentMetrics {
    fn uniform(score: f64, tokens_a: &HashSet<String>, tokens_b: &HashSet<String>) -> Self {
        Self {
            jaccard: score,
            overlap: score,
            dice: score,
            sequence_ratio: score,
            word_count_a: tokens_a.len(),
            word_count_b: tokens_b.len(),
            common_words: tokens_a.intersection(tokens_b).count(),
            unique_to_a: tokens_a.difference(tokens_b).count(),
            unique_to_b: tokens_b.difference(tokens_a).count(),
        }
    }
}

pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 1.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

pub fn overlap(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return if a.is_empty() && b.is_empty() { 1.0 } else { 0.0 };
    }
    a.intersection(b).count() as f64 / smaller as f64
}

pub fn dice(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * a.intersection(b).count() as f64 / total as f64
}

/// Score two raw texts on all four metrics.
///
/// Texts are normalized and tokenized first. Two texts without tokens are
/// identical (1.0); exactly one side without tokens scores 0.0. Sequence
/// matching only sees the first `sequence_cap` characters of each side.
pub fn compute_content_metrics(text_a: &str, text_b: &str, sequence_cap: usize) -> ContentMetrics {
    let norm_a = normalize_text(text_a);
    let norm_b = normalize_text(text_b);

    let tokens_a: HashSet<String> = tokenize(&norm_a).into_iter().collect();
    let tokens_b: HashSet<String> = tokenize(&norm_b).into_iter().collect();

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return ContentMetrics::uniform(1.0, &tokens_a, &tokens_b);
    }
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return ContentMetrics::uniform(0.0, &tokens_a, &tokens_b);
    }
    if norm_a == norm_b {
        return ContentMetrics::uniform(1.0, &tokens_a, &tokens_b);
    }

    let seq_a: Vec<char> = norm_a.chars().take(sequence_cap).collect();
    let seq_b: Vec<char> = norm_b.chars().take(sequence_cap).collect();

    let mut metrics = ContentMetrics::uniform(0.0, &tokens_a, &tokens_b);
    metrics.jaccard = jaccard(&tokens_a, &tokens_b);
    metrics.overlap = overlap(&tokens_a, &tokens_b);
    metrics.dice = dice(&tokens_a, &tokens_b);
    metrics.sequence_ratio = sequence_ratio(&seq_a, &seq_b);
    metrics
}

/// Ratcliff/Obershelp ratio: `2 * matched / (len(a) + len(b))`, where
/// `matched` is the total size of the recursively found longest common
/// blocks. Elements that make up more than 1% of a `b` of 200+ items are
/// not used to seed matches, which keeps long texts tractable.
pub fn sequence_ratio<T: Eq + std::hash::Hash + Copy>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched: usize = SequenceMatcher::new(a, b)
        .matching_blocks()
        .iter()
        .map(|m| m.size)
        .sum();
    2.0 * matched as f64 / total as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchBlock {
    pub a: usize,
    pub b: usize,
    pub size: usize,
}

struct SequenceMatcher<'s, T> {
    a: &'s [T],
    b: &'s [T],
    b2j: HashMap<T, Vec<usize>>,
}

impl<'s, T: Eq + std::hash::Hash + Copy> SequenceMatcher<'s, T> {
    fn new(a: &'s [T], b: &'s [T]) -> Self {
        let mut b2j: HashMap<T, Vec<usize>> = HashMap::new();
        for (j, elt) in b.iter().enumerate() {
            b2j.entry(*elt).or_default().push(j);
        }

        let n = b.len();
        if n >= 200 {
            let ntest = n / 100 + 1;
            b2j.retain(|_, indices| indices.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchBlock {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0usize);
        let mut j2len: HashMap<usize, usize> = HashMap::new();

        for i in alo..ahi {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    new_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Popular elements never seed a match but may still extend one.
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        MatchBlock {
            a: besti,
            b: bestj,
            size: bestsize,
        }
    }

    fn matching_blocks(&self) -> Vec<MatchBlock> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.size == 0 {
                continue;
            }
            if alo < m.a && blo < m.b {
                queue.push((alo, m.a, blo, m.b));
            }
            if m.a + m.size < ahi && m.b + m.size < bhi {
                queue.push((m.a + m.size, ahi, m.b + m.size, bhi));
            }
            blocks.push(m);
        }

        blocks.sort();
        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_sequence_ratio_known_value() {
        // "abcd" vs "bcde": one block "bcd" of 3 -> 6 / 8
        assert_eq!(sequence_ratio(&chars("abcd"), &chars("bcde")), 0.75);
    }

    #[test]
    fn test_sequence_ratio_disjoint() {
        assert_eq!(sequence_ratio(&chars("abc"), &chars("xyz")), 0.0);
    }

    #[test]
    fn test_sequence_ratio_empty_pair() {
        assert_eq!(sequence_ratio::<char>(&[], &[]), 1.0);
    }

    #[test]
    fn test_matching_blocks_split_around_longest() {
        let a = chars("abxcd");
        let b = chars("abycd");
        let blocks = SequenceMatcher::new(&a, &b).matching_blocks();
        let sizes: Vec<usize> = blocks.iter().map(|m| m.size).collect();
        assert_eq!(sizes, vec![2, 2]);
    }
}
