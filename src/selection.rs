use crate::blobs::CandidateBlob;

/// Four distinct candidates from the same frame, in enumeration order.
pub type MarkerSet = [CandidateBlob; 4];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCombination {
    pub markers: MarkerSet,
    pub score: f64,
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// `|median - mean|` of the areas. Zero when the distribution is symmetric,
/// which is what four copies of the same printed marker look like.
pub fn skew_score(markers: &MarkerSet) -> f64 {
    let areas = markers.map(|m| m.area);
    (median(&areas) - mean(&areas)).abs()
}

/// Index 4-combinations of `0..n` in lexicographic order.
pub struct Combinations4 {
    n: usize,
    indices: [usize; 4],
    done: bool,
}

impl Combinations4 {
    pub fn new(n: usize) -> Self {
        Combinations4 {
            n,
            indices: [0, 1, 2, 3],
            done: n < 4,
        }
    }
}

impl Iterator for Combinations4 {
    type Item = [usize; 4];

    fn next(&mut self) -> Option<[usize; 4]> {
        if self.done {
            return None;
        }

        let current = self.indices;

        // rightmost slot that can still move
        match (0..4).rev().find(|&i| self.indices[i] < self.n - 4 + i) {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..4 {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
            }
            None => self.done = true,
        }

        Some(current)
    }
}

/// Pick the four candidates with the most uniform areas.
///
/// Every combination is scored; one that scores less than *or equal to* the
/// best so far replaces it, so among exact ties the combination enumerated
/// last wins. Returns `None` when fewer than four candidates are available.
pub fn select_best_four(candidates: &[CandidateBlob]) -> Option<ScoredCombination> {
    Combinations4::new(candidates.len()).fold(None, |best, [a, b, c, d]| {
        let markers = [candidates[a], candidates[b], candidates[c], candidates[d]];
        let score = skew_score(&markers);

        match best {
            Some(ScoredCombination { score: best_score, .. }) if score > best_score => best,
            _ => {
                log::debug!("better combination {:?}: score={}", [a, b, c, d], score);
                Some(ScoredCombination { markers, score })
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(id: usize, x: f64, y: f64, area: f64) -> CandidateBlob {
        CandidateBlob::new(id, (x, y), area)
    }

    fn ids(selection: &ScoredCombination) -> Vec<usize> {
        selection.markers.iter().map(|m| m.id).collect()
    }

    #[test]
    fn median_and_mean() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
        assert_eq!(median(&[50.0, 48.0, 52.0, 49.0]), 49.5);
        assert_eq!(mean(&[50.0, 48.0, 52.0, 49.0]), 49.75);
    }

    #[test]
    fn combinations_are_lexicographic() {
        let all = Combinations4::new(5).collect::<Vec<_>>();
        assert_eq!(
            all,
            vec![[0, 1, 2, 3], [0, 1, 2, 4], [0, 1, 3, 4], [0, 2, 3, 4], [1, 2, 3, 4]]
        );

        assert_eq!(Combinations4::new(4).count(), 1);
        assert_eq!(Combinations4::new(6).count(), 15);
        assert_eq!(Combinations4::new(10).count(), 210);
        assert_eq!(Combinations4::new(3).count(), 0);
    }

    #[test]
    fn too_few_candidates() {
        let candidates = (0..3).map(|i| blob(i, i as f64, 0.0, 10.0)).collect::<Vec<_>>();
        for n in 0..=3 {
            assert_eq!(select_best_four(&candidates[..n]), None);
        }
    }

    #[test]
    fn uniform_areas_score_zero() {
        let candidates = (0..7).map(|i| blob(i, i as f64 * 3.0, 1.0, 42.0)).collect::<Vec<_>>();
        let best = select_best_four(&candidates).unwrap();
        assert_eq!(best.score, 0.0);
    }

    #[test]
    fn rejects_small_outlier() {
        let candidates = vec![
            blob(0, 10.0, 10.0, 50.0),
            blob(1, 90.0, 10.0, 48.0),
            blob(2, 90.0, 90.0, 52.0),
            blob(3, 10.0, 90.0, 49.0),
            blob(4, 500.0, 500.0, 5.0),
        ];

        let best = select_best_four(&candidates).unwrap();
        assert_eq!(ids(&best), vec![0, 1, 2, 3]);
        assert!((best.score - 0.25).abs() < 1e-12);
    }

    #[test]
    fn last_tie_wins() {
        // {0,1,2,3} and {0,2,3,4} both score 0.5, every other subset is worse.
        let candidates = vec![
            blob(0, 0.0, 0.0, 10.0),
            blob(1, 0.0, 0.0, 12.0),
            blob(2, 0.0, 0.0, 14.0),
            blob(3, 0.0, 0.0, 14.0),
            blob(4, 0.0, 0.0, 20.0),
        ];
        let best = select_best_four(&candidates).unwrap();
        assert_eq!(ids(&best), vec![0, 2, 3, 4]);
        assert_eq!(best.score, 0.5);

        let uniform = (0..6).map(|i| blob(i, 0.0, 0.0, 7.0)).collect::<Vec<_>>();
        let best = select_best_four(&uniform).unwrap();
        assert_eq!(ids(&best), vec![2, 3, 4, 5]);
    }
}
