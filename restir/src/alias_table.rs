use log::warn;

use crate::{gpu, Error, Result};

/// Alias table for O(1) sampling of lights proportionally to their weights.
#[derive(Clone, Debug, Default)]
pub struct AliasTable {
    cells: Vec<gpu::AliasCell>,
}

impl AliasTable {
    /// Builds the table using Vose's method.
    ///
    /// Weights must be non-negative and finite; if all of them are zero, the
    /// table falls back to uniform sampling.
    pub fn new(weights: &[f32]) -> Result<Self> {
        if weights.is_empty() {
            return Err(Error::EmptyWeights);
        }

        for (index, &weight) in weights.iter().enumerate() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::InvalidWeight { index, weight });
            }
        }

        let n = weights.len();
        let total: f64 = weights.iter().map(|&w| w as f64).sum();

        let pdfs: Vec<f64> = if total > 0.0 {
            weights.iter().map(|&w| w as f64 / total).collect()
        } else {
            warn!(
                "All of {} light weights are zero; falling back to uniform \
                 sampling",
                n
            );

            vec![1.0 / n as f64; n]
        };

        // ---

        let mut scaled: Vec<f64> =
            pdfs.iter().map(|pdf| pdf * n as f64).collect();
        let mut thresholds = vec![1.0; n];
        let mut aliases: Vec<usize> = (0..n).collect();
        let mut small = Vec::with_capacity(n);
        let mut large = Vec::with_capacity(n);

        for (idx, &weight) in scaled.iter().enumerate() {
            if weight < 1.0 {
                small.push(idx);
            } else {
                large.push(idx);
            }
        }

        while let (Some(small_idx), Some(large_idx)) = (small.pop(), large.pop())
        {
            thresholds[small_idx] = scaled[small_idx];
            aliases[small_idx] = large_idx;

            scaled[large_idx] = (scaled[large_idx] + scaled[small_idx]) - 1.0;

            if scaled[large_idx] < 1.0 {
                small.push(large_idx);
            } else {
                large.push(large_idx);
            }
        }

        // Whatever's left is (up to rounding errors) full
        for idx in small.into_iter().chain(large) {
            thresholds[idx] = 1.0;
            aliases[idx] = idx;
        }

        let cells = (0..n)
            .map(|idx| gpu::AliasCell {
                threshold: thresholds[idx] as f32,
                alias: aliases[idx] as u32,
                pdf: pdfs[idx] as f32,
                alias_pdf: pdfs[aliases[idx]] as f32,
            })
            .collect();

        Ok(Self { cells })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[gpu::AliasCell] {
        &self.cells
    }

    /// Returns the exact probability of sampling given index, as encoded by
    /// the cells (i.e. after accounting for the aliasing).
    pub fn probability(&self, idx: usize) -> f64 {
        let n = self.cells.len() as f64;

        self.cells
            .iter()
            .enumerate()
            .map(|(cell_idx, cell)| {
                let threshold = (cell.threshold as f64).clamp(0.0, 1.0);
                let mut p = 0.0;

                if cell_idx == idx {
                    p += threshold;
                }

                if cell.alias as usize == idx {
                    p += 1.0 - threshold;
                }

                p / n
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn sampling() {
        let table = AliasTable::new(&[1.0, 1.0, 2.0]).unwrap();
        let view = gpu::AliasTableView::new(table.cells());
        let mut rng = StdRng::seed_from_u64(1234);
        let mut hits = [0usize; 3];

        for _ in 0..100_000 {
            let (id, pdf) = view.sample(rng.gen()).unwrap();
            let idx = id.get() as usize;

            assert!(idx < 3);
            assert_relative_eq!(pdf, [0.25, 0.25, 0.5][idx]);

            hits[idx] += 1;
        }

        let ratio0 = hits[2] as f32 / hits[0] as f32;
        let ratio1 = hits[2] as f32 / hits[1] as f32;

        assert_relative_eq!(ratio0, 2.0, epsilon = 0.1);
        assert_relative_eq!(ratio1, 2.0, epsilon = 0.1);
    }

    #[test]
    fn probabilities() {
        let weights = [0.5, 3.0, 0.0, 7.25, 1.0, 1.0, 12.0];
        let total: f32 = weights.iter().sum();
        let table = AliasTable::new(&weights).unwrap();

        let sum: f64 =
            (0..weights.len()).map(|idx| table.probability(idx)).sum();

        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);

        for (idx, weight) in weights.iter().enumerate() {
            assert_relative_eq!(
                table.probability(idx),
                (weight / total) as f64,
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn single() {
        let table = AliasTable::new(&[3.0]).unwrap();

        assert_eq!(1, table.len());
        assert_relative_eq!(table.probability(0), 1.0);
        assert_eq!(
            Some((gpu::LightId::new(0), 1.0)),
            gpu::AliasTableView::new(table.cells()).sample(0.99)
        );
    }

    #[test]
    fn zero_weights() {
        let table = AliasTable::new(&[0.0, 0.0]).unwrap();

        assert_relative_eq!(table.probability(0), 0.5);
        assert_relative_eq!(table.probability(1), 0.5);
    }

    #[test]
    fn invalid_weights() {
        assert!(matches!(AliasTable::new(&[]), Err(Error::EmptyWeights)));

        assert!(matches!(
            AliasTable::new(&[1.0, -1.0]),
            Err(Error::InvalidWeight { index: 1, .. })
        ));

        assert!(matches!(
            AliasTable::new(&[f32::NAN]),
            Err(Error::InvalidWeight { index: 0, .. })
        ));
    }
}
