use num_traits::Float;

/// Possible methodologies for calculating the center of a group of feature vectors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Center {
    /// The elementwise mean of all data points in a group.
    /// The output is not guaranteed to be an observed data point.
    Centroid,
}

impl Center {
    /// Calculates one center per group. Points labelled `None` are ignored. A group without
    /// members gets a zero vector.
    pub(crate) fn calc_centers<T: Float>(
        &self,
        data: &[Vec<T>],
        labels: &[Option<usize>],
        n_groups: usize,
    ) -> Vec<Vec<T>> {
        debug_assert_eq!(data.len(), labels.len());
        match self {
            Center::Centroid => self.calc_centroids(data, labels, n_groups),
        }
    }

    fn calc_centroids<T: Float>(
        &self,
        data: &[Vec<T>],
        labels: &[Option<usize>],
        n_groups: usize,
    ) -> Vec<Vec<T>> {
        let n_dims = data.first().map(Vec::len).unwrap_or(0);
        let mut sums = vec![vec![T::zero(); n_dims]; n_groups];
        let mut counts = vec![0_usize; n_groups];

        for (datapoint, label) in data.iter().zip(labels) {
            if let Some(group) = label {
                counts[*group] += 1;
                for (sum, element) in sums[*group].iter_mut().zip(datapoint) {
                    *sum = *sum + *element;
                }
            }
        }

        for (sum, count) in sums.iter_mut().zip(counts) {
            if count == 0 {
                continue;
            }
            let count = T::from(count).unwrap_or(T::one());
            for element in sum.iter_mut() {
                *element = *element / count;
            }
        }
        sums
    }
}
