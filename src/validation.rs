use crate::{ClusterError, Item};
use num_traits::Float;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DataValidator<'a, T> {
    items: &'a [Item<T>],
}

impl<'a, T: Float> DataValidator<'a, T> {
    pub(crate) fn new(items: &'a [Item<T>]) -> Self {
        Self { items }
    }

    pub(crate) fn validate_items(&self) -> Result<(), ClusterError> {
        if self.items.is_empty() {
            return Err(ClusterError::EmptyItemStore);
        }
        let dims_0th = self.items[0].n_dims();
        for (n, item) in self.items.iter().enumerate() {
            if item.features.iter().any(|element| !element.is_finite()) {
                return Err(ClusterError::NonFiniteCoordinate(format!(
                    "{n}th feature vector ({}) contains non-finite element(s)",
                    item.id
                )));
            }
            let dims_nth = item.n_dims();
            if dims_nth != dims_0th {
                return Err(ClusterError::WrongDimension(format!(
                    "0th item has {dims_0th} dimensions, but {n}th has {dims_nth}"
                )));
            }
        }
        self.validate_locations()
    }

    fn validate_locations(&self) -> Result<(), ClusterError> {
        let n_located = self.items.iter().filter(|item| item.location.is_some()).count();
        if n_located != 0 && n_located != self.items.len() {
            return Err(ClusterError::WrongDimension(format!(
                "only {n_located} of {} items have an embedding location",
                self.items.len()
            )));
        }
        for (n, item) in self.items.iter().enumerate() {
            if let Some([x, y]) = item.location {
                if !x.is_finite() || !y.is_finite() {
                    return Err(ClusterError::NonFiniteCoordinate(format!(
                        "{n}th location contains non-finite element(s)"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_item_store() {
        let items: Vec<Item<f32>> = Vec::new();
        let result = DataValidator::new(&items).validate_items();
        assert!(matches!(result, Err(ClusterError::EmptyItemStore)));
    }

    #[test]
    fn mismatched_dimensions() {
        let items = vec![
            Item::new("a", vec![1.5, 2.2]),
            Item::new("b", vec![1.0, 1.1]),
            Item::new("c", vec![1.2]),
        ];
        let result = DataValidator::new(&items).validate_items();
        assert!(matches!(result, Err(ClusterError::WrongDimension(..))));
    }

    #[test]
    fn non_finite_coordinate() {
        let items = vec![Item::new("a", vec![1.5, f32::NAN])];
        let result = DataValidator::new(&items).validate_items();
        assert!(matches!(result, Err(ClusterError::NonFiniteCoordinate(..))));
    }

    #[test]
    fn partial_locations() {
        let items = vec![
            Item::new("a", vec![1.0_f32]).with_location(0.0, 0.0),
            Item::new("b", vec![2.0_f32]),
        ];
        let result = DataValidator::new(&items).validate_items();
        assert!(matches!(result, Err(ClusterError::WrongDimension(..))));
    }

    #[test]
    fn valid_items() {
        let items = vec![
            Item::new("a", vec![1.0_f32, 0.0]).with_location(0.0, 0.0),
            Item::new("b", vec![2.0_f32, 1.0]).with_location(1.0, 1.0),
        ];
        assert!(DataValidator::new(&items).validate_items().is_ok());
    }
}
