use num_traits::Float;
use std::path::Path;

/// One entity of the collection being explored, typically an image.
///
/// The feature vector drives partitioning. The payload is a reference to the raster the item
/// was built from and becomes the preview of the item's terminal leaf. The location is an
/// optional point of a 2-D embedding, used only to annotate nodes for layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Item<T> {
    pub id: String,
    pub features: Vec<T>,
    pub payload: Option<String>,
    pub location: Option<[T; 2]>,
}

impl<T: Float> Item<T> {
    /// Creates an item with no payload and no location.
    pub fn new(id: impl Into<String>, features: Vec<T>) -> Self {
        Item {
            id: id.into(),
            features,
            payload: None,
            location: None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_location(mut self, x: T, y: T) -> Self {
        self.location = Some([x, y]);
        self
    }

    /// The display label of the item: the file basename of its identifier, or the whole
    /// identifier when it has none.
    ///
    /// # Examples
    /// ```
    ///use photospheres::Item;
    ///
    ///let item = Item::new("./images/n01440764_10026.JPEG", vec![0.0_f32, 1.0]);
    ///assert_eq!("n01440764_10026.JPEG", item.label());
    /// ```
    pub fn label(&self) -> String {
        Path::new(&self.id)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.id.clone())
    }

    pub fn n_dims(&self) -> usize {
        self.features.len()
    }
}
