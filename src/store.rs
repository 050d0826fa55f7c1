//! Loaders that turn files on disk into an item store.

use crate::{ClusterError, Item};
use image::imageops::FilterType;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Loads every image in `dir` as an item. Images are resized to `width` x `height` and their
/// raw RGB bytes become the feature vector, so all items share the same dimensionality.
/// The path of each image is used both as its identifier and as its payload reference.
///
/// Files are read in sorted path order so that repeated runs see the same item order.
pub fn load_image_dir(
    dir: impl AsRef<Path>,
    width: u32,
    height: u32,
) -> Result<Vec<Item<f32>>, ClusterError> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| is_image_file(path))
        .collect();
    paths.sort();
    info!(dir = %dir.display(), n_images = paths.len(), "loading images");

    let mut items = Vec::with_capacity(paths.len());
    for (n, path) in paths.iter().enumerate() {
        let raster = image::open(path)?
            .resize_exact(width, height, FilterType::Triangle)
            .to_rgb8();
        let features = raster.into_raw().into_iter().map(f32::from).collect();
        let reference = path.to_string_lossy().into_owned();
        items.push(Item::new(reference.clone(), features).with_payload(reference));
        debug!("loaded {}/{}", n + 1, paths.len());
    }
    Ok(items)
}

fn is_image_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Loads items from a headerless CSV file where each line is `id,f1,...,fD`.
/// Blank lines are skipped. Items loaded this way carry no payload.
pub fn load_features_csv(path: impl AsRef<Path>) -> Result<Vec<Item<f32>>, ClusterError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let mut items = Vec::new();
    for (line_no, line) in numbered_records(&contents) {
        let mut fields = line.split(',').map(str::trim);
        let id = fields.next().unwrap_or_default();
        if id.is_empty() {
            return Err(ClusterError::InvalidRecord(format!(
                "line {line_no} has no item identifier"
            )));
        }
        let features = fields
            .map(|field| parse_value(field, line_no))
            .collect::<Result<Vec<_>, _>>()?;
        items.push(Item::new(id, features));
    }
    info!(n_items = items.len(), "loaded feature vectors");
    Ok(items)
}

/// Attaches 2-D embedding locations to already loaded items. Each line of the headerless CSV
/// file is `id,x,y` and must name an item present in `items`.
pub fn attach_locations_csv(
    path: impl AsRef<Path>,
    items: &mut [Item<f32>],
) -> Result<(), ClusterError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let positions: HashMap<String, usize> = items
        .iter()
        .enumerate()
        .map(|(n, item)| (item.id.clone(), n))
        .collect();

    for (line_no, line) in numbered_records(&contents) {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 3 {
            return Err(ClusterError::InvalidRecord(format!(
                "line {line_no} should be `id,x,y` but has {} fields",
                fields.len()
            )));
        }
        let position = positions.get(fields[0]).ok_or_else(|| {
            ClusterError::InvalidRecord(format!(
                "line {line_no} locates unknown item `{}`",
                fields[0]
            ))
        })?;
        let x = parse_value(fields[1], line_no)?;
        let y = parse_value(fields[2], line_no)?;
        items[*position].location = Some([x, y]);
    }
    Ok(())
}

fn numbered_records(contents: &str) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .map(|(n, line)| (n + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn parse_value(field: &str, line_no: usize) -> Result<f32, ClusterError> {
    field.parse::<f32>().map_err(|_| {
        ClusterError::InvalidRecord(format!("line {line_no} has a non numeric value `{field}`"))
    })
}
