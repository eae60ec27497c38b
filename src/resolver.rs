use std::path::Path;

use crate::index::{AxisRange, Coordinate, ParameterIndex};

/// Position along every axis, as indices into the axis ranges.
pub type IndexVector = Vec<usize>;

pub fn nearest_index_vector(coordinate: &[f64], ranges: &[AxisRange]) -> IndexVector {
    ranges
        .iter()
        .zip(coordinate)
        .map(|(range, value)| range.nearest_index(*value))
        .collect()
}

/// Moves `axis` by `delta`, clamped to the axis range. Other axes are left
/// untouched.
pub fn step(indices: &[usize], axis: usize, delta: isize, ranges: &[AxisRange]) -> IndexVector {
    let mut stepped = indices.to_vec();
    if let (Some(current), Some(range)) = (stepped.get_mut(axis), ranges.get(axis)) {
        let last = range.last_index() as isize;
        *current = (*current as isize).saturating_add(delta).clamp(0, last) as usize;
    }
    stepped
}

pub fn coordinate_of(indices: &[usize], ranges: &[AxisRange]) -> Coordinate {
    Coordinate::new(
        ranges
            .iter()
            .zip(indices)
            .map(|(range, &index)| range.get(index.min(range.last_index())).unwrap_or_default())
            .collect(),
    )
}

/// `None` when the parameter space has no figure at `coordinate`.
pub fn lookup<'a>(coordinate: &Coordinate, index: &'a ParameterIndex) -> Option<&'a Path> {
    index.lookup(coordinate)
}
