use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::filename::parse_parameter_filename;

/// A point in parameter space, one value per axis.
#[derive(Debug, Clone)]
pub struct Coordinate(Vec<f64>);

impl Coordinate {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values.into_iter().map(normalize_zero).collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

// `-0` and `0` must hash to the same key.
fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(&other.0)
                .all(|(lhs, rhs)| lhs.to_bits() == rhs.to_bits())
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.len().hash(state);
        for value in &self.0 {
            value.to_bits().hash(state);
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (index, value) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

/// Sorted, de-duplicated values observed on one axis. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisRange {
    values: Vec<f64>,
}

impl AxisRange {
    fn from_observed(mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        values.dedup_by(|a, b| a.to_bits() == b.to_bits());
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn min(&self) -> f64 {
        self.values.first().copied().unwrap_or_default()
    }

    pub fn max(&self) -> f64 {
        self.values.last().copied().unwrap_or_default()
    }

    pub fn last_index(&self) -> usize {
        self.values.len().saturating_sub(1)
    }

    /// True when the axis carries a single value and cannot be stepped.
    pub fn is_fixed(&self) -> bool {
        self.values.len() <= 1
    }

    /// Index of the entry closest to `value`; ties go to the lower index.
    pub fn nearest_index(&self, value: f64) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (index, candidate) in self.values.iter().enumerate() {
            let distance = (candidate - value).abs();
            if distance < best_distance {
                best = index;
                best_distance = distance;
            }
        }
        best
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Directory `{}` not found.", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("Could not read directory `{}`: {source}", .path.display())]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("No matching images in `{}`.", .0.display())]
    NoMatchingImages(PathBuf),
    #[error(
        "Mismatched parameter names: `{file}` has [{}] but earlier files have [{}].",
        .found.join(", "),
        .expected.join(", ")
    )]
    MismatchedParameterNames {
        file: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Immutable mapping from parameter coordinates to figure files, built from
/// one directory listing.
#[derive(Debug, Clone)]
pub struct ParameterIndex {
    directory: PathBuf,
    names: Vec<String>,
    coordinates: Vec<Coordinate>,
    ranges: Vec<AxisRange>,
    files: HashMap<Coordinate, PathBuf>,
}

impl ParameterIndex {
    pub fn build(directory: &Path) -> Result<Self, IndexError> {
        if !directory.is_dir() {
            return Err(IndexError::DirectoryNotFound(directory.to_path_buf()));
        }

        let read_error = |source| IndexError::ReadDirectory {
            path: directory.to_path_buf(),
            source,
        };
        let mut filenames = Vec::new();
        for entry in fs::read_dir(directory).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            if entry.file_type().map(|kind| kind.is_dir()).unwrap_or(false) {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => filenames.push(name),
                Err(raw) => log::debug!("Skipping non UTF-8 entry {raw:?}"),
            }
        }
        filenames.sort();

        Self::from_filenames(directory, filenames)
    }

    /// Builds the index from an already sorted listing.
    pub fn from_filenames<I, S>(directory: &Path, filenames: I) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = None::<Vec<String>>;
        let mut coordinates = Vec::new();
        let mut files = HashMap::new();

        for filename in filenames {
            let filename = filename.as_ref();
            let Some(parameters) = parse_parameter_filename(filename) else {
                log::debug!("Skipping `{filename}`: not a parameter filename");
                continue;
            };

            let file_names = parameters
                .iter()
                .map(|parameter| parameter.name.clone())
                .collect::<Vec<_>>();
            match names.as_ref() {
                None => names = Some(file_names),
                Some(expected) if *expected != file_names => {
                    return Err(IndexError::MismatchedParameterNames {
                        file: filename.to_string(),
                        expected: expected.clone(),
                        found: file_names,
                    });
                }
                Some(_) => {}
            }

            let Some(values) = parameters
                .iter()
                .map(|parameter| parameter.numeric_value())
                .collect::<Option<Vec<_>>>()
            else {
                log::debug!("Skipping `{filename}`: value is not a finite number");
                continue;
            };

            let coordinate = Coordinate::new(values);
            if let Some(previous) = files.insert(coordinate.clone(), directory.join(filename)) {
                log::warn!(
                    "Coordinate {coordinate} maps to both {} and `{filename}`; keeping the latter",
                    previous.display()
                );
            }
            coordinates.push(coordinate);
        }

        let Some(names) = names else {
            return Err(IndexError::NoMatchingImages(directory.to_path_buf()));
        };
        if coordinates.is_empty() {
            return Err(IndexError::NoMatchingImages(directory.to_path_buf()));
        }

        let ranges = (0..names.len())
            .map(|axis| {
                AxisRange::from_observed(
                    coordinates
                        .iter()
                        .map(|coordinate| coordinate.values()[axis])
                        .collect(),
                )
            })
            .collect::<Vec<_>>();

        log::info!(
            "Indexed {} figure(s) over [{}] in {}",
            coordinates.len(),
            names.join(", "),
            directory.display()
        );

        Ok(Self {
            directory: directory.to_path_buf(),
            names,
            coordinates,
            ranges,
            files,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Every parsed coordinate, in scan order (duplicates included).
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn ranges(&self) -> &[AxisRange] {
        &self.ranges
    }

    pub fn axis_count(&self) -> usize {
        self.names.len()
    }

    /// Number of distinct coordinates that resolve to a file.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn lookup(&self, coordinate: &Coordinate) -> Option<&Path> {
        self.files.get(coordinate).map(PathBuf::as_path)
    }
}
