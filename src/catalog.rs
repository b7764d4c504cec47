use std::{
    collections::{hash_map::Entry, HashMap},
    path::Path,
    time::Instant,
};

/// Column of `movies.csv` holding the movie title.
const TITLE_COLUMN: &str = "title";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} has no \"title\" column")]
    MissingTitleColumn { path: String },

    #[error("{path}: line {line} has no title")]
    MissingTitle { path: String, line: u64 },

    #[error("{path}: line {line}, column {column}: {value:?} is not a number")]
    InvalidNumber {
        path: String,
        line: u64,
        column: usize,
        value: String,
    },

    #[error("catalog has {titles} titles but {vectors} similarity rows")]
    LengthMismatch { titles: usize, vectors: usize },

    #[error("catalog is empty")]
    Empty,
}

/// Summary of a loaded catalog.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogStats {
    pub items: usize,
    pub dimensions: usize,
    pub distinct_titles: usize,
    pub repeated_titles: Vec<String>,
}

/// Ordered movie titles with one feature vector per title.
///
/// Titles are expected to be unique but the source data repeats a few. Title
/// lookup resolves to the first occurrence; later ones stay addressable by
/// position only.
#[derive(Clone, Debug)]
pub struct Catalog {
    titles: Vec<String>,
    vectors: Vec<Vec<f32>>,
    positions: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from `(title, vector)` pairs in catalog order.
    #[cfg(test)]
    pub fn from_items(items: Vec<(String, Vec<f32>)>) -> Result<Self, CatalogError> {
        let (titles, vectors) = items.into_iter().unzip();
        Self::from_parts(titles, vectors)
    }

    fn from_parts(titles: Vec<String>, vectors: Vec<Vec<f32>>) -> Result<Self, CatalogError> {
        if titles.len() != vectors.len() {
            return Err(CatalogError::LengthMismatch {
                titles: titles.len(),
                vectors: vectors.len(),
            });
        }

        if titles.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut positions = HashMap::with_capacity(titles.len());
        for (position, title) in titles.iter().enumerate() {
            // first occurrence wins
            positions.entry(title.clone()).or_insert(position);
        }

        let catalog = Catalog {
            titles,
            vectors,
            positions,
        };

        let repeated = catalog.repeated_titles();
        if !repeated.is_empty() {
            log::warn!(
                "{} titles appear more than once; lookups use the first occurrence",
                repeated.len()
            );
        }

        Ok(catalog)
    }

    /// Load titles from `movies_path` and vectors from `similarity_path`.
    ///
    /// `movies_path` is a CSV file with a header row containing a `title`
    /// column. `similarity_path` has no header; row `i` holds the vector for
    /// the `i`th movie.
    pub fn load(movies_path: &Path, similarity_path: &Path) -> Result<Self, CatalogError> {
        let now = Instant::now();

        let titles = read_titles(movies_path)?;
        let vectors = read_vectors(similarity_path)?;

        log::debug!(
            "took {}ms to read catalog of {} titles",
            now.elapsed().as_micros() as f64 / 1000.0,
            titles.len()
        );

        Self::from_parts(titles, vectors)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    /// Number of different titles.
    pub fn distinct_len(&self) -> usize {
        self.positions.len()
    }

    /// Position of the first item called `title`.
    pub fn position_of(&self, title: &str) -> Option<usize> {
        self.positions.get(title).copied()
    }

    /// Title at `position`.
    ///
    /// Panics if `position` is out of bounds.
    pub fn title(&self, position: usize) -> &str {
        &self.titles[position]
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Move the vectors out, leaving only the titles.
    ///
    /// The similarity index takes ownership of the vectors so the matrix is
    /// held once.
    pub fn take_vectors(&mut self) -> Vec<Vec<f32>> {
        std::mem::take(&mut self.vectors)
    }

    /// Titles that occur more than once, in order of first appearance.
    pub fn repeated_titles(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut repeated = vec![];

        for title in &self.titles {
            match counts.entry(title.as_str()) {
                Entry::Occupied(mut e) => {
                    *e.get_mut() += 1;
                    if *e.get() == 2 {
                        repeated.push(title.clone());
                    }
                }
                Entry::Vacant(e) => {
                    e.insert(1);
                }
            }
        }

        repeated
    }
}

fn read_titles(path: &Path) -> Result<Vec<String>, CatalogError> {
    let path_str = path.display().to_string();
    let csv_err = |source: csv::Error| CatalogError::Csv {
        path: path_str.clone(),
        source,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err)?;
    let column = csv_reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .position(|h| h.trim() == TITLE_COLUMN)
        .ok_or_else(|| CatalogError::MissingTitleColumn {
            path: path_str.clone(),
        })?;

    let mut titles = vec![];
    for (row, record) in csv_reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let title = record.get(column).ok_or_else(|| CatalogError::MissingTitle {
            path: path_str.clone(),
            line: record_line(&record, row + 2),
        })?;
        titles.push(title.to_string());
    }

    Ok(titles)
}

fn read_vectors(path: &Path) -> Result<Vec<Vec<f32>>, CatalogError> {
    let path_str = path.display().to_string();
    let csv_err = |source: csv::Error| CatalogError::Csv {
        path: path_str.clone(),
        source,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(csv_err)?;

    let mut vectors = vec![];
    for (row, record) in csv_reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let line = record_line(&record, row + 1);
        let vector = record
            .iter()
            .enumerate()
            .map(|(column, value)| {
                value
                    .parse::<f32>()
                    .map_err(|_| CatalogError::InvalidNumber {
                        path: path_str.clone(),
                        line,
                        column: column + 1,
                        value: value.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        vectors.push(vector);
    }

    Ok(vectors)
}

/// 1-based line of `record`, as the csv crate reports it in its own errors.
fn record_line(record: &csv::StringRecord, fallback: usize) -> u64 {
    record
        .position()
        .map(|pos| pos.line())
        .unwrap_or(fallback as u64)
}
