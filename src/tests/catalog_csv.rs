use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogError};
use crate::similarity::{IndexError, Recommender};

fn write_files(dir: &Path, movies: &str, similarity: &str) -> (PathBuf, PathBuf) {
    let movies_path = dir.join("movies.csv");
    let similarity_path = dir.join("similarity.csv");
    std::fs::write(&movies_path, movies).unwrap();
    std::fs::write(&similarity_path, similarity).unwrap();
    (movies_path, similarity_path)
}

const MOVIES: &str = "\
movie_id,title
19995,Avatar
285,Pirates of the Caribbean: At World's End
206647,Spectre
";

const SIMILARITY: &str = "\
1.0, 0.2, 0.1
0.2, 1.0, 0.6
0.1, 0.6, 1.0
";

#[test]
fn load_titles_and_vectors() {
    let tmp = tempfile::tempdir().unwrap();
    let (movies, similarity) = write_files(tmp.path(), MOVIES, SIMILARITY);

    let mut catalog = Catalog::load(&movies, &similarity).unwrap();
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.title(1), "Pirates of the Caribbean: At World's End");
    assert_eq!(catalog.position_of("Spectre"), Some(2));

    let vectors = catalog.take_vectors();
    assert_eq!(vectors.len(), 3);
    assert_eq!(vectors[1], vec![0.2, 1.0, 0.6]);
}

#[test]
fn loaded_catalog_recommends() {
    let tmp = tempfile::tempdir().unwrap();
    let (movies, similarity) = write_files(tmp.path(), MOVIES, SIMILARITY);

    let rec = Recommender::new(Catalog::load(&movies, &similarity).unwrap()).unwrap();
    let result = rec.recommend("Spectre", 5).unwrap();

    let titles: Vec<&str> = result.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Pirates of the Caribbean: At World's End", "Avatar"]
    );
}

#[test]
fn quoted_titles_with_commas() {
    let tmp = tempfile::tempdir().unwrap();
    let (movies, similarity) = write_files(
        tmp.path(),
        "title\n\"Crouching Tiger, Hidden Dragon\"\nHero\n",
        "1,0\n0,1\n",
    );

    let catalog = Catalog::load(&movies, &similarity).unwrap();
    assert_eq!(catalog.title(0), "Crouching Tiger, Hidden Dragon");
}

#[test]
fn missing_title_column() {
    let tmp = tempfile::tempdir().unwrap();
    let (movies, similarity) = write_files(tmp.path(), "id,name\n1,Avatar\n", "1,0\n");

    let result = Catalog::load(&movies, &similarity);
    assert!(matches!(result, Err(CatalogError::MissingTitleColumn { .. })));
}

#[test]
fn row_count_mismatch() {
    let tmp = tempfile::tempdir().unwrap();
    let (movies, similarity) = write_files(tmp.path(), MOVIES, "1,0,0\n0,1,0\n");

    let result = Catalog::load(&movies, &similarity);
    assert!(matches!(
        result,
        Err(CatalogError::LengthMismatch {
            titles: 3,
            vectors: 2
        })
    ));
}

#[test]
fn invalid_number_reports_location() {
    let tmp = tempfile::tempdir().unwrap();
    let (movies, similarity) = write_files(
        tmp.path(),
        MOVIES,
        "1.0,0.2,0.1\n0.2,oops,0.6\n0.1,0.6,1.0\n",
    );

    let err = Catalog::load(&movies, &similarity).unwrap_err();
    // line and column count from 1, like the csv crate's own errors
    assert!(err.to_string().contains("line 2, column 2"), "{err}");

    match err {
        CatalogError::InvalidNumber {
            line, column, value, ..
        } => {
            assert_eq!(line, 2);
            assert_eq!(column, 2);
            assert_eq!(value, "oops");
        }
        other => panic!("expected InvalidNumber, got {other:?}"),
    }
}

#[test]
fn short_row_reports_missing_title() {
    let tmp = tempfile::tempdir().unwrap();
    let (movies, similarity) = write_files(
        tmp.path(),
        "year,title\n2009,Avatar\n2015\n",
        "1,0\n0,1\n",
    );

    match Catalog::load(&movies, &similarity) {
        Err(CatalogError::MissingTitle { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected MissingTitle, got {other:?}"),
    }
}

#[test]
fn empty_files() {
    let tmp = tempfile::tempdir().unwrap();
    let (movies, similarity) = write_files(tmp.path(), "title\n", "");

    let result = Catalog::load(&movies, &similarity);
    assert!(matches!(result, Err(CatalogError::Empty)));
}

#[test]
fn missing_file() {
    let tmp = tempfile::tempdir().unwrap();
    let result = Catalog::load(&tmp.path().join("nope.csv"), &tmp.path().join("nope2.csv"));
    assert!(matches!(result, Err(CatalogError::Csv { .. })));
}

#[test]
fn ragged_rows_rejected_by_index() {
    let tmp = tempfile::tempdir().unwrap();
    let (movies, similarity) = write_files(tmp.path(), MOVIES, "1,0,0\n0,1\n0,0,1\n");

    let catalog = Catalog::load(&movies, &similarity).unwrap();
    let result = Recommender::new(catalog);
    assert!(matches!(
        result,
        Err(IndexError::DimensionMismatch {
            position: 1,
            expected: 3,
            got: 2
        })
    ));
}

#[test]
fn nan_rejected_by_index() {
    let tmp = tempfile::tempdir().unwrap();
    let (movies, similarity) = write_files(tmp.path(), MOVIES, "1,0,0\n0,NaN,0\n0,0,1\n");

    let catalog = Catalog::load(&movies, &similarity).unwrap();
    assert!(matches!(
        Recommender::new(catalog),
        Err(IndexError::NonFinite { position: 1 })
    ));
}

#[test]
fn repeated_titles_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let (movies, similarity) = write_files(
        tmp.path(),
        "title\nThe Host\nOut of the Blue\nThe Host\n",
        "1,0\n0,1\n1,1\n",
    );

    let rec = Recommender::new(Catalog::load(&movies, &similarity).unwrap()).unwrap();
    let stats = rec.stats();
    assert_eq!(stats.items, 3);
    assert_eq!(stats.dimensions, 2);
    assert_eq!(stats.distinct_titles, 2);
    assert_eq!(stats.repeated_titles, vec!["The Host"]);
    assert_eq!(rec.catalog().position_of("The Host"), Some(0));
}
