use crate::{
    manage::{
        create_table, delete_table, format_results, get_dm_range, get_tables, load_file, Value,
    },
    test_util::{connection_with, record, results},
    CommandError,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn input_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();

    file
}

#[test]
fn dm_range_is_distinct_and_filtered_by_samples() {
    let connection = connection_with(&[
        record(2048, 5, 8, 1, 10.0),
        record(1024, 5, 8, 1, 12.0),
        record(2048, 5, 16, 1, 11.0),
        record(4096, 7, 8, 1, 9.0),
        record(1024, 5, 32, 2, 13.0),
    ]);

    assert_eq!(get_dm_range(&connection, &results(), 5).unwrap(), vec![1024, 2048]);
    assert_eq!(get_dm_range(&connection, &results(), 7).unwrap(), vec![4096]);
    assert!(get_dm_range(&connection, &results(), 9).unwrap().is_empty());
}

#[test]
fn create_keeps_existing_table() {
    let connection = connection_with(&[record(1, 5, 8, 1, 10.0)]);

    create_table(&connection, &results()).unwrap();

    assert_eq!(get_dm_range(&connection, &results(), 5).unwrap(), vec![1]);
}

#[test]
fn delete_ignores_missing_tables() {
    let connection = connection_with(&[]);
    let missing = "missing".parse().unwrap();

    delete_table(&connection, &missing).unwrap();
    delete_table(&connection, &results()).unwrap();

    assert!(get_tables(&connection).unwrap().is_empty());
}

#[test]
fn lists_tables_by_name() {
    let connection = connection_with(&[]);
    create_table(&connection, &"archive".parse().unwrap()).unwrap();

    assert_eq!(
        get_tables(&connection).unwrap(),
        vec![
            vec![Value::Text("archive".to_owned())],
            vec![Value::Text("results".to_owned())]
        ]
    );
}

#[test]
fn loads_tuner_output() {
    let mut connection = connection_with(&[]);
    let file = input_file(
        "# DMs samples *configuration* GB/s time stdDeviation COV\n\
         \n\
         1 5 8 1 2 1 10.0 0.3 0.01 0.03\n\
         1 5 16 1 2 1 20.0 0.2 0.01 0.05\n\
         2 5 16 1 4 1 30.0 0.1 0.01 0.1\n",
    );

    assert_eq!(load_file(&mut connection, &results(), file.path()).unwrap(), 3);
    assert_eq!(get_dm_range(&connection, &results(), 5).unwrap(), vec![1, 2]);
}

#[test]
fn malformed_input_stores_nothing() {
    let mut connection = connection_with(&[]);
    let file = input_file("1 5 8 1 2 1 10.0 0.3 0.01 0.03\n1 5 8 1 2 1 fast 0.3 0.01 0.03\n");

    let error = load_file(&mut connection, &results(), file.path()).unwrap_err();

    assert!(matches!(error, CommandError::Ingest(_)));
    assert!(get_dm_range(&connection, &results(), 5).unwrap().is_empty());
}

#[test]
fn load_reports_missing_files_and_tables() {
    let mut connection = connection_with(&[]);

    let error = load_file(
        &mut connection,
        &results(),
        std::path::Path::new("/nonexistent/tuning.txt"),
    )
    .unwrap_err();
    assert!(matches!(error, CommandError::Input(..)));

    let file = input_file("1 5 8 1 2 1 10.0 0.3 0.01 0.03\n");
    let error = load_file(&mut connection, &"missing".parse().unwrap(), file.path()).unwrap_err();
    assert!(matches!(error, CommandError::Database(_)));
}

#[test]
fn formats_rows_as_columns() {
    let rows = vec![
        vec![Value::from(1i64), Value::from(10.0), Value::from(20.5)],
        vec![Value::from("table".to_owned())],
    ];

    assert_eq!(format_results(&rows), "1 10 20.5\ntable\n");
    assert_eq!(format_results(&[]), "");
}
