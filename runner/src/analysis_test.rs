use crate::{
    analysis::{
        histogram, optimization_space, single_parameter_space, statistics, AnalysisError,
        ParameterCurve, MAX_BUCKETS,
    },
    manage::Value,
    test_util::{connection_with, record, results},
    CommandError,
};
use tunedb_ingest::Parameter;

fn real(value: &Value) -> f64 {
    match value {
        Value::Real(value) => *value,
        other => panic!("expected a real, found {other:?}"),
    }
}

#[test]
fn statistics_of_a_single_group() {
    let connection = connection_with(&[
        record(1, 5, 8, 1, 10.0),
        record(1, 5, 16, 1, 20.0),
        record(1, 5, 32, 1, 30.0),
    ]);

    let confs = statistics(&connection, &results(), 5).unwrap();
    let stddev = (200.0f64 / 3.0).sqrt();

    assert_eq!(confs.len(), 1);
    assert_eq!(confs[0][0], Value::Integer(1));
    assert_eq!(real(&confs[0][1]), 10.0);
    assert_eq!(real(&confs[0][2]), 30.0);
    assert_eq!(real(&confs[0][3]), 20.0);
    assert!((real(&confs[0][4]) - stddev).abs() < 1e-9);
    assert!((real(&confs[0][5]) - 10.0 / stddev).abs() < 1e-9);
}

#[test]
fn statistics_per_dm_ignores_other_samples() {
    let connection = connection_with(&[
        record(2, 5, 8, 1, 4.0),
        record(2, 5, 8, 2, 8.0),
        record(1, 5, 8, 1, 1.0),
        record(1, 5, 8, 2, 3.0),
        record(1, 6, 8, 1, 100.0),
    ]);

    let confs = statistics(&connection, &results(), 5).unwrap();

    assert_eq!(confs.len(), 2);
    assert_eq!(confs[0][0], Value::Integer(1));
    assert_eq!(real(&confs[0][2]), 3.0);
    assert_eq!(real(&confs[0][4]), 1.0);
    assert_eq!(confs[1][0], Value::Integer(2));
    assert_eq!(real(&confs[1][3]), 6.0);
    assert_eq!(real(&confs[1][5]), 1.0);
}

#[test]
fn statistics_rejects_constant_throughput() {
    let connection = connection_with(&[record(3, 5, 8, 1, 7.0), record(3, 5, 16, 1, 7.0)]);

    let error = statistics(&connection, &results(), 5).unwrap_err();

    assert!(matches!(
        error,
        CommandError::Analysis(AnalysisError::ZeroDeviation { dms: 3 })
    ));
}

#[test]
fn statistics_rejects_constant_throughput_with_inexact_mean() {
    let connection = connection_with(&[
        record(1, 5, 8, 1, 0.1),
        record(1, 5, 16, 1, 0.1),
        record(1, 5, 32, 1, 0.1),
    ]);

    let error = statistics(&connection, &results(), 5).unwrap_err();

    assert!(matches!(
        error,
        CommandError::Analysis(AnalysisError::ZeroDeviation { dms: 1 })
    ));
}

#[test]
fn statistics_mean_stays_within_range() {
    let connection = connection_with(&[
        record(1, 5, 8, 1, 0.1),
        record(1, 5, 16, 1, 0.1),
        record(1, 5, 32, 1, 0.2),
    ]);

    let confs = statistics(&connection, &results(), 5).unwrap();

    assert!(real(&confs[0][3]) <= real(&confs[0][2]));
    assert!(real(&confs[0][4]) > 0.0);
    assert!(real(&confs[0][5]) >= 0.0);
}

#[test]
fn histogram_counts_every_record() {
    let connection = connection_with(&[
        record(1, 5, 8, 1, 0.5),
        record(1, 5, 8, 2, 3.9),
        record(1, 5, 8, 4, 3.1),
        record(1, 5, 16, 1, 5.0),
        record(2, 5, 8, 1, 2.2),
    ]);

    let hists = histogram(&connection, &results(), 5).unwrap();

    assert_eq!(hists, vec![vec![1, 0, 0, 2, 0, 1], vec![0, 0, 1]]);
    assert_eq!(hists[0].iter().sum::<u64>(), 4);
}

#[test]
fn histogram_rejects_negative_throughput() {
    let connection = connection_with(&[record(1, 5, 8, 1, -1.0), record(1, 5, 8, 2, 1.0)]);

    assert!(matches!(
        histogram(&connection, &results(), 5).unwrap_err(),
        CommandError::Analysis(AnalysisError::NegativeThroughput { dms: 1, .. })
    ));
}

#[test]
fn histogram_rejects_unbounded_throughput() {
    for gbs in [f64::INFINITY, 1e20, 1e12, MAX_BUCKETS as f64] {
        let connection = connection_with(&[record(1, 5, 8, 1, gbs), record(1, 5, 8, 2, 1.0)]);

        let error = histogram(&connection, &results(), 5).unwrap_err();

        assert!(
            matches!(
                error,
                CommandError::Analysis(AnalysisError::TooManyBuckets { dms: 1, .. })
            ),
            "unexpected result for {gbs}: {error:?}"
        );
    }
}

#[test]
fn histogram_accepts_largest_bucket() {
    let gbs = (MAX_BUCKETS - 1) as f64;
    let connection = connection_with(&[record(1, 5, 8, 1, gbs)]);

    let hists = histogram(&connection, &results(), 5).unwrap();

    assert_eq!(hists[0].len(), MAX_BUCKETS);
    assert_eq!(hists[0][MAX_BUCKETS - 1], 1);
}

#[test]
fn optimization_space_returns_first_stored_configuration() {
    let connection = connection_with(&[
        record(1, 5, 8, 4, 10.0),
        record(1, 5, 16, 2, 20.0),
        record(2, 5, 32, 1, 5.0),
    ]);

    let confs = optimization_space(&connection, &results(), 5).unwrap();

    assert_eq!(
        confs,
        vec![
            vec![
                Value::Integer(8),
                Value::Integer(1),
                Value::Integer(4),
                Value::Integer(1),
                Value::Real(10.0)
            ],
            vec![
                Value::Integer(32),
                Value::Integer(1),
                Value::Integer(1),
                Value::Integer(1),
                Value::Real(5.0)
            ],
        ]
    );
}

#[test]
fn single_parameter_space_is_sorted_and_distinct() {
    let connection = connection_with(&[
        record(1, 5, 64, 1, 9.0),
        record(1, 5, 8, 1, 10.0),
        record(1, 5, 8, 2, 14.0),
        record(1, 5, 32, 4, 12.0),
        record(1, 5, 32, 1, 11.0),
        record(2, 5, 8, 1, 3.0),
        record(2, 6, 16, 1, 99.0),
    ]);

    let curves = single_parameter_space(&connection, &results(), Parameter::ThreadsD0, 5).unwrap();

    assert_eq!(
        curves,
        vec![
            ParameterCurve {
                dms: 1,
                points: vec![(8, 14.0), (32, 12.0), (64, 9.0)],
            },
            ParameterCurve {
                dms: 2,
                points: vec![(8, 3.0)],
            },
        ]
    );

    let items = single_parameter_space(&connection, &results(), Parameter::ItemsD0, 5).unwrap();
    assert_eq!(items[0].points, vec![(1, 11.0), (2, 14.0), (4, 12.0)]);
}
