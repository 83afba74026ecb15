use chrono::NaiveDate;
use minicharts::timeseries::reshape;
use minicharts::{AddRequest, Field, Location, Minicharts, MinichartsError, SeriesMatrix, TimeKey};

fn column(values: &[f64]) -> SeriesMatrix {
    SeriesMatrix::new(values.iter().map(|&v| vec![v]).collect()).unwrap()
}

fn years(v: &[i32]) -> Vec<TimeKey> {
    v.iter().map(|&y| TimeKey::from(y)).collect()
}

#[test]
fn balanced_panel_rows_equal_anchors_times_steps() {
    // 3 anchors x 2 steps, time-major.
    let data = column(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let time = years(&[2000, 2000, 2000, 2010, 2010, 2010]);
    let ts = reshape(&data, Some(&time), None, None).unwrap();
    assert_eq!(ts.steps(), 2);
    assert_eq!(ts.anchors(), 3);
    assert_eq!(data.nrows(), ts.steps() * ts.anchors());
    assert_eq!(ts.slices[1], vec![vec![4.0], vec![5.0], vec![6.0]]);
}

#[test]
fn unbalanced_keys_are_a_data_shape_error() {
    // 2000 appears twice as often as 2010.
    let data = column(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let time = years(&[2000, 2000, 2000, 2000, 2010, 2010]);
    let err = reshape(&data, Some(&time), None, None).unwrap_err();
    assert!(matches!(err, MinichartsError::DataShape(_)));
}

#[test]
fn uneven_row_count_is_a_data_shape_error() {
    let data = column(&[1.0, 2.0, 3.0]);
    let time = years(&[1, 1, 2]);
    let err = reshape(&data, Some(&time), None, None).unwrap_err();
    assert!(matches!(err, MinichartsError::DataShape(_)));
}

#[test]
fn time_length_must_match_rows() {
    let data = column(&[1.0, 2.0]);
    let err = reshape(&data, Some(&years(&[1])), None, None).unwrap_err();
    assert!(matches!(err, MinichartsError::DataShape(_)));
}

#[test]
fn keys_keep_first_seen_order() {
    let data = column(&[1.0, 2.0, 3.0]);
    let time = vec![TimeKey::from("c"), TimeKey::from("a"), TimeKey::from("b")];
    let ts = reshape(&data, Some(&time), None, None).unwrap();
    assert_eq!(ts.labels, vec!["c", "a", "b"]);
}

#[test]
fn unknown_initial_time_falls_back_to_first_step() {
    let data = column(&[1.0, 2.0]);
    let time = years(&[2000, 2001]);
    let ts = reshape(&data, Some(&time), None, Some(&TimeKey::from(1999))).unwrap();
    assert_eq!(ts.initial_index, 0);
    let ts = reshape(&data, Some(&time), None, Some(&TimeKey::from(2001))).unwrap();
    assert_eq!(ts.initial_index, 1);
}

#[test]
fn datetime_labels_follow_pattern() {
    let t1 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(6, 0, 0).unwrap();
    let t2 = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(18, 30, 0).unwrap();
    let data = column(&[1.0, 2.0]);
    let time = vec![TimeKey::from(t1), TimeKey::from(t2)];
    let ts = reshape(&data, Some(&time), Some("%H:%M"), None).unwrap();
    assert_eq!(ts.labels, vec!["06:00", "18:30"]);
    let ts = reshape(&data, Some(&time), None, None).unwrap();
    assert_eq!(ts.labels, vec!["2024-03-01 06:00:00", "2024-03-01 18:30:00"]);
}

#[test]
fn add_rejects_rows_that_do_not_match_locations() {
    // 4 rows, 2 steps -> 2 anchors per step, but 3 locations.
    let req = AddRequest::new(
        vec![Location::new(0.0, 0.0), Location::new(1.0, 1.0), Location::new(2.0, 2.0)],
        column(&[1.0, 2.0, 3.0, 4.0]),
    )
    .with_time(years(&[1, 1, 2, 2]));
    let err = Minicharts::default().add(&req).unwrap_err();
    assert!(matches!(err, MinichartsError::DataShape(_)));
}

#[test]
fn add_payload_ships_every_slice_and_label() {
    let mut req = AddRequest::new(
        vec![Location::new(0.0, 0.0), Location::new(1.0, 1.0)],
        column(&[1.0, 2.0, 3.0, 4.0]),
    )
    .with_time(years(&[1990, 1990, 2000, 2000]));
    req.initial_time = Some(TimeKey::from(2000));
    let cmds = Minicharts::default().add(&req).unwrap();
    let payload = cmds[0].payload().unwrap();
    assert_eq!(
        payload.chartdata,
        Field::Value(vec![vec![vec![1.0], vec![2.0]], vec![vec![3.0], vec![4.0]]])
    );
    assert_eq!(payload.time_labels, Field::Value(vec!["1990".into(), "2000".into()]));
    assert_eq!(payload.initial_time_index, Field::Value(1));
    assert_eq!(payload.options.time, Field::Value(1));
}
