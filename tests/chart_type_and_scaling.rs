use minicharts::models::MaxValues;
use minicharts::resolve::{resolve_chart_type, resolve_max_values};
use minicharts::{AddRequest, ChartType, Field, Location, Minicharts, MinichartsError, SeriesMatrix};

fn matrix(ncols: usize) -> SeriesMatrix {
    SeriesMatrix::new(vec![(1..=ncols).map(|v| v as f64).collect()]).unwrap()
}

#[test]
fn auto_resolves_by_variable_count() {
    for ncols in 1..=5 {
        let want = if ncols == 1 {
            ChartType::PolarArea
        } else {
            ChartType::Bar
        };
        assert_eq!(resolve_chart_type(ChartType::Auto, ncols), want, "ncols={ncols}");
    }
}

#[test]
fn add_payload_carries_resolved_type() {
    let charts = Minicharts::default();
    let single = AddRequest::new(vec![Location::new(0.0, 0.0)], matrix(1));
    let cmds = charts.add(&single).unwrap();
    assert_eq!(
        cmds[0].payload().unwrap().options.chart_type,
        Field::Value(ChartType::PolarArea)
    );

    let pie = AddRequest::new(vec![Location::new(0.0, 0.0)], matrix(3)).with_type(ChartType::Pie);
    let cmds = charts.add(&pie).unwrap();
    assert_eq!(
        cmds[0].payload().unwrap().options.chart_type,
        Field::Value(ChartType::Pie)
    );
}

#[test]
fn scalar_ceiling_is_broadcast_to_every_variable() {
    for (m, k) in [(6.0, 1), (0.5, 3), (100.0, 7)] {
        let got = resolve_max_values(Some(&MaxValues::Shared(m)), &matrix(k)).unwrap();
        assert_eq!(got.len(), k);
        assert!(got.iter().all(|&v| v == m));
    }
}

#[test]
fn per_variable_ceiling_is_used_as_is() {
    let got = resolve_max_values(Some(&MaxValues::PerVariable(vec![5.0, 6.0, 7.0])), &matrix(3))
        .unwrap();
    assert_eq!(got, vec![5.0, 6.0, 7.0]);
}

#[test]
fn mismatched_ceiling_length_fails_the_add() {
    let req = AddRequest::new(vec![Location::new(0.0, 0.0)], matrix(3))
        .with_max_values(MaxValues::PerVariable(vec![1.0, 2.0]));
    let err = Minicharts::default().add(&req).unwrap_err();
    assert!(matches!(err, MinichartsError::Validation(_)));
}

#[test]
fn missing_ceiling_is_observed_maximum_per_variable() {
    let data = SeriesMatrix::new(vec![vec![1.0, -9.0], vec![4.0, 2.0]]).unwrap();
    let got = resolve_max_values(None, &data).unwrap();
    assert_eq!(got, vec![4.0, 9.0]);
}
