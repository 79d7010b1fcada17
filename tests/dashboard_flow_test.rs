use std::collections::BTreeMap;
use std::fs;

use region_stats::config::DashboardConfig;
use region_stats::data::error::DataError;
use region_stats::data::filter::{filter, filter_tables, SelectionState, YearSelection};
use region_stats::data::model::{Table, Value};
use region_stats::data::plot_spec::{build, ChartKind, SeriesKind};
use region_stats::data::registry::{Category, DatasetKind, DatasetRegistry};
use region_stats::state::{AppState, DashboardView, PanelContent};

fn two_year_table() -> Table {
    let mut t = Table::new(["Region", "Year", "Total"]);
    t.push_row(vec![
        Value::Text("A".into()),
        Value::Integer(2019),
        Value::Integer(100),
    ]);
    t.push_row(vec![
        Value::Text("A".into()),
        Value::Integer(2020),
        Value::Integer(110),
    ]);
    t
}

fn selection(years: YearSelection) -> SelectionState {
    SelectionState {
        region: "A".into(),
        years,
        category: Category::Total,
    }
}

#[test]
fn range_selection_to_line_chart() {
    let sel = selection(YearSelection::range(2019, 2020).unwrap());
    let result = filter_tables(&two_year_table(), None, &sel).unwrap();
    assert_eq!(result.population.len(), 2);

    let spec = build(&result.population, "Year", &["Total"], ChartKind::Line, "Total", false).unwrap();
    assert_eq!(spec.series.len(), 1);
    assert_eq!(spec.series[0].kind, SeriesKind::Line);
    assert_eq!(spec.series[0].x_values, vec![2019.0, 2020.0]);
    assert_eq!(spec.series[0].y_values, vec![100.0, 110.0]);
    assert_eq!(spec.x_tick_step, Some(1.0));
}

#[test]
fn single_year_selection_to_bar_equivalent() {
    let result =
        filter_tables(&two_year_table(), None, &selection(YearSelection::Single(2020))).unwrap();
    assert_eq!(result.population.len(), 1);
    assert_eq!(
        result.population.row(0).unwrap().get("Total"),
        Some(&Value::Integer(110))
    );

    let spec = build(&result.population, "Year", &["Total"], ChartKind::Line, "Total", true).unwrap();
    assert_eq!(spec.series[0].kind, SeriesKind::Bar);
    assert_eq!(spec.series[0].x_values, vec![2020.0]);
    assert_eq!(spec.x_tick_step, None);
}

#[test]
fn inverted_range_processes_nothing() {
    let registry = DatasetRegistry::from_tables([(DatasetKind::Total, two_year_table())]);
    let sel = selection(YearSelection::Range {
        start: 2020,
        end: 2019,
    });
    assert_eq!(
        filter(&registry, &sel).unwrap_err(),
        DataError::InvalidRange {
            start: 2020,
            end: 2019
        }
    );
}

#[test]
fn csv_directory_to_dashboard_view() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("Всего.csv"),
        "\u{feff}Субъект Российской Федерации,Год,Всего,18\n\
         Москва,2019,100,3\n0,2019,1,1\nМосква,2020,110,4\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("ЗП.csv"),
        "Год; В среднем за год ;I;II;III;IV\n2020;51344,5;1;2;3;4\n",
    )
    .unwrap();

    let state = AppState::new(DashboardConfig::with_data_dir(dir.path()));

    // Male and female files are absent: reported, but the dashboard still works.
    assert_eq!(state.load_notices.len(), 2);
    assert_eq!(state.regions, vec!["Москва"]);
    assert_eq!(state.year_bounds, Some((2019, 2020)));
    assert_eq!(state.selected_ages, vec!["18"]);

    let DashboardView::Range { panels, .. } = &state.view else {
        panic!("expected range view, got {:?}", state.view);
    };
    let PanelContent::Chart(wage) = &panels[3].content else {
        panic!("expected wage chart");
    };
    assert_eq!(wage.series[0].y_values, vec![51344.5]);
}

#[test]
fn registry_loads_each_file_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("total.csv");
    fs::write(&path, "Region,Year,Total\nA,2019,100\n").unwrap();

    let mut registry = DatasetRegistry::new(BTreeMap::from([(DatasetKind::Total, path.clone())]));
    assert_eq!(registry.load(DatasetKind::Total).unwrap().len(), 1);
    fs::remove_file(&path).unwrap();
    assert_eq!(registry.load(DatasetKind::Total).unwrap().len(), 1);
}
