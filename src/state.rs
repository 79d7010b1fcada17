use crate::config::DashboardConfig;
use crate::data::error::{DataError, Result, Severity};
use crate::data::filter::{self, FilteredResult, SelectionState, YearSelection};
use crate::data::model::{
    age_columns, Table, AGE_GROUP_COLUMNS, MONTH_COLUMNS, QUARTER_COLUMNS, TOTAL_COLUMNS,
    WAGE_AVERAGE_COLUMN,
};
use crate::data::plot_spec::{self, ChartKind, PlotSpec};
use crate::data::registry::{Category, DatasetRegistry};
use crate::data::summary::{summarize, Summary};

/// Age pre-selected when the table has it.
const DEFAULT_AGE: &str = "18";
/// Months pre-selected for the monthly wage view.
const DEFAULT_MONTH_COUNT: usize = 6;

// ---------------------------------------------------------------------------
// Control values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearMode {
    Single,
    Range,
}

/// Which wage analysis is shown. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WageView {
    #[default]
    Average,
    Quarters,
    Months,
}

impl WageView {
    pub const ALL: [WageView; 3] = [WageView::Average, WageView::Quarters, WageView::Months];

    pub fn label(self) -> &'static str {
        match self {
            WageView::Average => "Average wage",
            WageView::Quarters => "Wage by quarter",
            WageView::Months => "Wage by month",
        }
    }

    fn title(self) -> &'static str {
        match self {
            WageView::Average => "Average wage by year",
            WageView::Quarters => "Wage by quarter",
            WageView::Months => "Wage by month",
        }
    }
}

// ---------------------------------------------------------------------------
// Computed view
// ---------------------------------------------------------------------------

/// A message for the user, styled by severity.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notice {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

impl From<&DataError> for Notice {
    fn from(e: &DataError) -> Self {
        Notice {
            severity: e.severity(),
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    Chart(PlotSpec),
    Notice(Notice),
}

/// One block of the main view: an optional heading and a chart or a notice.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub heading: Option<String>,
    pub content: PanelContent,
}

impl Panel {
    fn chart(heading: Option<&str>, spec: Result<PlotSpec>) -> Self {
        Panel {
            heading: heading.map(str::to_string),
            content: match spec {
                Ok(spec) => PanelContent::Chart(spec),
                Err(e) => PanelContent::Notice(Notice::from(&e)),
            },
        }
    }

    fn notice(heading: Option<&str>, notice: Notice) -> Self {
        Panel {
            heading: heading.map(str::to_string),
            content: PanelContent::Notice(notice),
        }
    }
}

/// What the central area shows after a recompute pass.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    /// Nothing to render; the notice explains why.
    Blocked(Notice),
    /// Tables for one year plus a single-point wage chart.
    SingleYear {
        heading: String,
        population: Table,
        wage: Table,
        wage_panel: Panel,
    },
    /// Charts across a range of years.
    Range { heading: String, panels: Vec<Panel> },
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    registry: DatasetRegistry,

    /// One entry per dataset that failed to load.
    pub load_notices: Vec<Notice>,
    pub summaries: Vec<Summary>,

    /// Offered regions (sorted, sentinel excluded).
    pub regions: Vec<String>,
    pub year_bounds: Option<(i64, i64)>,

    pub region: Option<String>,
    pub year_mode: YearMode,
    pub single_year: i64,
    pub range_start: i64,
    pub range_end: i64,
    pub category: Category,
    pub wage_view: WageView,
    pub chart_kind: ChartKind,

    /// Single-age columns present in the current category's table.
    pub available_ages: Vec<String>,
    pub selected_ages: Vec<String>,
    pub selected_quarters: Vec<String>,
    pub selected_months: Vec<String>,

    /// Result of the last recompute pass.
    pub view: DashboardView,
}

impl AppState {
    /// Load every dataset named by `config` and compute the initial view.
    pub fn new(config: DashboardConfig) -> Self {
        let mut registry = DatasetRegistry::new(config.sources());
        let failures = registry.load_all();
        let mut state = Self::from_registry(config, registry);
        state.load_notices = failures
            .iter()
            .map(|(kind, e)| Notice {
                severity: e.severity(),
                message: format!("{kind}: {e}"),
            })
            .collect();
        state
    }

    /// Build state over an already-populated registry.
    pub fn from_registry(config: DashboardConfig, registry: DatasetRegistry) -> Self {
        let mut state = AppState {
            chart_kind: config.default_chart,
            config,
            registry,
            load_notices: Vec::new(),
            summaries: Vec::new(),
            regions: Vec::new(),
            year_bounds: None,
            region: None,
            year_mode: YearMode::Range,
            single_year: 0,
            range_start: 0,
            range_end: 0,
            category: Category::Total,
            wage_view: WageView::Average,
            available_ages: Vec::new(),
            selected_ages: Vec::new(),
            selected_quarters: QUARTER_COLUMNS.iter().map(|q| q.to_string()).collect(),
            selected_months: MONTH_COLUMNS
                .iter()
                .take(DEFAULT_MONTH_COUNT)
                .map(|m| m.to_string())
                .collect(),
            view: DashboardView::Blocked(Notice::info("Loading…")),
        };
        state.reset_selection();
        state
    }

    /// Point the dashboard at a different configuration, reloading everything.
    pub fn reload(&mut self, config: DashboardConfig) {
        log::info!("Reloading data from {}", config.data_dir.display());
        *self = Self::new(config);
    }

    pub fn registry(&self) -> &DatasetRegistry {
        &self.registry
    }

    /// Re-derive regions, year bounds and control defaults from the registry.
    fn reset_selection(&mut self) {
        self.summaries = self
            .registry
            .loaded()
            .map(|(kind, table)| summarize(table, kind.label()))
            .collect();

        self.regions = self.registry.get_regions().unwrap_or_default();
        self.region = self.regions.first().cloned();

        self.year_bounds = self.registry.get_years().ok();
        if let Some((min, max)) = self.year_bounds {
            self.single_year = min;
            self.range_start = min;
            self.range_end = max;
            // A one-year dataset has no valid range.
            self.year_mode = if min == max {
                YearMode::Single
            } else {
                YearMode::Range
            };
        }

        self.selected_ages.clear();
        self.refresh_ages();
        self.recompute();
    }

    /// Recompute offered ages for the current category, keeping still-valid picks.
    fn refresh_ages(&mut self) {
        let table = self.registry.table(self.category.dataset());
        self.available_ages = age_columns()
            .into_iter()
            .filter(|age| table.is_some_and(|t| t.has_column(age)))
            .collect();

        let available = &self.available_ages;
        self.selected_ages.retain(|age| available.contains(age));
        if self.selected_ages.is_empty() {
            let default = if available.iter().any(|a| a == DEFAULT_AGE) {
                Some(DEFAULT_AGE.to_string())
            } else {
                available.first().cloned()
            };
            self.selected_ages.extend(default);
        }
    }

    // -----------------------------------------------------------------------
    // Setters (each change triggers one recompute pass)
    // -----------------------------------------------------------------------

    pub fn set_region(&mut self, region: String) {
        if self.region.as_ref() != Some(&region) {
            self.region = Some(region);
            self.recompute();
        }
    }

    pub fn set_year_mode(&mut self, mode: YearMode) {
        if self.year_mode != mode {
            self.year_mode = mode;
            self.recompute();
        }
    }

    pub fn set_single_year(&mut self, year: i64) {
        if self.single_year != year {
            self.single_year = year;
            self.recompute();
        }
    }

    pub fn set_year_range(&mut self, start: i64, end: i64) {
        if (self.range_start, self.range_end) != (start, end) {
            self.range_start = start;
            self.range_end = end;
            self.recompute();
        }
    }

    pub fn set_category(&mut self, category: Category) {
        if self.category != category {
            self.category = category;
            self.refresh_ages();
            self.recompute();
        }
    }

    pub fn set_wage_view(&mut self, view: WageView) {
        if self.wage_view != view {
            self.wage_view = view;
            self.recompute();
        }
    }

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        if self.chart_kind != kind {
            self.chart_kind = kind;
            self.recompute();
        }
    }

    pub fn toggle_age(&mut self, age: &str) {
        let offered = self.available_ages.clone();
        toggle_in_order(&mut self.selected_ages, offered.as_slice(), age);
        self.recompute();
    }

    pub fn toggle_quarter(&mut self, quarter: &str) {
        toggle_in_order(&mut self.selected_quarters, QUARTER_COLUMNS, quarter);
        self.recompute();
    }

    pub fn toggle_month(&mut self, month: &str) {
        toggle_in_order(&mut self.selected_months, MONTH_COLUMNS, month);
        self.recompute();
    }

    // -----------------------------------------------------------------------
    // Recompute
    // -----------------------------------------------------------------------

    pub fn year_selection(&self) -> YearSelection {
        match self.year_mode {
            YearMode::Single => YearSelection::Single(self.single_year),
            YearMode::Range => YearSelection::Range {
                start: self.range_start,
                end: self.range_end,
            },
        }
    }

    /// Inline error for the year-range control, if the current range is invalid.
    pub fn range_error(&self) -> Option<DataError> {
        self.year_selection().validated().err()
    }

    /// Columns plotted by the active wage view.
    pub fn wage_columns(&self) -> Vec<String> {
        match self.wage_view {
            WageView::Average => vec![WAGE_AVERAGE_COLUMN.to_string()],
            WageView::Quarters => self.selected_quarters.clone(),
            WageView::Months => self.selected_months.clone(),
        }
    }

    /// Rebuild `view` from scratch for the current selection.
    pub fn recompute(&mut self) {
        log::debug!("Recomputing view");
        self.view = self
            .build_view()
            .unwrap_or_else(|e| DashboardView::Blocked(Notice::from(&e)));
    }

    fn build_view(&self) -> Result<DashboardView> {
        let region = self
            .region
            .clone()
            .ok_or_else(|| DataError::NoData("no regions available".to_string()))?;
        if self.year_bounds.is_none() {
            return Err(DataError::NoData("no years available".to_string()));
        }
        let selection = SelectionState {
            region,
            years: self.year_selection(),
            category: self.category,
        };
        let result = filter::filter(&self.registry, &selection)?;

        match selection.years {
            YearSelection::Single(year) => Ok(self.single_year_view(&selection.region, year, result)),
            YearSelection::Range { .. } => Ok(self.range_view(&selection.region, &result)),
        }
    }

    fn single_year_view(
        &self,
        region: &str,
        year: i64,
        result: FilteredResult,
    ) -> DashboardView {
        let mut id_columns: Vec<&str> = Vec::new();
        id_columns.extend(result.population.region_column());
        id_columns.extend(result.population.year_column());
        let population = result.population.without_columns(&id_columns);

        let wage_panel = self.wage_panel(&result.wage, true);
        let wage = match result.wage.year_column() {
            Some(col) => result.wage.without_columns(&[col]),
            None => result.wage.clone(),
        };

        DashboardView::SingleYear {
            heading: format!("Data for {year} in {region}"),
            population,
            wage,
            wage_panel,
        }
    }

    fn range_view(&self, region: &str, result: &FilteredResult) -> DashboardView {
        let population = &result.population;
        let heading = format!("Population of {region} by year");
        let Some(year_col) = population.year_column() else {
            return DashboardView::Blocked(Notice::from(&DataError::MissingColumn(
                "year".to_string(),
            )));
        };

        let mut panels = Vec::new();

        let total = match population.find_column(TOTAL_COLUMNS) {
            Some(col) => {
                plot_spec::build(population, year_col, &[col], ChartKind::Line, &heading, false)
            }
            None => Err(DataError::MissingColumn(TOTAL_COLUMNS[0].to_string())),
        };
        panels.push(Panel::chart(None, total));

        panels.push(Panel::chart(
            None,
            plot_spec::build(
                population,
                year_col,
                AGE_GROUP_COLUMNS,
                ChartKind::Line,
                "Population by age group",
                false,
            ),
        ));

        let valid_ages: Vec<&str> = self
            .selected_ages
            .iter()
            .map(String::as_str)
            .filter(|a| population.has_column(a))
            .collect();
        panels.push(if valid_ages.is_empty() {
            Panel::notice(
                None,
                Notice::warning("Select valid age groups to plot the age distribution."),
            )
        } else {
            Panel::chart(
                None,
                plot_spec::build(
                    population,
                    year_col,
                    &valid_ages,
                    ChartKind::Line,
                    "Population by age",
                    false,
                ),
            )
        });

        let mut wage_panel = self.wage_panel(&result.wage, false);
        wage_panel.heading = Some("Average monthly nominal wage".to_string());
        panels.push(wage_panel);

        DashboardView::Range { heading, panels }
    }

    fn wage_panel(&self, wage: &Table, single_point_mode: bool) -> Panel {
        if wage.is_empty() {
            return Panel::notice(None, Notice::info("No wage data for the selected years."));
        }
        let Some(year_col) = wage.year_column() else {
            return Panel::notice(None, Notice::from(&DataError::MissingColumn("year".into())));
        };
        Panel::chart(
            None,
            plot_spec::build(
                wage,
                year_col,
                &self.wage_columns(),
                self.chart_kind,
                self.wage_view.title(),
                single_point_mode,
            ),
        )
    }
}

/// Add or remove `value`, keeping `selected` in the order of `offered`.
fn toggle_in_order<S: AsRef<str>>(selected: &mut Vec<String>, offered: &[S], value: &str) {
    let was_selected = selected.iter().any(|s| s == value);
    let keep = |o: &str| {
        if o == value {
            !was_selected
        } else {
            selected.iter().any(|s| s == o)
        }
    };
    let next: Vec<String> = offered
        .iter()
        .map(AsRef::as_ref)
        .filter(|&o| keep(o))
        .map(str::to_string)
        .collect();
    *selected = next;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;
    use crate::data::plot_spec::SeriesKind;
    use crate::data::registry::DatasetKind;

    fn population(ages: &[&str]) -> Table {
        let mut columns = vec!["Субъект Российской Федерации", "Год", "Всего"];
        columns.extend_from_slice(AGE_GROUP_COLUMNS);
        columns.extend_from_slice(ages);
        let mut t = Table::new(columns.clone());
        for region in ["Москва", "0", "Адыгея"] {
            for year in 2019..=2021 {
                let mut row = vec![Value::Text(region.into()), Value::Integer(year)];
                row.extend((2..columns.len()).map(|i| Value::Integer(year * 10 + i as i64)));
                t.push_row(row);
            }
        }
        t
    }

    fn wage() -> Table {
        let mut columns = vec!["Год", WAGE_AVERAGE_COLUMN];
        columns.extend_from_slice(QUARTER_COLUMNS);
        columns.extend_from_slice(MONTH_COLUMNS);
        let mut t = Table::new(columns.clone());
        for year in 2020..=2021 {
            let mut row = vec![Value::Integer(year)];
            row.extend((1..columns.len()).map(|i| Value::Float(40_000.0 + i as f64)));
            t.push_row(row);
        }
        t
    }

    fn state(ages: &[&str]) -> AppState {
        let registry = DatasetRegistry::from_tables([
            (DatasetKind::Total, population(ages)),
            (DatasetKind::Male, population(&["5"])),
            (DatasetKind::Wage, wage()),
        ]);
        AppState::from_registry(DashboardConfig::default(), registry)
    }

    #[test]
    fn defaults_follow_the_data() {
        let s = state(&["до 1", "17", "18"]);
        assert_eq!(s.regions, vec!["Адыгея", "Москва"]);
        assert_eq!(s.region.as_deref(), Some("Адыгея"));
        assert_eq!((s.range_start, s.range_end), (2019, 2021));
        assert_eq!(s.single_year, 2019);
        assert_eq!(s.year_mode, YearMode::Range);
        assert_eq!(s.selected_ages, vec!["18"]);
        assert_eq!(s.selected_quarters, vec!["I", "II", "III", "IV"]);
        assert_eq!(s.selected_months, MONTH_COLUMNS[..6].to_vec());
        assert_eq!(s.summaries.len(), 3);
    }

    #[test]
    fn first_age_when_eighteen_is_absent() {
        let s = state(&["до 1", "40"]);
        assert_eq!(s.available_ages, vec!["до 1", "40"]);
        assert_eq!(s.selected_ages, vec!["до 1"]);
    }

    #[test]
    fn category_change_refreshes_ages() {
        let mut s = state(&["18"]);
        s.set_category(Category::Male);
        assert_eq!(s.selected_ages, vec!["5"]);
    }

    #[test]
    fn range_view_has_four_panels() {
        let s = state(&["18"]);
        let DashboardView::Range { panels, .. } = &s.view else {
            panic!("expected range view, got {:?}", s.view);
        };
        assert_eq!(panels.len(), 4);
        for panel in &panels[..3] {
            assert!(matches!(panel.content, PanelContent::Chart(_)));
        }
        let PanelContent::Chart(total) = &panels[0].content else {
            unreachable!()
        };
        assert_eq!(total.series[0].x_values, vec![2019.0, 2020.0, 2021.0]);
    }

    #[test]
    fn wage_views_are_mutually_exclusive() {
        let mut s = state(&["18"]);
        s.set_wage_view(WageView::Quarters);
        assert_eq!(s.wage_columns(), vec!["I", "II", "III", "IV"]);
        s.set_wage_view(WageView::Months);
        assert_eq!(s.wage_columns().len(), 6);
        assert!(!s.wage_columns().iter().any(|c| c == "I"));
    }

    #[test]
    fn toggles_keep_offered_order() {
        let mut s = state(&["18"]);
        s.toggle_quarter("II");
        s.toggle_quarter("II");
        assert_eq!(s.selected_quarters, vec!["I", "II", "III", "IV"]);
        s.toggle_month("Январь");
        assert_eq!(s.selected_months.first().map(String::as_str), Some("Февраль"));
    }

    #[test]
    fn invalid_range_blocks_with_warning() {
        let mut s = state(&["18"]);
        s.set_year_range(2021, 2019);
        assert!(matches!(s.range_error(), Some(DataError::InvalidRange { .. })));
        let DashboardView::Blocked(notice) = &s.view else {
            panic!("expected blocked view");
        };
        assert_eq!(notice.severity, Severity::Warning);
    }

    #[test]
    fn single_year_shows_tables_and_bar_wage_chart() {
        let mut s = state(&["18"]);
        s.set_year_mode(YearMode::Single);
        s.set_single_year(2020);
        let DashboardView::SingleYear {
            population,
            wage,
            wage_panel,
            ..
        } = &s.view
        else {
            panic!("expected single-year view");
        };
        assert_eq!(population.len(), 1);
        assert!(!population.has_column("Год"));
        assert!(!wage.has_column("Год"));
        let PanelContent::Chart(spec) = &wage_panel.content else {
            panic!("expected wage chart");
        };
        assert_eq!(spec.series[0].kind, SeriesKind::Bar);
    }

    #[test]
    fn single_year_without_wages_is_informational() {
        let mut s = state(&["18"]);
        s.set_year_mode(YearMode::Single);
        assert_eq!(s.single_year, 2019);
        let DashboardView::SingleYear { wage_panel, .. } = &s.view else {
            panic!("expected single-year view");
        };
        let PanelContent::Notice(notice) = &wage_panel.content else {
            panic!("expected notice");
        };
        assert_eq!(notice.severity, Severity::Info);
    }

    #[test]
    fn pie_over_a_range_warns() {
        let mut s = state(&["18"]);
        s.set_chart_kind(ChartKind::Pie);
        let DashboardView::Range { panels, .. } = &s.view else {
            panic!("expected range view");
        };
        let PanelContent::Notice(notice) = &panels[3].content else {
            panic!("expected notice");
        };
        assert_eq!(notice.severity, Severity::Warning);
    }

    #[test]
    fn one_year_of_data_opens_in_single_year_mode() {
        let mut pop = Table::new(["Регион", "Год", "Всего", "18"]);
        pop.push_row(vec![
            Value::Text("Москва".into()),
            Value::Integer(2020),
            Value::Integer(100),
            Value::Integer(2),
        ]);
        let registry = DatasetRegistry::from_tables([(DatasetKind::Total, pop)]);
        let s = AppState::from_registry(DashboardConfig::default(), registry);

        assert_eq!(s.year_bounds, Some((2020, 2020)));
        assert_eq!(s.year_mode, YearMode::Single);
        assert_eq!(s.single_year, 2020);
        assert!(s.range_error().is_none());
        assert!(matches!(s.view, DashboardView::SingleYear { .. }));
    }

    #[test]
    fn empty_registry_is_blocked() {
        let s = AppState::from_registry(DashboardConfig::default(), DatasetRegistry::default());
        assert!(matches!(s.view, DashboardView::Blocked(ref n) if n.severity == Severity::Blocking));
    }
}
