//! Period report navigator
//!
//! Holds the parameters of one by-period report (which entity, which months,
//! which currency) and the points built from them. Every change of a
//! parameter rebuilds the points through the [`DataAggregator`].
//!
//! A change is committed only once the aggregator has answered: on failure
//! the error is returned and the previous selection, window and result stay
//! as they were. Results are handed out as `Arc`s and replaced, never
//! mutated, so a result obtained earlier stays valid after a rebuild.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::error::TallyResult;
use crate::models::{Currency, EntityId, Month};

use super::aggregator::DataAggregator;
use super::data::{PeriodPoint, PeriodQuery, ReportDataByPeriod, ReportResult, ReportWindow};
use super::filter::{EntityStore, FilterSet, FilterSource};
use super::period_length::{default_start_period, is_valid_period_length, period_length_label};

/// Navigates a by-period report over one kind of entity
pub struct PeriodReportNavigator<'a> {
    aggregator: &'a dyn DataAggregator,
    store: &'a dyn EntityStore,
    source: FilterSource,
    level: u32,
    window: ReportWindow,
    filter: FilterSet,
    result: Arc<ReportResult>,
}

impl<'a> PeriodReportNavigator<'a> {
    /// Create a root navigator over the last `length` months up to `today`
    pub fn new(
        aggregator: &'a dyn DataAggregator,
        store: &'a dyn EntityStore,
        source: FilterSource,
        length: u32,
        currency: Currency,
        today: NaiveDate,
    ) -> TallyResult<Self> {
        let start = default_start_period(length, today);
        Self::with_start(aggregator, store, source, start, length, currency)
    }

    /// Create a root navigator over `length` months from `start`
    pub fn with_start(
        aggregator: &'a dyn DataAggregator,
        store: &'a dyn EntityStore,
        source: FilterSource,
        start: Month,
        length: u32,
        currency: Currency,
    ) -> TallyResult<Self> {
        let window = ReportWindow::new(start, length, currency);
        Self::at_level(aggregator, store, source, window, 0)
    }

    fn at_level(
        aggregator: &'a dyn DataAggregator,
        store: &'a dyn EntityStore,
        source: FilterSource,
        window: ReportWindow,
        level: u32,
    ) -> TallyResult<Self> {
        let mut navigator = Self {
            aggregator,
            store,
            source,
            level,
            window: window.clone(),
            filter: FilterSet::empty(source.kind()),
            result: Arc::new(ReportResult::empty()),
        };
        navigator.rebuild(window.start, window.length, window.currency)?;
        Ok(navigator)
    }

    /// Rebuild from scratch: list the filter entities again, select the first
    /// one and build its points
    ///
    /// `length` is clamped to `1..=MAX_PERIOD_LENGTH`.
    pub fn rebuild(&mut self, start: Month, length: u32, currency: Currency) -> TallyResult<()> {
        let window = ReportWindow::new(start, length, currency);
        let filter = self.source.create_filter(self.store)?;
        let result = self.build(&window, &filter, 0)?;

        if filter.is_empty() {
            debug!(filter = self.source.filter_name(), "No filter entries to report on");
        }

        self.window = window;
        self.filter = filter;
        self.result = result;
        Ok(())
    }

    /// Select the next filter entry; `false` when already on the last one
    pub fn next_filter(&mut self) -> TallyResult<bool> {
        let next = self.filter.current_index() + 1;
        if next >= self.filter.len() {
            trace!(index = self.filter.current_index(), "Already on the last filter entry");
            return Ok(false);
        }
        self.commit_selection(next)
    }

    /// Select the previous filter entry; `false` when already on the first one
    pub fn previous_filter(&mut self) -> TallyResult<bool> {
        let current = self.filter.current_index();
        if current == 0 || self.filter.is_empty() {
            trace!(index = current, "Already on the first filter entry");
            return Ok(false);
        }
        self.commit_selection(current - 1)
    }

    /// Select the filter entry at `index`; `false` when out of range
    pub fn select_filter(&mut self, index: usize) -> TallyResult<bool> {
        if index >= self.filter.len() {
            trace!(index, len = self.filter.len(), "Filter index out of range");
            return Ok(false);
        }
        self.commit_selection(index)
    }

    /// Change the number of months, keeping the start month
    ///
    /// Returns `false` and changes nothing when `length` is zero or above
    /// `MAX_PERIOD_LENGTH`.
    pub fn change_period_length(&mut self, length: u32) -> TallyResult<bool> {
        if !is_valid_period_length(length) {
            trace!(length, "Rejected period length");
            return Ok(false);
        }
        let window = ReportWindow {
            length,
            ..self.window.clone()
        };
        self.commit_window(window)?;
        Ok(true)
    }

    /// Show the last `length` months up to `today`
    ///
    /// Returns `false` and changes nothing when `length` is zero or above
    /// `MAX_PERIOD_LENGTH`.
    pub fn show_recent(&mut self, length: u32, today: NaiveDate) -> TallyResult<bool> {
        if !is_valid_period_length(length) {
            trace!(length, "Rejected period length");
            return Ok(false);
        }
        let window = ReportWindow {
            start: default_start_period(length, today),
            length,
            ..self.window.clone()
        };
        self.commit_window(window)?;
        Ok(true)
    }

    /// Move the window to start at `start`
    pub fn change_start_period(&mut self, start: Month) -> TallyResult<()> {
        let window = ReportWindow {
            start,
            ..self.window.clone()
        };
        self.commit_window(window)
    }

    /// Report in `currency`
    pub fn change_currency(&mut self, currency: Currency) -> TallyResult<()> {
        let window = ReportWindow {
            currency,
            ..self.window.clone()
        };
        self.commit_window(window)
    }

    fn commit_selection(&mut self, index: usize) -> TallyResult<bool> {
        let result = self.build(&self.window, &self.filter, index)?;
        self.filter.select(index);
        self.result = result;
        Ok(true)
    }

    fn commit_window(&mut self, window: ReportWindow) -> TallyResult<()> {
        let result = self.build(&window, &self.filter, self.filter.current_index())?;
        self.window = window;
        self.result = result;
        Ok(())
    }

    fn build(
        &self,
        window: &ReportWindow,
        filter: &FilterSet,
        index: usize,
    ) -> TallyResult<Arc<ReportResult>> {
        let Some(entity) = filter.id_at(index) else {
            return Ok(Arc::new(ReportResult::empty()));
        };

        let query = PeriodQuery::new(window, filter.kind(), entity);
        let data = self.aggregator.aggregate(&query)?;
        debug!(
            column = filter.column(),
            entity = %entity,
            start = %window.start,
            length = window.length,
            level = self.level,
            "Rebuilt period report"
        );
        Ok(Arc::new(ReportResult::from_data(data)))
    }

    /// Navigators one level down the hierarchy for the selected entry
    ///
    /// Only categories have one; the list is empty when the selected
    /// category has no sub-categories.
    pub fn children_charts(&self) -> TallyResult<Vec<PeriodReportNavigator<'a>>> {
        let Some(selected) = self.filter.current_id() else {
            return Ok(Vec::new());
        };
        let Some(source) = self.source.children(selected) else {
            return Ok(Vec::new());
        };

        let child = Self::at_level(
            self.aggregator,
            self.store,
            source,
            self.window.clone(),
            self.level + 1,
        )?;
        if child.has_filter() {
            Ok(vec![child])
        } else {
            Ok(Vec::new())
        }
    }

    /// The current result; stays valid after later rebuilds
    pub fn result(&self) -> Arc<ReportResult> {
        Arc::clone(&self.result)
    }

    pub fn points(&self) -> &[PeriodPoint] {
        &self.result.points
    }

    /// Point at `index`, `None` when out of range
    pub fn point(&self, index: usize) -> Option<&PeriodPoint> {
        self.result.points.get(index)
    }

    /// Summary statistics of the current result
    pub fn data(&self) -> &ReportDataByPeriod {
        &self.result.data
    }

    pub fn has_data_to_plot(&self) -> bool {
        self.result.has_data_to_plot()
    }

    pub fn has_filter(&self) -> bool {
        !self.filter.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.level == 0
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn source(&self) -> FilterSource {
        self.source
    }

    pub fn filter(&self) -> &FilterSet {
        &self.filter
    }

    pub fn selected_filter(&self) -> usize {
        self.filter.current_index()
    }

    pub fn selected_entity(&self) -> Option<EntityId> {
        self.filter.current_id()
    }

    pub fn filter_titles(&self) -> &[String] {
        self.filter.titles()
    }

    pub fn filter_name(&self) -> &'static str {
        self.source.filter_name()
    }

    pub fn no_filter_message(&self) -> &'static str {
        self.source.no_filter_message()
    }

    pub fn window(&self) -> &ReportWindow {
        &self.window
    }

    pub fn start_period(&self) -> Month {
        self.window.start
    }

    pub fn period_length(&self) -> u32 {
        self.window.length
    }

    pub fn period_length_label(&self) -> String {
        period_length_label(self.window.length)
    }

    pub fn currency(&self) -> &Currency {
        &self.window.currency
    }

    pub fn currency_symbol(&self) -> &str {
        &self.window.currency.symbol
    }
}
