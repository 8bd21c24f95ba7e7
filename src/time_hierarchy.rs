//! Code for working with the model's time hierarchy.
//!
//! Time is represented at three levels: investment periods, representative timeseries (usually
//! sampled days) within each period and timepoints (usually hours) within each timeseries.
//! Capacity is decided per period, storage is cycled per timeseries and dispatch happens per
//! timepoint.
use crate::error::{ModelError, ModelResult};
use crate::id::define_id_type;
use indexmap::IndexMap;
use serde::Deserialize;

define_id_type! {PeriodID}
define_id_type! {TimeseriesID}
define_id_type! {TimepointID}

/// An investment period
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct Period {
    /// A unique identifier for the period (e.g. "2030")
    pub id: PeriodID,
    /// The first year of the period
    pub start_year: u32,
    /// The last year of the period (inclusive)
    pub end_year: u32,
}

impl Period {
    /// The number of years covered by the period
    pub fn num_years(&self) -> u32 {
        self.end_year - self.start_year + 1
    }
}

/// A representative sample of timepoints (e.g. a day) within a period
#[derive(PartialEq, Clone, Debug)]
pub struct Timeseries {
    /// A unique identifier for the timeseries
    pub id: TimeseriesID,
    /// The period this timeseries belongs to
    pub period: PeriodID,
    /// The length of each timepoint in hours
    pub duration_of_tp: f64,
    /// How many times this timeseries occurs in a year
    pub scale_to_year: f64,
    /// Timepoints in chronological order
    pub timepoints: Vec<TimepointID>,
}

impl Timeseries {
    /// Create a new [`Timeseries`] with no timepoints.
    ///
    /// Timepoints are filled in when the [`TimeHierarchy`] is constructed.
    pub fn new(id: TimeseriesID, period: PeriodID, duration_of_tp: f64, scale_to_year: f64) -> Self {
        Self {
            id,
            period,
            duration_of_tp,
            scale_to_year,
            timepoints: Vec::new(),
        }
    }

    /// The number of hours per year represented by each of this timeseries' timepoints
    pub fn tp_weight_in_year(&self) -> f64 {
        self.duration_of_tp * self.scale_to_year
    }
}

/// A single timepoint
#[derive(PartialEq, Clone, Debug)]
pub struct Timepoint {
    /// A unique identifier for the timepoint
    pub id: TimepointID,
    /// The timeseries this timepoint belongs to
    pub timeseries: TimeseriesID,
    /// The period this timepoint belongs to (i.e. its timeseries' period)
    pub period: PeriodID,
}

/// Build the circular predecessor map for one timeseries' timepoints.
///
/// Each timepoint's predecessor is the one before it; the first timepoint's predecessor is the
/// last, so every timeseries is treated as a repeating cycle.
fn circular_predecessors(
    timepoints: &[TimepointID],
) -> impl Iterator<Item = (TimepointID, TimepointID)> + '_ {
    let len = timepoints.len();
    timepoints
        .iter()
        .enumerate()
        .map(move |(i, tp)| (tp.clone(), timepoints[(i + len - 1) % len].clone()))
}

/// The full time hierarchy for a model
#[derive(PartialEq, Debug)]
pub struct TimeHierarchy {
    periods: IndexMap<PeriodID, Period>,
    timeseries: IndexMap<TimeseriesID, Timeseries>,
    timepoints: IndexMap<TimepointID, Timepoint>,
    period_timeseries: IndexMap<PeriodID, Vec<TimeseriesID>>,
    previous: IndexMap<TimepointID, TimepointID>,
}

impl TimeHierarchy {
    /// Construct and validate a time hierarchy.
    ///
    /// # Arguments
    ///
    /// * `periods` - Investment periods, in chronological order
    /// * `timeseries` - Timeseries in the order they should be iterated over
    /// * `timepoints` - Pairs of timepoint and owning timeseries, in chronological order
    pub fn new<P, S, T>(periods: P, timeseries: S, timepoints: T) -> ModelResult<Self>
    where
        P: IntoIterator<Item = Period>,
        S: IntoIterator<Item = Timeseries>,
        T: IntoIterator<Item = (TimepointID, TimeseriesID)>,
    {
        let periods = read_periods(periods)?;

        let mut period_timeseries: IndexMap<_, Vec<_>> =
            periods.keys().map(|id| (id.clone(), Vec::new())).collect();
        let mut timeseries_map = IndexMap::new();
        for ts in timeseries {
            let Some(ids) = period_timeseries.get_mut(&ts.period) else {
                return Err(ModelError::UnknownPeriod(ts.period));
            };
            check_timeseries(&ts)?;
            ids.push(ts.id.clone());
            if let Some(ts) = timeseries_map.insert(ts.id.clone(), ts) {
                return Err(invalid(format!("Duplicate timeseries {}", ts.id)));
            }
        }

        let mut timepoint_map = IndexMap::new();
        for (id, ts_id) in timepoints {
            let Some(ts) = timeseries_map.get_mut(&ts_id) else {
                return Err(ModelError::UnknownTimeseries(ts_id));
            };
            ts.timepoints.push(id.clone());
            let timepoint = Timepoint {
                id: id.clone(),
                timeseries: ts_id,
                period: ts.period.clone(),
            };
            if timepoint_map.insert(id.clone(), timepoint).is_some() {
                return Err(invalid(format!("Duplicate timepoint {id}")));
            }
        }

        if let Some(ts) = timeseries_map.values().find(|ts| ts.timepoints.is_empty()) {
            return Err(invalid(format!("Timeseries {} has no timepoints", ts.id)));
        }

        let previous = timeseries_map
            .values()
            .flat_map(|ts| circular_predecessors(&ts.timepoints))
            .collect();

        Ok(Self {
            periods,
            timeseries: timeseries_map,
            timepoints: timepoint_map,
            period_timeseries,
            previous,
        })
    }

    /// Iterate over periods in chronological order
    pub fn iter_periods(&self) -> impl Iterator<Item = &Period> + Clone {
        self.periods.values()
    }

    /// Iterate over all timeseries
    pub fn iter_timeseries(&self) -> impl Iterator<Item = &Timeseries> + Clone {
        self.timeseries.values()
    }

    /// Iterate over all timepoints
    pub fn iter_timepoints(&self) -> impl Iterator<Item = &Timepoint> + Clone {
        self.timepoints.values()
    }

    /// Get the period with the given ID
    pub fn period(&self, id: &PeriodID) -> ModelResult<&Period> {
        self.periods
            .get(id)
            .ok_or_else(|| ModelError::UnknownPeriod(id.clone()))
    }

    /// Get the timeseries with the given ID
    pub fn timeseries(&self, id: &TimeseriesID) -> ModelResult<&Timeseries> {
        self.timeseries
            .get(id)
            .ok_or_else(|| ModelError::UnknownTimeseries(id.clone()))
    }

    /// Get the timepoint with the given ID
    pub fn timepoint(&self, id: &TimepointID) -> ModelResult<&Timepoint> {
        self.timepoints
            .get(id)
            .ok_or_else(|| ModelError::UnknownTimepoint(id.clone()))
    }

    /// The timeseries which the given timepoint belongs to
    pub fn timeseries_of_tp(&self, id: &TimepointID) -> ModelResult<&Timeseries> {
        let timepoint = self.timepoint(id)?;
        self.timeseries(&timepoint.timeseries)
    }

    /// Iterate over the given period and all the periods before it, in chronological order
    pub fn current_and_prior_periods(
        &self,
        id: &PeriodID,
    ) -> ModelResult<impl Iterator<Item = &PeriodID>> {
        let index = self
            .periods
            .get_index_of(id)
            .ok_or_else(|| ModelError::UnknownPeriod(id.clone()))?;

        Ok(self.periods.keys().take(index + 1))
    }

    /// Iterate over the timeseries belonging to the given period
    pub fn timeseries_in_period(
        &self,
        id: &PeriodID,
    ) -> ModelResult<impl Iterator<Item = &Timeseries>> {
        let ids = self
            .period_timeseries
            .get(id)
            .ok_or_else(|| ModelError::UnknownPeriod(id.clone()))?;

        Ok(ids.iter().map(move |ts_id| &self.timeseries[ts_id]))
    }

    /// Iterate over the timepoints belonging to the given timeseries
    pub fn timepoints_in_timeseries(
        &self,
        id: &TimeseriesID,
    ) -> ModelResult<impl Iterator<Item = &Timepoint>> {
        let ts = self.timeseries(id)?;
        Ok(ts.timepoints.iter().map(move |tp_id| &self.timepoints[tp_id]))
    }

    /// Iterate over the timepoints belonging to the given period
    pub fn timepoints_in_period(
        &self,
        id: &PeriodID,
    ) -> ModelResult<impl Iterator<Item = &Timepoint>> {
        Ok(self
            .timeseries_in_period(id)?
            .flat_map(move |ts| ts.timepoints.iter().map(move |tp_id| &self.timepoints[tp_id])))
    }

    /// The timepoint before the given one in its timeseries, wrapping from first to last
    pub fn previous_timepoint(&self, id: &TimepointID) -> ModelResult<&Timepoint> {
        let previous = self
            .previous
            .get(id)
            .ok_or_else(|| ModelError::UnknownTimepoint(id.clone()))?;

        Ok(&self.timepoints[previous])
    }
}

fn invalid(msg: String) -> ModelError {
    ModelError::InvalidTimeHierarchy(msg)
}

/// Check periods are valid and contiguous and collect them into a map
fn read_periods<P>(periods: P) -> ModelResult<IndexMap<PeriodID, Period>>
where
    P: IntoIterator<Item = Period>,
{
    let mut map = IndexMap::new();
    let mut last_end_year: Option<u32> = None;
    for period in periods {
        if period.start_year > period.end_year {
            return Err(invalid(format!(
                "Period {} starts after it ends",
                period.id
            )));
        }

        if let Some(last_end_year) = last_end_year
            && last_end_year.checked_add(1) != Some(period.start_year)
        {
            return Err(invalid(format!(
                "Period {} does not start immediately after the previous period",
                period.id
            )));
        }
        last_end_year = Some(period.end_year);

        if let Some(period) = map.insert(period.id.clone(), period) {
            return Err(invalid(format!("Duplicate period {}", period.id)));
        }
    }

    if map.is_empty() {
        return Err(invalid("At least one period is required".into()));
    }

    Ok(map)
}

/// Check that a timeseries' weights make sense
fn check_timeseries(ts: &Timeseries) -> ModelResult<()> {
    if !(ts.duration_of_tp.is_finite() && ts.duration_of_tp > 0.0) {
        return Err(invalid(format!(
            "Timeseries {} must have a positive timepoint duration",
            ts.id
        )));
    }

    if !(ts.scale_to_year.is_finite() && ts.scale_to_year >= 0.0) {
        return Err(invalid(format!(
            "Timeseries {} must have a non-negative scale to year",
            ts.id
        )));
    }

    // Timepoints are assigned from the timepoint list only
    if !ts.timepoints.is_empty() {
        return Err(invalid(format!(
            "Timeseries {} must not have timepoints before they are assigned",
            ts.id
        )));
    }

    Ok(())
}
