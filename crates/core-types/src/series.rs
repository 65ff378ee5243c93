use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Names of the raw columns. Derived columns may never use them.
pub const RESERVED_COLUMNS: [&str; 4] = ["timestamp", "price", "volume", "return"];

/// A single raw market observation as delivered by the data collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    /// Price in the quote currency. Must be positive.
    pub price: f64,
    /// Notional volume in the quote currency. Must be non-negative.
    pub volume: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, price: f64, volume: f64) -> Self {
        Self {
            timestamp,
            price,
            volume,
        }
    }
}

/// A derived column appended to a `TimeSeries`.
///
/// `None` marks a cell where the statistic is undefined (warm-up region or
/// an undefined ratio). Values are aligned by position with the series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// An ordered price/volume series with its return column and any derived
/// indicator columns.
///
/// The series is immutable from the outside: every enrichment goes through
/// [`TimeSeries::with_column`], which hands back a new series and leaves the
/// receiver untouched. Deserialization re-validates the raw columns and
/// rebuilds `returns`, so a decoded series upholds the same invariants as one
/// built with [`TimeSeries::from_observations`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeSeries")]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    prices: Vec<f64>,
    volumes: Vec<f64>,
    returns: Vec<Option<f64>>,
    columns: Vec<Column>,
}

/// Wire shape of a [`TimeSeries`]. A serialized `returns` field is ignored
/// and recomputed from the prices.
#[derive(Deserialize)]
struct RawTimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    prices: Vec<f64>,
    volumes: Vec<f64>,
    #[serde(default)]
    columns: Vec<Column>,
}

impl TryFrom<RawTimeSeries> for TimeSeries {
    type Error = CoreError;

    fn try_from(raw: RawTimeSeries) -> Result<Self, Self::Error> {
        let len = raw.timestamps.len();
        if raw.prices.len() != len || raw.volumes.len() != len {
            return Err(CoreError::InvalidSeries(format!(
                "raw columns differ in length: {} timestamps, {} prices, {} volumes",
                len,
                raw.prices.len(),
                raw.volumes.len()
            )));
        }
        let observations = raw
            .timestamps
            .into_iter()
            .zip(raw.prices)
            .zip(raw.volumes)
            .map(|((timestamp, price), volume)| Observation::new(timestamp, price, volume))
            .collect();
        let series = Self::from_observations(observations)?;
        raw.columns
            .into_iter()
            .try_fold(series, |series, column| {
                series.with_column(column.name, column.values)
            })
    }
}

impl TimeSeries {
    /// Builds a series from raw observations, validating the ordering and
    /// value invariants and deriving the `return` column.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSeries` when timestamps are not strictly
    /// increasing, a price is not a finite positive number, or a volume is
    /// negative or non-finite.
    pub fn from_observations(observations: Vec<Observation>) -> Result<Self, CoreError> {
        let len = observations.len();
        let mut timestamps = Vec::with_capacity(len);
        let mut prices = Vec::with_capacity(len);
        let mut volumes = Vec::with_capacity(len);

        for (i, obs) in observations.into_iter().enumerate() {
            if let Some(prev) = timestamps.last() {
                if obs.timestamp <= *prev {
                    return Err(CoreError::InvalidSeries(format!(
                        "timestamp at index {} ({}) is not after the previous one ({})",
                        i, obs.timestamp, prev
                    )));
                }
            }
            if !obs.price.is_finite() || obs.price <= 0.0 {
                return Err(CoreError::InvalidSeries(format!(
                    "price at index {} must be a positive number, got {}",
                    i, obs.price
                )));
            }
            if !obs.volume.is_finite() || obs.volume < 0.0 {
                return Err(CoreError::InvalidSeries(format!(
                    "volume at index {} must be non-negative, got {}",
                    i, obs.volume
                )));
            }
            timestamps.push(obs.timestamp);
            prices.push(obs.price);
            volumes.push(obs.volume);
        }

        let returns = std::iter::once(None)
            .chain(prices.windows(2).map(|w| Some(w[1] / w[0] - 1.0)))
            .take(len)
            .collect();

        Ok(Self {
            timestamps,
            prices,
            volumes,
            returns,
            columns: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn volumes(&self) -> &[f64] {
        &self.volumes
    }

    /// Fractional change from the previous price. The first cell is always `None`.
    pub fn returns(&self) -> &[Option<f64>] {
        &self.returns
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// The derived columns, in the order they were first added.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// The most recent defined value of a derived column.
    pub fn latest(&self, name: &str) -> Option<f64> {
        self.column(name)?.last().copied().flatten()
    }

    /// Returns a copy of this series with `values` attached as column `name`.
    ///
    /// A derived column with the same name is replaced at its original
    /// position, so applying the same transform twice yields the same table.
    pub fn with_column(
        &self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, CoreError> {
        let mut next = self.clone();
        next.set_column(name.into(), values)?;
        Ok(next)
    }

    /// Like [`TimeSeries::with_column`] for several columns at once.
    pub fn with_columns(
        &self,
        columns: impl IntoIterator<Item = (String, Vec<Option<f64>>)>,
    ) -> Result<Self, CoreError> {
        let mut next = self.clone();
        for (name, values) in columns {
            next.set_column(name, values)?;
        }
        Ok(next)
    }

    fn set_column(&mut self, name: String, values: Vec<Option<f64>>) -> Result<(), CoreError> {
        if RESERVED_COLUMNS.contains(&name.as_str()) {
            return Err(CoreError::ReservedColumn(name));
        }
        if values.len() != self.len() {
            return Err(CoreError::LengthMismatch {
                name,
                expected: self.len(),
                actual: values.len(),
            });
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.values = values,
            None => {
                tracing::trace!(column = %name, "appending derived column");
                self.columns.push(Column { name, values });
            }
        }
        Ok(())
    }
}
