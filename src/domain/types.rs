//! Shared domain types.
//!
//! Everything here lives for a single invocation: the normalized series, the
//! fixed model configuration, and the serializable result documents.

use chrono::NaiveDate;
use serde::Serialize;

/// Trend shape of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Growth {
    Linear,
}

/// How seasonal components combine with the trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityMode {
    Additive,
}

impl Growth {
    pub fn as_str(self) -> &'static str {
        match self {
            Growth::Linear => "linear",
        }
    }
}

impl SeasonalityMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SeasonalityMode::Additive => "additive",
        }
    }
}

/// A periodic component expressed as a truncated Fourier series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seasonality {
    pub name: &'static str,
    /// Period in days.
    pub period: f64,
    pub fourier_order: usize,
}

impl Seasonality {
    /// Number of design columns (one sine and one cosine per order).
    pub fn column_count(&self) -> usize {
        2 * self.fourier_order
    }
}

pub const YEARLY: Seasonality = Seasonality {
    name: "yearly",
    period: 365.25,
    fourier_order: 10,
};

pub const WEEKLY: Seasonality = Seasonality {
    name: "weekly",
    period: 7.0,
    fourier_order: 3,
};

/// Fixed model hyperparameters.
///
/// Callers only choose the horizon and whether history is echoed; everything
/// here is pinned so runs are reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub growth: Growth,
    pub seasonality_mode: SeasonalityMode,
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,

    /// Upper bound on potential trend changepoints.
    pub n_changepoints: usize,
    /// Share of history in which changepoints may be placed.
    pub changepoint_range: f64,
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    /// Prior scale for the trend offset and base slope.
    pub trend_prior_scale: f64,

    pub interval_width: f64,
    pub uncertainty_samples: usize,
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            growth: Growth::Linear,
            seasonality_mode: SeasonalityMode::Additive,
            yearly_seasonality: true,
            weekly_seasonality: true,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            trend_prior_scale: 5.0,
            interval_width: 0.8,
            uncertainty_samples: 1000,
            seed: 42,
        }
    }
}

impl ModelConfig {
    /// Enabled seasonal components, in design-column order.
    pub fn seasonalities(&self) -> Vec<Seasonality> {
        let mut out = Vec::with_capacity(2);
        if self.yearly_seasonality {
            out.push(YEARLY);
        }
        if self.weekly_seasonality {
            out.push(WEEKLY);
        }
        out
    }

    /// Lower/upper percentiles matching `interval_width`.
    pub fn interval_percentiles(&self) -> (f64, f64) {
        let tail = (1.0 - self.interval_width) / 2.0;
        (tail * 100.0, (1.0 - tail) * 100.0)
    }
}

/// One observation in the normalized series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A normalized, strictly ascending, duplicate-free daily series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    /// Wrap points that are already sorted and deduplicated.
    ///
    /// Returns `None` if dates are not strictly increasing.
    pub fn from_sorted(points: Vec<SeriesPoint>) -> Option<Self> {
        if points.windows(2).all(|w| w[0].date < w[1].date) {
            Some(Self { points })
        } else {
            None
        }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}

/// One row of the emitted forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    #[serde(with = "iso_date")]
    pub date: NaiveDate,
    pub predicted_demand: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence_score: f64,
}

/// Run metadata reported alongside the forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub method: String,
    pub data_points: usize,
    pub forecast_days: usize,
    pub mae: f64,
    /// `None` when every actual value is zero.
    pub mape: Option<f64>,
    pub seasonality_mode: SeasonalityMode,
    pub growth: Growth,
}

/// Document printed for a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub success: bool,
    pub forecast: Vec<ForecastPoint>,
    pub model_info: ModelInfo,
}

/// Document printed when the pipeline could not produce a forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureReport {
    pub success: bool,
    pub error: String,
    pub fallback_needed: bool,
}

/// Result of a single `generate` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForecastOutcome {
    Success(ForecastReport),
    Failure(FailureReport),
}

impl ForecastOutcome {
    pub fn success(forecast: Vec<ForecastPoint>, model_info: ModelInfo) -> Self {
        ForecastOutcome::Success(ForecastReport {
            success: true,
            forecast,
            model_info,
        })
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ForecastOutcome::Failure(FailureReport {
            success: false,
            error: error.into(),
            fallback_needed: true,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ForecastOutcome::Success(_))
    }
}

/// Validated request parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub sales_data: Vec<serde_json::Value>,
    pub forecast_days: usize,
    pub include_history: bool,
}

mod iso_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(date: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format("%Y-%m-%d"))
    }
}
