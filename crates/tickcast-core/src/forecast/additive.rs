use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};

use super::{ForecastConfig, ForecastError, ForecastPoint, ForecastResult, Forecaster};
use crate::{Horizon, Series, TradeDate};

const WEEKLY_PERIOD: f64 = 7.0;
const WEEKLY_ORDER: usize = 3;
const YEARLY_PERIOD: f64 = 365.25;
const TREND_COLUMNS: usize = 2;

/// Additive regression: linear trend + weekly + yearly Fourier seasonality.
///
/// `y(d) = a + b·t(d) + Σ weekly_k(d) + Σ yearly_k(d)`, fitted by least
/// squares with a ridge penalty on the Fourier coefficients. `t` is time
/// scaled to `[0, 1]` over the history; Fourier terms use absolute day
/// numbers so cycles line up with the calendar. A seasonal block is only
/// fitted when the history covers two full periods of it.
///
/// Trading-day histories never observe weekends, so the weekly block alone
/// is not identifiable from the data. The penalty resolves it to the
/// smallest seasonal shape that fits the observed weekdays.
#[derive(Debug, Clone, Default)]
pub struct AdditiveForecaster {
    config: ForecastConfig,
}

impl AdditiveForecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }
}

#[derive(Debug, Clone, Copy)]
struct Design {
    origin: TradeDate,
    span_days: f64,
    weekly: bool,
    yearly_order: usize,
}

impl Design {
    fn width(&self) -> usize {
        TREND_COLUMNS + if self.weekly { 2 * WEEKLY_ORDER } else { 0 } + 2 * self.yearly_order
    }

    fn row(&self, date: TradeDate) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(date.days_since(self.origin) as f64 / self.span_days);

        let day = date.unix_timestamp() as f64 / 86_400.0;
        if self.weekly {
            push_fourier(&mut row, day, WEEKLY_PERIOD, WEEKLY_ORDER);
        }
        push_fourier(&mut row, day, YEARLY_PERIOD, self.yearly_order);
        row
    }

    fn weekly_range(&self) -> std::ops::Range<usize> {
        let len = if self.weekly { 2 * WEEKLY_ORDER } else { 0 };
        TREND_COLUMNS..TREND_COLUMNS + len
    }

    fn yearly_range(&self) -> std::ops::Range<usize> {
        let start = self.weekly_range().end;
        start..start + 2 * self.yearly_order
    }
}

fn push_fourier(row: &mut Vec<f64>, day: f64, period: f64, order: usize) {
    for k in 1..=order {
        let angle = 2.0 * PI * k as f64 * day / period;
        row.push(angle.sin());
        row.push(angle.cos());
    }
}

fn dot(row: &[f64], coefficients: &DVector<f64>, range: std::ops::Range<usize>) -> f64 {
    range.map(|i| row[i] * coefficients[i]).sum()
}

impl Forecaster for AdditiveForecaster {
    fn name(&self) -> &'static str {
        "additive"
    }

    fn forecast(&self, series: &Series, horizon: Horizon) -> Result<ForecastResult, ForecastError> {
        let width = self.config.interval_width;
        if !(width > 0.0 && width < 1.0) {
            return Err(ForecastError::InvalidIntervalWidth { value: width });
        }

        let penalty = self.config.seasonality_penalty;
        if !(penalty.is_finite() && penalty > 0.0) {
            return Err(ForecastError::InvalidSeasonalityPenalty { value: penalty });
        }

        let n = series.len();
        if n < 2 {
            return Err(ForecastError::InsufficientHistory {
                required: 2,
                actual: n,
            });
        }

        let origin = series.first().date;
        let last = series.last().date;
        let span = last.days_since(origin);
        let design = Design {
            origin,
            span_days: span as f64,
            weekly: self.config.weekly_seasonality && span as f64 >= 2.0 * WEEKLY_PERIOD,
            yearly_order: if self.config.yearly_seasonality && span as f64 >= 2.0 * YEARLY_PERIOD {
                self.config.yearly_order
            } else {
                0
            },
        };

        let rows = series
            .points()
            .iter()
            .map(|point| design.row(point.date))
            .collect::<Vec<_>>();
        let x = DMatrix::from_fn(n, design.width(), |i, j| rows[i][j]);
        let y = DVector::from_iterator(n, series.values());

        let coefficients = ridge_solve(&x, &y, penalty)?;

        let residuals = &y - &x * &coefficients;
        let dof = n.saturating_sub(design.width()).max(1) as f64;
        let sigma = (residuals.norm_squared() / dof).sqrt();
        let z = normal_quantile(0.5 + width / 2.0);
        tracing::debug!(
            symbol = %series.symbol(),
            observations = n,
            parameters = design.width(),
            sigma,
            "fitted additive model"
        );

        let future_dates = (1..=horizon.periods() as i64).map_while(|offset| last.plus_days(offset));
        let dates = series
            .points()
            .iter()
            .map(|point| point.date)
            .chain(future_dates);

        let mut points = Vec::with_capacity(n + horizon.periods());
        for date in dates {
            let row = design.row(date);
            let trend = dot(&row, &coefficients, 0..TREND_COLUMNS);
            let weekly = dot(&row, &coefficients, design.weekly_range());
            let yearly = dot(&row, &coefficients, design.yearly_range());
            let yhat = trend + weekly + yearly;

            let steps_ahead = date.days_since(last).max(0) as f64;
            let half_width = z * sigma * (1.0 + steps_ahead / n as f64).sqrt();

            if !yhat.is_finite() || !half_width.is_finite() {
                return Err(ForecastError::Degenerate {
                    reason: format!("non-finite prediction at {date}"),
                });
            }

            points.push(ForecastPoint {
                date,
                yhat,
                yhat_lower: yhat - half_width,
                yhat_upper: yhat + half_width,
                trend,
                weekly,
                yearly,
            });
        }

        Ok(ForecastResult {
            symbol: series.symbol().clone(),
            horizon,
            last_observed: last,
            interval_width: width,
            points,
        })
    }
}

/// Solves `(XᵀX + λ·D) β = Xᵀy` where `D` penalizes every column after the
/// intercept and trend.
fn ridge_solve(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    penalty: f64,
) -> Result<DVector<f64>, ForecastError> {
    let xt = x.transpose();
    let mut normal = &xt * x;
    for column in TREND_COLUMNS..normal.ncols() {
        normal[(column, column)] += penalty;
    }
    let rhs = &xt * y;

    let cholesky = normal.cholesky().ok_or_else(|| ForecastError::Degenerate {
        reason: String::from("normal equations are not positive definite"),
    })?;
    Ok(cholesky.solve(&rhs))
}

/// Inverse standard normal CDF (Acklam's rational approximation).
fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_69e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    if p < P_LOW {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= 1.0 - P_LOW {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        -normal_quantile(1.0 - p)
    }
}
