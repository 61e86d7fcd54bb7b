//! Forecast plots: terminal ASCII (`ascii`) and SVG files (`svg`).

pub mod ascii;
pub mod svg;

pub use ascii::render_forecast_plot;
pub use svg::write_forecast_svg;

/// One target's windows and (optionally) a model's prediction over validate.
#[derive(Debug, Clone, Copy)]
pub struct ForecastSeries<'a> {
    pub target: &'a str,
    pub train: &'a [f64],
    pub validate: &'a [f64],
    pub test: &'a [f64],
    /// `(model label, predicted values)`, aligned with the start of validate.
    pub prediction: Option<(&'a str, &'a [f64])>,
}
