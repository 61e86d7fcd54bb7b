//! SVG forecast chart rendered with Plotters.

use std::path::Path;

use plotters::prelude::*;

use crate::error::PipelineError;
use crate::plot::ForecastSeries;
use crate::plot::ascii::{SegmentKind, pad_range, x_range, y_range};

/// Write an SVG chart of `series` to `path`.
pub fn write_forecast_svg(path: &Path, series: &ForecastSeries<'_>, size: (u32, u32)) -> Result<(), PipelineError> {
    draw(path, series, size).map_err(|e| PipelineError::Snapshot {
        path: path.to_path_buf(),
        message: format!("failed to render SVG plot: {e}"),
    })
}

fn draw(path: &Path, series: &ForecastSeries<'_>, size: (u32, u32)) -> Result<(), Box<dyn std::error::Error>> {
    let segments = series.segments();
    let (x0, x1) = x_range(series.total_len());
    let (y0, y1) = y_range(segments.iter().flat_map(|s| s.points.iter().map(|&(_, y)| y)))
        .ok_or("nothing to plot")?;
    let (y0, y1) = pad_range(y0, y1, 0.05);

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(series.target, ("sans-serif", 20))
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("observation")
        .y_desc(series.target)
        .draw()?;

    for segment in segments {
        let (label, color) = match segment.kind {
            SegmentKind::Train => ("train".to_string(), BLUE),
            SegmentKind::Validate => ("validate".to_string(), RGBColor(255, 140, 0)),
            SegmentKind::Test => ("test".to_string(), RGBColor(0, 150, 0)),
            SegmentKind::Prediction => (
                series.prediction.map(|(l, _)| l.to_string()).unwrap_or_default(),
                RED,
            ),
        };
        if segment.points.is_empty() {
            continue;
        }
        chart
            .draw_series(LineSeries::new(segment.points, &color))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
