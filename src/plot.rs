//! Grouped bar charts of mean FN / FP rates.

use std::error::Error;
use std::path::Path;

use itertools::Itertools;
use plotters::prelude::*;

use crate::error::{SummaryError, SummaryResult};
use crate::summary::SummaryRow;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RateMetric {
    FalseNegative,
    FalsePositive,
}

impl RateMetric {
    pub fn file_name(self) -> &'static str {
        match self {
            RateMetric::FalseNegative => "fn_rates_by_method.png",
            RateMetric::FalsePositive => "fp_rates_by_method.png",
        }
    }

    fn title(self) -> &'static str {
        match self {
            RateMetric::FalseNegative => "Average False Negative Rates by Method and Model",
            RateMetric::FalsePositive => "Average False Positive Rates by Method and Model",
        }
    }

    fn y_desc(self) -> &'static str {
        match self {
            RateMetric::FalseNegative => "False Negative Rate",
            RateMetric::FalsePositive => "False Positive Rate",
        }
    }

    pub fn mean(self, row: &SummaryRow) -> Option<f64> {
        match self {
            RateMetric::FalseNegative => row.fn_mean,
            RateMetric::FalsePositive => row.fp_mean,
        }
    }
}

/// Render the mean of `metric` per method (x axis) and model (one bar each).
///
/// Returns `Ok(false)` without touching `path` when no row has a value for
/// the metric.
pub fn render_rate_chart(path: &Path, metric: RateMetric, rows: &[SummaryRow]) -> SummaryResult<bool> {
    if rows.iter().all(|row| metric.mean(row).is_none()) {
        return Ok(false);
    }
    draw_grouped_bars(path, metric, rows).map_err(|e| SummaryError::Plot(e.to_string()))?;
    Ok(true)
}

fn method_label(methods: &[&str], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    methods.get(idx as usize).map(|m| m.to_string()).unwrap_or_default()
}

fn draw_grouped_bars(path: &Path, metric: RateMetric, rows: &[SummaryRow]) -> Result<(), Box<dyn Error>> {
    let methods: Vec<&str> = rows.iter().map(|r| r.method.as_str()).sorted().dedup().collect();
    let models: Vec<&str> = rows.iter().map(|r| r.model.as_str()).sorted().dedup().collect();

    let y_max = rows.iter().filter_map(|r| metric.mean(r)).fold(0.0f64, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.15 } else { 1.0 };
    let n = methods.len() as f64;

    let root = BitMapBackend::new(path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(metric.title(), ("sans-serif", 22))
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n - 0.5), 0.0f64..y_top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(methods.len())
        .x_label_formatter(&|x| method_label(&methods, *x))
        .x_desc("Method")
        .y_desc(metric.y_desc())
        .draw()?;

    // bars of one method share 80% of its unit slot
    let width = 0.8 / models.len() as f64;
    for (m_idx, model) in models.iter().enumerate() {
        let color = Palette99::pick(m_idx).mix(0.9);
        let bars = rows.iter().filter(|r| r.model == *model).filter_map(|r| {
            let x = methods.iter().position(|m| *m == r.method)? as f64;
            let mean = metric.mean(r)?;
            let x0 = x - 0.4 + m_idx as f64 * width;
            Some(Rectangle::new([(x0, 0.0), (x0 + width, mean)], color.filled()))
        });
        chart
            .draw_series(bars)?
            .label(*model)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}
