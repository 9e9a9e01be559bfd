//! Rendering: a plain-text table by default, an ASCII/bitmap chart when
//! `verbose` is set, both annotated with the configured budget lines.

use std::path::Path;

use plotters::prelude::*;

use crate::trend::fit::{fit_best, Model};
use crate::trend::Series;

pub struct Report<'s> {
    series: &'s Series,
    model: Option<Model>,
    horizon: usize,
    max_input_size: Option<u64>,
    max_res: Option<f64>,
}

impl<'s> Report<'s> {
    pub fn build(
        series: &'s Series,
        horizon: usize,
        polynomial_degree: usize,
        max_input_size: Option<u64>,
        max_res: Option<f64>,
    ) -> Self {
        Self {
            series,
            model: fit_best(series, polynomial_degree),
            horizon,
            max_input_size,
            max_res,
        }
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// A plain-text table: the series, the chosen model and its
    /// coefficients, and the extrapolated value at the horizon. Used when
    /// `verbose` is off.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("n\tWC(n)\n");
        for &(n, wc) in self.series.points() {
            out.push_str(&format!("{n}\t{wc}\n"));
        }
        match &self.model {
            Some(model) => {
                let coefficients = model
                    .coefficients
                    .iter()
                    .map(|c| format!("{c:.6}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&format!(
                    "\nfitted model: {} (coefficients=[{}], rss={:.6})\n",
                    model.kind, coefficients, model.rss
                ));
                out.push_str(&format!(
                    "extrapolated WC({}) = {:.6}\n",
                    self.horizon,
                    model.predict(self.horizon as u64)
                ));
            }
            None => out.push_str("\nempty series: fitting skipped\n"),
        }
        if let Some(n) = self.max_input_size {
            out.push_str(&format!("budget: maxInputSize = {n}\n"));
        }
        if let Some(r) = self.max_res {
            out.push_str(&format!("budget: maxRes = {r}\n"));
        }
        out
    }

    /// Renders the series, the fitted curve extended to the horizon, and
    /// the budget reference lines to a bitmap at `path`. Only called when
    /// `verbose` is set — plain-text output otherwise.
    pub fn render_chart(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let root = BitMapBackend::new(path, (900, 540)).into_drawing_area();
        root.fill(&WHITE)?;

        let max_n = self
            .series
            .points()
            .map(|&(n, _)| n)
            .max()
            .unwrap_or(0)
            .max(self.horizon as u64)
            .max(self.max_input_size.unwrap_or(0));
        let max_wc = self
            .series
            .points()
            .map(|&(_, wc)| wc)
            .fold(0.0f64, f64::max)
            .max(self.max_res.unwrap_or(0.0));

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .caption("worst-case resource growth", ("sans-serif", 20).into_font())
            .build_cartesian_2d(0u64..(max_n + 1), 0f64..(max_wc * 1.1).max(1.0))?;

        chart.configure_mesh().draw()?;

        chart.draw_series(LineSeries::new(
            self.series.points().map(|&(n, wc)| (n, wc)),
            &BLUE,
        ))?;

        if let Some(model) = &self.model {
            chart.draw_series(LineSeries::new(
                (0..=max_n).map(|n| (n, model.predict(n))),
                &RED,
            ))?;
        }

        if let Some(n) = self.max_input_size {
            chart.draw_series(LineSeries::new(vec![(n, 0.0), (n, max_wc * 1.1)], &BLACK))?;
        }
        if let Some(r) = self.max_res {
            chart.draw_series(LineSeries::new(vec![(0, r), (max_n, r)], &BLACK))?;
        }

        root.present()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_report_notes_empty_series() {
        let series = Series::from(vec![]);
        let report = Report::build(&series, 5, 1, None, None);
        assert!(report.model().is_none());
        assert!(report.to_text().contains("empty series"));
    }

    #[test]
    fn text_report_includes_budget_annotations() {
        let series = Series::from(vec![(0, 0.0), (1, 1.0)]);
        let report = Report::build(&series, 3, 1, Some(10), Some(99.0));
        let text = report.to_text();
        assert!(text.contains("maxInputSize = 10"));
        assert!(text.contains("maxRes = 99"));
    }
}
