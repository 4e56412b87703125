//! Terminal charts for the daily trend and the employee ranking
//!
//! The trend can be drawn in the four dashboard styles. Line and area share a
//! plotted grid, bars are drawn horizontally one per day, and scatter puts
//! liters against revenue.

use crate::format::{format_br_currency, format_br_date, format_liters};
use chrono::NaiveDate;
use colored::*;
use fuelstat_core::aggregation_types::{DailyAggregate, EmployeeAggregate};
use fuelstat_core::types::ChartMode;

/// Plot glyphs (ASCII)
const POINT: char = '*';
const CONNECTOR: char = '.';
const SCATTER_POINT: char = 'x';
const FILL: char = '#';
const BAR: &str = "#";

const AXIS_VERTICAL: &str = "|";
const AXIS_CORNER: &str = "+";
const AXIS_HORIZONTAL: &str = "-";

const DEFAULT_WIDTH: usize = 100;
const DEFAULT_HEIGHT: usize = 12;
const MAX_LABEL_CHARS: usize = 24;

pub const EMPTY_MESSAGE: &str = "Sem dados para o período selecionado.";

/// Renders charts sized to the terminal
pub struct ChartRenderer {
    width: usize,
    height: usize,
    /// Whether to use colored output (respects NO_COLOR environment variable)
    colored_output: bool,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer {
    pub fn new() -> Self {
        let raw_width = terminal_width().unwrap_or(DEFAULT_WIDTH);
        let width = if raw_width < 40 {
            raw_width
        } else {
            raw_width.clamp(40, 120)
        };
        Self {
            width,
            height: DEFAULT_HEIGHT,
            colored_output: std::env::var("NO_COLOR").is_err(),
        }
    }

    /// Fixed size, mainly for tests and non-terminal output
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height: height.max(2),
            colored_output: false,
        }
    }

    pub fn with_color(mut self, colored_output: bool) -> Self {
        self.colored_output = colored_output;
        self
    }

    /// Daily revenue and liters in the requested style
    ///
    /// Line, area and bars draw the revenue series followed by the liters
    /// series. Scatter draws one point per day with liters on the x axis
    /// and revenue on the y axis.
    pub fn render_trend(&self, data: &[DailyAggregate], mode: ChartMode) -> String {
        if data.is_empty() {
            return format!("{EMPTY_MESSAGE}\n");
        }

        if mode == ChartMode::Scatter {
            return format!(
                "Litragem e faturamento por dia ({mode})\n{}",
                self.scatter(data)
            );
        }

        let mut output = format!("Faturamento diário ({mode})\n");
        for series in Series::both(data) {
            output.push_str(&format!("{}\n", series.title));
            match mode {
                ChartMode::Bars => {
                    let rows: Vec<(String, f64)> = data
                        .iter()
                        .zip(&series.values)
                        .map(|(d, v)| (format_br_date(d.day), *v))
                        .collect();
                    output.push_str(&self.horizontal_bars(&rows, series.label));
                }
                _ => output.push_str(&self.plot(data, &series, mode)),
            }
        }
        output
    }

    /// Revenue per employee as horizontal bars, in the given order
    pub fn render_employees(&self, data: &[EmployeeAggregate]) -> String {
        if data.is_empty() {
            return format!("{EMPTY_MESSAGE}\n");
        }
        let rows: Vec<(String, f64)> = data
            .iter()
            .map(|e| (truncate_label(&e.employee_name), e.total_value))
            .collect();
        format!(
            "Faturamento por colaborador\n{}",
            self.horizontal_bars(&rows, format_br_currency)
        )
    }

    fn horizontal_bars(&self, rows: &[(String, f64)], format_value: fn(f64) -> String) -> String {
        let label_width = rows
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);
        let value_labels: Vec<String> = rows.iter().map(|(_, v)| format_value(*v)).collect();
        let value_width = value_labels.iter().map(String::len).max().unwrap_or(0);
        let bar_width = self
            .width
            .saturating_sub(label_width + value_width + 4)
            .max(10);
        let max = rows.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

        let mut output = String::new();
        for ((label, value), value_label) in rows.iter().zip(&value_labels) {
            let filled = if max > 0.0 {
                ((value.max(0.0) / max) * bar_width as f64).round() as usize
            } else {
                0
            };
            let bar = self.paint(&BAR.repeat(filled.min(bar_width)));
            let padding = " ".repeat(bar_width - filled.min(bar_width));
            output.push_str(&format!(
                "{:<label_width$} {}{}{} {:>value_width$}\n",
                label, AXIS_VERTICAL, bar, padding, value_label
            ));
        }
        output
    }

    fn plot(&self, data: &[DailyAggregate], series: &Series, mode: ChartMode) -> String {
        let height = self.height;
        let max = series.values.iter().copied().fold(0.0_f64, f64::max);
        let scale = if max > 0.0 { max } else { 1.0 };

        let top_label = (series.label)(max);
        let bottom_label = (series.label)(0.0);
        let axis_width = top_label.len().max(bottom_label.len());

        let available = self.width.saturating_sub(axis_width + 2);
        let column_width = (available / data.len()).max(1);
        let plot_width = column_width * data.len();

        let points: Vec<(usize, usize)> = series
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let x = i * column_width + column_width / 2;
                (x, scale_to(*v, scale, height))
            })
            .collect();

        // grid[row][col], row 0 is the bottom
        let mut grid = vec![vec![' '; plot_width]; height];

        match mode {
            ChartMode::Area => {
                for (x, level) in interpolate(&points) {
                    for row in grid.iter_mut().take(level + 1) {
                        row[x] = FILL;
                    }
                }
            }
            _ => {
                let mut previous: Option<usize> = None;
                for (x, level) in interpolate(&points) {
                    if let Some(prev) = previous {
                        let (low, high) = if prev < level { (prev, level) } else { (level, prev) };
                        for row in grid.iter_mut().take(high).skip(low + 1) {
                            row[x] = CONNECTOR;
                        }
                    }
                    grid[level][x] = CONNECTOR;
                    previous = Some(level);
                }
                for &(x, level) in &points {
                    grid[level][x] = POINT;
                }
            }
        }

        let mut output = self.grid_lines(&grid, &top_label, &bottom_label, axis_width);
        output.push_str(&self.x_labels(data, axis_width, plot_width));
        output
    }

    /// Liters (x) against revenue (y), one point per day
    fn scatter(&self, data: &[DailyAggregate]) -> String {
        let height = self.height;
        let max_value = data.iter().map(|d| d.total_value).fold(0.0_f64, f64::max);
        let max_liters = data.iter().map(|d| d.total_liters).fold(0.0_f64, f64::max);
        let y_scale = if max_value > 0.0 { max_value } else { 1.0 };
        let x_scale = if max_liters > 0.0 { max_liters } else { 1.0 };

        let top_label = format_br_currency(max_value);
        let bottom_label = format_br_currency(0.0);
        let axis_width = top_label.len().max(bottom_label.len());
        let plot_width = self.width.saturating_sub(axis_width + 2).max(2);

        let mut grid = vec![vec![' '; plot_width]; height];
        for d in data {
            let x = scale_to(d.total_liters, x_scale, plot_width);
            let y = scale_to(d.total_value, y_scale, height);
            grid[y][x] = SCATTER_POINT;
        }

        let mut output = self.grid_lines(&grid, &top_label, &bottom_label, axis_width);
        let left = format_liters(0.0);
        let right = format_liters(max_liters);
        let gap = plot_width
            .saturating_sub(left.chars().count() + right.chars().count())
            .max(1);
        output.push_str(&format!(
            "{:>axis_width$}  {}{}{}\n",
            "",
            left,
            " ".repeat(gap),
            right
        ));
        output
    }

    /// Rows of a plotted grid, top first, with the y labels and the x axis
    fn grid_lines(
        &self,
        grid: &[Vec<char>],
        top_label: &str,
        bottom_label: &str,
        axis_width: usize,
    ) -> String {
        let height = grid.len();
        let plot_width = grid.first().map_or(0, Vec::len);
        let mut output = String::new();
        for (index, row) in grid.iter().enumerate().rev() {
            let label = if index == height - 1 {
                top_label
            } else if index == 0 {
                bottom_label
            } else {
                ""
            };
            let line: String = row.iter().collect();
            output.push_str(&format!(
                "{:>axis_width$} {}{}\n",
                label,
                AXIS_VERTICAL,
                self.paint(line.trim_end())
            ));
        }
        output.push_str(&format!(
            "{:>axis_width$} {}{}\n",
            "",
            AXIS_CORNER,
            AXIS_HORIZONTAL.repeat(plot_width)
        ));
        output
    }

    fn x_labels(&self, data: &[DailyAggregate], axis_width: usize, plot_width: usize) -> String {
        let first = short_date(data[0].day);
        let mut line = format!("{:>axis_width$}  {}", "", first);
        if data.len() > 1 {
            let last = short_date(data[data.len() - 1].day);
            let gap = plot_width.saturating_sub(first.len() + last.len()).max(1);
            line.push_str(&" ".repeat(gap));
            line.push_str(&last);
        }
        line.push('\n');
        line
    }

    fn paint(&self, text: &str) -> String {
        if self.colored_output {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }
}

/// One trend series with its title and axis label format
struct Series {
    title: &'static str,
    values: Vec<f64>,
    label: fn(f64) -> String,
}

impl Series {
    fn both(data: &[DailyAggregate]) -> [Series; 2] {
        [
            Series {
                title: "Valor (R$)",
                values: data.iter().map(|d| d.total_value).collect(),
                label: format_br_currency,
            },
            Series {
                title: "Litragem (L)",
                values: data.iter().map(|d| d.total_liters).collect(),
                label: format_liters,
            },
        ]
    }
}

/// Position of `value` on an axis of `cells` cells whose last cell is `max`
fn scale_to(value: f64, max: f64, cells: usize) -> usize {
    let last = cells.saturating_sub(1);
    let position = ((value.max(0.0) / max) * last as f64).round();
    if position.is_finite() {
        (position as usize).min(last)
    } else {
        0
    }
}

/// Every column between consecutive points, with its interpolated level
fn interpolate(points: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut columns = Vec::new();
    if let Some(&first) = points.first() {
        columns.push(first);
    }
    for pair in points.windows(2) {
        let (x0, l0) = pair[0];
        let (x1, l1) = pair[1];
        let span = (x1 - x0) as f64;
        for x in (x0 + 1)..=x1 {
            let t = (x - x0) as f64 / span;
            let level = l0 as f64 + (l1 as f64 - l0 as f64) * t;
            columns.push((x, level.round() as usize));
        }
    }
    columns
}

fn short_date(day: NaiveDate) -> String {
    day.format("%d/%m").to_string()
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        label.to_string()
    } else {
        let mut short: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        short.push('~');
        short
    }
}

/// Get terminal width using the cross-platform terminal_size crate
fn terminal_width() -> Option<usize> {
    terminal_size::terminal_size().map(|(width, _)| width.0 as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, value: f64) -> DailyAggregate {
        DailyAggregate {
            day: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
            total_value: value,
            total_liters: value / 6.0,
        }
    }

    fn renderer() -> ChartRenderer {
        ChartRenderer::with_size(60, 8)
    }

    #[test]
    fn test_empty_trend_and_employees() {
        assert!(renderer().render_trend(&[], ChartMode::Line).contains(EMPTY_MESSAGE));
        assert!(renderer().render_employees(&[]).contains(EMPTY_MESSAGE));
    }

    fn point(d: u32, value: f64, liters: f64) -> DailyAggregate {
        DailyAggregate {
            day: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
            total_value: value,
            total_liters: liters,
        }
    }

    /// Chart lines under the `title` heading
    fn section<'a>(chart: &'a str, title: &str) -> Vec<&'a str> {
        chart
            .lines()
            .skip_while(|l| *l != title)
            .skip(1)
            .take_while(|l| l.contains(AXIS_VERTICAL) || l.contains(AXIS_CORNER) || l.starts_with(' '))
            .collect()
    }

    #[test]
    fn test_bars_mode_lists_every_day_for_both_series() {
        let data = vec![point(1, 100.0, 40.0), point(2, 300.0, 20.0)];
        let chart = renderer().render_trend(&data, ChartMode::Bars);
        assert!(chart.contains("(barras)"));
        assert!(chart.contains("01/03/2024"));
        assert!(chart.contains("R$ 300,00"));

        let value_bars: Vec<usize> = section(&chart, "Valor (R$)")
            .iter()
            .map(|l| l.matches('#').count())
            .collect();
        assert_eq!(value_bars.len(), 2);
        assert!(value_bars[1] > value_bars[0]);

        let liters = section(&chart, "Litragem (L)");
        assert_eq!(liters.len(), 2);
        assert!(liters[0].ends_with("40,00 L"));
        assert!(liters[1].ends_with("20,00 L"));
        assert!(liters[0].matches('#').count() > liters[1].matches('#').count());
    }

    #[test]
    fn test_scatter_plots_liters_against_value() {
        // most liters on the cheapest day
        let data = vec![point(1, 10.0, 30.0), point(2, 50.0, 5.0), point(3, 30.0, 15.0)];
        let chart = renderer().render_trend(&data, ChartMode::Scatter);
        assert!(chart.contains("(dispersao)"));
        assert_eq!(chart.matches(SCATTER_POINT).count(), 3);
        assert!(chart.contains("R$ 50,00"));
        assert!(chart.lines().last().unwrap().trim_end().ends_with("30,00 L"));

        let column = |line: &str| line.find(SCATTER_POINT).unwrap();
        let rows: Vec<&str> = chart.lines().filter(|l| l.contains(SCATTER_POINT)).collect();
        assert_eq!(rows.len(), 3);
        // top row is the highest value, bottom row the lowest
        assert!(rows[0].starts_with("R$ 50,00"));
        assert!(column(rows[0]) < column(rows[1]));
        assert!(column(rows[1]) < column(rows[2]));
    }

    #[test]
    fn test_line_draws_value_then_liters() {
        let data = vec![point(1, 10.0, 30.0), point(2, 80.0, 12.0)];
        let chart = renderer().render_trend(&data, ChartMode::Line);
        assert_eq!(chart.matches(POINT).count(), 4);

        let value = section(&chart, "Valor (R$)");
        assert!(value[0].starts_with("R$ 80,00"));
        assert!(value[0].contains(POINT));

        let liters = section(&chart, "Litragem (L)");
        assert!(liters[0].trim_start().starts_with("30,00 L"));
        assert!(liters[0].contains(POINT));
        assert!(liters.iter().any(|l| l.contains("01/03")));
    }

    #[test]
    fn test_area_fills_below_both_curves() {
        let data = vec![day(1, 40.0), day(2, 40.0)];
        let area = renderer().render_trend(&data, ChartMode::Area);
        let line = renderer().render_trend(&data, ChartMode::Line);
        assert!(area.matches(FILL).count() > line.matches(POINT).count());
        assert!(section(&area, "Litragem (L)").iter().any(|l| l.contains(FILL)));
        assert!(area.contains("6,67 L"));
    }

    #[test]
    fn test_all_zero_values_render_flat() {
        let data = vec![day(1, 0.0), day(2, 0.0)];
        let chart = renderer().render_trend(&data, ChartMode::Scatter);
        let bottom = chart
            .lines()
            .find(|l| l.contains(SCATTER_POINT))
            .unwrap();
        assert!(bottom.starts_with("R$ 0,00"));
    }

    #[test]
    fn test_scale_to_clamps() {
        assert_eq!(scale_to(5.0, 10.0, 11), 5);
        assert_eq!(scale_to(20.0, 10.0, 11), 10);
        assert_eq!(scale_to(-3.0, 10.0, 11), 0);
        assert_eq!(scale_to(f64::NAN, 10.0, 11), 0);
    }

    #[test]
    fn test_employee_bars_keep_order_and_truncate() {
        let data = vec![
            EmployeeAggregate {
                employee_name: "Maria Aparecida dos Santos Oliveira".to_string(),
                total_value: 900.0,
            },
            EmployeeAggregate {
                employee_name: "João".to_string(),
                total_value: 300.0,
            },
        ];
        let chart = renderer().render_employees(&data);
        let lines: Vec<&str> = chart.lines().collect();
        assert!(lines[1].starts_with("Maria Aparecida dos San~"));
        assert!(lines[2].starts_with("João"));
        assert!(lines[1].matches('#').count() > lines[2].matches('#').count());
    }

    #[test]
    fn test_interpolate_fills_gaps() {
        let columns = interpolate(&[(0, 0), (4, 4)]);
        assert_eq!(columns, vec![(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]);
        assert!(interpolate(&[]).is_empty());
    }
}
