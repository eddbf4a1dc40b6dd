#![cfg(feature = "web")]
//! SVG charts for the dashboard screens.
//!
//! This is a thin adapter: it takes already-prepared views from
//! [`crate::views`] and draws them with plotters. Empty views still produce a
//! chart, with axes only and "(no data)" appended to the title.

use plotters::prelude::*;
use plotters::style::{Palette, Palette99};
use std::error::Error;
use std::ops::Range;

use crate::dataset::Dataset;
use crate::pipeline::{self, Metric};
use crate::record::Record;
use crate::views::{self, Distribution, ScatterSeries, Screen, Selection};

/// Configuration options for chart generation
#[derive(Clone, Debug)]
pub struct ChartOptions {
    /// Title displayed at the top of the chart
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the chart in pixels
    pub width: u32,

    /// Height of the chart in pixels
    pub height: u32,

    /// Start the Y-axis at zero and print its labels with thousands separators
    pub population_axis: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            title: "Chart".to_string(),
            x_label: "X Axis".to_string(),
            y_label: "Y Axis".to_string(),
            width: 800,
            height: 500,
            population_axis: false,
        }
    }
}

impl ChartOptions {
    pub fn new(title: impl Into<String>, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            ..Self::default()
        }
    }

    fn caption(&self, empty: bool) -> String {
        if empty {
            format!("{} (no data)", self.title)
        } else {
            self.title.clone()
        }
    }

    fn format_y(&self, y: f64) -> String {
        if self.population_axis {
            format_thousands(y.max(0.0).round() as u64)
        } else {
            format!("{:.1}", y)
        }
    }
}

/// One marker of a scatter chart.
#[derive(Clone, Debug)]
pub struct Marker {
    pub x: f64,
    pub y: f64,
    pub radius: u32,
    /// Overrides the series colour
    pub color: Option<RGBColor>,
}

/// A named group of markers sharing a legend entry.
#[derive(Clone, Debug)]
pub struct Series {
    pub name: String,
    pub color: RGBColor,
    pub markers: Vec<Marker>,
}

// Legends with more entries than this cover the plot.
const MAX_LEGEND_ENTRIES: usize = 12;

/// `1234567` -> `"1,234,567"`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn palette(idx: usize) -> RGBColor {
    let c = Palette99::pick(idx).to_rgba();
    RGBColor(c.0, c.1, c.2)
}

/// Viridis colour for `t` in `[0, 1]`.
pub fn viridis(t: f64) -> RGBColor {
    const STOPS: [(f64, f64, f64); 5] = [
        (68.0, 1.0, 84.0),
        (59.0, 82.0, 139.0),
        (33.0, 145.0, 140.0),
        (94.0, 201.0, 98.0),
        (253.0, 231.0, 37.0),
    ];

    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let pos = t * (STOPS.len() - 1) as f64;
    let i = (pos.floor() as usize).min(STOPS.len() - 2);
    let f = pos - i as f64;
    let (a, b) = (STOPS[i], STOPS[i + 1]);
    let lerp = |x: f64, y: f64| (x + (y - x) * f).round() as u8;

    RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Axis range around the data with a small margin. Never degenerate.
pub fn padded(bounds: Option<(f64, f64)>) -> Range<f64> {
    match bounds {
        None => 0.0..1.0,
        Some((lo, hi)) if lo == hi => {
            let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
            lo - pad..hi + pad
        }
        Some((lo, hi)) => {
            let pad = (hi - lo) * 0.05;
            lo - pad..hi + pad
        }
    }
}

fn value_range(options: &ChartOptions, bounds: Option<(f64, f64)>) -> Range<f64> {
    if options.population_axis {
        let hi = bounds.map_or(1.0, |(_, hi)| hi.max(1.0));
        0.0..hi * 1.1
    } else {
        padded(bounds)
    }
}

/// Draws a line chart with point markers
///
/// # Arguments
/// * `points` - (x, y) pairs, drawn in the given order
/// * `options` - Chart styling options
///
/// # Returns
/// * The SVG document as a string
pub fn line_chart(points: &[(f64, f64)], options: &ChartOptions) -> Result<String, Box<dyn Error>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let x_range = padded(bounds(points.iter().map(|p| p.0)));
        let y_range = value_range(options, bounds(points.iter().map(|p| p.1)));

        let mut chart = ChartBuilder::on(&root)
            .caption(options.caption(points.is_empty()), ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .y_label_formatter(&|y| options.format_y(*y))
            .draw()?;

        chart.draw_series(LineSeries::new(points.iter().copied(), &BLUE))?;
        chart.draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())),
        )?;

        root.present()?;
    }

    Ok(svg)
}

/// Draws a bar chart with the value printed above each bar
///
/// Bar width follows the smallest gap between x values, so evenly spaced
/// years produce adjacent bars with a small gutter.
pub fn bar_chart(points: &[(f64, f64)], options: &ChartOptions) -> Result<String, Box<dyn Error>> {
    let mut xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    xs.sort_by(f64::total_cmp);
    let step = xs
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .fold(f64::INFINITY, f64::min);
    let half = if step.is_finite() { step * 0.4 } else { 0.4 };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let x_range = padded(bounds(xs.iter().copied()).map(|(lo, hi)| (lo - half, hi + half)));
        let y_range = value_range(options, bounds(points.iter().map(|p| p.1)));

        let mut chart = ChartBuilder::on(&root)
            .caption(options.caption(points.is_empty()), ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(110)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .y_label_formatter(&|y| options.format_y(*y))
            .draw()?;

        chart.draw_series(points.iter().map(|&(x, y)| {
            Rectangle::new([(x - half, 0.0), (x + half, y)], BLUE.mix(0.7).filled())
        }))?;
        chart.draw_series(points.iter().map(|&(x, y)| {
            Text::new(
                options.format_y(y),
                (x - half, y),
                ("sans-serif", 10).into_font(),
            )
        }))?;

        root.present()?;
    }

    Ok(svg)
}

/// Draws a scatter chart, one legend entry per series
pub fn scatter_chart(series: &[Series], options: &ChartOptions) -> Result<String, Box<dyn Error>> {
    let empty = series.iter().all(|s| s.markers.is_empty());

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let markers = || series.iter().flat_map(|s| s.markers.iter());
        let x_range = padded(bounds(markers().map(|m| m.x)));
        let y_range = value_range(options, bounds(markers().map(|m| m.y)));

        let mut chart = ChartBuilder::on(&root)
            .caption(options.caption(empty), ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .y_label_formatter(&|y| options.format_y(*y))
            .draw()?;

        for s in series {
            let color = s.color;
            chart
                .draw_series(s.markers.iter().map(|m| {
                    Circle::new((m.x, m.y), m.radius, m.color.unwrap_or(color).mix(0.8).filled())
                }))?
                .label(s.name.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        }

        if !empty && series.len() <= MAX_LEGEND_ENTRIES {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
    }

    Ok(svg)
}

/// Draws one vertical box per group
///
/// Groups without values are skipped. With nothing left to draw the result is
/// an empty line chart carrying the same title.
pub fn box_chart(groups: &[Distribution], options: &ChartOptions) -> Result<String, Box<dyn Error>> {
    let groups: Vec<&Distribution> = groups.iter().filter(|g| !g.values.is_empty()).collect();
    if groups.is_empty() {
        return line_chart(&[], options);
    }

    let labels: Vec<String> = groups.iter().map(|g| g.continent.clone()).collect();
    let range = padded(bounds(groups.iter().flat_map(|g| g.values.iter().copied())));
    let y_range = range.start as f32..range.end as f32;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (options.width, options.height))
            .into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&options.title, ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(labels[..].into_segmented(), y_range)?;

        chart
            .configure_mesh()
            .x_desc(&options.x_label)
            .y_desc(&options.y_label)
            .x_label_formatter(&|v| match v {
                SegmentValue::Exact(name) | SegmentValue::CenterOf(name) => name.to_string(),
                SegmentValue::Last => String::new(),
            })
            .draw()?;

        chart.draw_series(groups.iter().zip(labels.iter()).map(|(g, name)| {
            Boxplot::new_vertical(SegmentValue::CenterOf(name), &Quartiles::new(g.values.as_slice()))
                .width(30)
                .whisker_width(0.5)
                .style(BLUE)
        }))?;

        root.present()?;
    }

    Ok(svg)
}

fn time_series<'a, I>(records: I, metric: Metric) -> Vec<(f64, f64)>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .map(|r| (r.year as f64, metric.of(r)))
        .collect()
}

fn gdp_life_exp_series(groups: &[ScatterSeries<'_>]) -> Vec<Series> {
    groups
        .iter()
        .enumerate()
        .map(|(idx, group)| Series {
            name: group.name.clone(),
            color: palette(idx),
            markers: group
                .points
                .iter()
                .map(|r| Marker {
                    x: r.gdp_percap,
                    y: r.life_exp,
                    radius: 4,
                    color: None,
                })
                .collect(),
        })
        .collect()
}

// Bubble radius grows with the square root of population in millions.
fn bubble_radius(pop: u64) -> u32 {
    let millions = pop as f64 / 1e6;
    (3.0 + millions.sqrt()).clamp(3.0, 25.0).round() as u32
}

fn metric_options(subject: &str, metric: Metric) -> ChartOptions {
    ChartOptions {
        population_axis: metric == Metric::Pop,
        ..ChartOptions::new(
            format!("{} {} over time", subject, metric.label()),
            "Year",
            metric.label(),
        )
    }
}

fn metric_for_line(chart: &str) -> Option<Metric> {
    match chart {
        "gdp_line" => Some(Metric::GdpPercap),
        "life_exp_line" => Some(Metric::LifeExp),
        "pop_line" => Some(Metric::Pop),
        _ => None,
    }
}

/// Renders one named chart of a screen for the given selection.
///
/// Returns `Ok(None)` when the screen has no chart with that name.
pub fn render(
    dataset: &Dataset,
    screen: Screen,
    chart: &str,
    selection: &Selection,
) -> Result<Option<String>, Box<dyn Error>> {
    let svg = match screen {
        Screen::Eda => {
            let view = views::eda_view(dataset, selection);
            let year = view.year.map(|y| y.to_string()).unwrap_or_default();
            let (groups, metric) = match chart {
                "gdp_box" => (&view.gdp_percap, Metric::GdpPercap),
                "life_exp_box" => (&view.life_exp, Metric::LifeExp),
                _ => return Ok(None),
            };
            let options = ChartOptions::new(
                format!("{} distribution {}", metric.label(), year),
                "Continent",
                metric.label(),
            );
            box_chart(groups, &options)?
        }
        Screen::Global => {
            let view = views::global_view(dataset);
            match chart {
                "population_bar" => {
                    let points: Vec<(f64, f64)> = view
                        .population
                        .iter()
                        .map(|r| (r.year as f64, r.pop as f64))
                        .collect();
                    let options = ChartOptions {
                        population_axis: true,
                        ..ChartOptions::new("World Population over time", "Year", "Population")
                    };
                    bar_chart(&points, &options)?
                }
                "gdp_life_exp" => {
                    let options = ChartOptions::new(
                        "Life Expectancy vs GDP per Capita",
                        "GDP per Capita",
                        "Life Expectancy",
                    );
                    scatter_chart(&gdp_life_exp_series(&view.scatter), &options)?
                }
                _ => return Ok(None),
            }
        }
        Screen::Continent => {
            let view = views::continent_view(dataset, selection);
            let subject = view.continent.clone().unwrap_or_default();
            if let Some(metric) = metric_for_line(chart) {
                let points: Vec<(f64, f64)> = view
                    .rollups
                    .iter()
                    .map(|r| {
                        let value = match metric {
                            Metric::GdpPercap => r.gdp_percap,
                            Metric::LifeExp => r.life_exp,
                            Metric::Pop => r.pop as f64,
                        };
                        (r.year as f64, value)
                    })
                    .collect();
                line_chart(&points, &metric_options(&subject, metric))?
            } else if chart == "gdp_life_exp" {
                let options = ChartOptions::new(
                    format!("{} Life Expectancy vs GDP per Capita", subject),
                    "GDP per Capita",
                    "Life Expectancy",
                );
                scatter_chart(&gdp_life_exp_series(&view.countries), &options)?
            } else {
                return Ok(None);
            }
        }
        Screen::Country => {
            let view = views::country_view(dataset, selection);
            let subject = view.country.clone().unwrap_or_default();
            if let Some(metric) = metric_for_line(chart) {
                let points = time_series(view.records.iter().copied(), metric);
                line_chart(&points, &metric_options(&subject, metric))?
            } else if chart == "gdp_life_exp" {
                let (lo, hi) =
                    pipeline::year_bounds(view.records.iter().copied()).unwrap_or((0, 0));
                let span = (hi - lo).max(1) as f64;
                let markers = view
                    .records
                    .iter()
                    .map(|r| Marker {
                        x: r.gdp_percap,
                        y: r.life_exp,
                        radius: bubble_radius(r.pop),
                        color: Some(viridis((r.year - lo) as f64 / span)),
                    })
                    .collect();
                let series = [Series {
                    name: subject.clone(),
                    color: viridis(0.0),
                    markers,
                }];
                let options = ChartOptions::new(
                    format!("{} Life Expectancy vs GDP per Capita", subject),
                    "GDP per Capita",
                    "Life Expectancy",
                );
                scatter_chart(&series, &options)?
            } else {
                return Ok(None);
            }
        }
    };

    Ok(Some(svg))
}
