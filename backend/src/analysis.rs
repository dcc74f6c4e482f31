//! Chart data for the Analysis page.
//!
//! Every chart is computed server side as plain data (bins, group means, box
//! statistics, point sets); the browser only draws it.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::dataset::Dataset;
use crate::error::Result;

/// Columns the fixed chart sequence groups or plots on.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "online_order",
    "book_table",
    "rate",
    "rest_type",
    "cuisines",
    "dining_type",
    "location_city",
    "cost_category",
    "vote_category",
];

const HEAD_ROWS: usize = 10;

#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub rows: usize,
    pub columns: Vec<String>,
    pub head: Vec<BTreeMap<String, String>>,
    pub univariate: Vec<Chart>,
    pub bivariate: Vec<Section>,
    pub multivariate: Vec<Section>,
}

#[derive(Debug, Serialize)]
pub struct Section {
    pub question: String,
    pub charts: Vec<Chart>,
}

#[derive(Debug, Serialize)]
pub struct Chart {
    pub title: String,
    #[serde(flatten)]
    pub kind: ChartKind,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Aggregate {
    Mean,
    Sum,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    Histogram {
        x: String,
        bins: Vec<Bin>,
    },
    Box {
        x: String,
        y: String,
        color: Option<String>,
        groups: Vec<BoxGroup>,
    },
    Bar {
        x: String,
        y: String,
        color: Option<String>,
        aggregate: Aggregate,
        bars: Vec<BarValue>,
    },
    Scatter {
        x: String,
        y: String,
        z: Option<String>,
        color: Option<String>,
        points: Vec<Point>,
    },
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Bin {
    pub label: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub count: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BoxGroup {
    pub label: String,
    pub color: Option<String>,
    pub stats: BoxStats,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BarValue {
    pub label: String,
    pub color: Option<String>,
    pub value: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Point {
    pub x: String,
    pub y: f64,
    pub z: Option<f64>,
    pub color: Option<String>,
}

/// A categorical series: its column name and one value per dataset row.
type Series<'a> = (&'a str, Vec<&'a str>);

pub fn build_report(dataset: &Dataset) -> Result<AnalysisReport> {
    dataset.require_columns(&REQUIRED_COLUMNS)?;

    let rate = dataset.numeric_cells("rate")?;
    let cost = series(dataset, "cost_category")?;
    let votes = series(dataset, "vote_category")?;
    let online = series(dataset, "online_order")?;
    let booking = series(dataset, "book_table")?;
    let rest_type = series(dataset, "rest_type")?;
    let cuisines = series(dataset, "cuisines")?;
    let city = series(dataset, "location_city")?;
    let dining = series(dataset, "dining_type")?;

    let options_values: Vec<String> = online
        .1
        .iter()
        .zip(&booking.1)
        .map(|(o, b)| format!("{o} & {b}"))
        .collect();
    let options: Series = ("options", options_values.iter().map(String::as_str).collect());

    let mut univariate = Vec::with_capacity(dataset.headers().len());
    for header in dataset.headers() {
        univariate.push(histogram(dataset, header)?);
    }

    let bivariate = vec![
        section(
            "What is the correlation between cost_category and rate?",
            vec![box_chart("Rate by cost category", &cost, &rate, None)],
        ),
        section(
            "How do votes relate to rate?",
            vec![bar_chart("Rate by vote category", &votes, &rate, None, Aggregate::Sum)],
        ),
        section(
            "How do average ratings differ between restaurants that offer online order vs. those that don't?",
            vec![bar_chart("Average rate by online order", &online, &rate, None, Aggregate::Mean)],
        ),
        section(
            "Is there a significant difference in ratings based on restaurant type or cuisines?",
            vec![
                box_chart("Rate by restaurant type", &rest_type, &rate, None),
                box_chart("Rate by cuisines", &cuisines, &rate, None),
            ],
        ),
        section(
            "How do average ratings vary by location_city or dining_type?",
            vec![
                bar_chart("Average Ratings by Location City", &city, &rate, None, Aggregate::Mean),
                bar_chart("Average Ratings by Dining Type", &dining, &rate, None, Aggregate::Mean),
            ],
        ),
    ];

    let multivariate = vec![
        section(
            "How do ratings vary by the type of cuisine and cost_category?",
            vec![scatter_chart("Rate by cuisine and cost", &cuisines, &rate, false, Some(&cost))],
        ),
        section(
            "What is the relationship between approximate cost and ratings?",
            vec![scatter_chart("Cost, rate and cuisines", &cost, &rate, true, Some(&cuisines))],
        ),
        section(
            "Do dining types affect the relationship between approximate cost and ratings?",
            vec![scatter_chart("Cost and rate by dining type", &cost, &rate, false, Some(&dining))],
        ),
        section(
            "How does the combination of online ordering and table booking options relate to ratings and approximate costs?",
            vec![scatter_chart("Cost and rate by ordering options", &cost, &rate, false, Some(&options))],
        ),
        section(
            "Is there a difference in ratings based on city, given the approximate cost?",
            vec![box_chart("Rate by city and cost", &city, &rate, Some(&cost))],
        ),
        section(
            "How do average ratings differ between high-cost and low-cost restaurants across various cuisines?",
            vec![bar_chart("Average rate by cuisine and cost", &cuisines, &rate, Some(&cost), Aggregate::Mean)],
        ),
    ];

    Ok(AnalysisReport {
        rows: dataset.len(),
        columns: dataset.headers().to_vec(),
        head: dataset.head(HEAD_ROWS),
        univariate,
        bivariate,
        multivariate,
    })
}

fn series<'a>(dataset: &'a Dataset, name: &'a str) -> Result<Series<'a>> {
    Ok((name, dataset.column(name)?))
}

fn section(question: &str, charts: Vec<Chart>) -> Section {
    Section {
        question: question.to_string(),
        charts,
    }
}

fn histogram(dataset: &Dataset, column: &str) -> Result<Chart> {
    let bins = if dataset.is_numeric(column) {
        numeric_bins(&dataset.numeric_column(column)?)
    } else {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in dataset.column(column)? {
            *counts.entry(value).or_default() += 1;
        }
        counts
            .into_iter()
            .map(|(label, count)| Bin {
                label: label.to_string(),
                start: None,
                end: None,
                count,
            })
            .collect()
    };

    Ok(Chart {
        title: format!("Distribution of {column}"),
        kind: ChartKind::Histogram {
            x: column.to_string(),
            bins,
        },
    })
}

/// Equal-width bins, bin count from Sturges' rule.
pub fn numeric_bins(values: &[f64]) -> Vec<Bin> {
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bin_count = if min == max {
        1
    } else {
        ((values.len() as f64).log2().ceil() as usize + 1).max(1)
    };
    let width = (max - min) / bin_count as f64;

    let mut counts = vec![0usize; bin_count];
    for value in values {
        let ix = if width > 0.0 {
            (((value - min) / width) as usize).min(bin_count - 1)
        } else {
            0
        };
        counts[ix] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(ix, count)| {
            let start = min + width * ix as f64;
            let end = if ix + 1 == bin_count { max } else { start + width };
            Bin {
                label: format!("{start:.2}-{end:.2}"),
                start: Some(start),
                end: Some(end),
                count,
            }
        })
        .collect()
}

/// Rates grouped by (x, color); rows with an empty rate are left out.
fn group_rates(
    x: &Series,
    rate: &[Option<f64>],
    color: Option<&Series>,
) -> BTreeMap<(String, Option<String>), Vec<f64>> {
    let mut groups: BTreeMap<(String, Option<String>), Vec<f64>> = BTreeMap::new();
    for (row, value) in rate.iter().enumerate() {
        let Some(value) = value else { continue };
        let key = (
            x.1[row].to_string(),
            color.map(|(_, values)| values[row].to_string()),
        );
        groups.entry(key).or_default().push(*value);
    }
    groups
}

fn box_chart(title: &str, x: &Series, rate: &[Option<f64>], color: Option<&Series>) -> Chart {
    let groups = group_rates(x, rate, color)
        .into_iter()
        .filter_map(|((label, color), values)| {
            box_stats(&values).map(|stats| BoxGroup {
                label,
                color,
                stats,
            })
        })
        .collect();

    Chart {
        title: title.to_string(),
        kind: ChartKind::Box {
            x: x.0.to_string(),
            y: "rate".to_string(),
            color: color.map(|(name, _)| name.to_string()),
            groups,
        },
    }
}

fn bar_chart(
    title: &str,
    x: &Series,
    rate: &[Option<f64>],
    color: Option<&Series>,
    aggregate: Aggregate,
) -> Chart {
    let bars = group_rates(x, rate, color)
        .into_iter()
        .map(|((label, color), values)| {
            let sum: f64 = values.iter().sum();
            let value = match aggregate {
                Aggregate::Sum => sum,
                Aggregate::Mean => sum / values.len() as f64,
            };
            BarValue {
                label,
                color,
                value,
            }
        })
        .collect();

    Chart {
        title: title.to_string(),
        kind: ChartKind::Bar {
            x: x.0.to_string(),
            y: "rate".to_string(),
            color: color.map(|(name, _)| name.to_string()),
            aggregate,
            bars,
        },
    }
}

fn scatter_chart(
    title: &str,
    x: &Series,
    rate: &[Option<f64>],
    rate_as_z: bool,
    color: Option<&Series>,
) -> Chart {
    let points = rate
        .iter()
        .enumerate()
        .filter_map(|(row, value)| {
            value.map(|y| Point {
                x: x.1[row].to_string(),
                y,
                z: rate_as_z.then_some(y),
                color: color.map(|(_, values)| values[row].to_string()),
            })
        })
        .collect();

    Chart {
        title: title.to_string(),
        kind: ChartKind::Scatter {
            x: x.0.to_string(),
            y: "rate".to_string(),
            z: rate_as_z.then(|| "rate".to_string()),
            color: color.map(|(name, _)| name.to_string()),
            points,
        },
    }
}

pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    Some(BoxStats {
        count: sorted.len(),
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
        mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
    })
}

/// Linear interpolation between closest ranks; `sorted` must be ascending.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
