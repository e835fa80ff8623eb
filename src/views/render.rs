use crate::aggregate::stats::histogram;
use crate::aggregate::{AggregateView, AggregateViewBuilder, ViewConfig, ViewError};
use crate::dataset::{NumericColumn, Table};
use crate::views::node::{format_value, BarDatum, ScatterPoint, ViewNode};
use log::warn;

pub const NO_DATA: &str = "暂无数据";

#[derive(Debug, Clone, PartialEq)]
pub enum ChartSpec {
    Bars { x_label: String, y_label: String },
    Histogram { bins: usize },
    Scatter {
        x: Option<String>,
        y: Option<String>,
        log_axes: bool,
    },
    Summary,
    Listing,
}

/// 一个面板 = 查询配置 + 图表类型；query 为空表示当前选择下没有可展示的数据
#[derive(Debug, Clone, PartialEq)]
pub struct PanelSpec {
    pub title: String,
    pub query: Option<ViewConfig>,
    pub chart: ChartSpec,
}

impl PanelSpec {
    pub fn new(title: impl Into<String>, query: ViewConfig, chart: ChartSpec) -> Self {
        Self {
            title: title.into(),
            query: Some(query),
            chart,
        }
    }

    pub fn empty(title: impl Into<String>, chart: ChartSpec) -> Self {
        Self {
            title: title.into(),
            query: None,
            chart,
        }
    }
}

pub fn render_panel(table: &Table, panel: &PanelSpec) -> ViewNode {
    let Some(query) = &panel.query else {
        return ViewNode::placeholder(format!("{}: {}", panel.title, NO_DATA));
    };
    let result = AggregateViewBuilder::new(table)
        .build(query)
        .and_then(|view| chart(table, panel, &view));
    match result {
        Ok(node) => node,
        Err(e) => error_placeholder(&panel.title, &e),
    }
}

fn error_placeholder(title: &str, err: &ViewError) -> ViewNode {
    match err {
        ViewError::EmptySelection => ViewNode::placeholder("请选择一个属性。"),
        ViewError::MissingColumn(c) => {
            warn!("panel '{}' references missing column {}", title, c);
            ViewNode::placeholder(format!("缺少列: {}（请检查数据集或视图配置）", c))
        }
        other => {
            warn!("panel '{}' failed: {}", title, other);
            ViewNode::placeholder(other.to_string())
        }
    }
}

fn resolve(table: &Table, name: Option<&str>) -> Result<NumericColumn, ViewError> {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => table.numeric_column(n),
        _ => Err(ViewError::EmptySelection),
    }
}

fn chart(table: &Table, panel: &PanelSpec, view: &AggregateView) -> Result<ViewNode, ViewError> {
    let title = panel.title.clone();
    let node = match &panel.chart {
        ChartSpec::Bars { x_label, y_label } => ViewNode::Bars {
            title,
            x_label: x_label.clone(),
            y_label: y_label.clone(),
            bars: view
                .rows
                .iter()
                .map(|r| BarDatum {
                    label: r
                        .keys
                        .iter()
                        .map(|k| k.to_string())
                        .collect::<Vec<_>>()
                        .join(" / "),
                    value: r.value,
                })
                .collect(),
        },
        ChartSpec::Histogram { bins } => {
            let column = view.attribute.ok_or(ViewError::EmptySelection)?;
            ViewNode::Histogram {
                title,
                attribute: column.to_string(),
                bins: histogram(&view.values(column), *bins),
            }
        }
        ChartSpec::Summary => ViewNode::Summary {
            title,
            stats: view.summary.clone().ok_or(ViewError::EmptySelection)?,
        },
        ChartSpec::Scatter { x, y, log_axes } => {
            let x = resolve(table, x.as_deref())?;
            let y = resolve(table, y.as_deref())?;
            let points = view
                .records
                .iter()
                .filter_map(|m| {
                    let (px, py) = (m.metric(x)?, m.metric(y)?);
                    if *log_axes && (px <= 0.0 || py <= 0.0) {
                        return None;
                    }
                    Some(ScatterPoint {
                        x: px,
                        y: py,
                        label: m.title.clone(),
                    })
                })
                .collect();
            ViewNode::Scatter {
                title,
                x_label: x.to_string(),
                y_label: y.to_string(),
                log_axes: *log_axes,
                points,
            }
        }
        ChartSpec::Listing => {
            let mut records: Vec<_> = view.records.iter().collect();
            records.sort_by(|a, b| {
                a.release_date
                    .cmp(&b.release_date)
                    .then_with(|| a.title.cmp(&b.title))
            });
            let cell = |v: Option<f64>| v.map(format_value).unwrap_or_else(|| "-".to_string());
            ViewNode::Listing {
                title,
                header: ["Release Date", "Title", "Vote Average", "Popularity", "Budget"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                rows: records
                    .into_iter()
                    .map(|m| {
                        vec![
                            m.release_date
                                .map(|d| d.format("%Y-%m-%d").to_string())
                                .unwrap_or_else(|| "-".to_string()),
                            m.title.clone(),
                            cell(m.vote_average),
                            cell(m.popularity),
                            cell(m.budget),
                        ]
                    })
                    .collect(),
            }
        }
    };
    Ok(node)
}
