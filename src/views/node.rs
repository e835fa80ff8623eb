use crate::aggregate::{HistogramBin, SummaryStats};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarDatum {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub label: String,
}

/// 渲染无关的视图树，UI 层和导出都基于它
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewNode {
    Placeholder {
        message: String,
    },
    Bars {
        title: String,
        x_label: String,
        y_label: String,
        bars: Vec<BarDatum>,
    },
    Histogram {
        title: String,
        attribute: String,
        bins: Vec<HistogramBin>,
    },
    Scatter {
        title: String,
        x_label: String,
        y_label: String,
        log_axes: bool,
        points: Vec<ScatterPoint>,
    },
    Summary {
        title: String,
        stats: SummaryStats,
    },
    Listing {
        title: String,
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Stack {
        children: Vec<ViewNode>,
    },
}

impl ViewNode {
    pub fn placeholder(message: impl Into<String>) -> Self {
        ViewNode::Placeholder {
            message: message.into(),
        }
    }

    #[cfg(test)]
    pub fn children(&self) -> &[ViewNode] {
        match self {
            ViewNode::Stack { children } => children,
            other => std::slice::from_ref(other),
        }
    }
}

/// 大数用 K/M/B 缩写，其余保留两位小数
pub fn format_value(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if abs >= 1e4 {
        format!("{:.1}K", v / 1e3)
    } else if v.fract() == 0.0 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}
