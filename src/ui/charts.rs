use crate::aggregate::{HistogramBin, SummaryStats};
use crate::views::{format_value, BarDatum, ScatterPoint, ViewNode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph, Row,
        Table, Wrap,
    },
    Frame,
};

/// 递归渲染视图树；Stack 按子节点数均分区域
pub fn render_node(f: &mut Frame, area: Rect, node: &ViewNode) {
    match node {
        ViewNode::Stack { children } => {
            if children.is_empty() {
                return;
            }
            let n = children.len() as u32;
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![Constraint::Ratio(1, n); children.len()])
                .split(area);
            for (child, chunk) in children.iter().zip(chunks.iter()) {
                render_node(f, *chunk, child);
            }
        }
        ViewNode::Placeholder { message } => {
            let p = Paragraph::new(message.as_str())
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(p, area);
        }
        ViewNode::Bars {
            title,
            x_label,
            y_label,
            bars,
        } => render_bars(f, area, &format!("{} ({} → {})", title, x_label, y_label), bars),
        ViewNode::Histogram {
            title,
            attribute,
            bins,
        } => render_histogram(f, area, title, attribute, bins),
        ViewNode::Scatter {
            title,
            x_label,
            y_label,
            log_axes,
            points,
        } => render_scatter(f, area, title, (x_label, y_label), *log_axes, points),
        ViewNode::Summary { title, stats } => render_summary(f, area, title, stats),
        ViewNode::Listing {
            title,
            header,
            rows,
        } => render_listing(f, area, title, header, rows),
    }
}

fn titled(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
}

fn empty(f: &mut Frame, area: Rect, title: &str) {
    let p = Paragraph::new("暂无数据")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(titled(title));
    f.render_widget(p, area);
}

/// BarChart 只接受 u64；小数值放大 100 倍保留精度，显示用原值
fn bar_scale(max: f64) -> f64 {
    if max < 1_000.0 {
        100.0
    } else {
        1.0
    }
}

fn render_bars(f: &mut Frame, area: Rect, title: &str, data: &[BarDatum]) {
    if data.is_empty() {
        return empty(f, area, title);
    }
    let max = data.iter().map(|d| d.value).fold(0.0_f64, f64::max);
    let scale = bar_scale(max);
    let bars: Vec<Bar> = data
        .iter()
        .map(|d| {
            Bar::default()
                .value((d.value.max(0.0) * scale).round() as u64)
                .label(Line::from(d.label.clone()))
                .text_value(format_value(d.value))
                .style(Style::default().fg(Color::Cyan))
                .value_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        })
        .collect();
    let chart = BarChart::default()
        .block(titled(title))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn render_histogram(f: &mut Frame, area: Rect, title: &str, attribute: &str, bins: &[HistogramBin]) {
    let data: Vec<BarDatum> = bins
        .iter()
        .map(|b| BarDatum {
            label: format!("{}~{}", format_value(b.lower), format_value(b.upper)),
            value: b.count as f64,
        })
        .collect();
    render_bars(f, area, &format!("{} ({})", title, attribute), &data);
}

fn axis_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo == hi {
        [lo - 1.0, hi + 1.0]
    } else {
        [lo, hi]
    }
}

fn axis_labels(bounds: [f64; 2], log: bool) -> Vec<Span<'static>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| {
            let shown = if log { 10f64.powf(*v) } else { *v };
            Span::raw(format_value(shown))
        })
        .collect()
}

fn render_scatter(
    f: &mut Frame,
    area: Rect,
    title: &str,
    (x_label, y_label): (&str, &str),
    log_axes: bool,
    points: &[ScatterPoint],
) {
    if points.is_empty() {
        return empty(f, area, title);
    }
    // 对数轴：绘制 log10 后的坐标，刻度还原为原值
    let project = |v: f64| if log_axes { v.log10() } else { v };
    let data: Vec<(f64, f64)> = points
        .iter()
        .map(|p| (project(p.x), project(p.y)))
        .collect();
    let xb = axis_bounds(data.iter().map(|p| p.0));
    let yb = axis_bounds(data.iter().map(|p| p.1));
    let suffix = if log_axes { " (log)" } else { "" };

    let dataset = Dataset::default()
        .name(format!("{} 部电影", points.len()))
        .marker(Marker::Braille)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);
    let chart = Chart::new(vec![dataset])
        .block(titled(title))
        .x_axis(
            Axis::default()
                .title(format!("{}{}", x_label, suffix))
                .style(Style::default().fg(Color::Gray))
                .bounds(xb)
                .labels(axis_labels(xb, log_axes)),
        )
        .y_axis(
            Axis::default()
                .title(format!("{}{}", y_label, suffix))
                .style(Style::default().fg(Color::Gray))
                .bounds(yb)
                .labels(axis_labels(yb, log_axes)),
        );
    f.render_widget(chart, area);
}

fn render_summary(f: &mut Frame, area: Rect, title: &str, stats: &SummaryStats) {
    let cell = |v: Option<f64>| v.map(format_value).unwrap_or_else(|| "-".to_string());
    let rows = [
        ("Count", stats.count.to_string()),
        ("Mean", cell(stats.mean)),
        ("Median", cell(stats.median)),
        ("Min", cell(stats.min)),
        ("Max", cell(stats.max)),
        ("Std Dev", cell(stats.std)),
    ];
    let lines: Vec<Line> = rows
        .into_iter()
        .map(|(k, v)| {
            Line::from(vec![
                Span::styled(
                    format!("  {:<10}", k),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(v, Style::default().fg(Color::Green)),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(titled(title)), area);
}

fn render_listing(f: &mut Frame, area: Rect, title: &str, header: &[String], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return empty(f, area, title);
    }
    let widths: Vec<Constraint> = header
        .iter()
        .enumerate()
        .map(|(i, _)| {
            if i == 1 {
                Constraint::Min(20)
            } else {
                Constraint::Length(12)
            }
        })
        .collect();
    let title = format!("{} ({} 部)", title, rows.len());
    let table = Table::new(
        rows.iter().map(|r| Row::new(r.iter().map(String::as_str))),
        widths,
    )
    .header(
        Row::new(header.iter().map(String::as_str))
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
    )
    .block(titled(&title));
    f.render_widget(table, area);
}
