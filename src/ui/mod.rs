mod charts;

use crate::app_state::{App, FocusArea, InputMode};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    // 创建布局
    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 顶部标题栏
            Constraint::Min(0),    // 中间内容区域
            Constraint::Length(10), // 底部命令/日志区域
        ])
        .split(f.size());

    render_top_bar(f, chunks[0], app);

    // 中间内容区域（左侧菜单 + 主视图）
    let middle_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)])
        .split(chunks[1]);

    render_left_menu(f, middle_chunks[0], app);
    render_main_view(f, middle_chunks[1], app);
    render_bottom_bar(f, chunks[2], app);
}

fn focus_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let dataset = match &app.dataset {
        Some((path, rows)) => format!(" - {} ({} 部电影)", path.display(), rows),
        None => " - 数据加载中".to_string(),
    };
    let title_text = Line::from(vec![
        Span::styled(
            " 电影数据仪表盘 ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(dataset),
    ]);

    let paragraph = Paragraph::new(title_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        )
        .alignment(ratatui::layout::Alignment::Center);

    f.render_widget(paragraph, area);
}

fn render_left_menu(f: &mut Frame, area: Rect, app: &App) {
    let active = app.snapshot.as_ref().map(|s| s.index);
    let mut items: Vec<ListItem> = Vec::new();
    let mut last_group = "";
    for (i, section) in app.sections.iter().enumerate() {
        // 分组标题
        if section.group != last_group {
            items.push(
                ListItem::new(section.group).style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                ),
            );
            last_group = section.group;
        }
        let is_selected = i == app.menu_selected_index;
        let is_active = Some(i) == active;

        let style = if is_selected {
            if app.focus_area == FocusArea::Menu {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            }
        } else if is_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::White)
        };

        let prefix = if is_active { "● " } else { "○ " };
        items.push(ListItem::new(format!("{}{}", prefix, section.title)).style(style));
    }

    let title = if app.focus_area == FocusArea::Menu {
        "区块 (Enter/c 确认)"
    } else {
        "区块 (← 切换)"
    };

    let menu = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(focus_style(app.focus_area == FocusArea::Menu)),
    );

    f.render_widget(menu, area);
}

fn render_main_view(f: &mut Frame, area: Rect, app: &App) {
    let Some(snapshot) = &app.snapshot else {
        let p = Paragraph::new("正在计算视图...").block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    };

    let focused = app.focus_area == FocusArea::MainView;
    let controls_height = if snapshot.controls.is_empty() {
        3
    } else {
        snapshot.controls.len() as u16 + 2
    };
    let chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Length(controls_height), Constraint::Min(0)])
        .split(area);

    let lines: Vec<Line> = if snapshot.controls.is_empty() {
        vec![Line::from(Span::styled(
            "（此区块没有控件）",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        snapshot
            .controls
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let selected = focused && i == app.control_index;
                let marker = if selected { ">> " } else { "   " };
                let style = if selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(format!("{}{:<32}", marker, c.label), style),
                    Span::styled(format!(" {} ", c.value), Style::default().fg(Color::Green)),
                    Span::styled(format!(" [{}]", c.id), Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect()
    };

    let title = if focused {
        format!("{} (↑↓ 选择, n/p/空格 调整, x 清空, ← 菜单)", snapshot.title)
    } else {
        snapshot.title.clone()
    };
    let controls = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(focus_style(focused)),
    );
    f.render_widget(controls, chunks[0]);

    charts::render_node(f, chunks[1], &snapshot.node);
}

fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    let bottom_chunks = Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    // 命令输入区域
    let command_prompt = if app.input_mode == InputMode::Command {
        let mut spans = vec![Span::styled(
            "命令: ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )];
        let cur = app.command_cursor.min(app.command_input.len());
        let (left, right) = app.command_input.split_at(cur);
        spans.push(Span::raw(left));
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(right));

        // 补全建议显示为灰色幽灵文本
        if let Some(hint) = app.get_completion_hint() {
            spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));
        }

        vec![
            Line::from(spans),
            Line::from("Enter执行 Esc取消 Tab补全 ←→光标 Home/End ↑历史 ↓下一条"),
        ]
    } else {
        vec![
            Line::from(vec![
                Span::styled("命令: ", Style::default().fg(Color::Yellow)),
                Span::raw("(按 / 进入命令模式，help 查看命令)"),
            ]),
            Line::from("/命令 ←→切换 ↑↓导航 Enter/c确认 n/p/空格调整 x清空 q退出"),
        ]
    };
    let command_paragraph = Paragraph::new(command_prompt).block(
        Block::default()
            .borders(Borders::ALL)
            .title(if app.input_mode == InputMode::Command {
                "命令输入模式"
            } else {
                "命令输入"
            })
            .style(if app.input_mode == InputMode::Command {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::White)
            }),
    );
    f.render_widget(command_paragraph, bottom_chunks[0]);

    // 日志区域，最新的在顶部
    let log_items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with('✓') {
                Style::default().fg(Color::Green)
            } else if msg.starts_with('✗') {
                Style::default().fg(Color::Red)
            } else if msg.starts_with('⚠') {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();

    let log = List::new(log_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("日志 (共 {} 条)", app.log_messages.len()))
            .style(Style::default().fg(Color::White)),
    );
    f.render_widget(log, bottom_chunks[1]);
}
