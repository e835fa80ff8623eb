mod aggregate;
mod app_service;
mod app_state;
mod commands;
mod config;
mod dataset;
mod ui;
mod views;

use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::app_service::{load_report_lines, DashboardService};
use crate::app_state::{App, AppEvent};
use crate::commands::AppCommand;
use crate::config::AppConfig;
use crate::dataset::load_csv;
use crate::ui::draw;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> io::Result<()> {
    let mut startup_info = Vec::new();

    // 加载 .env（可选）
    match dotenv::dotenv() {
        Ok(path) => startup_info.push(format!("✓ 找到 .env 文件: {}", path.display())),
        Err(_) => startup_info.push("⚠ 未找到 .env 文件，使用系统环境变量".to_string()),
    }

    let (config, warnings) = AppConfig::from_env(std::env::args().nth(1));

    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    std::fs::create_dir_all(&config.log_dir)?;
    let log_path = config.log_dir.join(format!("app-{}.log", ts));
    let log_file = std::fs::File::create(&log_path)?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file))) // 终端归 TUI，日志写文件
        .filter_level(log::LevelFilter::Warn)
        .filter_module("moviedash", log::LevelFilter::Info)
        .init();

    for w in &warnings {
        warn!("{}", w);
    }
    startup_info.extend(warnings);
    startup_info.push(format!("日志文件: {}", log_path.display()));

    // 启动时加载失败直接退出
    startup_info.push(format!("正在加载数据集: {}", config.dataset_path.display()));
    let (table, report) = match load_csv(&config.dataset_path, config.release_cutoff) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("dataset load failed: {:#}", e);
            eprintln!("无法加载数据集: {:#}", e);
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("数据集加载失败: {}", e),
            ));
        }
    };
    startup_info.extend(load_report_lines(&report));
    if table.is_empty() {
        startup_info.push("⚠ 数据集没有有效行，所有视图都将为空".to_string());
    }
    info!(
        "starting dashboard: {} movies, cutoff {}",
        table.len(),
        config.release_cutoff
    );

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<AppCommand>();
    let (evt_tx, evt_rx) = mpsc::unbounded_channel::<AppEvent>();

    let _ = evt_tx.send(AppEvent::DatasetLoaded {
        path: config.dataset_path.clone(),
        rows: table.len(),
    });

    // 单后台任务模型 (Actor)
    let service = DashboardService::new(config, Arc::new(table), evt_tx);
    tokio::spawn(service.run(cmd_rx));

    // TUI 初始化
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(startup_info, cmd_tx, evt_rx);

    let res = match app.evt_rx.take() {
        Some(rx) => run_app_loop(&mut terminal, &mut app, rx).await,
        None => Ok(()),
    };

    // 恢复终端
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        error!("ui loop failed: {}", e);
    }
    res
}

async fn run_app_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut evt_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        while let Ok(event) = evt_rx.try_recv() {
            app.on_event(event);
        }

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key_event(key.code) {
                    return Ok(());
                }
            }
        }
    }
}
