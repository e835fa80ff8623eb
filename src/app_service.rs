use crate::app_state::{AppEvent, SectionInfo};
use crate::commands::app_command::HELP_TEXT;
use crate::commands::AppCommand;
use crate::config::AppConfig;
use crate::dataset::{load_csv, LoadReport, Table};
use crate::views::{catalog, ControlEvent, Section, SectionSnapshot, View, ViewNode, SECTIONS};
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// 持有数据表和全部区块状态的后台服务，逐条处理命令
pub struct DashboardService {
    config: AppConfig,
    table: Arc<Table>,
    sections: Vec<Section>,
    current: usize,
    last: Option<SectionSnapshot>,
    evt_tx: mpsc::UnboundedSender<AppEvent>,
}

pub fn section_infos() -> Vec<SectionInfo> {
    SECTIONS
        .iter()
        .map(|d| SectionInfo {
            id: d.id,
            title: d.title,
            group: d.group,
        })
        .collect()
}

pub fn load_report_lines(report: &LoadReport) -> Vec<String> {
    let mut lines = vec![format!(
        "✓ 读取 {} 行，去重 {} 行，跳过 {} 行",
        report.rows_read, report.duplicates, report.malformed
    )];
    if report.invalid_dates > 0 {
        lines.push(format!("⚠ {} 行日期无法解析，已置空", report.invalid_dates));
    }
    if report.suspicious_vote_average > 0 {
        lines.push(format!(
            "⚠ {} 行 vote_average 大于 10（未做缩放）",
            report.suspicious_vote_average
        ));
    }
    lines
}

impl DashboardService {
    pub fn new(config: AppConfig, table: Arc<Table>, evt_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        let sections = build_sections(&table, &config);
        Self {
            config,
            table,
            sections,
            current: 0,
            last: None,
            evt_tx,
        }
    }

    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<AppCommand>) {
        let _ = self.evt_tx.send(AppEvent::Sections(section_infos()));
        self.publish(None);
        while let Some(cmd) = cmd_rx.recv().await {
            if !self.handle(cmd).await {
                break;
            }
        }
        info!("dashboard service stopped");
    }

    /// 处理一条命令；收到 Quit 时返回 false
    pub async fn handle(&mut self, cmd: AppCommand) -> bool {
        if let Some(event) = cmd.control_event() {
            self.apply(event);
            return true;
        }
        match cmd {
            AppCommand::Show { section } => match catalog::find(&section) {
                Some((idx, _)) => self.open(idx),
                None => self.error(format!("未知区块: {}（输入 sections 查看列表）", section)),
            },
            AppCommand::Open(idx) => {
                if idx < self.sections.len() {
                    self.open(idx);
                }
            }
            AppCommand::Sections => {
                let mut lines = vec!["可用区块:".to_string()];
                lines.extend(
                    self.sections
                        .iter()
                        .map(|s| format!("  {:<24}{}", s.id(), s.title())),
                );
                self.message(lines.join("\n"));
            }
            AppCommand::Export { path } => match self.export(&path) {
                Ok(()) => self.message(format!("✓ 已导出到 {}", path.display())),
                Err(e) => {
                    warn!("export failed: {:#}", e);
                    self.error(format!("导出失败: {:#}", e));
                }
            },
            AppCommand::Reload => match self.reload().await {
                Ok(report) => {
                    for line in load_report_lines(&report) {
                        let _ = self.evt_tx.send(AppEvent::Log(line));
                    }
                    let _ = self.evt_tx.send(AppEvent::DatasetLoaded {
                        path: self.config.dataset_path.clone(),
                        rows: self.table.len(),
                    });
                    self.publish(None);
                }
                Err(e) => {
                    warn!("reload failed: {:#}", e);
                    self.error(format!("重新加载失败，继续使用旧数据: {:#}", e));
                }
            },
            AppCommand::Help => self.message(HELP_TEXT.to_string()),
            AppCommand::Quit => {
                self.message("收到退出命令".to_string());
                return false;
            }
            AppCommand::Unknown(msg) => {
                if !msg.is_empty() {
                    self.error(msg);
                }
            }
            AppCommand::Set { .. } | AppCommand::Clear { .. } | AppCommand::Control(_) => {}
        }
        true
    }

    fn open(&mut self, idx: usize) {
        self.current = idx;
        self.publish(None);
    }

    fn apply(&mut self, event: ControlEvent) {
        let current = self.current;
        match self.sections[current].bind(&event) {
            Ok(node) => self.publish(Some(node)),
            Err(e) => {
                let msg = format!("{}（区块 {}）", e, self.sections[current].id());
                self.error(msg);
            }
        }
    }

    fn publish(&mut self, node: Option<ViewNode>) {
        let section = &self.sections[self.current];
        let node = node.unwrap_or_else(|| section.render());
        let snapshot = section.snapshot(self.current, node);
        self.last = Some(snapshot.clone());
        let _ = self.evt_tx.send(AppEvent::Snapshot(snapshot));
    }

    #[cfg(test)]
    pub fn current_snapshot(&self) -> Option<&SectionSnapshot> {
        self.last.as_ref()
    }

    fn export(&self, path: &Path) -> Result<()> {
        let snapshot = self.last.as_ref().context("no view rendered yet")?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(snapshot).context("failed to serialize view")?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!("exported section {} to {}", snapshot.id, path.display());
        Ok(())
    }

    /// 新表加载成功后才替换；控件回到默认值
    async fn reload(&mut self) -> Result<LoadReport> {
        let path = self.config.dataset_path.clone();
        let cutoff = self.config.release_cutoff;
        let (table, report) = tokio::task::spawn_blocking(move || load_csv(&path, cutoff))
            .await
            .context("dataset loader task failed")??;
        self.table = Arc::new(table);
        self.sections = build_sections(&self.table, &self.config);
        info!("dataset reloaded: {} rows", self.table.len());
        Ok(report)
    }

    fn message(&self, msg: String) {
        let _ = self.evt_tx.send(AppEvent::Message(msg));
    }

    fn error(&self, msg: String) {
        let _ = self.evt_tx.send(AppEvent::Error(msg));
    }
}

fn build_sections(table: &Arc<Table>, config: &AppConfig) -> Vec<Section> {
    SECTIONS
        .iter()
        .map(|def| Section::new(def, Arc::clone(table), config.dashboard))
        .collect()
}
