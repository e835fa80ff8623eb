use crate::dataset::Table;
use crate::views::catalog::SectionDef;
use crate::views::controls::{Control, ControlError, ControlEvent, ControlKind, ControlValues};
use crate::views::node::ViewNode;
use crate::views::render::render_panel;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardSettings {
    pub histogram_bins: usize,
    pub min_category_count: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            histogram_bins: 20,
            min_category_count: 5,
        }
    }
}

/// 仪表盘区块的能力接口
pub trait View {
    fn render(&self) -> ViewNode;
    /// 应用一次控件变更并重新渲染；非法输入时状态不变
    fn bind(&mut self, event: &ControlEvent) -> Result<ViewNode, ControlError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSnapshot {
    pub id: &'static str,
    pub label: String,
    pub value: String,
    /// 可选项，仅下拉框/单选有；用于命令补全
    #[serde(skip)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSnapshot {
    pub index: usize,
    pub id: &'static str,
    pub title: String,
    pub controls: Vec<ControlSnapshot>,
    pub node: ViewNode,
}

pub struct Section {
    def: &'static SectionDef,
    table: Arc<Table>,
    settings: DashboardSettings,
    controls: Vec<Control>,
}

impl Section {
    pub fn new(def: &'static SectionDef, table: Arc<Table>, settings: DashboardSettings) -> Self {
        let controls = (def.controls)(&table, &settings);
        Self {
            def,
            table,
            settings,
            controls,
        }
    }

    pub fn id(&self) -> &'static str {
        self.def.id
    }

    pub fn title(&self) -> &'static str {
        self.def.title
    }

    #[cfg(test)]
    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn control_snapshots(&self) -> Vec<ControlSnapshot> {
        self.controls
            .iter()
            .map(|c| ControlSnapshot {
                id: c.id,
                label: c.label.clone(),
                value: c.display_value(),
                options: match &c.kind {
                    ControlKind::Choice { options, .. } => options.clone(),
                    _ => Vec::new(),
                },
            })
            .collect()
    }

    pub fn snapshot(&self, index: usize, node: ViewNode) -> SectionSnapshot {
        SectionSnapshot {
            index,
            id: self.def.id,
            title: self.def.title.to_string(),
            controls: self.control_snapshots(),
            node,
        }
    }
}

impl View for Section {
    fn render(&self) -> ViewNode {
        let panels = (self.def.panels)(&ControlValues(&self.controls), &self.settings);
        let mut children: Vec<ViewNode> = panels
            .iter()
            .map(|p| render_panel(&self.table, p))
            .collect();
        if children.len() == 1 {
            children.remove(0)
        } else {
            ViewNode::Stack { children }
        }
    }

    fn bind(&mut self, event: &ControlEvent) -> Result<ViewNode, ControlError> {
        let control = self
            .controls
            .iter_mut()
            .find(|c| c.id == event.control())
            .ok_or_else(|| ControlError::UnknownControl(event.control().to_string()))?;
        control.apply(event)?;
        Ok(self.render())
    }
}
