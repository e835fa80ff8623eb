use crate::commands::app_command::COMMANDS;
use crate::commands::AppCommand;
use crate::views::{ControlEvent, SectionSnapshot};
use crossterm::event::KeyCode;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::sync::mpsc;

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(PartialEq, Debug, Clone)]
pub enum FocusArea {
    Menu,     // 焦点在左侧菜单
    MainView, // 焦点在控件区
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub group: &'static str,
}

#[derive(Debug)]
pub enum AppEvent {
    Log(String),
    Message(String),
    Error(String),
    Sections(Vec<SectionInfo>),
    Snapshot(SectionSnapshot),
    DatasetLoaded { path: PathBuf, rows: usize },
}

pub struct App {
    pub input_mode: InputMode,
    pub focus_area: FocusArea,
    pub menu_selected_index: usize,
    pub sections: Vec<SectionInfo>,
    pub snapshot: Option<SectionSnapshot>,
    pub control_index: usize,
    pub dataset: Option<(PathBuf, usize)>,
    pub command_input: String,
    pub command_cursor: usize,
    pub command_history: Vec<String>,
    pub command_history_index: Option<usize>,
    pub log_messages: Vec<String>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
    pub evt_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        startup_info: Vec<String>,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
        evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> App {
        let mut log_messages = vec!["应用已启动".to_string()];
        log_messages.extend(startup_info);

        App {
            input_mode: InputMode::Normal,
            focus_area: FocusArea::Menu,
            menu_selected_index: 0,
            sections: Vec::new(),
            snapshot: None,
            control_index: 0,
            dataset: None,
            command_input: String::new(),
            command_cursor: 0,
            command_history: Vec::new(),
            command_history_index: None,
            log_messages,
            cmd_tx,
            evt_rx: Some(evt_rx),
        }
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
    }

    pub fn on_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Log(msg) | AppEvent::Message(msg) => {
                for line in msg.lines() {
                    self.add_log(line.to_string());
                }
            }
            AppEvent::Error(msg) => self.add_log(format!("✗ {}", msg)),
            AppEvent::Sections(list) => {
                self.sections = list;
                if self.menu_selected_index >= self.sections.len() {
                    self.menu_selected_index = self.sections.len().saturating_sub(1);
                }
            }
            AppEvent::Snapshot(snapshot) => {
                if self.snapshot.as_ref().map(|s| s.index) != Some(snapshot.index) {
                    self.control_index = 0;
                }
                self.menu_selected_index = snapshot.index;
                if self.control_index >= snapshot.controls.len() {
                    self.control_index = snapshot.controls.len().saturating_sub(1);
                }
                self.snapshot = Some(snapshot);
            }
            AppEvent::DatasetLoaded { path, rows } => {
                self.add_log(format!("✓ 数据集已加载: {} ({} 行)", path.display(), rows));
                self.dataset = Some((path, rows));
            }
        }
    }

    fn focused_control(&self) -> Option<&'static str> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.controls.get(self.control_index))
            .map(|c| c.id)
    }

    fn step_focused(&mut self, delta: i32) {
        if let Some(id) = self.focused_control() {
            let _ = self.cmd_tx.send(AppCommand::Control(ControlEvent::Step {
                control: id.to_string(),
                delta,
            }));
        }
    }

    /// 获取当前的补全建议
    pub fn get_completion_hint(&self) -> Option<String> {
        let input = self.command_input.as_str();
        let mut parts: Vec<&str> = input.split_whitespace().collect();
        if parts.is_empty() {
            return None;
        }
        let controls = self.snapshot.as_ref().map(|s| s.controls.as_slice()).unwrap_or(&[]);

        // set 的取值可以带空格，控件名之后的全部内容都算前缀
        let trailing_space = input.ends_with(char::is_whitespace);
        if parts[0] == "set" && (parts.len() > 2 || (parts.len() == 2 && trailing_space)) {
            let control = parts[1];
            let rest = input.trim_start()["set".len()..].trim_start();
            let value = rest[control.len()..].trim_start();
            return controls
                .iter()
                .find(|c| c.id == control)?
                .options
                .iter()
                .find(|o| o.starts_with(value) && o.as_str() != value)
                .map(|o| o[value.len()..].to_string());
        }
        let cur = if trailing_space {
            ""
        } else {
            parts.pop().unwrap_or("")
        };

        let candidates: Vec<&str> = match parts.as_slice() {
            [] => COMMANDS.to_vec(),
            ["show"] => self.sections.iter().map(|s| s.id).collect(),
            ["set"] | ["clear"] => controls.iter().map(|c| c.id).collect(),
            _ => return None,
        };
        candidates
            .into_iter()
            .find(|c| c.starts_with(cur) && *c != cur)
            .map(|c| c[cur.len()..].to_string())
    }

    fn reset_command_line(&mut self) {
        self.command_input.clear();
        self.command_cursor = 0;
        self.input_mode = InputMode::Normal;
    }

    pub fn handle_key_event(&mut self, key: KeyCode) -> bool {
        if self.input_mode == InputMode::Command {
            match key {
                KeyCode::Enter => {
                    let cmd_owned = self.command_input.trim().to_string();
                    if cmd_owned.is_empty() {
                        self.reset_command_line();
                        return false;
                    }
                    let app_cmd = AppCommand::from_str(&cmd_owned)
                        .unwrap_or_else(|_| AppCommand::Unknown(cmd_owned.clone()));
                    let quit = app_cmd == AppCommand::Quit;
                    let _ = self.cmd_tx.send(app_cmd);

                    self.command_history.push(cmd_owned);
                    self.command_history_index = None;
                    self.reset_command_line();
                    return quit;
                }
                KeyCode::Esc => self.reset_command_line(),
                KeyCode::Tab => {
                    if let Some(hint) = self.get_completion_hint() {
                        let insert = format!("{} ", hint);
                        self.command_input.insert_str(self.command_cursor, &insert);
                        self.command_cursor += insert.len();
                    }
                }
                KeyCode::Up => {
                    if self.command_history.is_empty() {
                        return false;
                    }
                    let next = match self.command_history_index {
                        None => self.command_history.len() - 1,
                        Some(i) => i.saturating_sub(1),
                    };
                    self.command_history_index = Some(next);
                    self.command_input = self.command_history[next].clone();
                    self.command_cursor = self.command_input.len();
                }
                KeyCode::Down => {
                    let Some(i) = self.command_history_index else {
                        return false;
                    };
                    let next = i + 1;
                    if next >= self.command_history.len() {
                        self.command_history_index = None;
                        self.command_input.clear();
                        self.command_cursor = 0;
                    } else {
                        self.command_history_index = Some(next);
                        self.command_input = self.command_history[next].clone();
                        self.command_cursor = self.command_input.len();
                    }
                }
                // 光标按字符边界移动，输入可能含中文
                KeyCode::Backspace => {
                    if let Some((idx, _)) =
                        self.command_input[..self.command_cursor].char_indices().next_back()
                    {
                        self.command_input.remove(idx);
                        self.command_cursor = idx;
                    }
                }
                KeyCode::Delete => {
                    if self.command_cursor < self.command_input.len() {
                        self.command_input.remove(self.command_cursor);
                    }
                }
                KeyCode::Left => {
                    if let Some((idx, _)) =
                        self.command_input[..self.command_cursor].char_indices().next_back()
                    {
                        self.command_cursor = idx;
                    }
                }
                KeyCode::Right => {
                    if let Some(c) = self.command_input[self.command_cursor..].chars().next() {
                        self.command_cursor += c.len_utf8();
                    }
                }
                KeyCode::Home => self.command_cursor = 0,
                KeyCode::End => self.command_cursor = self.command_input.len(),
                KeyCode::Char(c) => {
                    self.command_input.insert(self.command_cursor, c);
                    self.command_cursor += c.len_utf8();
                }
                _ => {}
            }
            return false;
        }

        // 正常模式下的按键处理
        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.command_input.clear();
                self.command_cursor = 0;
            }
            KeyCode::Char('q') => {
                let _ = self.cmd_tx.send(AppCommand::Quit);
                return true;
            }
            KeyCode::Left => self.focus_area = FocusArea::Menu,
            KeyCode::Right => self.focus_area = FocusArea::MainView,
            KeyCode::Up => {
                if self.focus_area == FocusArea::Menu {
                    self.menu_selected_index = self.menu_selected_index.saturating_sub(1);
                } else {
                    self.control_index = self.control_index.saturating_sub(1);
                }
            }
            KeyCode::Down => {
                if self.focus_area == FocusArea::Menu {
                    if self.menu_selected_index + 1 < self.sections.len() {
                        self.menu_selected_index += 1;
                    }
                } else {
                    let n = self.snapshot.as_ref().map(|s| s.controls.len()).unwrap_or(0);
                    if self.control_index + 1 < n {
                        self.control_index += 1;
                    }
                }
            }
            KeyCode::Enter | KeyCode::Char('c') => {
                if self.focus_area == FocusArea::Menu {
                    let _ = self.cmd_tx.send(AppCommand::Open(self.menu_selected_index));
                    // 确认后自动切换焦点到控件区
                    self.focus_area = FocusArea::MainView;
                }
            }
            KeyCode::Char('n') | KeyCode::Char(' ') => {
                if self.focus_area == FocusArea::MainView {
                    self.step_focused(1);
                }
            }
            KeyCode::Char('p') => {
                if self.focus_area == FocusArea::MainView {
                    self.step_focused(-1);
                }
            }
            KeyCode::Char('x') => {
                if let Some(id) = self.focused_control() {
                    if self.focus_area == FocusArea::MainView {
                        let _ = self.cmd_tx.send(AppCommand::Clear {
                            control: id.to_string(),
                        });
                    }
                }
            }
            _ => {}
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::section::ControlSnapshot;
    use crate::views::ViewNode;

    fn app() -> (App, mpsc::UnboundedReceiver<AppCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (_evt_tx, evt_rx) = mpsc::unbounded_channel();
        let mut app = App::new(Vec::new(), cmd_tx, evt_rx);
        app.on_event(AppEvent::Sections(vec![
            SectionInfo {
                id: "countries",
                title: "Country Performance",
                group: "Production",
            },
            SectionInfo {
                id: "companies",
                title: "Production Companies",
                group: "Production",
            },
        ]));
        app.on_event(AppEvent::Snapshot(SectionSnapshot {
            index: 0,
            id: "countries",
            title: "Country Performance".into(),
            controls: vec![
                ControlSnapshot {
                    id: "category",
                    label: "Production Country".into(),
                    value: "(未选择)".into(),
                    options: vec!["France".into(), "Germany".into()],
                },
                ControlSnapshot {
                    id: "top",
                    label: "Top N".into(),
                    value: "5".into(),
                    options: Vec::new(),
                },
            ],
            node: ViewNode::placeholder("x"),
        }));
        (app, cmd_rx)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key_event(KeyCode::Char(c));
        }
    }

    #[test]
    fn command_mode_sends_parsed_command_and_records_history() {
        let (mut app, mut rx) = app();
        app.handle_key_event(KeyCode::Char('/'));
        type_str(&mut app, "show companies");
        assert!(!app.handle_key_event(KeyCode::Enter));
        assert_eq!(
            rx.try_recv().unwrap(),
            AppCommand::Show {
                section: "companies".into()
            }
        );
        assert_eq!(app.input_mode, InputMode::Normal);

        app.handle_key_event(KeyCode::Char('/'));
        app.handle_key_event(KeyCode::Up);
        assert_eq!(app.command_input, "show companies");
    }

    #[test]
    fn tab_completes_commands_sections_and_options() {
        let (mut app, _rx) = app();
        app.handle_key_event(KeyCode::Char('/'));
        type_str(&mut app, "sh");
        assert_eq!(app.get_completion_hint().as_deref(), Some("ow"));
        app.handle_key_event(KeyCode::Tab);
        assert_eq!(app.command_input, "show ");
        type_str(&mut app, "comp");
        app.handle_key_event(KeyCode::Tab);
        assert_eq!(app.command_input, "show companies ");

        app.handle_key_event(KeyCode::Esc);
        app.handle_key_event(KeyCode::Char('/'));
        type_str(&mut app, "set category Ge");
        assert_eq!(app.get_completion_hint().as_deref(), Some("rmany"));
    }

    #[test]
    fn option_completion_spans_spaces() {
        let (mut app, _rx) = app();
        app.on_event(AppEvent::Snapshot(SectionSnapshot {
            index: 0,
            id: "countries",
            title: "Country Performance".into(),
            controls: vec![ControlSnapshot {
                id: "category",
                label: "Production Country".into(),
                value: "(未选择)".into(),
                options: vec!["United Kingdom".into(), "United States of America".into()],
            }],
            node: ViewNode::placeholder("x"),
        }));
        app.handle_key_event(KeyCode::Char('/'));
        type_str(&mut app, "set category United St");
        assert_eq!(app.get_completion_hint().as_deref(), Some("ates of America"));

        app.handle_key_event(KeyCode::Esc);
        app.handle_key_event(KeyCode::Char('/'));
        type_str(&mut app, "set category ");
        assert_eq!(app.get_completion_hint().as_deref(), Some("United Kingdom"));
    }

    #[test]
    fn keys_step_the_focused_control() {
        let (mut app, mut rx) = app();
        app.handle_key_event(KeyCode::Right);
        app.handle_key_event(KeyCode::Down);
        app.handle_key_event(KeyCode::Char('n'));
        assert_eq!(
            rx.try_recv().unwrap(),
            AppCommand::Control(ControlEvent::Step {
                control: "top".into(),
                delta: 1
            })
        );
        // 控件数之外不再下移
        app.handle_key_event(KeyCode::Down);
        assert_eq!(app.control_index, 1);
    }

    #[test]
    fn menu_enter_opens_section() {
        let (mut app, mut rx) = app();
        app.handle_key_event(KeyCode::Down);
        app.handle_key_event(KeyCode::Enter);
        assert_eq!(rx.try_recv().unwrap(), AppCommand::Open(1));
        assert_eq!(app.focus_area, FocusArea::MainView);
    }

    #[test]
    fn multibyte_input_editing() {
        let (mut app, _rx) = app();
        app.handle_key_event(KeyCode::Char('/'));
        type_str(&mut app, "set category 法国");
        app.handle_key_event(KeyCode::Backspace);
        assert_eq!(app.command_input, "set category 法");
        app.handle_key_event(KeyCode::Left);
        app.handle_key_event(KeyCode::Char('x'));
        assert_eq!(app.command_input, "set category x法");
    }

    #[test]
    fn errors_are_prefixed() {
        let (mut app, _rx) = app();
        app.on_event(AppEvent::Error("boom".into()));
        assert_eq!(app.log_messages.last().unwrap(), "✗ boom");
    }
}
