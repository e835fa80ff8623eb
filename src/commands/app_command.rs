use crate::views::ControlEvent;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// 按 id 切换区块
    Show {
        section: String,
    },
    /// 菜单选择，按序号切换（内部使用）
    Open(usize),
    Set {
        control: String,
        value: String,
    },
    Clear {
        control: String,
    },
    /// 按键产生的控件事件（内部使用）
    Control(ControlEvent),
    Sections,
    Export {
        path: PathBuf,
    },
    Reload,
    Help,
    Quit,
    Unknown(String),
}

pub const COMMANDS: &[&str] = &[
    "show", "set", "clear", "sections", "export", "reload", "help", "quit",
];

pub const HELP_TEXT: &str = "可用命令:\n  \
show <section>        切换区块\n  \
set <control> <value> 设置当前区块的控件\n  \
clear <control>       清空下拉框或阈值\n  \
sections              列出所有区块\n  \
export <path>         导出当前视图为 JSON\n  \
reload                重新加载数据集\n  \
help                  显示帮助\n  \
quit                  退出";

impl FromStr for AppCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(AppCommand::Unknown("".to_string()));
        }

        match parts[0] {
            "show" | "open" => match parts.get(1) {
                Some(id) => Ok(AppCommand::Show {
                    section: id.to_string(),
                }),
                None => Ok(AppCommand::Unknown("用法: show <section>".to_string())),
            },
            "set" => {
                if parts.len() < 3 {
                    return Ok(AppCommand::Unknown("用法: set <control> <value>".to_string()));
                }
                // 值可以带空格，例如 "United States of America"
                Ok(AppCommand::Set {
                    control: parts[1].to_string(),
                    value: parts[2..].join(" "),
                })
            }
            "clear" => match parts.get(1) {
                Some(c) => Ok(AppCommand::Clear {
                    control: c.to_string(),
                }),
                None => Ok(AppCommand::Unknown("用法: clear <control>".to_string())),
            },
            "sections" | "ls" => Ok(AppCommand::Sections),
            "export" => {
                let path = parts[1..].join(" ");
                if path.is_empty() {
                    Ok(AppCommand::Unknown("用法: export <path>".to_string()))
                } else {
                    Ok(AppCommand::Export {
                        path: PathBuf::from(path),
                    })
                }
            }
            "reload" => Ok(AppCommand::Reload),
            "help" | "h" => Ok(AppCommand::Help),
            "quit" | "q" | "exit" => Ok(AppCommand::Quit),
            _ => Ok(AppCommand::Unknown(format!("未知命令: {}", parts[0]))),
        }
    }
}

impl AppCommand {
    /// 把 set/clear 转为控件事件；其它命令返回 None
    pub fn control_event(&self) -> Option<ControlEvent> {
        match self {
            AppCommand::Set { control, value } => Some(ControlEvent::Set {
                control: control.clone(),
                value: value.clone(),
            }),
            AppCommand::Clear { control } => Some(ControlEvent::Clear {
                control: control.clone(),
            }),
            AppCommand::Control(ev) => Some(ev.clone()),
            _ => None,
        }
    }
}
