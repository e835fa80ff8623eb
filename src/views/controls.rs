use crate::views::node::format_value;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("unknown control: {0}")]
    UnknownControl(String),
    #[error("invalid value for {control}: {value}")]
    InvalidValue { control: String, value: String },
    #[error("{0} cannot be cleared")]
    NotClearable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    /// 下拉框；不可清空时即单选按钮组
    Choice {
        options: Vec<String>,
        selected: Option<usize>,
        clearable: bool,
    },
    Slider {
        min: f64,
        max: f64,
        step: f64,
        value: f64,
    },
    Toggle {
        on: bool,
    },
    Number {
        value: f64,
        step: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub id: &'static str,
    pub label: String,
    pub kind: ControlKind,
}

/// 控件事件，来自按键或 `set` 命令
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    Set { control: String, value: String },
    Step { control: String, delta: i32 },
    Clear { control: String },
}

impl ControlEvent {
    pub fn control(&self) -> &str {
        match self {
            ControlEvent::Set { control, .. }
            | ControlEvent::Step { control, .. }
            | ControlEvent::Clear { control } => control,
        }
    }
}

impl Control {
    pub fn dropdown(id: &'static str, label: &str, options: Vec<String>, default: Option<&str>) -> Self {
        let selected = default
            .and_then(|d| options.iter().position(|o| o == d))
            .or(if options.is_empty() { None } else { Some(0) });
        Self {
            id,
            label: label.to_string(),
            kind: ControlKind::Choice {
                options,
                selected,
                clearable: true,
            },
        }
    }

    pub fn radio(id: &'static str, label: &str, options: &[&str], default: &str) -> Self {
        let options: Vec<String> = options.iter().map(|s| s.to_string()).collect();
        let selected = options.iter().position(|o| o == default).or(Some(0));
        Self {
            id,
            label: label.to_string(),
            kind: ControlKind::Choice {
                options,
                selected,
                clearable: false,
            },
        }
    }

    pub fn slider(id: &'static str, label: &str, min: f64, max: f64, step: f64, value: f64) -> Self {
        Self {
            id,
            label: label.to_string(),
            kind: ControlKind::Slider {
                min,
                max,
                step,
                value,
            },
        }
    }

    pub fn toggle(id: &'static str, label: &str, on: bool) -> Self {
        Self {
            id,
            label: label.to_string(),
            kind: ControlKind::Toggle { on },
        }
    }

    pub fn number(id: &'static str, label: &str, value: f64, step: f64) -> Self {
        Self {
            id,
            label: label.to_string(),
            kind: ControlKind::Number { value, step },
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ControlKind::Choice {
                options, selected, ..
            } => selected.and_then(|i| options.get(i)).map(String::as_str),
            _ => None,
        }
    }

    pub fn display_value(&self) -> String {
        match &self.kind {
            ControlKind::Choice { .. } => self.text().unwrap_or("(未选择)").to_string(),
            ControlKind::Slider { value, .. } => format_value(*value),
            ControlKind::Toggle { on } => if *on { "开" } else { "关" }.to_string(),
            ControlKind::Number { value, .. } => format_value(*value),
        }
    }

    fn invalid(&self, value: &str) -> ControlError {
        ControlError::InvalidValue {
            control: self.id.to_string(),
            value: value.to_string(),
        }
    }

    pub fn apply(&mut self, event: &ControlEvent) -> Result<(), ControlError> {
        match event {
            ControlEvent::Set { value, .. } => self.set(value),
            ControlEvent::Step { delta, .. } => {
                self.step(*delta);
                Ok(())
            }
            ControlEvent::Clear { .. } => self.clear(),
        }
    }

    fn set(&mut self, raw: &str) -> Result<(), ControlError> {
        let raw = raw.trim();
        let err = self.invalid(raw);
        match &mut self.kind {
            ControlKind::Choice {
                options, selected, ..
            } => {
                let idx = options
                    .iter()
                    .position(|o| o.eq_ignore_ascii_case(raw))
                    .ok_or(err)?;
                *selected = Some(idx);
            }
            ControlKind::Slider {
                min,
                max,
                step,
                value,
            } => {
                let v = parse_amount(raw).ok_or(err)?;
                *value = snap(v, *min, *max, *step);
            }
            ControlKind::Toggle { on } => {
                *on = match raw.to_ascii_lowercase().as_str() {
                    "on" | "true" | "1" | "yes" => true,
                    "off" | "false" | "0" | "no" => false,
                    _ => return Err(err),
                };
            }
            ControlKind::Number { value, .. } => {
                *value = parse_amount(raw).ok_or(err)?;
            }
        }
        Ok(())
    }

    fn step(&mut self, delta: i32) {
        match &mut self.kind {
            ControlKind::Choice {
                options, selected, ..
            } => {
                if options.is_empty() {
                    return;
                }
                let n = options.len() as i64;
                let next = match selected {
                    Some(i) => (*i as i64 + delta as i64).rem_euclid(n),
                    None => 0,
                };
                *selected = Some(next as usize);
            }
            ControlKind::Slider {
                min,
                max,
                step,
                value,
            } => {
                *value = snap(*value + *step * delta as f64, *min, *max, *step);
            }
            ControlKind::Toggle { on } => *on = !*on,
            ControlKind::Number { value, step } => {
                *value = (*value + *step * delta as f64).max(0.0);
            }
        }
    }

    fn clear(&mut self) -> Result<(), ControlError> {
        match &mut self.kind {
            ControlKind::Choice {
                selected,
                clearable: true,
                ..
            } => *selected = None,
            ControlKind::Number { value, .. } => *value = 0.0,
            _ => return Err(ControlError::NotClearable(self.id.to_string())),
        }
        Ok(())
    }
}

fn snap(v: f64, min: f64, max: f64, step: f64) -> f64 {
    let v = v.clamp(min, max);
    if step > 0.0 {
        (min + ((v - min) / step).round() * step).clamp(min, max)
    } else {
        v
    }
}

/// 支持 1500 / 1.5k / 2m / 1b 这样的输入
pub fn parse_amount(raw: &str) -> Option<f64> {
    let t = raw.trim().to_ascii_lowercase().replace('_', "");
    let (num, mul) = match t.chars().last()? {
        'k' => (&t[..t.len() - 1], 1e3),
        'm' => (&t[..t.len() - 1], 1e6),
        'b' => (&t[..t.len() - 1], 1e9),
        _ => (t.as_str(), 1.0),
    };
    num.trim()
        .parse::<f64>()
        .ok()
        .map(|v| v * mul)
        .filter(|v| v.is_finite())
}

/// 按 id 读取控件当前值
pub struct ControlValues<'a>(pub &'a [Control]);

impl<'a> ControlValues<'a> {
    fn find(&self, id: &str) -> Option<&'a Control> {
        self.0.iter().find(|c| c.id == id)
    }

    pub fn text(&self, id: &str) -> Option<&'a str> {
        self.find(id).and_then(Control::text)
    }

    pub fn flag(&self, id: &str) -> bool {
        matches!(
            self.find(id).map(|c| &c.kind),
            Some(ControlKind::Toggle { on: true })
        )
    }

    pub fn number(&self, id: &str) -> f64 {
        match self.find(id).map(|c| &c.kind) {
            Some(ControlKind::Slider { value, .. }) | Some(ControlKind::Number { value, .. }) => {
                *value
            }
            _ => 0.0,
        }
    }
}
