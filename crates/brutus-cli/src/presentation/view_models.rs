use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// One frame of the console, top to bottom
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScreenViewModel {
    pub header: String,
    pub sections: Vec<SectionViewModel>,
    pub status_bar: StatusBarViewModel,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionViewModel {
    Panel(PanelViewModel),
    Menu(MenuViewModel),
    Comparison(ComparisonViewModel),
}

/// Bordered block of text lines
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PanelViewModel {
    pub title: String,
    pub lines: Vec<String>,
    pub level: StatusLevel,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MenuViewModel {
    pub title: Option<String>,
    pub items: Vec<String>,
    /// Already clamped to `items`
    pub selected: usize,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ComparisonViewModel {
    pub current: ColumnViewModel,
    pub recommended: ColumnViewModel,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ColumnViewModel {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatusBarViewModel {
    pub message: String,
    pub level: StatusLevel,
    pub pending_tasks: usize,
    pub help: String,
}

impl SectionViewModel {
    /// Rows needed to draw the section including its border
    pub fn height(&self) -> u16 {
        let content = match self {
            SectionViewModel::Panel(panel) => panel.lines.len(),
            SectionViewModel::Menu(menu) => {
                menu.items.len() + menu.feedback.as_ref().map_or(0, |_| 2)
            }
            SectionViewModel::Comparison(cmp) => {
                cmp.current.lines.len().max(cmp.recommended.lines.len())
            }
        };
        u16::try_from(content + 2).unwrap_or(u16::MAX)
    }
}
