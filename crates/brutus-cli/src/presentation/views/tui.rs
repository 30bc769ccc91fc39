use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use super::status_level_to_color;
use crate::presentation::view_models::{
    ColumnViewModel, ComparisonViewModel, MenuViewModel, PanelViewModel, ScreenViewModel,
    SectionViewModel, StatusBarViewModel,
};

const ACCENT: Color = Color::Magenta;

fn bordered(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .title(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

pub struct PanelView<'a> {
    model: &'a PanelViewModel,
}

impl<'a> PanelView<'a> {
    pub fn new(model: &'a PanelViewModel) -> Self {
        Self { model }
    }
}

impl<'a> Widget for PanelView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = bordered(&self.model.title, status_level_to_color(self.model.level));
        let lines: Vec<Line> = self
            .model
            .lines
            .iter()
            .map(|l| Line::raw(l.as_str()))
            .collect();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct MenuView<'a> {
    model: &'a MenuViewModel,
}

impl<'a> MenuView<'a> {
    pub fn new(model: &'a MenuViewModel) -> Self {
        Self { model }
    }
}

impl<'a> Widget for MenuView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = bordered(self.model.title.as_deref().unwrap_or(""), ACCENT);

        let selected_style = Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD);

        let mut lines: Vec<Line> = self
            .model
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if i == self.model.selected {
                    Line::from(Span::styled(format!("► {}", item), selected_style))
                } else {
                    Line::raw(format!("  {}", item))
                }
            })
            .collect();

        if let Some(feedback) = &self.model.feedback {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                feedback.as_str(),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::ITALIC),
            )));
        }

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct ComparisonView<'a> {
    model: &'a ComparisonViewModel,
}

impl<'a> ComparisonView<'a> {
    pub fn new(model: &'a ComparisonViewModel) -> Self {
        Self { model }
    }

    fn column(column: &ColumnViewModel, color: Color, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = column.lines.iter().map(|l| Line::raw(l.as_str())).collect();
        Paragraph::new(lines)
            .block(bordered(&column.title, color))
            .render(area, buf);
    }
}

impl<'a> Widget for ComparisonView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [left, _, right] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(2),
            Constraint::Fill(1),
        ])
        .areas(area);

        Self::column(&self.model.current, Color::Red, left, buf);
        Self::column(&self.model.recommended, Color::Green, right, buf);
    }
}

pub struct StatusBarView<'a> {
    model: &'a StatusBarViewModel,
}

impl<'a> StatusBarView<'a> {
    pub fn new(model: &'a StatusBarViewModel) -> Self {
        Self { model }
    }
}

impl<'a> Widget for StatusBarView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::TOP);
        let inner = block.inner(area);
        block.render(area, buf);

        let [status_area, help_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);

        let mut status = vec![Span::styled(
            self.model.message.as_str(),
            Style::default().fg(status_level_to_color(self.model.level)),
        )];
        if self.model.pending_tasks > 0 {
            status.push(Span::raw(format!(
                "  ({} background task{} running)",
                self.model.pending_tasks,
                if self.model.pending_tasks == 1 { "" } else { "s" }
            )));
        }
        Paragraph::new(Line::from(status)).render(status_area, buf);

        Paragraph::new(Span::styled(
            self.model.help.as_str(),
            Style::default().fg(Color::DarkGray),
        ))
        .render(help_area, buf);
    }
}

/// Whole frame: header, sections stacked in order, status bar
pub struct ScreenView<'a> {
    model: &'a ScreenViewModel,
}

impl<'a> ScreenView<'a> {
    pub fn new(model: &'a ScreenViewModel) -> Self {
        Self { model }
    }
}

impl<'a> Widget for ScreenView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [header_area, body_area, status_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .areas(area);

        Paragraph::new(Span::styled(
            self.model.header.as_str(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
        .render(header_area, buf);

        let mut constraints: Vec<Constraint> = self
            .model
            .sections
            .iter()
            .map(|s| Constraint::Length(s.height()))
            .collect();
        constraints.push(Constraint::Min(0));
        let chunks = Layout::vertical(constraints).split(body_area);

        for (section, chunk) in self.model.sections.iter().zip(chunks.iter()) {
            match section {
                SectionViewModel::Panel(panel) => PanelView::new(panel).render(*chunk, buf),
                SectionViewModel::Menu(menu) => MenuView::new(menu).render(*chunk, buf),
                SectionViewModel::Comparison(cmp) => {
                    ComparisonView::new(cmp).render(*chunk, buf)
                }
            }
        }

        StatusBarView::new(&self.model.status_bar).render(status_area, buf);
    }
}
