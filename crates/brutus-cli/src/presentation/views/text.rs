use std::fmt;

use owo_colors::OwoColorize;

use crate::presentation::view_models::{PanelViewModel, StatusLevel};

/// A panel as plain lines: bold title, then its body indented by two spaces
pub struct PanelText<'a> {
    model: &'a PanelViewModel,
    colored: bool,
}

impl<'a> PanelText<'a> {
    pub fn new(model: &'a PanelViewModel, colored: bool) -> Self {
        Self { model, colored }
    }

    fn write_title(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let title = self.model.title.as_str();
        if !self.colored {
            return writeln!(f, "{}", title);
        }
        match self.model.level {
            StatusLevel::Success => writeln!(f, "{}", title.green().bold()),
            StatusLevel::Info => writeln!(f, "{}", title.cyan().bold()),
            StatusLevel::Warning => writeln!(f, "{}", title.yellow().bold()),
            StatusLevel::Error => writeln!(f, "{}", title.red().bold()),
        }
    }
}

impl<'a> fmt::Display for PanelText<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.write_title(f)?;
        writeln!(f)?;
        for line in &self.model.lines {
            if line.is_empty() {
                writeln!(f)?;
            } else {
                writeln!(f, "  {}", line)?;
            }
        }
        Ok(())
    }
}

/// Pre-rendered tree lines under an optional heading
pub struct TreeText<'a> {
    heading: Option<&'a str>,
    lines: &'a [String],
    colored: bool,
}

impl<'a> TreeText<'a> {
    pub fn new(lines: &'a [String], colored: bool) -> Self {
        Self {
            heading: None,
            lines,
            colored,
        }
    }

    pub fn with_heading(mut self, heading: &'a str) -> Self {
        self.heading = Some(heading);
        self
    }
}

impl<'a> fmt::Display for TreeText<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(heading) = self.heading {
            if self.colored {
                writeln!(f, "{}", heading.bold())?;
            } else {
                writeln!(f, "{}", heading)?;
            }
            writeln!(f)?;
        }
        for line in self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_text_plain() {
        let panel = PanelViewModel {
            title: "🌐 Azure Environment Status".to_string(),
            lines: vec!["👤 User: demo".to_string(), String::new(), "🌍 Scope: x".to_string()],
            level: StatusLevel::Success,
        };
        assert_eq!(
            PanelText::new(&panel, false).to_string(),
            "🌐 Azure Environment Status\n\n  👤 User: demo\n\n  🌍 Scope: x\n"
        );
    }

    #[test]
    fn test_tree_text_heading() {
        let lines = vec!["🏛️ Tenant Root Group (mg-tenant-root)".to_string()];
        let out = TreeText::new(&lines, false).with_heading("Basic CAF").to_string();
        assert_eq!(out, "Basic CAF\n\n🏛️ Tenant Root Group (mg-tenant-root)\n");
    }
}
