//! Research screen: company-name input and the resulting report.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use scout_shared::CompanyReport;

/// What the app should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    /// Run the pipeline for this company name.
    Research(String),
    /// Save the current report.
    Save,
    /// Show a message in the status bar.
    Notify(String),
    Quit,
}

pub(crate) struct ResearchScreen {
    input: String,
    editing: bool,
    report: Option<CompanyReport>,
}

impl ResearchScreen {
    pub(crate) fn new() -> Self {
        Self {
            input: String::new(),
            editing: true,
            report: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn report(&self) -> Option<&CompanyReport> {
        self.report.as_ref()
    }

    pub(crate) fn set_report(&mut self, report: CompanyReport) {
        self.report = Some(report);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        if self.editing {
            match code {
                KeyCode::Enter => {
                    let name = self.input.trim();
                    if name.is_empty() {
                        return Action::Notify("Enter a company name first".to_string());
                    }
                    self.editing = false;
                    Action::Research(name.to_string())
                }
                KeyCode::Esc => {
                    self.editing = false;
                    Action::None
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    Action::None
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    Action::None
                }
                _ => Action::None,
            }
        } else {
            match code {
                KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('/') => {
                    self.editing = true;
                    Action::None
                }
                KeyCode::Char('s') if self.report.is_some() => Action::Save,
                KeyCode::Char('s') => Action::Notify("Nothing to save yet".to_string()),
                KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
                _ => Action::None,
            }
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Company name
                Constraint::Length(1), // Hint
                Constraint::Min(1),    // Report
            ])
            .split(area);

        let input_style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let input = Paragraph::new(self.input.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Company name ")
                .border_style(input_style),
        );
        f.render_widget(input, chunks[0]);

        let hint = if self.editing {
            "Type a name · Enter to research · Esc to stop editing"
        } else {
            "Enter to edit · s to save the JSON report · q/Esc to quit"
        };
        let hint = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[1]);

        let (title, lines) = match &self.report {
            Some(report) => (
                format!(" Summary for {} ", report.company_name),
                report_lines(report),
            ),
            None => (
                " Report ".to_string(),
                vec![Line::from("Enter a company name and press Enter.")],
            ),
        };
        let body = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(body, chunks[2]);
    }
}

/// Report fields as labelled lines.
fn report_lines(report: &CompanyReport) -> Vec<Line<'_>> {
    let label = |text: &'static str| Span::styled(text, Style::default().add_modifier(Modifier::BOLD));
    let website = if report.website.is_empty() {
        "Not found"
    } else {
        report.website.as_str()
    };

    let mut lines = vec![
        Line::from(vec![label("Website: "), Span::raw(website)]),
        Line::from(vec![label("Summary: "), Span::raw(report.summary.trim())]),
        Line::from(vec![label("Key People: "), Span::raw(report.key_people.as_str())]),
        Line::from(vec![
            label("Products/Services: "),
            Span::raw(report.products_services.as_str()),
        ]),
        Line::from(vec![label("Locations: "), Span::raw(report.locations.as_str())]),
        Line::from(""),
        Line::from(label("Recent News Headlines")),
    ];

    if report.recent_news.is_empty() {
        lines.push(Line::from("No news found."));
    } else {
        lines.extend(
            report
                .recent_news
                .iter()
                .map(|headline| Line::from(format!("- {headline}"))),
        );
    }
    lines
}
