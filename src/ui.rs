pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};

use crate::{engine::RunOutcome, App};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(1), // title
                    Constraint::Length(1), // controls
                    Constraint::Length(1), // padding
                    Constraint::Min(1),    // stage
                    Constraint::Length(1), // legend
                ]
                .as_ref(),
            )
            .split(area);

        let spec = self.engine.spec();
        Paragraph::new(Span::styled(
            format!("{} - {}", spec.id, spec.title),
            bold_style,
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let action_style = if self.engine.is_active() {
            bold_style.fg(Color::Red)
        } else {
            bold_style.fg(Color::Green)
        };
        let controls = Line::from(vec![
            Span::styled("Ejercicio ", dim_style),
            Span::styled(spec.id.to_string(), bold_style),
            Span::raw("    "),
            Span::styled("Nivel ", dim_style),
            Span::styled(self.session.level().to_string(), bold_style),
            Span::raw("    "),
            Span::styled(format!("[ {} ]", self.action_label()), action_style),
            Span::raw("    "),
            Span::styled(self.session.elapsed_display(), bold_style),
        ]);
        Paragraph::new(controls)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        screen::current_screen(self.engine.phase()).render(self, chunks[3], buf);

        Paragraph::new(Span::styled(legend(self), italic_style)).render(chunks[4], buf);
    }
}

/// Key help for whatever the user can do right now
fn legend(app: &App) -> String {
    if app.engine.is_active() {
        if app.engine.spec().is_judgment() {
            let keys = app.engine.keys();
            return format!(
                "({}) sí / ({}) no / (enter) stop / (esc) stop",
                keys.congruent, keys.incongruent
            );
        }
        return "(enter) stop / (esc) stop".to_string();
    }
    match app.engine.outcome() {
        Some(RunOutcome::Recall(sheet)) if !sheet.is_verified() => {
            "(↑/↓) opción / (←/→) columna / (espacio) marcar / (enter) corregir".to_string()
        }
        Some(RunOutcome::Exact(recall)) if recall.verdict().is_none() => {
            "(0-9) cifras / (←/→) casilla / (enter) corregir".to_string()
        }
        _ => "(enter) comenzar / (tab) ejercicio / (+/-) nivel / (esc)ape".to_string(),
    }
}

pub fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
