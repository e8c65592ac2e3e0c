use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    catalogue::Mode,
    engine::{Phase, RunOutcome},
    generator::{Position, Stimulus},
    recall::{Column, ExactRecall, RecallSheet, Verdict},
    scoring::{Response, RunSummary, Scoring},
    App,
};

/// A UI Screen boundary: renders one engine phase into the stage area
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Nothing running: exercise description, or the last start failure
pub struct IdleScreen;

impl Screen for IdleScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let line = match &app.error {
            Some(err) => Line::from(Span::styled(
                err.as_str(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            None => Line::from(Span::styled(
                app.engine.spec().description,
                Style::default().add_modifier(Modifier::ITALIC),
            )),
        };
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(vertical_center(area, 1), buf);
    }
}

/// A stimulus is on screen
pub struct StimulusScreen;

impl Screen for StimulusScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let Some(stimulus) = app.engine.visible_stimulus() else {
            return;
        };
        let text = stimulus_text(stimulus);
        let style = Style::default().add_modifier(Modifier::BOLD);
        match stimulus.position() {
            Some(position) => {
                let target = place(position, area, text.width() as u16);
                if !target.is_empty() {
                    buf.set_stringn(target.x, target.y, &text, target.width as usize, style);
                }
            }
            None => {
                Paragraph::new(Span::styled(text, style))
                    .alignment(Alignment::Center)
                    .render(vertical_center(area, 1), buf);
            }
        }
    }
}

/// Between stimuli. Judgment exercises show which keys answer.
pub struct BlankScreen;

impl Screen for BlankScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        if app.engine.phase() != Phase::AwaitingInput {
            return;
        }
        let keys = app.engine.keys();
        let hint = format!(
            "{} = concuerda     {} = no concuerda",
            keys.congruent, keys.incongruent
        );
        Paragraph::new(Span::styled(
            hint,
            Style::default().add_modifier(Modifier::DIM),
        ))
        .alignment(Alignment::Center)
        .render(vertical_center(area, 1), buf);
    }
}

pub struct FeedbackScreen(pub Response);

impl Screen for FeedbackScreen {
    fn render(&self, _app: &App, area: Rect, buf: &mut Buffer) {
        let color = if self.0.correct {
            Color::Green
        } else {
            Color::Red
        };
        Paragraph::new(Span::styled(
            self.0.feedback(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(vertical_center(area, 1), buf);
    }
}

/// Run finished: summary, answer sheet or typed recall
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        match app.engine.outcome() {
            Some(RunOutcome::Judged(Some(summary))) => {
                let scoring = match app.engine.spec().mode {
                    Mode::AwaitResponse { scoring, .. } => scoring,
                    Mode::AutoAdvance { .. } => Scoring::Average,
                };
                render_summary(summary, scoring, area, buf);
            }
            Some(RunOutcome::Judged(None)) => {
                centered_lines(vec![Line::from("Sin respuestas")], area, buf);
            }
            Some(RunOutcome::Recall(sheet)) => render_sheet(app, sheet, area, buf),
            Some(RunOutcome::Exact(recall)) => render_exact(recall, area, buf),
            Some(RunOutcome::Viewed) | None => {
                let lines = vec![
                    Line::from(Span::styled(
                        "Ejercicio terminado",
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(format!("Tiempo: {}", app.session.elapsed_display())),
                ];
                centered_lines(lines, area, buf);
            }
        }
    }
}

/// Helper to construct the appropriate screen for the current phase
pub fn current_screen(phase: Phase) -> Box<dyn Screen> {
    match phase {
        Phase::Idle => Box::new(IdleScreen),
        Phase::Presenting => Box::new(StimulusScreen),
        Phase::Hidden | Phase::AwaitingInput => Box::new(BlankScreen),
        Phase::Feedback(response) => Box::new(FeedbackScreen(response)),
        Phase::Completed => Box::new(ResultsScreen),
    }
}

pub fn stimulus_text(stimulus: &Stimulus) -> String {
    let gap = match stimulus {
        Stimulus::Sum(..) => " ",
        Stimulus::Digits(_) => "   ",
        _ => "     ",
    };
    stimulus.parts().join(gap)
}

/// Map a canvas position onto `area`, centring `width` cells on the point.
pub fn place(position: Position, area: Rect, width: u16) -> Rect {
    let (rx, ry) = position.relative();
    let width = width.min(area.width);
    let cx = area.x + (rx * f64::from(area.width)) as u16;
    let y = area.y + ((ry * f64::from(area.height)) as u16).min(area.height.saturating_sub(1));
    let x = cx
        .saturating_sub(width / 2)
        .clamp(area.x, area.right().saturating_sub(width));
    Rect::new(x, y, width, 1.min(area.height))
}

fn vertical_center(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect::new(
        area.x,
        area.y + (area.height - height) / 2,
        area.width,
        height,
    )
}

fn centered_lines(lines: Vec<Line>, area: Rect, buf: &mut Buffer) {
    let target = vertical_center(area, lines.len() as u16);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(target, buf);
}

fn verdict_style(verdict: Verdict) -> Style {
    let color = if verdict.is_correct() {
        Color::Green
    } else {
        Color::Red
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn render_summary(summary: &RunSummary, scoring: Scoring, area: Rect, buf: &mut Buffer) {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![Line::from(vec![
        Span::raw("Tiempo medio: "),
        Span::styled(format!("{:.0} ms", summary.average_time_ms), bold),
    ])];
    if scoring == Scoring::PenaltyAdjusted {
        lines.push(Line::from(format!(
            "Penalización: +{:.0} ms",
            summary.error_penalty_ms
        )));
        lines.push(Line::from(vec![
            Span::raw("Tiempo con penalización: "),
            Span::styled(format!("{:.0} ms", summary.scored_time_ms), bold),
        ]));
    }
    lines.push(Line::from(format!(
        "Fallos: {} / {}",
        summary.incorrect, summary.total
    )));
    lines.push(Line::from(Span::styled(
        summary.label.to_string(),
        bold.fg(Color::Cyan),
    )));
    centered_lines(lines, area, buf);
}

fn sheet_column<'a>(sheet: &'a RecallSheet, column: Column, title: &'a str) -> Vec<Line<'a>> {
    let (cursor_column, cursor_index) = sheet.cursor();
    let answer = sheet.answer(column);
    let mut lines = vec![
        Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];
    for (index, option) in sheet.options().iter().enumerate() {
        let pointer = if !sheet.is_verified() && cursor_column == column && cursor_index == index {
            ">"
        } else {
            " "
        };
        let mark = if sheet.is_picked(column, index) {
            "(•)"
        } else {
            "( )"
        };
        let style = if answer == Some(option.as_str()) {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{pointer} {mark} ")),
            Span::styled(option.as_str(), style),
        ]));
    }
    if let Some(verdicts) = sheet.verdicts() {
        let verdict = match column {
            Column::Repeated => verdicts.repeated,
            Column::Missing => verdicts.missing,
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            verdict.to_string(),
            verdict_style(verdict),
        )));
    }
    lines
}

fn render_sheet(app: &App, sheet: &RecallSheet, area: Rect, buf: &mut Buffer) {
    let (repeated_title, missing_title) = app
        .exercise()
        .recall_questions()
        .unwrap_or(("Repetido", "No ha salido"));
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    for (column, title, chunk) in [
        (Column::Repeated, repeated_title, columns[0]),
        (Column::Missing, missing_title, columns[1]),
    ] {
        Paragraph::new(sheet_column(sheet, column, title))
            .alignment(Alignment::Left)
            .render(chunk, buf);
    }
}

fn render_exact(recall: &ExactRecall, area: Rect, buf: &mut Buffer) {
    let mut boxes: Vec<Span> = Vec::new();
    for (index, (entry, group)) in recall.entries().iter().zip(recall.expected()).enumerate() {
        let fill = "_".repeat(group.width.saturating_sub(entry.len()));
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if recall.verdict().is_none() && index == recall.focus() {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        boxes.push(Span::raw("["));
        boxes.push(Span::styled(format!("{entry}{fill}"), style));
        boxes.push(Span::raw("]  "));
    }

    let mut lines = vec![
        Line::from("Escribe lo que has visto"),
        Line::from(""),
        Line::from(boxes),
    ];
    if let Some(verdict) = recall.verdict() {
        let solution = recall
            .expected()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            verdict.to_string(),
            verdict_style(verdict),
        )));
        lines.push(Line::from(format!("Solución: {solution}")));
    }
    centered_lines(lines, area, buf);
}
