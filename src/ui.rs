pub mod charting;

use blinktrainer::{guide, recording::Window, session::Phase, truth::Label};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};

use crate::{App, AppState};
use charting::{channel_spacing, format_label, span, y_bounds};

const HORIZONTAL_MARGIN: u16 = 1;

const TRACE_COLORS: [Color; 4] = [Color::Cyan, Color::Green, Color::Yellow, Color::Magenta];
const EOG_COLORS: [Color; 2] = [Color::Rgb(255, 165, 0), Color::LightBlue];

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([Constraint::Min(4), Constraint::Length(1)])
            .split(area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(rows[0]);
        let charts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(columns[0]);

        match self.trainer.window() {
            Ok(window) => {
                render_trace(self, &window, charts[0], buf);
                render_answer(self, &window, charts[1], buf);
            }
            Err(e) => {
                Paragraph::new(Span::styled(e.to_string(), Style::default().fg(Color::Red)))
                    .wrap(Wrap { trim: true })
                    .render(columns[0], buf);
            }
        }

        match self.state {
            AppState::Quiz => render_diagnosis(self, columns[1], buf),
            AppState::Guide => render_guide(self, columns[1], buf),
        }

        let legend = match (self.state, self.trainer.quiz.state.phase) {
            (AppState::Guide, _) => "(g)/(b)ack / (esc)ape",
            (AppState::Quiz, Phase::AwaitingAnswer) => {
                "(↑/↓) choose / (enter) submit / (←/→) scroll / (g)uide / (esc)ape"
            }
            (AppState::Quiz, Phase::AnswerRevealed) => "(n)ext / (g)uide / (esc)ape",
        };
        Paragraph::new(Span::styled(
            legend,
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(rows[1], buf);
    }
}

/// Stacks `names` top to bottom and returns each trace with its name
fn stacked_traces<'n>(window: &Window, names: &[&'n str]) -> Vec<(&'n str, Vec<(f64, f64)>)> {
    let spacing = channel_spacing(
        names
            .iter()
            .filter_map(|name| window.channel(name).ok())
            .filter_map(|values| span(values.iter().copied())),
    );

    names
        .iter()
        .enumerate()
        .filter_map(|(idx, &name)| {
            let offset = (names.len() - 1 - idx) as f64 * spacing;
            window.points(name, offset).ok().map(|points| (name, points))
        })
        .collect()
}

fn time_axis(window: &Window) -> Axis<'static> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    Axis::default()
        .title("Time (s)")
        .bounds([window.start_secs, window.end_secs()])
        .labels(vec![
            Span::styled(format_label(window.start_secs), bold_style),
            Span::styled(format_label(window.end_secs()), bold_style),
        ])
}

fn render_trace(app: &App, window: &Window, area: Rect, buf: &mut Buffer) {
    let names: Vec<&str> = app
        .trainer
        .config
        .channels
        .frontal
        .iter()
        .map(String::as_str)
        .collect();
    let traces = stacked_traces(window, &names);

    let datasets = traces
        .iter()
        .enumerate()
        .map(|(idx, (name, points))| {
            Dataset::default()
                .name(*name)
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(TRACE_COLORS[idx % TRACE_COLORS.len()]))
                .data(points)
        })
        .collect::<Vec<_>>();

    Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("EEG Channels (Frontal)"),
        )
        .x_axis(time_axis(window))
        .y_axis(Axis::default().bounds(y_bounds(traces.iter().map(|(_, p)| p.as_slice()))))
        .render(area, buf);
}

fn render_answer(app: &App, window: &Window, area: Rect, buf: &mut Buffer) {
    let trainer = &app.trainer;
    let block = Block::default()
        .borders(Borders::ALL)
        .title("EOG Channel (Ground Truth)");
    let inner = block.inner(area);

    if !trainer.quiz.is_revealed() {
        block.render(area, buf);
        let middle = Rect {
            y: inner.y + inner.height / 2,
            height: inner.height.min(1),
            ..inner
        };
        Paragraph::new(Span::styled(
            "Hidden (Ground Truth)",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(middle, buf);
        return;
    }

    let names = trainer.dataset.answer_channels(&trainer.config);
    let traces = stacked_traces(window, &names);
    let bounds = y_bounds(traces.iter().map(|(_, p)| p.as_slice()));

    let truth = &trainer.dataset.truth;
    let mut event_times = truth
        .blinks
        .within(window.start_secs, window.duration_secs, truth.sfreq);
    if let Some(horizontal) = &truth.horizontal {
        event_times.extend(horizontal.within(window.start_secs, window.duration_secs, truth.sfreq));
    }
    let markers: Vec<[(f64, f64); 2]> = event_times
        .iter()
        .map(|&t| [(t, bounds[0]), (t, bounds[1])])
        .collect();

    let mut datasets = traces
        .iter()
        .enumerate()
        .map(|(idx, (name, points))| {
            Dataset::default()
                .name(*name)
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(EOG_COLORS[idx % EOG_COLORS.len()]))
                .data(points)
        })
        .collect::<Vec<_>>();
    datasets.extend(markers.iter().map(|line| {
        Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(line)
    }));

    Chart::new(datasets)
        .block(block)
        .x_axis(time_axis(window))
        .y_axis(Axis::default().bounds(bounds))
        .render(area, buf);

    if let Some(banner) = trainer.current_truth().banner() {
        let top = Rect {
            height: inner.height.min(1),
            ..inner
        };
        Paragraph::new(Span::styled(
            banner,
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(top, buf);
    }
}

fn render_diagnosis(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);

    let trainer = &app.trainer;
    let quiz = &trainer.quiz;
    let verdict = quiz.state.last_verdict;

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Current Window: "),
            Span::styled(format!("{:.2}s", quiz.state.start_secs), bold_style),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            quiz.mode.question(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];

    for (idx, label) in trainer.options().iter().enumerate() {
        let selected = idx == trainer.selected;
        let style = match verdict {
            Some(v) if *label == v.truth => green_bold_style,
            Some(v) if *label == v.choice => red_bold_style,
            None if selected => bold_style.add_modifier(Modifier::REVERSED),
            _ => Style::default(),
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{} ({}) {}",
                if selected { ">" } else { " " },
                idx + 1,
                label.option_text(quiz.mode)
            ),
            style,
        )));
    }
    lines.push(Line::from(""));

    if let Some(v) = verdict {
        lines.push(if v.is_correct() {
            Line::from(Span::styled("Correct!", green_bold_style))
        } else {
            Line::from(Span::styled("Incorrect.", red_bold_style))
        });
        if v.truth != Label::Clean || !v.is_correct() {
            lines.push(Line::from(format!(
                "Answer: {}",
                v.truth.option_text(quiz.mode)
            )));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        format!("Score: {} / {}", quiz.state.score, quiz.state.attempts),
        bold_style,
    )));

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Diagnosis"))
        .wrap(Wrap { trim: false })
        .render(area, buf);
}

fn render_guide(app: &App, area: Rect, buf: &mut Buffer) {
    Paragraph::new(guide::text(app.trainer.quiz.mode))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Training Guide"),
        )
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: false })
        .render(area, buf);
}
