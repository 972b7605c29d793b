// 渲染：只读 App，不修改任何状态

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, Mode},
    config::ThemeKind,
    form::{FIELD_COUNT, FIELD_LABELS, FIELD_PLACEHOLDERS},
};

const CARD_WIDTH: u16 = 54;
const CONTROLS_HEIGHT: u16 = 6;

// ---------------- 主题与样式 ----------------
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    fg: Color,
    muted: Color,
    accent: Color,
    alert: Color,
    good: Color,
    bar_bg: Color,
}

pub fn theme_of(kind: ThemeKind) -> Theme {
    match kind {
        ThemeKind::Dark => Theme {
            fg: Color::Rgb(220, 220, 220),
            muted: Color::Rgb(140, 140, 140),
            accent: Color::Rgb(95, 175, 255),
            alert: Color::Rgb(235, 95, 90),
            good: Color::Rgb(130, 200, 120),
            bar_bg: Color::Rgb(35, 40, 46),
        },
        ThemeKind::Light => Theme {
            fg: Color::Rgb(51, 51, 51),
            muted: Color::Rgb(102, 102, 102),
            accent: Color::Rgb(44, 123, 182),
            alert: Color::Rgb(215, 25, 28),
            good: Color::Rgb(26, 150, 65),
            bar_bg: Color::Rgb(235, 240, 245),
        },
    }
}

pub fn ui(f: &mut Frame, app: &App, th: Theme) {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());
    let body = centered_column(CARD_WIDTH, v[0]);
    match app.mode {
        Mode::Adding => draw_form(f, body, app, th),
        Mode::Browsing => draw_card(f, body, app, th),
    }
    draw_footer(f, v[1], app, th);
}

fn centered_column(width: u16, r: Rect) -> Rect {
    let w = width.min(r.width);
    Rect {
        x: r.x + (r.width - w) / 2,
        y: r.y,
        width: w,
        height: r.height,
    }
}

fn label(text: &str, color: Color) -> Span<'static> {
    Span::styled(
        text.to_string(),
        Style::default().fg(color).add_modifier(Modifier::ITALIC),
    )
}

fn draw_card(f: &mut Frame, area: Rect, app: &App, th: Theme) {
    let Some(card) = app.current_card() else {
        f.render_widget(
            Paragraph::new("No words available.").style(Style::default().fg(th.muted)),
            area,
        );
        return;
    };

    let title = Line::from(vec![
        Span::styled(
            " Pinyin Vocab Flashcards ",
            Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("({}/{})", app.current + 1, app.deck.size()),
            Style::default().fg(th.fg),
        ),
    ]);

    let mut lines = vec![
        Line::from(vec![label("Pinyin", th.good), Span::raw(": "), Span::raw(card.pinyin.clone())]),
        Line::from(vec![
            label("Chinese", th.alert),
            Span::raw(": "),
            Span::raw(card.chinese.clone()),
        ]),
    ];
    if app.show_details {
        lines.push(Line::from(""));
        if app.loading_example {
            lines.push(Line::from(label("Loading example...", th.accent)));
        } else {
            lines.push(Line::from(vec![
                label("Definition", th.accent),
                Span::raw(": "),
                Span::raw(card.definition.clone()),
            ]));
            lines.push(Line::from(""));
            lines.push(Line::from(label("Example", th.accent)));
            for l in card.example.lines() {
                lines.push(Line::from(l.to_string()));
            }
        }
    }

    // 边框 2 + 左右内边距 4；上下同为 4
    let inner_width = area.width.saturating_sub(6);
    let card_height = wrapped_rows(&lines, inner_width) + 4;
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(card_height),
            Constraint::Length(1),
            Constraint::Length(CONTROLS_HEIGHT),
        ])
        .split(area);

    f.render_widget(Paragraph::new(title).alignment(Alignment::Center), v[0]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(th.accent));
    let para = Paragraph::new(lines)
        .block(block.padding(Padding::new(2, 2, 1, 1)))
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(th.fg));
    f.render_widget(para, v[1]);

    let controls = vec![
        Line::from(label("Controls:", th.muted)),
        Line::from("← / h : Previous word "),
        Line::from("→ / l : Next word     "),
        Line::from("SPACE : Toggle details"),
        Line::from("a     : Add new card  "),
        Line::from("q     : Quit          "),
    ];
    f.render_widget(
        Paragraph::new(controls)
            .alignment(Alignment::Center)
            .style(Style::default().fg(th.muted)),
        v[3],
    );
}

/// 按显示宽度估算折行后的行数，空行记 1
fn wrapped_rows(lines: &[Line], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines.iter().map(|l| l.width().div_ceil(width).max(1)).sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn draw_form(f: &mut Frame, area: Rect, app: &App, th: Theme) {
    let mut constraints = vec![Constraint::Length(2)];
    for _ in 0..FIELD_COUNT {
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(0));
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    f.render_widget(
        Paragraph::new(Span::styled(
            " Add New Vocabulary Card ",
            Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
        )),
        v[0],
    );

    for i in 0..FIELD_COUNT {
        let focused = app.field_focused(i);
        f.render_widget(Paragraph::new(label(FIELD_LABELS[i], th.good)), v[1 + i * 2]);
        let border = if focused { th.alert } else { th.accent };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let input_area = v[2 + i * 2];
        f.render_widget(
            Paragraph::new(field_line(app, i, th)).block(block),
            input_area,
        );
        if focused {
            let before: String = app.form.value(i).chars().take(app.form.cursor()).collect();
            // 边框 1 + 提示符 "» " 2
            let x = input_area.x + 3 + before.width() as u16;
            if x < input_area.x + input_area.width.saturating_sub(1) {
                f.set_cursor_position((x, input_area.y + 1));
            }
        }
    }

    let help = vec![
        Line::from("TAB: Next field"),
        Line::from("ENTER: Save card"),
        Line::from("ESC: Cancel"),
    ];
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(th.muted)),
        v[v.len() - 1],
    );
}

fn field_line(app: &App, i: usize, th: Theme) -> Line<'static> {
    let value = app.form.value(i);
    let content = if value.is_empty() {
        Span::styled(FIELD_PLACEHOLDERS[i], Style::default().fg(th.muted))
    } else {
        Span::styled(value.to_string(), Style::default().fg(th.fg))
    };
    Line::from(vec![Span::styled("» ", Style::default().fg(th.accent)), content])
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App, th: Theme) {
    let mode = match app.mode {
        Mode::Browsing => " BROWSE ",
        Mode::Adding => " ADD ",
    };
    let mut segs = vec![Span::styled(
        mode,
        Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
    )];
    if app.loading_example {
        segs.push(Span::styled(" | fetching example…", Style::default().fg(th.muted)));
    }
    f.render_widget(
        Paragraph::new(Line::from(segs)).style(Style::default().bg(th.bar_bg).fg(th.fg)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::{Deck, WordCard};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 32)).unwrap();
        terminal
            .draw(|f| ui(f, app, theme_of(ThemeKind::Dark)))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn buffer_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn app() -> App {
        App::with_default_keys(Deck::new(vec![
            WordCard::new("ni", "ni hao", "Hello", "greeting text"),
            WordCard::new("xie", "xie xie", "Thanks", ""),
        ]))
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn browsing_shows_counter_and_front() {
        let out = render(&app());
        assert!(out.contains("Pinyin Vocab Flashcards"));
        assert!(out.contains("(1/2)"));
        assert!(out.contains("ni hao"));
        assert!(!out.contains("Definition"));
    }

    #[test]
    fn details_show_loading_then_content() {
        let mut a = app();
        press(&mut a, KeyCode::Char(' '));
        let out = render(&a);
        assert!(out.contains("Loading example..."));
        assert!(!out.contains("Definition"));

        a.loading_example = false;
        let out = render(&a);
        assert!(out.contains("Definition"));
        assert!(out.contains("Hello"));
        assert!(out.contains("greeting text"));
    }

    #[test]
    fn long_example_wraps_without_clipping() {
        let example = "我的朋友很好。 (Wǒ de péngyou hěn hǎo.) My friend is very nice, \
                       and we often eat dinner together after class on Friday. END_MARK";
        let mut a = App::with_default_keys(Deck::new(vec![WordCard::new(
            "朋友", "péngyou", "Friend", example,
        )]));
        a.show_details = true;
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal
            .draw(|f| ui(f, &a, theme_of(ThemeKind::Dark)))
            .unwrap();
        let out = buffer_text(terminal.backend().buffer());
        assert!(out.contains("END_MARK"), "tail of example clipped:\n{out}");
        assert!(out.contains("q     : Quit"));
    }

    #[test]
    fn wrapped_rows_counts_display_width() {
        let lines = vec![Line::from(""), Line::from("abcd"), Line::from("好好好")];
        assert_eq!(wrapped_rows(&lines, 4), 1 + 1 + 2);
        assert_eq!(wrapped_rows(&lines, 0), 1 + 4 + 6);
    }

    #[test]
    fn form_shows_fields_and_placeholders() {
        let mut a = app();
        press(&mut a, KeyCode::Char('a'));
        press(&mut a, KeyCode::Char('m'));
        let out = render(&a);
        assert!(out.contains("Add New Vocabulary Card"));
        assert!(out.contains("Pinyin (e.g. ni hao)"));
        assert!(out.contains("Example Sentence (optional)"));
        assert!(out.contains("» m"));
        assert!(out.contains("ESC: Cancel"));
    }

    #[test]
    fn empty_deck_message() {
        let out = render(&App::with_default_keys(Deck::default()));
        assert!(out.contains("No words available."));
    }

    #[test]
    fn narrow_terminal_does_not_panic() {
        let mut terminal = Terminal::new(TestBackend::new(20, 6)).unwrap();
        let mut a = app();
        press(&mut a, KeyCode::Char('a'));
        terminal
            .draw(|f| ui(f, &a, theme_of(ThemeKind::Light)))
            .unwrap();
    }
}
