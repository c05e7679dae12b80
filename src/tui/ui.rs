use ratatui::prelude::*;
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Cell, Clear, Gauge, Paragraph, Row, Table, TableState, Tabs,
    Wrap,
};

use crate::output::{format_age, format_count, truncate_title};
use crate::report::RepositoryReport;
use crate::tui::app::{App, InputMode, LoadState, RepoTab, View};
use crate::tui::theme::ThemeColors;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 10 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    let theme = app.theme.clone();

    // Layout: Title(1) + Body(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app, &theme);
    match app.view.clone() {
        View::Home => render_home(frame, chunks[1], app, &theme),
        View::GetStarted => render_get_started(frame, chunks[1], app, &theme),
        View::Repository(_) => render_repository(frame, chunks[1], app, &theme),
    }
    render_status_bar(frame, chunks[2], app, &theme);

    if app.input_mode == InputMode::Help {
        render_help_popup(frame, &theme);
    }

    // Loading overlay appears on top of everything
    if app.is_loading() {
        render_loading_overlay(frame, app, &theme);
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App, theme: &ThemeColors) {
    let name = "repo-lens";
    let location = match &app.view {
        View::Home => "Home".to_string(),
        View::GetStarted => "Get started".to_string(),
        View::Repository(repo) => repo.to_string(),
    };
    let padding = (area.width as usize).saturating_sub(name.len() + location.chars().count());

    let title = Line::from(vec![
        Span::styled(name, Style::default().fg(theme.title_color).bold()),
        Span::raw(" ".repeat(padding)),
        Span::styled(location, Style::default().fg(theme.muted)),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

/// Text input line with a cursor while `active`
fn input_line<'a>(value: &'a str, active: bool, theme: &ThemeColors) -> Line<'a> {
    if active {
        Line::from(vec![
            Span::styled(value, theme.input_active),
            Span::styled("|", theme.input_active),
        ])
    } else if value.is_empty() {
        Line::from(Span::styled("(empty)", Style::default().fg(theme.muted)))
    } else {
        Line::from(value)
    }
}

fn render_home(frame: &mut Frame, area: Rect, app: &App, theme: &ThemeColors) {
    let popup = centered_rect_fixed(64, 9, area);
    let block = Block::bordered()
        .title(" Explore a GitHub repository ")
        .title_style(theme.popup_title)
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let editing = app.input_mode == InputMode::RepoInput;
    let lines = vec![
        Line::from(Span::styled(
            "Repository (owner/repo or https://github.com/owner/repo)",
            Style::default().fg(theme.muted),
        )),
        Line::from(""),
        input_line(&app.repo_input, editing, theme),
        Line::from(""),
        Line::from(vec![
            Span::styled("/", Style::default().fg(theme.status_key_color)),
            Span::raw(" type a repository   "),
            Span::styled("g", Style::default().fg(theme.status_key_color)),
            Span::raw(" browse a user's repositories"),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_get_started(frame: &mut Frame, area: Rect, app: &mut App, theme: &ThemeColors) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .split(area);

    let username_block = Block::bordered()
        .title(" GitHub username ")
        .border_style(Style::default().fg(if app.input_mode == InputMode::UsernameInput {
            theme.popup_border
        } else {
            theme.muted
        }));
    let username = Paragraph::new(input_line(
        &app.username_input,
        app.input_mode == InputMode::UsernameInput,
        theme,
    ))
    .block(username_block);
    frame.render_widget(username, chunks[0]);

    let filter = Line::from(vec![
        Span::styled(" Filter: ", Style::default().fg(theme.muted)),
        Span::styled(
            if app.input_mode == InputMode::FilterInput {
                format!("{}|", app.filter_input)
            } else {
                app.filter_input.clone()
            },
            theme.input_active,
        ),
    ]);
    frame.render_widget(Paragraph::new(filter), chunks[1]);

    match &app.user_repos {
        LoadState::Idle => {
            render_centered_message(
                frame,
                chunks[2],
                "Enter a GitHub username to list their repositories",
                theme.muted,
            );
            return;
        }
        LoadState::Loading => return,
        LoadState::Failed(msg) => {
            let msg = msg.clone();
            render_error(frame, chunks[2], &msg, theme);
            return;
        }
        LoadState::Loaded(_) => {}
    }

    let repos = app.visible_repos();
    if repos.is_empty() {
        render_centered_message(frame, chunks[2], "No repositories found", theme.muted);
        return;
    }

    let rows: Vec<Row> = repos
        .iter()
        .enumerate()
        .map(|(idx, repo)| {
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(theme.index_color)),
                Cell::from(repo.name.clone()),
                Cell::from(format_count(repo.stars)).style(Style::default().fg(theme.accent)),
                Cell::from(format_count(repo.forks)),
                Cell::from(repo.language.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(truncate_title(repo.description.as_deref().unwrap_or(""), 80)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Length(28),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(12),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Name", "Stars", "Forks", "Language", "Description"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, chunks[2], &mut app.table_state);
}

fn render_repository(frame: &mut Frame, area: Rect, app: &mut App, theme: &ThemeColors) {
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).split(area);

    let titles: Vec<&str> = RepoTab::ALL.iter().map(|t| t.title()).collect();
    let tabs = Tabs::new(titles)
        .select(app.repo_tab.index())
        .style(theme.tab_inactive_style)
        .highlight_style(theme.tab_active_style)
        .divider(" | ");
    frame.render_widget(tabs, chunks[0]);

    let report = match &app.report {
        LoadState::Loaded(report) => report,
        LoadState::Failed(msg) => {
            render_error(frame, chunks[1], msg, theme);
            return;
        }
        LoadState::Idle | LoadState::Loading => return,
    };

    // Detach the selection so the report can stay borrowed while rendering
    let mut table_state = std::mem::take(&mut app.table_state);
    match app.repo_tab {
        RepoTab::Overview => render_overview(frame, chunks[1], &mut table_state, report, theme),
        RepoTab::Analytics => render_analytics(frame, chunks[1], report, theme),
        RepoTab::Collaboration => {
            render_collaboration(frame, chunks[1], &mut table_state, report, theme)
        }
    }
    app.table_state = table_state;
}

fn render_overview(
    frame: &mut Frame,
    area: Rect,
    table_state: &mut TableState,
    report: &RepositoryReport,
    theme: &ThemeColors,
) {
    let overview = &report.overview;
    let summary = &overview.summary;

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(12),
    ])
    .split(area);

    // Header
    let created = format!("created {} ago", format_age(report.generated_at - summary.created_at));
    let header = vec![
        Line::from(vec![
            Span::styled(summary.full_name.clone(), Style::default().fg(theme.title_color).bold()),
            Span::raw("  "),
            Span::styled(created, Style::default().fg(theme.muted)),
        ]),
        Line::from(summary.description.clone().unwrap_or_default()),
        Line::from(Span::styled(
            summary.html_url.clone(),
            Style::default().fg(theme.muted).underlined(),
        )),
    ];
    frame.render_widget(Paragraph::new(header).wrap(Wrap { trim: true }), chunks[0]);

    // Stat cards
    let cards = overview.stat_cards();
    let card_areas = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(chunks[1]);
    for ((label, value), card_area) in cards.iter().zip(card_areas.iter()) {
        let card = Paragraph::new(Span::styled(
            format_count(*value),
            Style::default().fg(theme.accent).bold(),
        ))
        .alignment(Alignment::Center)
        .block(Block::bordered().title(format!(" {} ", label)));
        frame.render_widget(card, *card_area);
    }

    // Languages + top contributors
    let middle = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);

    let languages_block = Block::bordered().title(" Languages ");
    if overview.languages.is_empty() {
        frame.render_widget(
            Paragraph::new("No language data")
                .alignment(Alignment::Center)
                .block(languages_block),
            middle[0],
        );
    } else {
        let bars: Vec<Bar> = overview
            .languages
            .iter()
            .map(|language| {
                Bar::default()
                    .value((language.percentage * 10.0).round() as u64)
                    .label(Line::from(truncate_title(&language.name, 12)))
                    .text_value(format!("{}%", language.percentage_label()))
            })
            .collect();
        let chart = BarChart::default()
            .block(languages_block)
            .direction(Direction::Horizontal)
            .data(BarGroup::default().bars(&bars))
            .max(1000)
            .bar_width(1)
            .bar_gap(0)
            .bar_style(Style::default().fg(theme.bar))
            .value_style(Style::default().fg(theme.accent));
        frame.render_widget(chart, middle[0]);
    }

    let rows: Vec<Row> = overview
        .top_contributors
        .iter()
        .enumerate()
        .map(|(idx, contributor)| {
            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(theme.index_color)),
                Cell::from(contributor.login.clone()),
                Cell::from(contributor.contributions.to_string()),
            ])
        })
        .collect();
    render_contributor_table(frame, middle[1], table_state, rows, " Top contributors ", theme);

    // Recent commits
    let commit_rows: Vec<Row> = overview
        .recent_commits
        .iter()
        .map(|commit| {
            let age = commit
                .authored_at()
                .map(|at| format_age(report.generated_at - at))
                .unwrap_or_else(|| "-".to_string());
            Row::new(vec![
                Cell::from(commit.short_sha()).style(Style::default().fg(theme.accent)),
                Cell::from(commit.headline().to_string()),
                Cell::from(commit.author_name().to_string()),
                Cell::from(age).style(Style::default().fg(theme.muted)),
            ])
        })
        .collect();
    let commits_block = Block::bordered().title(" Recent commits ");
    if commit_rows.is_empty() {
        frame.render_widget(
            Paragraph::new("No commits")
                .alignment(Alignment::Center)
                .block(commits_block),
            chunks[3],
        );
    } else {
        let table = Table::new(
            commit_rows,
            [
                Constraint::Length(8),
                Constraint::Fill(1),
                Constraint::Length(20),
                Constraint::Length(5),
            ],
        )
        .block(commits_block);
        frame.render_widget(table, chunks[3]);
    }
}

fn render_contributor_table(
    frame: &mut Frame,
    area: Rect,
    table_state: &mut TableState,
    rows: Vec<Row>,
    title: &str,
    theme: &ThemeColors,
) {
    let block = Block::bordered().title(title.to_string());
    if rows.is_empty() {
        frame.render_widget(
            Paragraph::new("No contributors")
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Fill(1),
            Constraint::Length(10),
        ],
    )
    .header(Row::new(vec!["#", "Login", "Commits"]).style(theme.header_style))
    .row_highlight_style(theme.row_selected)
    .block(block);
    frame.render_stateful_widget(table, area, table_state);
}

/// Bar width that spreads `count` bars across `area`
fn bar_width(area: Rect, count: usize) -> u16 {
    let inner = area.width.saturating_sub(2) as usize;
    let per_bar = inner / count.max(1);
    (per_bar.saturating_sub(1)).clamp(1, 9) as u16
}

fn render_analytics(frame: &mut Frame, area: Rect, report: &RepositoryReport, theme: &ThemeColors) {
    let analytics = &report.analytics;
    let chunks =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);

    let commits_block = Block::bordered().title(" Commit frequency (last 12 weeks) ");
    if analytics.commit_series.is_empty() {
        frame.render_widget(
            Paragraph::new("No commit activity yet")
                .alignment(Alignment::Center)
                .block(commits_block),
            chunks[0],
        );
    } else {
        let bars: Vec<Bar> = analytics
            .commit_series
            .iter()
            .enumerate()
            .map(|(i, point)| {
                Bar::default()
                    .value(point.value)
                    .label(Line::from(format!("W{}", i + 1)))
                    .text_value(point.value.to_string())
            })
            .collect();
        let chart = BarChart::default()
            .block(commits_block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width(chunks[0], bars.len()))
            .bar_gap(1)
            .bar_style(Style::default().fg(theme.bar))
            .value_style(Style::default().fg(theme.accent));
        frame.render_widget(chart, chunks[0]);
    }

    let title = match analytics.average_resolution_days() {
        Some(average) => format!(" Issue resolution time (avg {:.1} days) ", average),
        None => " Issue resolution time ".to_string(),
    };
    let issues_block = Block::bordered().title(title);
    if analytics.issue_resolution.is_empty() {
        frame.render_widget(
            Paragraph::new("No closed issues")
                .alignment(Alignment::Center)
                .block(issues_block),
            chunks[1],
        );
    } else {
        let bars: Vec<Bar> = analytics
            .issue_resolution
            .iter()
            .map(|point| {
                let days = point.days.max(0) as u64;
                Bar::default()
                    .value(days)
                    .label(Line::from(format!("#{}", point.issue_number)))
                    .text_value(format!("{}d", days))
            })
            .collect();
        let chart = BarChart::default()
            .block(issues_block)
            .data(BarGroup::default().bars(&bars))
            .bar_width(bar_width(chunks[1], bars.len()))
            .bar_gap(1)
            .bar_style(Style::default().fg(theme.bar_alt))
            .value_style(Style::default().fg(theme.accent));
        frame.render_widget(chart, chunks[1]);
    }
}

fn score_gauge<'a>(title: &'a str, score: f64, theme: &ThemeColors) -> Gauge<'a> {
    let ratio = if score.is_finite() {
        (score / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Gauge::default()
        .block(Block::bordered().title(title))
        .gauge_style(Style::default().fg(theme.score_color(score)).bg(theme.gauge_empty))
        .ratio(ratio)
        .label(format!("{:.1}", score))
}

fn render_collaboration(
    frame: &mut Frame,
    area: Rect,
    table_state: &mut TableState,
    report: &RepositoryReport,
    theme: &ThemeColors,
) {
    let collaboration = &report.collaboration;
    let columns = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    // Team metrics
    let entries = collaboration.team.entries();
    let metric_areas = Layout::vertical([Constraint::Length(3); 5]).split(columns[0]);
    for ((label, score), metric_area) in entries.iter().zip(metric_areas.iter()) {
        frame.render_widget(score_gauge(label, *score, theme), *metric_area);
    }

    let right = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(9),
        Constraint::Fill(1),
    ])
    .split(columns[1]);

    let reviews = &collaboration.reviews;
    let summary = format!(
        " {} reviews across {} pull requests",
        reviews.total, collaboration.pull_requests_sampled
    );
    frame.render_widget(
        Paragraph::new(Span::styled(summary, Style::default().fg(theme.muted))),
        right[0],
    );

    let review_areas = Layout::vertical([Constraint::Length(3); 3]).split(right[1]);
    let review_bars = [
        ("Approved", reviews.approvals, theme.score_high),
        ("Changes requested", reviews.changes_requested, theme.score_low),
        ("Pending", reviews.pending, theme.score_mid),
    ];
    for ((label, count, color), review_area) in review_bars.iter().zip(review_areas.iter()) {
        let share = reviews.share(*count);
        let gauge = Gauge::default()
            .block(Block::bordered().title(format!(" {} ", label)))
            .gauge_style(Style::default().fg(*color).bg(theme.gauge_empty))
            .ratio((share / 100.0).clamp(0.0, 1.0))
            .label(format!("{} ({:.0}%)", count, share));
        frame.render_widget(gauge, *review_area);
    }

    let rows: Vec<Row> = collaboration
        .leaderboard
        .iter()
        .enumerate()
        .map(|(idx, contributor)| {
            let style = if idx == 0 {
                Style::default().fg(theme.accent).bold()
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(theme.index_color)),
                Cell::from(contributor.login.clone()).style(style),
                Cell::from(contributor.contributions.to_string()),
            ])
        })
        .collect();
    render_contributor_table(frame, right[2], table_state, rows, " Leaderboard ", theme);
}

fn render_centered_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let y = area.y + area.height / 2;
    let line_area = Rect { x: area.x, y, width: area.width, height: area.height.min(1) };
    frame.render_widget(
        Paragraph::new(Span::styled(message.to_string(), Style::default().fg(color)))
            .alignment(Alignment::Center),
        line_area,
    );
}

/// Single error message in place of the view content
fn render_error(frame: &mut Frame, area: Rect, message: &str, theme: &ThemeColors) {
    let popup = centered_rect_fixed(70, 6, area);
    let lines = vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(theme.error).bold())),
        Line::from(""),
        Line::from(Span::styled(
            "r: retry   Esc: back",
            Style::default().fg(theme.muted),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::bordered()
                .title(" Error ")
                .border_style(Style::default().fg(theme.error)),
        );
    frame.render_widget(paragraph, popup);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App, theme: &ThemeColors) {
    let text = if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if msg.starts_with("Failed") || msg.starts_with("Error") {
            theme.flash_error
        } else if msg.starts_with("Opened:") {
            theme.flash_success
        } else {
            theme.muted
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints: &[(&str, &str)] = match (app.input_mode, &app.view) {
            (InputMode::RepoInput | InputMode::UsernameInput, _) => {
                &[("Enter", ":submit "), ("Esc", ":cancel")]
            }
            (InputMode::FilterInput, _) => &[("Enter/Esc", ":done")],
            (_, View::Home) => &[
                ("/", ":repository "),
                ("g", ":get started "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            (_, View::GetStarted) => &[
                ("j/k", ":nav "),
                ("Enter", ":open "),
                ("/", ":filter "),
                ("u", ":username "),
                ("Esc", ":back "),
                ("q", ":quit"),
            ],
            (_, View::Repository(_)) => &[
                ("Tab", ":next tab "),
                ("j/k", ":nav "),
                ("o", ":profile "),
                ("w", ":web "),
                ("r", ":reload "),
                ("Esc", ":back "),
                ("q", ":quit"),
            ],
        };

        let mut spans = Vec::new();
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    // Clamp dimensions to area bounds
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Render the help overlay popup
fn render_help_popup(frame: &mut Frame, theme: &ThemeColors) {
    let popup_area = centered_rect_fixed(54, 19, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(" Keyboard Shortcuts ")
        .title_style(theme.popup_title)
        .border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(theme.status_key_color).bold();
    let shortcuts = [
        ("/ or i", "Type a repository (Home)"),
        ("g", "Browse a user's repositories"),
        ("u", "Edit username (Get started)"),
        ("/ or f", "Filter repositories (Get started)"),
        ("j / Down", "Move down"),
        ("k / Up", "Move up"),
        ("Enter", "Open selected repository"),
        ("Tab / l", "Next tab"),
        ("S-Tab / h", "Previous tab"),
        ("1 2 3", "Overview / Analytics / Collaboration"),
        ("o", "Open contributor profile"),
        ("w", "Open repository on GitHub"),
        ("r", "Reload"),
        ("Esc / b", "Back to home"),
        ("q / Ctrl-c", "Quit"),
    ];
    let mut lines: Vec<Line> = shortcuts
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{:<14}", key), key_style),
                Span::raw(*action),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the loading spinner overlay
fn render_loading_overlay(frame: &mut Frame, app: &App, theme: &ThemeColors) {
    let popup_area = centered_rect_fixed(36, 3, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered().border_style(Style::default().fg(theme.popup_border));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
    let text = match &app.view {
        View::Repository(repo) => format!("{} Loading {}...", spinner, repo),
        _ => format!("{} Loading repositories...", spinner),
    };

    let loading_text = Paragraph::new(truncate_title(&text, inner.width as usize))
        .alignment(Alignment::Center)
        .style(Style::default().fg(theme.title_color));
    frame.render_widget(loading_text, inner);
}
