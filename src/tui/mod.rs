pub mod app;
pub mod event;
pub mod loader;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};
use loader::{spawn_load, PendingLoad};

use crate::fetch::FetchOptions;
use crate::github::{is_valid_login, GitHubClient, RepoRef};

/// Where the dashboard opens
#[derive(Debug, Clone, Default)]
pub struct LaunchTarget {
    pub repo: Option<RepoRef>,
    pub user: Option<String>,
}

/// Fetch settings shared by every load the dashboard spawns
#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub client: GitHubClient,
    pub options: FetchOptions,
    pub timeout: Duration,
}

pub async fn run_tui(
    mut app: App,
    settings: LoadSettings,
    target: LaunchTarget,
) -> anyhow::Result<()> {
    match (target.repo, target.user) {
        (Some(repo), _) => app.open_repository(repo),
        (None, Some(user)) => {
            app.go_get_started();
            app.username_input = user;
            app.submit_username();
        }
        (None, None) => {}
    }

    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut app, &settings).await;

    // Restore terminal
    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

async fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    settings: &LoadSettings,
) -> anyhow::Result<()> {
    let mut events = EventHandler::new(250);
    let mut pending: Option<PendingLoad> = None;

    loop {
        // Abort in-flight work of a view we navigated away from
        if pending
            .as_ref()
            .is_some_and(|load| load.generation != app.generation())
        {
            if let Some(stale) = pending.take() {
                stale.abort();
            }
        }

        // Spawn the load the current view asked for
        if let Some(request) = app.take_load_request() {
            if let Some(previous) = pending.take() {
                previous.abort();
            }
            pending = Some(spawn_load(
                request,
                app.generation(),
                settings.client.clone(),
                settings.options,
                settings.timeout,
            ));
        }

        // Check if background load has completed
        if pending.as_ref().is_some_and(|load| load.handle.is_finished()) {
            if let Some(done) = pending.take() {
                let (generation, outcome) = done.finish().await;
                app.apply_load(generation, outcome);
            }
        }

        terminal.draw(|frame| ui::draw(frame, app))?;

        match events.next().await {
            Event::Key(key) => handle_key_event(app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        if app.should_quit {
            break;
        }
    }

    if let Some(load) = pending.take() {
        load.abort();
    }
    Ok(())
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
        app::InputMode::RepoInput => match key.code {
            KeyCode::Enter => app.submit_repo_input(),
            KeyCode::Esc => app.input_mode = app::InputMode::Normal,
            KeyCode::Backspace => {
                app.repo_input.pop();
            }
            KeyCode::Char(c) if !c.is_whitespace() => app.repo_input.push(c),
            _ => {}
        },
        app::InputMode::UsernameInput => match key.code {
            KeyCode::Enter => app.submit_username(),
            KeyCode::Esc => app.input_mode = app::InputMode::Normal,
            KeyCode::Backspace => {
                app.username_input.pop();
            }
            KeyCode::Char(c) if is_valid_login(c.encode_utf8(&mut [0; 4])) => {
                app.username_input.push(c)
            }
            _ => {}
        },
        app::InputMode::FilterInput => match key.code {
            KeyCode::Enter | KeyCode::Esc => app.input_mode = app::InputMode::Normal,
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Char(c) => app.push_filter_char(c),
            _ => {}
        },
        app::InputMode::Normal => handle_normal_key(app, key),
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') => {
            app.show_help();
            return;
        }
        _ => {}
    }

    match app.view {
        app::View::Home => match key.code {
            KeyCode::Char('/') | KeyCode::Char('i') | KeyCode::Enter => {
                app.input_mode = app::InputMode::RepoInput
            }
            KeyCode::Char('g') => app.go_get_started(),
            _ => {}
        },
        app::View::GetStarted => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            KeyCode::Enter => app.open_selected_repo(),
            KeyCode::Char('/') | KeyCode::Char('f') => {
                app.input_mode = app::InputMode::FilterInput
            }
            KeyCode::Char('u') => app.input_mode = app::InputMode::UsernameInput,
            KeyCode::Char('r') => app.reload(),
            KeyCode::Esc | KeyCode::Char('b') => app.go_home(),
            _ => {}
        },
        app::View::Repository(_) => match key.code {
            KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => app.next_tab(),
            KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => app.previous_tab(),
            KeyCode::Char('1') => app.select_tab(app::RepoTab::Overview),
            KeyCode::Char('2') => app.select_tab(app::RepoTab::Analytics),
            KeyCode::Char('3') => app.select_tab(app::RepoTab::Collaboration),
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            KeyCode::Char('o') => app.open_selected_contributor(),
            KeyCode::Char('w') => app.open_current_repository(),
            KeyCode::Char('r') => app.reload(),
            KeyCode::Esc | KeyCode::Char('b') => app.go_home(),
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        App::new(Theme::Dark.colors())
    }

    #[test]
    fn test_home_typing_opens_repository() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        for c in "octocat/hello".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        handle_key_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.view, app::View::Repository(RepoRef::new("octocat", "hello")));
        assert_eq!(app.input_mode, app::InputMode::Normal);
    }

    #[test]
    fn test_g_goes_to_get_started_and_esc_returns_home() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('g')));
        assert_eq!(app.view, app::View::GetStarted);
        assert_eq!(app.input_mode, app::InputMode::UsernameInput);

        // Letters go into the username while editing
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert_eq!(app.username_input, "q");
        assert!(!app.should_quit);

        handle_key_event(&mut app, key(KeyCode::Esc));
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.view, app::View::Home);
    }

    #[test]
    fn test_username_input_ignores_path_characters() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('g')));
        for c in "a/b.c-1".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.username_input, "abc-1");
    }

    #[test]
    fn test_navigation_bumps_generation() {
        let mut app = app();
        app.open_repository(RepoRef::new("a", "b"));
        let loading = app.generation();
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert!(app.generation() > loading);
    }

    #[test]
    fn test_ctrl_c_quits_from_input() {
        let mut app = app();
        app.input_mode = app::InputMode::RepoInput;
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_dismissed_by_any_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.input_mode, app::InputMode::Help);
        handle_key_event(&mut app, key(KeyCode::Char('x')));
        assert_eq!(app.input_mode, app::InputMode::Normal);
    }

    #[test]
    fn test_repository_tab_keys() {
        let mut app = app();
        app.open_repository(RepoRef::new("a", "b"));
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.repo_tab, app::RepoTab::Analytics);
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.repo_tab, app::RepoTab::Collaboration);
        handle_key_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.repo_tab, app::RepoTab::Analytics);
    }
}
