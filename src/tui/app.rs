use ratatui::widgets::TableState;
use std::time::Instant;

use crate::github::types::{Contributor, UserRepository};
use crate::github::RepoRef;
use crate::report::{filter_repositories, RepositoryReport};
use crate::tui::loader::{LoadOutcome, LoadRequest};
use crate::tui::theme::ThemeColors;

const FLASH_SECS: u64 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Home,
    GetStarted,
    Repository(RepoRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    RepoInput,
    UsernameInput,
    FilterInput,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoTab {
    Overview,
    Analytics,
    Collaboration,
}

impl RepoTab {
    pub const ALL: [RepoTab; 3] = [RepoTab::Overview, RepoTab::Analytics, RepoTab::Collaboration];

    pub fn title(self) -> &'static str {
        match self {
            RepoTab::Overview => "Overview",
            RepoTab::Analytics => "Analytics",
            RepoTab::Collaboration => "Collaboration",
        }
    }

    pub fn index(self) -> usize {
        match self {
            RepoTab::Overview => 0,
            RepoTab::Analytics => 1,
            RepoTab::Collaboration => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Data of one view instance
#[derive(Debug, Clone, Default)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

pub struct App {
    pub view: View,
    pub input_mode: InputMode,
    pub repo_input: String,
    pub username_input: String,
    pub filter_input: String,
    pub user_repos: LoadState<Vec<UserRepository>>,
    pub report: LoadState<Box<RepositoryReport>>,
    pub repo_tab: RepoTab,
    pub table_state: TableState,
    pub flash_message: Option<(String, Instant)>,
    pub spinner_frame: usize,
    pub should_quit: bool,
    pub theme: ThemeColors,
    /// Bumped on every navigation and reload; loads from older generations are dropped
    generation: u64,
    load_request: Option<LoadRequest>,
}

impl App {
    pub fn new(theme: ThemeColors) -> Self {
        Self {
            view: View::Home,
            input_mode: InputMode::Normal,
            repo_input: String::new(),
            username_input: String::new(),
            filter_input: String::new(),
            user_repos: LoadState::Idle,
            report: LoadState::Idle,
            repo_tab: RepoTab::Overview,
            table_state: TableState::default(),
            flash_message: None,
            spinner_frame: 0,
            should_quit: false,
            theme,
            generation: 0,
            load_request: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The load the event loop should spawn next, if any
    pub fn take_load_request(&mut self) -> Option<LoadRequest> {
        self.load_request.take()
    }

    /// Start a new view instance: bump the generation and drop all
    /// view-scoped data
    fn enter(&mut self, view: View) {
        self.generation += 1;
        self.view = view;
        self.user_repos = LoadState::Idle;
        self.report = LoadState::Idle;
        self.load_request = None;
        self.filter_input.clear();
        self.table_state.select(None);
        self.input_mode = InputMode::Normal;
    }

    pub fn go_home(&mut self) {
        self.enter(View::Home);
    }

    pub fn go_get_started(&mut self) {
        self.enter(View::GetStarted);
        self.input_mode = InputMode::UsernameInput;
    }

    pub fn open_repository(&mut self, repo: RepoRef) {
        self.enter(View::Repository(repo.clone()));
        self.repo_tab = RepoTab::Overview;
        self.report = LoadState::Loading;
        self.load_request = Some(LoadRequest::Report(repo));
    }

    /// Parse the home input and open that repository
    pub fn submit_repo_input(&mut self) {
        match RepoRef::parse(&self.repo_input) {
            Ok(repo) => self.open_repository(repo),
            Err(e) => self.show_flash(format!("Error: {}", e)),
        }
    }

    /// Look up the repositories of the entered username
    pub fn submit_username(&mut self) {
        let username = self.username_input.trim().to_string();
        if username.is_empty() {
            self.show_flash("Error: Please enter a GitHub username".to_string());
            return;
        }
        self.generation += 1;
        self.user_repos = LoadState::Loading;
        self.filter_input.clear();
        self.table_state.select(None);
        self.input_mode = InputMode::Normal;
        self.load_request = Some(LoadRequest::UserRepositories(username));
    }

    /// Fetch the current view's data again
    pub fn reload(&mut self) {
        match self.view.clone() {
            View::Repository(repo) => {
                let tab = self.repo_tab;
                self.open_repository(repo);
                self.repo_tab = tab;
            }
            View::GetStarted if !self.username_input.trim().is_empty() => self.submit_username(),
            _ => {}
        }
    }

    pub fn is_loading(&self) -> bool {
        match self.view {
            View::Home => false,
            View::GetStarted => self.user_repos.is_loading(),
            View::Repository(_) => self.report.is_loading(),
        }
    }

    /// Commit a finished load if it belongs to the current view instance.
    ///
    /// Returns false when the result is stale and was discarded.
    pub fn apply_load(&mut self, generation: u64, outcome: LoadOutcome) -> bool {
        if generation != self.generation {
            tracing::warn!(
                generation,
                current = self.generation,
                "discarding stale load result"
            );
            return false;
        }

        match outcome {
            LoadOutcome::UserRepositories(result) if self.view == View::GetStarted => {
                self.user_repos = match result {
                    Ok(repos) => LoadState::Loaded(repos),
                    Err(msg) => LoadState::Failed(msg),
                };
            }
            LoadOutcome::Report(result) if matches!(self.view, View::Repository(_)) => {
                self.report = match result {
                    Ok(report) => LoadState::Loaded(report),
                    Err(msg) => LoadState::Failed(msg),
                };
            }
            outcome => {
                tracing::warn!(view = ?self.view, ?outcome, "load result does not match the view");
                return false;
            }
        }

        let rows = self.row_count();
        self.table_state.select(if rows > 0 { Some(0) } else { None });
        true
    }

    /// Repositories of the GetStarted list after the name filter
    pub fn visible_repos(&self) -> Vec<&UserRepository> {
        match &self.user_repos {
            LoadState::Loaded(repos) => filter_repositories(repos, &self.filter_input),
            _ => Vec::new(),
        }
    }

    pub fn selected_repo(&self) -> Option<&UserRepository> {
        let repos = self.visible_repos();
        self.table_state.selected().and_then(|i| repos.get(i).copied())
    }

    /// Contributors listed on the active repository tab
    pub fn tab_contributors(&self) -> &[Contributor] {
        match self.report.loaded() {
            Some(report) => match self.repo_tab {
                RepoTab::Overview => report.overview.top_contributors.as_slice(),
                RepoTab::Collaboration => report.collaboration.leaderboard.as_slice(),
                RepoTab::Analytics => &[],
            },
            None => &[],
        }
    }

    pub fn selected_contributor(&self) -> Option<&Contributor> {
        self.table_state
            .selected()
            .and_then(|i| self.tab_contributors().get(i))
    }

    fn row_count(&self) -> usize {
        match self.view {
            View::Home => 0,
            View::GetStarted => self.visible_repos().len(),
            View::Repository(_) => self.tab_contributors().len(),
        }
    }

    pub fn next_row(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn select_tab(&mut self, tab: RepoTab) {
        self.repo_tab = tab;
        let rows = self.row_count();
        self.table_state.select(if rows > 0 { Some(0) } else { None });
    }

    pub fn next_tab(&mut self) {
        self.select_tab(self.repo_tab.next());
    }

    pub fn previous_tab(&mut self) {
        self.select_tab(self.repo_tab.previous());
    }

    /// Append to the name filter and keep the selection on the first match
    pub fn push_filter_char(&mut self, c: char) {
        self.filter_input.push(c);
        self.reset_selection();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_input.pop();
        self.reset_selection();
    }

    fn reset_selection(&mut self) {
        let rows = self.row_count();
        self.table_state.select(if rows > 0 { Some(0) } else { None });
    }

    /// Open the repository selected in the GetStarted list
    pub fn open_selected_repo(&mut self) {
        let Some(selected) = self.selected_repo() else {
            return;
        };
        let parsed = if selected.full_name.is_empty() {
            Ok(RepoRef::new(selected.owner.login.clone(), selected.name.clone()))
        } else {
            RepoRef::parse(&selected.full_name)
        };
        match parsed {
            Ok(repo) => self.open_repository(repo),
            Err(e) => self.show_flash(format!("Error: {}", e)),
        }
    }

    /// Open the selected contributor's profile in the browser
    pub fn open_selected_contributor(&mut self) {
        let Some(contributor) = self.selected_contributor().cloned() else {
            self.show_flash("No contributor selected".to_string());
            return;
        };
        match crate::browser::open_profile(&contributor) {
            Ok(()) => self.show_flash(format!("Opened: {}", contributor.login)),
            Err(e) => self.show_flash(format!("Failed to open browser: {}", e)),
        }
    }

    /// Open the current repository's GitHub page
    pub fn open_current_repository(&mut self) {
        if let View::Repository(repo) = &self.view {
            let repo = repo.clone();
            match crate::browser::open_repository(&repo) {
                Ok(()) => self.show_flash(format!("Opened: {}", repo)),
                Err(e) => self.show_flash(format!("Failed to open browser: {}", e)),
            }
        }
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}
