//! Centralized theme module for TUI colors and styles

use ratatui::prelude::*;

use crate::config::ThemeMode;

/// Background luma above which the terminal counts as light
const LIGHT_LUMA_THRESHOLD: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors::dark(),
            Theme::Light => ThemeColors::light(),
        }
    }
}

/// Pick the palette for `mode`, querying the terminal background for `auto`.
///
/// Must run before the terminal enters raw mode.
pub fn resolve_theme(mode: ThemeMode) -> Theme {
    match mode {
        ThemeMode::Dark => Theme::Dark,
        ThemeMode::Light => Theme::Light,
        ThemeMode::Auto => match terminal_light::luma() {
            Ok(luma) if luma > LIGHT_LUMA_THRESHOLD => Theme::Light,
            Ok(_) => Theme::Dark,
            Err(e) => {
                tracing::debug!("could not detect terminal background: {}", e);
                Theme::Dark
            }
        },
    }
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Score colors, higher is better
    pub score_high: Color,
    pub score_mid: Color,
    pub score_low: Color,

    // Charts
    pub bar: Color,
    pub bar_alt: Color,
    pub gauge_empty: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub header_style: Style,
    pub row_selected: Style,

    pub muted: Color,
    pub title_color: Color,
    pub accent: Color,
    pub error: Color,

    // Tabs
    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Status bar
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popups and inputs
    pub popup_border: Color,
    pub popup_title: Style,
    pub input_active: Style,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            score_high: Color::Green,
            score_mid: Color::Yellow,
            score_low: Color::Red,
            bar: Color::Cyan,
            bar_alt: Color::Magenta,
            gauge_empty: Color::Indexed(236),
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            accent: Color::Yellow,
            error: Color::Red,
            tab_active_style: Style::new().fg(Color::Cyan).bold().reversed(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            input_active: Style::new().fg(Color::Yellow),
        }
    }

    pub fn light() -> Self {
        Self {
            score_high: Color::Rgb(0, 128, 0),
            score_mid: Color::Rgb(176, 112, 0),
            score_low: Color::Rgb(192, 0, 0),
            bar: Color::Blue,
            bar_alt: Color::Rgb(128, 0, 128),
            gauge_empty: Color::Indexed(253),
            row_alt_bg: Color::Indexed(255),
            index_color: Color::Gray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::DarkGray,
            title_color: Color::Blue,
            accent: Color::Rgb(176, 112, 0),
            error: Color::Rgb(192, 0, 0),
            tab_active_style: Style::new().fg(Color::Blue).bold().reversed(),
            tab_inactive_style: Style::new().fg(Color::Gray),
            status_bar_bg: Color::Indexed(254),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(0, 128, 0),
            flash_error: Color::Rgb(192, 0, 0),
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
            input_active: Style::new().fg(Color::Blue),
        }
    }

    /// Traffic-light color for a 0-100 score
    pub fn score_color(&self, score: f64) -> Color {
        if score >= 70.0 {
            self.score_high
        } else if score >= 40.0 {
            self.score_mid
        } else {
            self.score_low
        }
    }
}
