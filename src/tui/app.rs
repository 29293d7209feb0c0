use std::collections::HashMap;

use crate::api::MovieDetails;
use crate::domain::{Movie, MovieId, Session, ThemeMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Sections,
    Movies,
    Detail,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::Sections => ActivePane::Movies,
            ActivePane::Movies => ActivePane::Detail,
            ActivePane::Detail => ActivePane::Sections,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActivePane::Sections => ActivePane::Detail,
            ActivePane::Movies => ActivePane::Sections,
            ActivePane::Detail => ActivePane::Movies,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Trending,
    Popular,
    Favorites,
    History,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Trending,
        Section::Popular,
        Section::Favorites,
        Section::History,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Trending => "Trending",
            Section::Popular => "Popular",
            Section::Favorites => "Favorites",
            Section::History => "Search History",
        }
    }
}

pub struct TuiApp {
    pub active_pane: ActivePane,
    pub section_index: usize,
    pub movie_index: usize,
    pub detail_scroll: u16,
    pub movies: Vec<Movie>,
    pub detail: Option<MovieDetails>,
    pub favorites: Vec<MovieId>,
    pub view_counts: HashMap<MovieId, u64>,
    pub theme: ThemeMode,
    pub session: Session,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub is_loading: bool,
}

impl TuiApp {
    pub fn new(theme: ThemeMode, session: Session) -> Self {
        Self {
            active_pane: ActivePane::Sections,
            section_index: 0,
            movie_index: 0,
            detail_scroll: 0,
            movies: Vec::new(),
            detail: None,
            favorites: Vec::new(),
            view_counts: HashMap::new(),
            theme,
            session,
            should_quit: false,
            status_message: None,
            is_loading: false,
        }
    }

    pub fn selected_section(&self) -> Section {
        Section::ALL[self.section_index.min(Section::ALL.len() - 1)]
    }

    pub fn selected_movie(&self) -> Option<&Movie> {
        self.movies.get(self.movie_index)
    }

    pub fn is_favorite(&self, id: MovieId) -> bool {
        self.favorites.contains(&id)
    }

    pub fn view_count(&self, id: MovieId) -> u64 {
        self.view_counts.get(&id).copied().unwrap_or(0)
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Sections => {
                if self.section_index > 0 {
                    self.section_index -= 1;
                }
            }
            ActivePane::Movies => {
                if self.movie_index > 0 {
                    self.movie_index -= 1;
                }
            }
            ActivePane::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_sub(1);
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Sections => {
                if self.section_index < Section::ALL.len() - 1 {
                    self.section_index += 1;
                }
            }
            ActivePane::Movies => {
                if !self.movies.is_empty() && self.movie_index < self.movies.len() - 1 {
                    self.movie_index += 1;
                }
            }
            ActivePane::Detail => {
                self.detail_scroll = self.detail_scroll.saturating_add(1);
            }
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pane_cycle() {
        assert_eq!(ActivePane::Sections.next(), ActivePane::Movies);
        assert_eq!(ActivePane::Detail.next(), ActivePane::Sections);
        assert_eq!(ActivePane::Sections.prev(), ActivePane::Detail);
    }

    #[test]
    fn test_move_clamps_to_bounds() {
        let mut app = TuiApp::new(ThemeMode::Dark, Session::default());
        app.move_up();
        assert_eq!(app.section_index, 0);

        for _ in 0..10 {
            app.move_down();
        }
        assert_eq!(app.section_index, Section::ALL.len() - 1);
        assert_eq!(app.selected_section(), Section::History);
    }
}
