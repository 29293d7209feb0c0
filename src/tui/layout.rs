use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::tui::app::{ActivePane, Section, TuiApp};

pub fn render(frame: &mut Frame, app: &TuiApp, palette: &ColorConfig) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),      // Sections pane
            Constraint::Percentage(40), // Movies pane
            Constraint::Min(10),        // Detail pane
            Constraint::Length(1),      // Status bar
        ])
        .split(frame.area());

    render_sections_pane(frame, app, palette, chunks[0]);
    render_movies_pane(frame, app, palette, chunks[1]);
    render_detail_pane(frame, app, palette, chunks[2]);
    render_status_bar(frame, app, palette, chunks[3]);
}

fn border_style(active: bool, palette: &ColorConfig) -> Style {
    if active {
        Style::default().fg(palette.active_border)
    } else {
        Style::default().fg(palette.inactive_border)
    }
}

fn render_sections_pane(frame: &mut Frame, app: &TuiApp, palette: &ColorConfig, area: Rect) {
    let is_active = app.active_pane == ActivePane::Sections;

    let items: Vec<ListItem> = Section::ALL
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let content = match section {
                Section::Favorites => {
                    format!("{} ({})", section.title(), app.favorites.len())
                }
                _ => section.title().to_string(),
            };

            let style = if i == app.section_index && is_active {
                Style::default()
                    .bg(palette.selection_bg)
                    .fg(palette.selection_fg)
                    .add_modifier(Modifier::BOLD)
            } else if i == app.section_index {
                Style::default().bg(palette.text_dim)
            } else {
                Style::default().fg(palette.text)
            };

            ListItem::new(content).style(style)
        })
        .collect();

    let block = Block::default()
        .title(" Sections ")
        .borders(Borders::ALL)
        .border_style(border_style(is_active, palette));

    frame.render_widget(List::new(items).block(block), area);
}

fn render_movies_pane(frame: &mut Frame, app: &TuiApp, palette: &ColorConfig, area: Rect) {
    let is_active = app.active_pane == ActivePane::Movies;

    let items: Vec<ListItem> = app
        .movies
        .iter()
        .enumerate()
        .map(|(i, movie)| {
            let marker = if app.is_favorite(movie.id) { "♥" } else { " " };
            let views = app.view_count(movie.id);

            let content = format!(
                "{} {:>4}  {:>4}★  {:>3}v  {}",
                marker,
                movie.year_label(),
                movie.rating_label(),
                views,
                movie.display_title()
            );

            let base_style = if app.is_favorite(movie.id) {
                Style::default().fg(palette.favorite)
            } else {
                Style::default().fg(palette.text)
            };

            let style = if i == app.movie_index && is_active {
                Style::default()
                    .bg(palette.selection_bg)
                    .fg(palette.selection_fg)
                    .add_modifier(Modifier::BOLD)
            } else if i == app.movie_index {
                base_style.bg(palette.text_dim)
            } else {
                base_style
            };

            ListItem::new(content).style(style)
        })
        .collect();

    let title = format!(
        " {} ({}) ",
        app.selected_section().title(),
        app.movies.len()
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active, palette));

    frame.render_widget(List::new(items).block(block), area);
}

fn render_detail_pane(frame: &mut Frame, app: &TuiApp, palette: &ColorConfig, area: Rect) {
    let is_active = app.active_pane == ActivePane::Detail;

    let (title, content) = if let Some(details) = &app.detail {
        let movie = details.as_movie();
        let mut lines = Vec::new();

        lines.push(Line::from(Span::styled(
            format!("{} ({})", movie.display_title(), movie.year_label()),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "{}  |  {}",
                details.runtime_label(),
                details.genre_names().join(", ")
            ),
            Style::default().fg(palette.text_dim),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "{}★ ({} votes)   {} views",
                movie.rating_label(),
                movie.vote_count,
                app.view_count(movie.id)
            ),
            Style::default().fg(palette.rating),
        )));
        lines.push(Line::from(""));

        for overview_line in movie.overview.lines() {
            lines.push(Line::from(Span::styled(
                overview_line.to_string(),
                Style::default().fg(palette.text),
            )));
        }

        if let Some(url) = details.trailer_url() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Trailer: {}", url),
                Style::default().fg(palette.text_dim),
            )));
        }

        (
            format!(" {} ", movie.display_title()),
            Text::from(lines),
        )
    } else {
        (
            " Detail ".to_string(),
            Text::from("No movie selected (Enter on a movie to load it)"),
        )
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active, palette));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, palette: &ColorConfig, area: Rect) {
    let status = if app.is_loading {
        "Loading...".to_string()
    } else if let Some(ref msg) = app.status_message {
        msg.clone()
    } else {
        let help = "j/k:Navigate  Tab:Pane  Enter:Select  f:Favorite  o:Trailer  t:Theme  R:Refresh  q:Quit";
        if app.session.logged_in {
            format!("[{}]  {}", app.session.username, help)
        } else {
            help.to_string()
        }
    };

    let paragraph = Paragraph::new(status)
        .style(Style::default().fg(palette.status_fg).bg(palette.status_bg));

    frame.render_widget(paragraph, area);
}
