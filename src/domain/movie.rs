use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub type MovieId = i64;

/// A movie snapshot as delivered by the metadata API.
///
/// Everything except the id is optional on the wire: snapshots persisted by
/// older versions of the app may lack fields, and a record that decodes
/// partially is still usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

impl Movie {
    pub fn display_title(&self) -> &str {
        if !self.title.is_empty() {
            &self.title
        } else if !self.original_title.is_empty() {
            &self.original_title
        } else {
            "(Untitled)"
        }
    }

    /// Release year parsed from the API's `YYYY-MM-DD` date string.
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date.as_deref()?;
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .map(|d| d.year())
    }

    pub fn year_label(&self) -> String {
        self.release_year()
            .map(|y| y.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.vote_average)
    }

    /// Full poster URL against the configured image base, w300 size.
    pub fn poster_url(&self, image_base: &str) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|p| format!("{}/w300{}", image_base.trim_end_matches('/'), p))
    }

    pub fn backdrop_url(&self, image_base: &str) -> Option<String> {
        self.backdrop_path
            .as_deref()
            .map(|p| format!("{}/w780{}", image_base.trim_end_matches('/'), p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Movie {
        Movie {
            id: 27205,
            title: "Inception".into(),
            original_title: "Inception".into(),
            overview: "A thief who steals corporate secrets.".into(),
            poster_path: Some("/inception.jpg".into()),
            backdrop_path: None,
            release_date: Some("2010-07-15".into()),
            vote_average: 8.37,
            vote_count: 34000,
            genre_ids: vec![28, 878],
        }
    }

    #[test]
    fn test_decode_with_missing_fields() {
        let movie: Movie = serde_json::from_str(r#"{"id": 5}"#).unwrap();
        assert_eq!(movie.id, 5);
        assert_eq!(movie.title, "");
        assert_eq!(movie.poster_path, None);
        assert!(movie.genre_ids.is_empty());
    }

    #[test]
    fn test_decode_rejects_missing_id() {
        assert!(serde_json::from_str::<Movie>(r#"{"title": "x"}"#).is_err());
    }

    #[test]
    fn test_release_year() {
        assert_eq!(sample().release_year(), Some(2010));
    }

    #[test]
    fn test_release_year_empty_date() {
        let mut movie = sample();
        movie.release_date = Some(String::new());
        assert_eq!(movie.release_year(), None);
        assert_eq!(movie.year_label(), "N/A");

        movie.release_date = None;
        assert_eq!(movie.release_year(), None);
    }

    #[test]
    fn test_display_title_fallbacks() {
        let mut movie = sample();
        assert_eq!(movie.display_title(), "Inception");

        movie.title = String::new();
        assert_eq!(movie.display_title(), "Inception"); // original_title

        movie.original_title = String::new();
        assert_eq!(movie.display_title(), "(Untitled)");
    }

    #[test]
    fn test_poster_url() {
        let movie = sample();
        assert_eq!(
            movie.poster_url("https://image.tmdb.org/t/p"),
            Some("https://image.tmdb.org/t/p/w300/inception.jpg".to_string())
        );
        assert_eq!(movie.backdrop_url("https://image.tmdb.org/t/p"), None);
    }

    #[test]
    fn test_rating_label() {
        assert_eq!(sample().rating_label(), "8.4");
    }
}
