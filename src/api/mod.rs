pub mod tmdb;

use async_trait::async_trait;
use serde::Deserialize;

use crate::app::Result;
use crate::domain::{Movie, MovieId};

pub use tmdb::TmdbClient;

/// The movie metadata collaborator. Supplies read-only [`Movie`] records;
/// the persisted state store never calls it.
#[async_trait]
pub trait MovieApi: Send + Sync {
    /// Movies trending this week.
    async fn trending(&self) -> Result<Vec<Movie>>;
    /// Currently popular movies.
    async fn popular(&self) -> Result<Vec<Movie>>;
    /// Search by title, API-side ranking.
    async fn search(&self, query: &str) -> Result<Vec<Movie>>;
    /// Full details for one movie, videos included.
    async fn details(&self, id: MovieId) -> Result<MovieDetails>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub key: String,
    pub site: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

/// The detail endpoint's richer movie shape: genres come as objects rather
/// than ids, and runtime/videos only exist here.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetails {
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
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: i64,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub videos: VideoList,
}

impl MovieDetails {
    /// First YouTube video of type "Trailer", as a watch URL.
    pub fn trailer_url(&self) -> Option<String> {
        self.videos
            .results
            .iter()
            .find(|v| v.kind == "Trailer" && v.site == "YouTube")
            .map(|v| format!("https://www.youtube.com/watch?v={}", v.key))
    }

    /// Runtime as "2h 28m", or "N/A" when the API omits it.
    pub fn runtime_label(&self) -> String {
        match self.runtime {
            Some(mins) if mins > 0 => format!("{}h {}m", mins / 60, mins % 60),
            _ => "N/A".to_string(),
        }
    }

    pub fn genre_names(&self) -> Vec<&str> {
        self.genres.iter().map(|g| g.name.as_str()).collect()
    }

    /// The list-shaped snapshot of this movie, as the store persists it.
    pub fn as_movie(&self) -> Movie {
        Movie {
            id: self.id,
            title: self.title.clone(),
            original_title: self.original_title.clone(),
            overview: self.overview.clone(),
            poster_path: self.poster_path.clone(),
            backdrop_path: self.backdrop_path.clone(),
            release_date: self.release_date.clone(),
            vote_average: self.vote_average,
            vote_count: self.vote_count,
            genre_ids: self.genres.iter().map(|g| g.id).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details_json() -> &'static str {
        r#"{
            "id": 27205,
            "title": "Inception",
            "original_title": "Inception",
            "overview": "A thief who steals corporate secrets.",
            "release_date": "2010-07-15",
            "runtime": 148,
            "vote_average": 8.37,
            "vote_count": 34000,
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "videos": {"results": [
                {"key": "abc", "site": "YouTube", "name": "Teaser", "type": "Teaser"},
                {"key": "vim", "site": "Vimeo", "name": "Trailer", "type": "Trailer"},
                {"key": "YoHD9XEInc0", "site": "YouTube", "name": "Official Trailer", "type": "Trailer"}
            ]}
        }"#
    }

    #[test]
    fn test_trailer_url_picks_first_youtube_trailer() {
        let details: MovieDetails = serde_json::from_str(details_json()).unwrap();
        assert_eq!(
            details.trailer_url(),
            Some("https://www.youtube.com/watch?v=YoHD9XEInc0".to_string())
        );
    }

    #[test]
    fn test_trailer_url_none_without_videos() {
        let details: MovieDetails = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(details.trailer_url(), None);
    }

    #[test]
    fn test_runtime_label() {
        let details: MovieDetails = serde_json::from_str(details_json()).unwrap();
        assert_eq!(details.runtime_label(), "2h 28m");

        let bare: MovieDetails = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(bare.runtime_label(), "N/A");
    }

    #[test]
    fn test_as_movie_maps_genres_to_ids() {
        let details: MovieDetails = serde_json::from_str(details_json()).unwrap();
        let movie = details.as_movie();
        assert_eq!(movie.id, 27205);
        assert_eq!(movie.genre_ids, vec![28, 878]);
        assert_eq!(movie.release_date.as_deref(), Some("2010-07-15"));
    }
}
