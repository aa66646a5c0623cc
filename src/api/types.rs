use serde::Serialize;

use crate::models::{MovieSummary, SearchCounter};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieListDto {
    pub query: String,
    pub results: Vec<MovieDto>,
}

#[derive(Debug, Serialize)]
pub struct MovieDto {
    pub id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub popularity: f64,
    pub vote_average: Option<f64>,
    pub release_year: Option<String>,
    pub original_language: Option<String>,
}

impl MovieDto {
    #[must_use]
    pub fn from_summary(movie: MovieSummary, image_base_url: &str) -> Self {
        let poster_url = Some(movie.poster_url(image_base_url)).filter(|url| !url.is_empty());
        let release_year = movie.release_year().map(str::to_string);

        Self {
            id: movie.id,
            title: movie.title,
            poster_url,
            popularity: movie.popularity,
            vote_average: movie.vote_average,
            release_year,
            original_language: movie.original_language,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrendingEntryDto {
    pub rank: usize,
    pub term: String,
    pub count: i64,
    pub movie_id: i64,
    pub poster_url: String,
}

impl TrendingEntryDto {
    #[must_use]
    pub fn ranked(counters: Vec<SearchCounter>) -> Vec<Self> {
        counters
            .into_iter()
            .enumerate()
            .map(|(i, c)| Self {
                rank: i + 1,
                term: c.term,
                count: c.count,
                movie_id: c.movie_id,
                poster_url: c.poster_url,
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub store: bool,
    pub version: &'static str,
    pub uptime_seconds: u64,
}
