use serde::{Deserialize, Serialize};

/// A movie as returned by the catalog. Lives only as long as the request
/// that fetched it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub original_language: Option<String>,
}

impl MovieSummary {
    /// Joins `image_base_url` with the poster fragment. Movies without a
    /// poster produce an empty string.
    #[must_use]
    pub fn poster_url(&self, image_base_url: &str) -> String {
        self.poster_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map_or_else(String::new, |path| format!("{image_base_url}{path}"))
    }

    #[must_use]
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(poster_path: Option<&str>) -> MovieSummary {
        MovieSummary {
            id: 5,
            title: "Batman".to_string(),
            poster_path: poster_path.map(str::to_string),
            popularity: 10.0,
            vote_average: None,
            release_date: Some("1989-06-23".to_string()),
            original_language: None,
        }
    }

    #[test]
    fn test_poster_url() {
        let base = "https://image.tmdb.org/t/p/w500";
        assert_eq!(
            movie(Some("/x.jpg")).poster_url(base),
            "https://image.tmdb.org/t/p/w500/x.jpg"
        );
        assert_eq!(movie(None).poster_url(base), "");
        assert_eq!(movie(Some("")).poster_url(base), "");
    }

    #[test]
    fn test_release_year() {
        assert_eq!(movie(None).release_year(), Some("1989"));

        let mut undated = movie(None);
        undated.release_date = Some(String::new());
        assert_eq!(undated.release_year(), None);
    }

    #[test]
    fn test_deserialize_minimal_catalog_entry() {
        let json = r#"{"id": 7, "title": "Heat", "poster_path": null}"#;
        let movie: MovieSummary = serde_json::from_str(json).unwrap();
        assert_eq!(movie.id, 7);
        assert!(movie.poster_path.is_none());
        assert!(movie.popularity.abs() < f64::EPSILON);
    }
}
