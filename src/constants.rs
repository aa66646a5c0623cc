pub mod tmdb {

    pub const API_BASE_URL: &str = "https://api.themoviedb.org/3";

    pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

    pub const POPULAR_SORT: &str = "popularity.desc";
}

pub mod appwrite {

    pub const DEFAULT_ENDPOINT: &str = "https://fra.cloud.appwrite.io/v1";

    pub const TERM_ATTRIBUTE: &str = "searchTerm";

    pub const COUNT_ATTRIBUTE: &str = "count";
}

pub mod limits {

    pub const TRENDING_LIMIT: u64 = 5;

    pub const CLI_RESULTS: usize = 20;
}

pub mod intervals {
    use std::time::Duration;

    pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
}

pub mod messages {

    pub const FETCH_FAILED: &str = "Error fetching movies. Please, try again later.";

    pub const TRENDING_FAILED: &str = "Error loading trending movies. Please try again later.";
}
