pub mod movie;
pub mod search_counter;

pub use movie::MovieSummary;
pub use search_counter::SearchCounter;
