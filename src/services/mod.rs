pub mod catalog;
pub use catalog::{CatalogDispatcher, CatalogError, CatalogView, MovieCatalog};

pub mod counter_store;
pub use counter_store::{CounterStoreError, NewSearchCounter, SearchCountStore};

pub mod counter_store_impl;
pub use counter_store_impl::{AppwriteCounterStore, SeaOrmCounterStore};

pub mod debounce;
pub use debounce::debounce;

pub mod session;
pub use session::{SearchSession, TrendingView};

pub mod trending;
pub use trending::TrendingService;
