pub mod database;
pub mod keyword_repo;

pub use database::Database;
pub use keyword_repo::KeywordRepository;
