pub mod database;
pub mod rest_prediction_repository;
pub mod sqlite_prediction_repository;

pub use database::Database;
pub use rest_prediction_repository::RestPredictionRepository;
pub use sqlite_prediction_repository::SqlitePredictionRepository;
