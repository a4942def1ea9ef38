pub mod ads_db_operations;
pub mod stories_db_operations;
pub mod tracking_db_operations;
pub mod users_db_operations;
