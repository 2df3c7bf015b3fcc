pub mod history_db;
