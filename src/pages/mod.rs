pub mod admin;
pub mod config_error;
pub mod data_stats;
pub mod home;
pub mod knowledge_graph;
pub mod not_found;
pub mod papers;
pub mod user;
