pub mod activity;
pub mod export;
pub mod filters;
pub mod financial;
pub mod health;
pub mod monitoring;
pub mod performance;
pub mod rating;
