pub mod category;
pub mod check;
pub mod config;
pub mod note;
