pub mod clean;
pub mod replay;
pub mod schema;
