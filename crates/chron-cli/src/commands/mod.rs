pub mod enrich;
pub mod schema;
