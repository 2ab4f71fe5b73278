pub mod field;
pub mod form;
pub mod schema;
pub mod ticket;
