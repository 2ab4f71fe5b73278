pub mod compose;
pub mod discovery;
pub mod ticket;

#[cfg(test)]
pub mod testing;
