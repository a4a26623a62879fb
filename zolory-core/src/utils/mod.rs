pub mod bounds;
pub mod time;
