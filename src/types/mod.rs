pub mod ids;
pub mod money;
pub mod points;
pub mod timestamp;
