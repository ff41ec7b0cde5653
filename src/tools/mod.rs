pub mod date;
pub mod math;
pub mod waves;
