pub mod fill;
pub mod lookup;
