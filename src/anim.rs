pub mod ease;
pub mod flap;
