pub mod fonts;
pub mod frame;
pub mod sink;
