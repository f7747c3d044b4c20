pub mod synth;
pub mod track;
pub mod wav;
