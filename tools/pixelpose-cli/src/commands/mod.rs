pub mod check;
pub mod pixelate;
pub mod poses;
pub mod render;
