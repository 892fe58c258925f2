pub mod movement;
pub mod portal;
pub mod position;
pub mod temporal;
