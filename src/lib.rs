pub mod patterns;
pub mod render;
pub mod solver;
pub mod types;
