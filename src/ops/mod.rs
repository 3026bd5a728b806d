pub mod compositor;
pub mod text;
pub mod transform;
