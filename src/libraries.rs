pub mod origin;
pub mod steam;
