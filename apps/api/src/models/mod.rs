pub mod analysis;
pub mod member;
pub mod project;
