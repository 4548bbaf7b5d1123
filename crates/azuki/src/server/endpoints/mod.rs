pub mod course;
pub mod status;
