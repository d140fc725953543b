pub mod prelude;

pub mod judgments;
pub mod movies;
pub mod reviews;
