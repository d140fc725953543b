pub use super::judgments::Entity as Judgments;
pub use super::movies::Entity as Movies;
pub use super::reviews::Entity as Reviews;
