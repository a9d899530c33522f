//! SeaORM entities mirroring the migration schema.

pub mod comment;
pub mod group;
pub mod post;
pub mod user;
