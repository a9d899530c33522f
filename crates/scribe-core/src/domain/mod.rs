//! Domain entities - the core business objects.

mod comment;
mod group;
mod image;
mod page;
mod post;
mod user;

pub use comment::{Comment, CommentView};
pub use group::{Group, MAX_SLUG_LEN, MAX_TITLE_LEN, is_valid_slug};
pub use image::ImageKind;
pub use page::{Page, PageLink, PageRequest, num_pages};
pub use post::{Post, PostView};
pub use user::User;
