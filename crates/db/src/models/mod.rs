pub mod blog_post;
pub mod subscriber;
pub mod tool;
