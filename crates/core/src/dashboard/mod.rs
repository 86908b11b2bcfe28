pub mod cover;
pub mod html;
pub mod view;
