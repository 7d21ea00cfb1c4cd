pub mod category;
pub mod form;
pub mod photo;
pub mod token;
pub mod user;
