pub mod category;
pub mod health;
pub mod image;
pub mod item;
pub mod location;
pub mod search;
