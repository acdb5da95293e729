pub mod category;
pub mod image;
pub mod item;
pub mod location;
pub mod search;
pub mod shared;
