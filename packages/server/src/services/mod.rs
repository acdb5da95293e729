pub mod hierarchy;
pub mod imaging;
pub mod search;
pub mod vision;
