pub mod email;
pub mod signature;
pub mod time;
