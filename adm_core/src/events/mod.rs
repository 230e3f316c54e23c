pub mod observer;
pub mod percent;
