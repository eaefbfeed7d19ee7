pub mod address;
pub mod hosts;
