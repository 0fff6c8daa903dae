pub mod assignment;
pub mod independent;
