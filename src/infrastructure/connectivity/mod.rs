pub mod fixed;
pub mod sysfs;
