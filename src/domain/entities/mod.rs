pub mod albums;
pub mod media_entries;
