pub mod notification_durations;
pub mod upload_failure_kinds;
