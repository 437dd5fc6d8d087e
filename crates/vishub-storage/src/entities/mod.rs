pub mod change_job;
pub mod change_log_entry;
pub mod project;
pub mod recommendation;
pub mod schedule_flag;
pub mod test_result;
pub mod user;
