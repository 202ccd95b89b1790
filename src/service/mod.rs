pub mod attendance;
pub mod reasons;
pub mod roster;
pub mod scan_resolver;
pub mod work_day;
