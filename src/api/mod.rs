pub mod assignment;
pub mod attendance;
pub mod dispute;
pub mod leave_request;
pub mod leave_type;
pub mod location;
pub mod remote_work;
pub mod shift;
pub mod shift_change;
