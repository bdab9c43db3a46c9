pub mod assignment;
pub mod attendance;
pub mod dispute;
pub mod leave;
pub mod location;
pub mod remote_work;
pub mod role;
pub mod shift;
pub mod shift_change;
