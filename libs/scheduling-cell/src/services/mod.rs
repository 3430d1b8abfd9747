pub mod alternatives;
pub mod booking;
pub mod conflict;
pub mod working_hours;
