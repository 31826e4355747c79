pub mod caregiver;
pub mod kid;
pub mod room;
pub mod sign_event;
pub mod teacher;
