pub mod attendance;
pub mod kids;
pub mod qr;
pub mod registration;
pub mod rooms;
pub mod sign;
pub mod teachers;
