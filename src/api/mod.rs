pub mod attendance;
pub mod kids;
pub mod qr;
pub mod register;
pub mod rooms;
pub mod sign;
