pub mod room_cache;
