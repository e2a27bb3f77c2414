pub mod clock;
pub mod date_window;
