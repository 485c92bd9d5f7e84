pub mod ports;
pub mod session_controller;
