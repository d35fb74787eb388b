//! Actuator drivers, indicator rendering, and the window timer.

pub mod belt_motor;
pub mod buzzer;
pub mod display;
pub mod led_patterns;
pub mod matrix;
pub mod sim_pwm;
pub mod status_led;
pub mod window_timer;
