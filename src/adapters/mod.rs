//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements         | Connects to                  |
//! |---------------|--------------------|------------------------------|
//! | `hardware`    | SensorPort         | humidity ADC channel         |
//! |               | ActuatorPort       | belt PWM, RGB LED PWM        |
//! |               | AlarmPort          | buzzer PWM, 5x5 LED matrix   |
//! |               | DisplayPort        | four-line status display     |
//! | `log_sink`    | EventSink          | `log` facade                 |
//! | `config_file` | ConfigPort         | JSON file on disk            |
//! | `console`     | (input source)     | stdin, drives the edge latch |
//! | `time`        | DelayNs            | `std::time`                  |

pub mod config_file;
pub mod console;
pub mod hardware;
pub mod log_sink;
pub mod time;
