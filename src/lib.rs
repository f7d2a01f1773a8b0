//! Discover Elgato Key Lights and set their power, brightness and color
//! temperature.

pub mod address;
pub mod config;
pub mod control;
pub mod discovery;
pub mod error;
pub mod keylight;
pub mod settings;
pub mod temperature;

pub use config::{Args, Config};
pub use control::run;
pub use error::{ElgatoError, Result};
pub use keylight::{Device, KeyLight, Light, LightClient, LightGroup};
pub use settings::{Configurator, Power};
