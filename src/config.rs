use std::num::NonZeroU32;
use std::time::Duration;

use clap::{ArgAction, Parser};
use log::LevelFilter;

use crate::address;
use crate::error::Result;
use crate::keylight::Device;
use crate::settings::{Configurator, Power};

/// Command line of `keylightctl`.
#[derive(Parser, Debug)]
#[command(name = "keylightctl", version, about = "Configure Elgato Key Lights")]
pub struct Args {
    /// Brightness (in percent)
    #[arg(short = 'b')]
    pub brightness: Option<u32>,

    /// Temperature (in Kelvin)
    #[arg(short = 'k')]
    pub temperature: Option<NonZeroU32>,

    /// Turn the lights on or off
    #[arg(short = 'p', value_enum)]
    pub power: Option<Power>,

    /// Discovery timeout
    #[arg(short = 't', default_value = "10s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Only use a discovered light with this name
    #[arg(short = 'n')]
    pub name: Option<String>,

    /// Verbose output, repeat (-vv) for debug output
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbose: u8,

    /// Lights to configure instead of discovering one
    #[arg(value_name = "HOST:PORT")]
    pub targets: Vec<String>,
}

/// Settings for one run, built once from [`Args`].
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub brightness: Option<u32>,
    pub temperature: Option<NonZeroU32>,
    pub power: Option<Power>,
    pub timeout: Duration,
    pub name: Option<String>,
    pub verbosity: u8,
    /// Explicit targets; discovery is used when empty.
    pub devices: Vec<Device>,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Config> {
        let devices = args
            .targets
            .iter()
            .map(|target| address::parse_endpoint(target))
            .collect::<Result<Vec<_>>>()?;

        Ok(Config {
            brightness: args.brightness,
            temperature: args.temperature,
            power: args.power,
            timeout: args.timeout,
            name: args.name,
            verbosity: args.verbose,
            devices,
        })
    }

    /// One configurator per option given on the command line.
    pub fn configurators(&self) -> Vec<Configurator> {
        let mut config = Vec::new();
        if let Some(power) = self.power {
            config.push(Configurator::SetPower(power));
        }
        if let Some(brightness) = self.brightness {
            config.push(Configurator::SetBrightness(brightness));
        }
        if let Some(kelvin) = self.temperature {
            config.push(Configurator::SetTemperature(kelvin));
        }
        config
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

/// Parse a duration such as `10s`, `500ms` or `1m30s`.
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is accepted.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("missing unit in duration {:?}", s))?;
        if digits == 0 {
            return Err(format!("invalid duration {:?}", s));
        }
        let value: f64 = rest[..digits]
            .parse()
            .map_err(|_| format!("invalid duration {:?}", s))?;

        rest = &rest[digits..];
        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            unit => return Err(format!("unknown unit {:?} in duration {:?}", unit, s)),
        };
        rest = &rest[unit_len..];

        total += Duration::from_nanos((value * nanos_per_unit).round() as u64);
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("keylightctl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("1m30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("10d").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_args(parse(&[])).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.log_level(), LevelFilter::Warn);
        assert!(config.devices.is_empty());
        assert!(config.configurators().is_empty());
    }

    #[test]
    fn test_only_given_options_configure() {
        let config = Config::from_args(parse(&["-b", "30"])).unwrap();
        assert_eq!(config.configurators(), vec![Configurator::SetBrightness(30)]);

        let config = Config::from_args(parse(&["-k", "4000", "-p", "off"])).unwrap();
        assert_eq!(
            config.configurators(),
            vec![
                Configurator::SetPower(Power::Off),
                Configurator::SetTemperature(NonZeroU32::new(4000).unwrap()),
            ]
        );
    }

    #[test]
    fn test_zero_kelvin_rejected() {
        let args = ["keylightctl", "-k", "0"];
        assert!(Args::try_parse_from(args).is_err());
    }

    #[test]
    fn test_verbosity() {
        let config = Config::from_args(parse(&["-v"])).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Info);

        let config = Config::from_args(parse(&["-vv"])).unwrap();
        assert_eq!(config.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_targets() {
        let config =
            Config::from_args(parse(&["-t", "2s", "10.0.1.32:9123", "10.0.1.33:9123"])).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(
            config.devices,
            vec![
                Device::user_specified("10.0.1.32", 9123),
                Device::user_specified("10.0.1.33", 9123),
            ]
        );

        assert!(Config::from_args(parse(&["10.0.1.32"])).is_err());
    }
}
