use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use zeroconf::ServiceDiscovery;

use crate::error::{ElgatoError, Result};

const LIGHTS_PATH: &str = "/elgato/lights";
const USER_SPECIFIED_NAME: &str = "User-specified device";

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightGroup {
    pub number_of_lights: i64,
    pub lights: Vec<Light>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Light {
    pub on: i64,
    pub brightness: i64,
    pub temperature: i64,
}

/// A Key Light reachable over HTTP, either given on the command line or
/// discovered over mDNS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl Device {
    pub fn user_specified(host: &str, port: u16) -> Device {
        Device {
            name: USER_SPECIFIED_NAME.to_string(),
            host: host.to_string(),
            port,
        }
    }

    pub fn lights_url(&self) -> String {
        if self.host.contains(':') {
            format!("http://[{}]:{}{}", self.host, self.port, LIGHTS_PATH)
        } else {
            format!("http://{}:{}{}", self.host, self.port, LIGHTS_PATH)
        }
    }
}

impl From<&ServiceDiscovery> for Device {
    fn from(service: &ServiceDiscovery) -> Self {
        Device {
            name: service.name().to_string(),
            host: service.address().to_string(),
            port: service.port().to_owned(),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.name, self.host, self.port)
    }
}

/// Reads and writes the light group of a single device.
pub trait LightClient {
    fn fetch_light_group(&self) -> impl Future<Output = Result<LightGroup>>;

    /// Push `group` to the device, returning the state it reports back.
    fn update_light_group(&self, group: &LightGroup) -> impl Future<Output = Result<LightGroup>>;
}

#[derive(Debug)]
pub struct KeyLight {
    url: String,
    client: reqwest::Client,
}

impl KeyLight {
    pub fn new(device: &Device) -> KeyLight {
        KeyLight {
            url: device.lights_url(),
            client: reqwest::Client::new(),
        }
    }

    async fn read_group(resp: reqwest::Response) -> Result<LightGroup> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ElgatoError::Status(status));
        }

        Ok(resp.json::<LightGroup>().await?)
    }
}

impl LightClient for KeyLight {
    async fn fetch_light_group(&self) -> Result<LightGroup> {
        let resp = self.client.get(&self.url).send().await?;

        Self::read_group(resp).await
    }

    async fn update_light_group(&self, group: &LightGroup) -> Result<LightGroup> {
        let resp = self.client.put(&self.url).json(group).send().await?;

        Self::read_group(resp).await
    }
}
