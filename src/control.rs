use log::{debug, info};

use crate::config::Config;
use crate::discovery;
use crate::error::{ElgatoError, Result};
use crate::keylight::{Device, KeyLight, Light, LightClient, LightGroup};
use crate::settings::{self, Configurator};
use crate::temperature;

/// Resolve the target devices and apply the requested settings to each.
pub async fn run(config: &Config) -> Result<()> {
    let devices = if config.devices.is_empty() {
        debug!("no devices specified via the command-line, using the discovery");
        let device = discovery::discover_device(config.timeout, config.name.as_deref()).await?;
        vec![device]
    } else {
        config.devices.clone()
    };

    update_devices(&devices, &config.configurators(), KeyLight::new).await
}

/// Update `devices` one after another, stopping at the first failure.
pub async fn update_devices<C, F>(
    devices: &[Device],
    configurators: &[Configurator],
    mut connect: F,
) -> Result<()>
where
    C: LightClient,
    F: FnMut(&Device) -> C,
{
    for device in devices {
        debug!("found light {}", device);
        let client = connect(device);
        update_device_settings(device, &client, configurators)
            .await
            .map_err(|err| ElgatoError::device(&device.host, err))?;
    }

    Ok(())
}

pub async fn update_device_settings<C: LightClient>(
    device: &Device,
    client: &C,
    configurators: &[Configurator],
) -> Result<()> {
    let current = client
        .fetch_light_group()
        .await
        .map_err(ElgatoError::fetch)?;
    log_lights(device, &current, "before");

    let mut requested = current.clone();
    settings::apply_all(&mut requested, configurators);

    client
        .update_light_group(&requested)
        .await
        .map_err(ElgatoError::update)?;

    let updated = client
        .fetch_light_group()
        .await
        .map_err(ElgatoError::fetch)?;
    log_lights(device, &updated, "after");

    Ok(())
}

fn log_lights(device: &Device, group: &LightGroup, stage: &str) {
    for (i, light) in group.lights.iter().enumerate() {
        info!("{}", describe(device, i, light, stage));
    }
}

/// One log line for the light at zero-based `index`, temperature in Kelvin.
fn describe(device: &Device, index: usize, light: &Light, stage: &str) -> String {
    let kelvin = temperature::to_kelvin(light.temperature)
        .map(|k| k.to_string())
        .unwrap_or_else(|| "?".to_string());

    format!(
        "{} light #{} ({}) {}: {}% {}K",
        device.host,
        index + 1,
        light.on,
        stage,
        light.brightness,
        kelvin
    )
}
