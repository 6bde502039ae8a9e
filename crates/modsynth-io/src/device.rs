//! Output device discovery via cpal.

use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};

use crate::{Error, Result};

/// Fallback when a device does not report a default configuration.
const FALLBACK_SAMPLE_RATE: u32 = 44100;

/// Output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the host's default output.
    pub is_default: bool,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
}

pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

fn describe(device: &Device, name: String, is_default: bool) -> AudioDevice {
    let (default_sample_rate, channels) = device
        .default_output_config()
        .map(|c| (c.sample_rate(), c.channels()))
        .unwrap_or((FALLBACK_SAMPLE_RATE, 2));
    AudioDevice {
        name,
        is_default,
        default_sample_rate,
        channels,
    }
}

/// Lists every output device on the default host.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());
    let outputs = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;

    let mut devices = Vec::new();
    for device in outputs {
        if let Ok(name) = device_name(&device) {
            let is_default = default_name.as_deref() == Some(name.as_str());
            devices.push(describe(&device, name, is_default));
        }
    }
    Ok(devices)
}

/// The host's default output device, if any.
pub fn default_output_device() -> Option<AudioDevice> {
    let device = cpal::default_host().default_output_device()?;
    let name = device_name(&device).ok()?;
    Some(describe(&device, name, true))
}

/// Finds an output device by index, exact name, or case-insensitive
/// substring; `None` selects the default.
pub(crate) fn find_output_device(name: Option<&str>) -> Result<Device> {
    let host = cpal::default_host();
    let Some(search) = name else {
        return host.default_output_device().ok_or(Error::NoDevice);
    };

    let devices: Vec<Device> = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?
        .collect();

    if let Ok(index) = search.parse::<usize>() {
        return devices.get(index).cloned().ok_or_else(|| {
            Error::DeviceNotFound(format!(
                "output device index {index} (only {} devices available)",
                devices.len()
            ))
        });
    }

    if let Some(exact) = devices
        .iter()
        .find(|d| device_name(d).is_ok_and(|n| n == search))
    {
        return Ok(exact.clone());
    }

    let search_lower = search.to_lowercase();
    let mut matches: Vec<(Device, String)> = devices
        .iter()
        .filter_map(|d| {
            device_name(d)
                .ok()
                .filter(|n| n.to_lowercase().contains(&search_lower))
                .map(|n| (d.clone(), n))
        })
        .collect();

    match matches.len() {
        0 => Err(Error::DeviceNotFound(format!(
            "no output device matching '{search}'"
        ))),
        1 => Ok(matches.remove(0).0),
        _ => {
            let names: Vec<&str> = matches.iter().map(|(_, n)| n.as_str()).collect();
            tracing::warn!(search, ?names, "several output devices match, using the first");
            Ok(matches.remove(0).0)
        }
    }
}
