//! Configuration for the camera streaming daemon.
//!
//! Loads configuration from a TOML file. Camera entries are validated when
//! resolved into session configurations: an unusable value is replaced by a
//! working default and logged, never raised, so a single bad entry does not
//! keep the rest of the rig from streaming.

use crate::error::Result;
use crate::model::{CameraModel, Resolution};
use crate::session::SessionConfig;
use crate::sink::TransportMode;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Port used when a camera entry supplies an unusable one
pub const DEFAULT_PORT: u16 = 30000;
/// Frame rate used when a camera entry supplies an unusable one
pub const DEFAULT_FPS: u32 = 30;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub streaming: StreamingConfig,
    pub logging: LoggingConfig,
    /// One entry per streamed camera rig
    #[serde(default)]
    pub camera: Vec<CameraConfig>,
}

/// Simulation loop and sink transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamingConfig {
    /// Bind address for the per-session sink listeners
    pub bind_host: String,
    /// Simulation steps per second driven by the main loop
    pub tick_rate_hz: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log output (stdout, stderr, or file path)
    pub output: String,
}

/// One camera rig entry as written in the TOML file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraConfig {
    /// Display name for diagnostics
    #[serde(default)]
    pub name: Option<String>,
    /// Rig path of the camera assembly in the scene
    pub rig_path: String,
    /// Second rig path; presence turns the entry into a custom stereo pair
    #[serde(default)]
    pub second_rig_path: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_model")]
    pub camera_model: String,
    #[serde(default = "default_resolution")]
    pub resolution: String,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_transport")]
    pub transport: String,
    /// Virtual serial number; must belong to the model's pool
    #[serde(default)]
    pub serial_number: Option<u32>,
    /// Stream wall-clock timestamps instead of anchored simulation time
    #[serde(default)]
    pub use_system_time: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_model() -> String {
    CameraModel::StereoStd.label().to_string()
}

fn default_resolution() -> String {
    Resolution::Hd1200.label().to_string()
}

fn default_fps() -> u32 {
    DEFAULT_FPS
}

fn default_transport() -> String {
    TransportMode::Network.label().to_string()
}

impl CameraConfig {
    /// Resolve this entry into a usable session configuration
    ///
    /// Every unusable value is replaced by a working default and logged as
    /// a warning. Resolution never fails.
    pub fn resolve(&self) -> SessionConfig {
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("camera[{}]", self.rig_path));

        // Streaming ports come in pairs (data on the even port, control on
        // the next one up), so odd or zero ports are rejected.
        let port = if self.port == 0 || self.port % 2 != 0 {
            warn!(
                "{}: invalid port {}, falling back to {}",
                name, self.port, DEFAULT_PORT
            );
            DEFAULT_PORT
        } else {
            self.port
        };

        let model = match CameraModel::parse(&self.camera_model) {
            Some(model) => model,
            None => {
                warn!(
                    "{}: unknown camera model {:?}, falling back to {}",
                    name,
                    self.camera_model,
                    CameraModel::StereoStd.label()
                );
                CameraModel::StereoStd
            }
        };

        let resolution = match Resolution::parse(&self.resolution) {
            Some(res) if model.supported_resolutions().contains(&res) => res,
            Some(res) => {
                warn!(
                    "{}: resolution {} not supported by {}, falling back to {}",
                    name,
                    res.label(),
                    model.label(),
                    model.default_resolution().label()
                );
                model.default_resolution()
            }
            None => {
                warn!(
                    "{}: unknown resolution {:?}, falling back to {}",
                    name,
                    self.resolution,
                    model.default_resolution().label()
                );
                model.default_resolution()
            }
        };

        let fps = if model.allowed_fps().contains(&self.fps) {
            self.fps
        } else {
            warn!(
                "{}: {} fps not supported by {}, falling back to {}",
                name,
                self.fps,
                model.label(),
                DEFAULT_FPS
            );
            DEFAULT_FPS
        };

        let transport = match TransportMode::parse(&self.transport) {
            Some(transport) => transport,
            None => {
                warn!(
                    "{}: unknown transport {:?}, falling back to {}",
                    name,
                    self.transport,
                    TransportMode::Network.label()
                );
                TransportMode::Network
            }
        };

        let pool = model.serial_pool();
        let serial_number = match self.serial_number {
            Some(serial) if pool.contains(&serial) => serial,
            Some(serial) => {
                warn!(
                    "{}: serial {} does not belong to the {} pool, using {}",
                    name,
                    serial,
                    model.label(),
                    pool[0]
                );
                pool[0]
            }
            None => pool[0],
        };

        SessionConfig {
            name,
            rig_path: self.rig_path.clone(),
            second_rig_path: self.second_rig_path.clone(),
            port,
            model,
            resolution,
            fps,
            transport,
            serial_number,
            use_system_time: self.use_system_time,
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Arguments
    /// - `path`: Path to TOML configuration file
    ///
    /// # Returns
    /// Parsed configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration streaming one standard stereo rig
    ///
    /// Suitable for testing and development. Deployments should use a
    /// proper TOML configuration file.
    pub fn single_rig_defaults() -> Self {
        Self {
            streaming: StreamingConfig {
                bind_host: "0.0.0.0".to_string(),
                tick_rate_hz: 60,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                output: "stdout".to_string(),
            },
            camera: vec![CameraConfig {
                name: Some("front".to_string()),
                rig_path: "/World/Rig0".to_string(),
                second_rig_path: None,
                port: DEFAULT_PORT,
                camera_model: default_model(),
                resolution: default_resolution(),
                fps: DEFAULT_FPS,
                transport: default_transport(),
                serial_number: None,
                use_system_time: false,
            }],
        }
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::single_rig_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_entry() -> CameraConfig {
        CameraConfig {
            name: None,
            rig_path: "/World/Rig0".to_string(),
            second_rig_path: None,
            port: 30000,
            camera_model: "STEREO_STD".to_string(),
            resolution: "HD1200".to_string(),
            fps: 30,
            transport: "NETWORK".to_string(),
            serial_number: None,
            use_system_time: false,
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::single_rig_defaults();
        assert_eq!(config.streaming.bind_host, "0.0.0.0");
        assert_eq!(config.streaming.tick_rate_hz, 60);
        assert_eq!(config.camera.len(), 1);
        assert_eq!(config.camera[0].port, 30000);
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::single_rig_defaults();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[streaming]"));
        assert!(toml_string.contains("[logging]"));
        assert!(toml_string.contains("[[camera]]"));
        assert!(toml_string.contains("rig_path = \"/World/Rig0\""));
    }

    #[test]
    fn test_toml_deserialization_with_defaults() {
        let toml_content = r#"
[streaming]
bind_host = "127.0.0.1"
tick_rate_hz = 120

[logging]
level = "debug"
output = "stdout"

[[camera]]
rig_path = "/World/RigA"
port = 30004

[[camera]]
rig_path = "/World/RigB"
camera_model = "MONO_GS"
fps = 120
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.streaming.bind_host, "127.0.0.1");
        assert_eq!(config.camera.len(), 2);
        assert_eq!(config.camera[0].port, 30004);
        assert_eq!(config.camera[0].camera_model, "STEREO_STD");
        assert_eq!(config.camera[1].fps, 120);
    }

    #[test]
    fn test_resolve_accepts_valid_entry() {
        let mut entry = base_entry();
        entry.serial_number = Some(41116066);
        let cfg = entry.resolve();
        assert_eq!(cfg.port, 30000);
        assert_eq!(cfg.model, CameraModel::StereoStd);
        assert_eq!(cfg.resolution, Resolution::Hd1200);
        assert_eq!(cfg.fps, 30);
        assert_eq!(cfg.serial_number, 41116066);
    }

    #[test]
    fn test_resolve_rejects_odd_and_zero_ports() {
        let mut entry = base_entry();
        entry.port = 30001;
        assert_eq!(entry.resolve().port, DEFAULT_PORT);
        entry.port = 0;
        assert_eq!(entry.resolve().port, DEFAULT_PORT);
    }

    #[test]
    fn test_resolve_falls_back_on_unknown_model() {
        let mut entry = base_entry();
        entry.camera_model = "STEREO_ULTRA".to_string();
        assert_eq!(entry.resolve().model, CameraModel::StereoStd);
    }

    #[test]
    fn test_resolve_rejects_unsupported_resolution() {
        let mut entry = base_entry();
        // HD4K parses but only the UHD mono family supports it
        entry.resolution = "HD4K".to_string();
        assert_eq!(entry.resolve().resolution, Resolution::Hd1200);

        entry.camera_model = "MONO_UHD".to_string();
        assert_eq!(entry.resolve().resolution, Resolution::Hd4k);
    }

    #[test]
    fn test_resolve_fps_allow_list_is_per_model() {
        let mut entry = base_entry();
        entry.fps = 120;
        assert_eq!(entry.resolve().fps, DEFAULT_FPS);

        entry.camera_model = "MONO_GS".to_string();
        assert_eq!(entry.resolve().fps, 120);

        entry.fps = 17;
        assert_eq!(entry.resolve().fps, DEFAULT_FPS);
    }

    #[test]
    fn test_resolve_serial_pool_membership() {
        let mut entry = base_entry();
        entry.serial_number = Some(12345);
        // Unknown serials fall back to the pool default
        assert_eq!(entry.resolve().serial_number, 40976320);
        entry.serial_number = None;
        assert_eq!(entry.resolve().serial_number, 40976320);
    }
}
