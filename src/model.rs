//! Camera model and resolution tables.
//!
//! Behavior that differs between camera families (stereo capability, lens
//! variant, allowed frame rates, supported resolutions, virtual serial
//! pools) is kept here as data so the session logic stays model-agnostic.

/// Image resolutions supported by the virtual rigs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 960 x 600
    Svga,
    /// 1920 x 1080
    Hd1080,
    /// 1920 x 1200
    Hd1200,
    /// 3200 x 1800
    QhdPlus,
    /// 3840 x 2160
    Hd4k,
}

impl Resolution {
    /// Parse a resolution name from configuration
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "SVGA" => Some(Resolution::Svga),
            "HD1080" => Some(Resolution::Hd1080),
            "HD1200" => Some(Resolution::Hd1200),
            "QHDPLUS" => Some(Resolution::QhdPlus),
            "HD4K" => Some(Resolution::Hd4k),
            _ => None,
        }
    }

    /// Configuration name of this resolution
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Svga => "SVGA",
            Resolution::Hd1080 => "HD1080",
            Resolution::Hd1200 => "HD1200",
            Resolution::QhdPlus => "QHDPLUS",
            Resolution::Hd4k => "HD4K",
        }
    }

    /// Image dimensions as (width, height)
    pub fn dims(&self) -> (u32, u32) {
        match self {
            Resolution::Svga => (960, 600),
            Resolution::Hd1080 => (1920, 1080),
            Resolution::Hd1200 => (1920, 1200),
            Resolution::QhdPlus => (3200, 1800),
            Resolution::Hd4k => (3840, 2160),
        }
    }
}

/// Frame rates accepted by the standard camera families
const STD_FPS: &[u32] = &[15, 30, 60];
/// The global-shutter mono family additionally supports 120 fps
const GS_FPS: &[u32] = &[15, 30, 60, 120];

const STEREO_RESOLUTIONS: &[Resolution] =
    &[Resolution::Svga, Resolution::Hd1080, Resolution::Hd1200];
const UHD_RESOLUTIONS: &[Resolution] = &[
    Resolution::Svga,
    Resolution::Hd1080,
    Resolution::Hd1200,
    Resolution::QhdPlus,
    Resolution::Hd4k,
];

// Virtual serial number pools, one per model family. The first entry is the
// default when configuration supplies no (or an unknown) serial.
const STEREO_STD_SERIALS: &[u32] = &[40976320, 41116066, 49123828, 45626933];
const STEREO_STD_4MM_SERIALS: &[u32] = &[47890353, 45263213, 47800035, 47706147];
const STEREO_MINI_SERIALS: &[u32] = &[57890353, 55263213, 57800035, 57706147];
const STEREO_MINI_4MM_SERIALS: &[u32] = &[50179396, 52835616, 59695059, 55043860];
const MONO_UHD_SERIALS: &[u32] = &[312015765, 312817871, 315177501, 313382320];
const MONO_GS_SERIALS: &[u32] = &[305221009, 305952675, 307526942, 307184845];
const MONO_GS_4MM_SERIALS: &[u32] = &[300605725, 302696256, 302485375, 307845777];

/// Camera model tags recognized by the streamer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraModel {
    /// Standard stereo rig, 2.2mm lens
    StereoStd,
    /// Standard stereo rig, 4mm lens
    StereoStd4mm,
    /// Compact stereo rig
    StereoMini,
    /// Compact stereo rig, 4mm lens
    StereoMini4mm,
    /// Mono rig with UHD sensor
    MonoUhd,
    /// Mono rig with global-shutter sensor
    MonoGs,
    /// Mono rig with global-shutter sensor, 4mm lens
    MonoGs4mm,
}

impl CameraModel {
    /// Parse a model name from configuration
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "STEREO_STD" => Some(CameraModel::StereoStd),
            "STEREO_STD_4MM" => Some(CameraModel::StereoStd4mm),
            "STEREO_MINI" => Some(CameraModel::StereoMini),
            "STEREO_MINI_4MM" => Some(CameraModel::StereoMini4mm),
            "MONO_UHD" => Some(CameraModel::MonoUhd),
            "MONO_GS" => Some(CameraModel::MonoGs),
            "MONO_GS_4MM" => Some(CameraModel::MonoGs4mm),
            _ => None,
        }
    }

    /// Configuration name of this model
    pub fn label(&self) -> &'static str {
        match self {
            CameraModel::StereoStd => "STEREO_STD",
            CameraModel::StereoStd4mm => "STEREO_STD_4MM",
            CameraModel::StereoMini => "STEREO_MINI",
            CameraModel::StereoMini4mm => "STEREO_MINI_4MM",
            CameraModel::MonoUhd => "MONO_UHD",
            CameraModel::MonoGs => "MONO_GS",
            CameraModel::MonoGs4mm => "MONO_GS_4MM",
        }
    }

    /// Whether the model declares an intrinsic stereo pair
    pub fn is_stereo(&self) -> bool {
        matches!(
            self,
            CameraModel::StereoStd
                | CameraModel::StereoStd4mm
                | CameraModel::StereoMini
                | CameraModel::StereoMini4mm
        )
    }

    /// Whether this is a 4mm lens variant
    pub fn is_4mm(&self) -> bool {
        matches!(
            self,
            CameraModel::StereoStd4mm | CameraModel::StereoMini4mm | CameraModel::MonoGs4mm
        )
    }

    /// Frame rates this model family accepts
    pub fn allowed_fps(&self) -> &'static [u32] {
        match self {
            CameraModel::MonoGs | CameraModel::MonoGs4mm => GS_FPS,
            _ => STD_FPS,
        }
    }

    /// Resolutions this model family supports
    pub fn supported_resolutions(&self) -> &'static [Resolution] {
        match self {
            CameraModel::MonoUhd => UHD_RESOLUTIONS,
            _ => STEREO_RESOLUTIONS,
        }
    }

    /// Default resolution when configuration supplies an unusable one
    pub fn default_resolution(&self) -> Resolution {
        Resolution::Hd1200
    }

    /// Virtual serial numbers available for this model family
    pub fn serial_pool(&self) -> &'static [u32] {
        match self {
            CameraModel::StereoStd => STEREO_STD_SERIALS,
            CameraModel::StereoStd4mm => STEREO_STD_4MM_SERIALS,
            CameraModel::StereoMini => STEREO_MINI_SERIALS,
            CameraModel::StereoMini4mm => STEREO_MINI_4MM_SERIALS,
            CameraModel::MonoUhd => MONO_UHD_SERIALS,
            CameraModel::MonoGs => MONO_GS_SERIALS,
            CameraModel::MonoGs4mm => MONO_GS_4MM_SERIALS,
        }
    }

    /// Focal length (pixels) for a given image height
    pub fn focal_length(&self, image_height: u32) -> f64 {
        let is_4mm = self.is_4mm();
        match image_height {
            600 => {
                if is_4mm {
                    636.25
                } else {
                    370.8
                }
            }
            1800 | 2160 => {
                if is_4mm {
                    2545.0
                } else {
                    1483.2
                }
            }
            // 1080/1200 and the fallback share the standard lens value
            _ => {
                if is_4mm {
                    1272.5
                } else {
                    741.6
                }
            }
        }
    }

    /// Rig path of the left camera for an intrinsic stereo model
    pub fn left_camera_path(&self, rig_path: &str) -> String {
        format!("{}/base_link/{}/CameraLeft", rig_path, self.label())
    }

    /// Rig path of the right camera for an intrinsic stereo model
    pub fn right_camera_path(&self, rig_path: &str) -> String {
        format!("{}/base_link/{}/CameraRight", rig_path, self.label())
    }

    /// Rig path of the single camera for a mono model (also used per side
    /// when the caller supplies two independent rigs)
    pub fn mono_camera_path(&self, rig_path: &str) -> String {
        format!("{}/base_link/{}/Camera", rig_path, self.label())
    }

    /// Rig path of the attached inertial sensor
    pub fn imu_path(&self, rig_path: &str) -> String {
        format!("{}/base_link/{}/Imu_Sensor", rig_path, self.label())
    }
}
