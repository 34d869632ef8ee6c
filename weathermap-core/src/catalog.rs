//! WMO weather code catalog.
//!
//! Codes follow the Open-Meteo documentation:
//! <https://open-meteo.com/en/docs#weathervariables>. Anything outside the
//! known set is [`WeatherCode::Unknown`].

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCode {
    ClearSky,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Fog,
    RimeFog,
    LightDrizzle,
    ModerateDrizzle,
    DenseDrizzle,
    SlightRain,
    ModerateRain,
    HeavyRain,
    SlightSnow,
    ModerateSnow,
    HeavySnow,
    SnowGrains,
    RainShowers,
    HeavyShowers,
    SnowShowers,
    HeavySnowShowers,
    Thunderstorm,
    SevereStorm,
    Unknown,
}

impl WeatherCode {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::ClearSky,
            1 => Self::MainlyClear,
            2 => Self::PartlyCloudy,
            3 => Self::Overcast,
            45 => Self::Fog,
            48 => Self::RimeFog,
            51 => Self::LightDrizzle,
            53 => Self::ModerateDrizzle,
            55 => Self::DenseDrizzle,
            61 => Self::SlightRain,
            63 => Self::ModerateRain,
            65 => Self::HeavyRain,
            71 => Self::SlightSnow,
            73 => Self::ModerateSnow,
            75 => Self::HeavySnow,
            77 => Self::SnowGrains,
            80 | 81 => Self::RainShowers,
            82 => Self::HeavyShowers,
            85 => Self::SnowShowers,
            86 => Self::HeavySnowShowers,
            95 | 96 => Self::Thunderstorm,
            99 => Self::SevereStorm,
            _ => Self::Unknown,
        }
    }

    /// Human label with an icon, as shown in the condition row.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ClearSky => "Clear Sky ☀️",
            Self::MainlyClear => "Mainly Clear 🌤️",
            Self::PartlyCloudy => "Partly Cloudy ⛅",
            Self::Overcast => "Overcast ☁️",
            Self::Fog => "Foggy 🌫️",
            Self::RimeFog => "Rime Fog 🌫️",
            Self::LightDrizzle => "Light Drizzle 🌦️",
            Self::ModerateDrizzle => "Moderate Drizzle 🌦️",
            Self::DenseDrizzle => "Dense Drizzle 🌧️",
            Self::SlightRain => "Slight Rain 🌧️",
            Self::ModerateRain => "Moderate Rain 🌧️",
            Self::HeavyRain => "Heavy Rain 🌧️",
            Self::SlightSnow => "Slight Snow ❄️",
            Self::ModerateSnow => "Moderate Snow ❄️",
            Self::HeavySnow => "Heavy Snow ❄️",
            Self::SnowGrains => "Snow Grains ❄️",
            Self::RainShowers => "Rain Showers 🌧️",
            Self::HeavyShowers => "Heavy Showers 🌧️",
            Self::SnowShowers => "Snow Showers 🌨️",
            Self::HeavySnowShowers => "Heavy Snow 🌨️",
            Self::Thunderstorm => "Thunderstorm ⛈️",
            Self::SevereStorm => "Severe Storm ⛈️",
            Self::Unknown => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Self::Unknown
    }
}

impl From<i64> for WeatherCode {
    fn from(code: i64) -> Self {
        Self::from_code(code)
    }
}

impl fmt::Display for WeatherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
