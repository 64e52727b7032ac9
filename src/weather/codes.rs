//! Static lookup tables for WMO weather codes and wind bearings.
//! See: https://open-meteo.com/en/docs#weathervariables

/// Weather code reported for a clear sky.
pub const CLEAR_SKY: i32 = 0;

pub fn describe_weather_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// Eight-point compass direction for a bearing in degrees, rounded to the
/// nearest 45°.
pub fn wind_direction(degrees: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

    if !degrees.is_finite() {
        return "N/A";
    }
    let sector = (degrees.rem_euclid(360.0) / 45.0).round() as usize % POINTS.len();
    POINTS[sector]
}

/// Advice tied to hazardous conditions, if the code calls for any.
pub fn code_recommendation(code: i32) -> Option<&'static str> {
    match code {
        45 | 48 => Some("🚗 Drive carefully - reduced visibility"),
        65 | 67 | 82 => Some("🏠 Stay indoors if possible"),
        95 | 96 | 99 => Some("⚡ Avoid outdoor activities"),
        71 | 73 | 75 | 85 | 86 => Some("❄️ Dress warmly and watch for ice"),
        _ => None,
    }
}
