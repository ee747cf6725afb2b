use serde::{Deserialize, Deserializer, Serialize};

/// Locality resolved by the postal code lookup service.
///
/// Every field defaults to empty so partial upstream bodies still decode;
/// the error flag is the only thing that decides whether `localidade` is usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LocationLookupResult {
    #[serde(default)]
    pub cep: String,

    #[serde(default)]
    pub localidade: String,

    /// ViaCEP sends `"erro": "true"` (older deployments send a bare `true`).
    #[serde(default, deserialize_with = "flag_as_string")]
    pub erro: String,
}

impl LocationLookupResult {
    pub fn is_error(&self) -> bool {
        self.erro == "true"
    }

    /// Locality name, or `None` when the lookup marked the code as erroneous.
    pub fn locality(&self) -> Option<&str> {
        if self.is_error() { None } else { Some(self.localidade.as_str()) }
    }
}

fn flag_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Text(String),
        Bool(bool),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Text(s)) => s,
        Some(Flag::Bool(b)) => b.to_string(),
        None => String::new(),
    })
}

/// Current conditions reported by the weather service.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WeatherResult {
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CurrentConditions {
    pub temp_c: f64,
}

impl WeatherResult {
    pub fn temp_c(&self) -> f64 {
        self.current.temp_c
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + 273.15
}

/// Outbound payload: the same temperature in three scales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureResponse {
    #[serde(rename = "temp_C")]
    temp_c: f64,
    #[serde(rename = "temp_F")]
    temp_f: f64,
    #[serde(rename = "temp_K")]
    temp_k: f64,
}

impl TemperatureResponse {
    pub fn from_celsius(celsius: f64) -> Self {
        Self {
            temp_c: celsius,
            temp_f: celsius_to_fahrenheit(celsius),
            temp_k: celsius_to_kelvin(celsius),
        }
    }

    pub fn celsius(&self) -> f64 {
        self.temp_c
    }

    pub fn fahrenheit(&self) -> f64 {
        self.temp_f
    }

    pub fn kelvin(&self) -> f64 {
        self.temp_k
    }
}

impl From<WeatherResult> for TemperatureResponse {
    fn from(weather: WeatherResult) -> Self {
        Self::from_celsius(weather.temp_c())
    }
}
