//! Temperature units and formatting

use clap::ValueEnum;

/// Unit temperatures are shown in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Converts a Celsius reading to this unit, rounded to the nearest degree
    pub fn convert(self, temp_c: f64) -> i64 {
        let value = match self {
            Self::Celsius => temp_c,
            Self::Fahrenheit => temp_c * 9.0 / 5.0 + 32.0,
        };
        // Half rounds towards positive infinity so -0.5 reads as 0
        (value + 0.5).floor() as i64
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// Converted value followed by the unit symbol, e.g. "59°F"
    pub fn format(self, temp_c: f64) -> String {
        format!("{}{}", self.convert(temp_c), self.symbol())
    }

    /// The other unit
    pub fn toggle(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }
}
