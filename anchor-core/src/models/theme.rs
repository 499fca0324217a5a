use serde::{Deserialize, Serialize};

/// Weekly mood rotation for the verse of the day. One theme per weekday,
/// cyclic with period 7 (0 = Sunday).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    Rest,
    Strength,
    Peace,
    Wisdom,
    Love,
    Faith,
    Joy,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Strength => "strength",
            Self::Peace => "peace",
            Self::Wisdom => "wisdom",
            Self::Love => "love",
            Self::Faith => "faith",
            Self::Joy => "joy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "rest" => Some(Self::Rest),
            "strength" => Some(Self::Strength),
            "peace" => Some(Self::Peace),
            "wisdom" => Some(Self::Wisdom),
            "love" => Some(Self::Love),
            "faith" => Some(Self::Faith),
            "joy" => Some(Self::Joy),
            _ => None,
        }
    }

    /// Theme for a weekday index (0 = Sunday .. 6 = Saturday).
    pub fn for_weekday(weekday: u32) -> Self {
        match weekday % 7 {
            0 => Self::Rest,
            1 => Self::Strength,
            2 => Self::Peace,
            3 => Self::Wisdom,
            4 => Self::Love,
            5 => Self::Faith,
            _ => Self::Joy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekdays_map_to_seven_distinct_themes() {
        let themes: Vec<Theme> = (0..7).map(Theme::for_weekday).collect();
        for (i, a) in themes.iter().enumerate() {
            for b in &themes[i + 1..] {
                assert_ne!(a, b);
            }
        }
        // Cyclic with period 7
        assert_eq!(Theme::for_weekday(7), Theme::for_weekday(0));
    }

    #[test]
    fn round_trips_through_str() {
        for day in 0..7 {
            let theme = Theme::for_weekday(day);
            assert_eq!(Theme::from_str(theme.as_str()), Some(theme));
        }
    }
}
