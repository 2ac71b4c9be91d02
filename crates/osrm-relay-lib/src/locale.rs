//! Phrase tables for route narration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language used for summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl Locale {
    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }

    /// Base phrase for a maneuver.
    pub fn maneuver(self, maneuver: ManeuverType) -> &'static str {
        use ManeuverType::*;
        match self {
            Locale::Ru => match maneuver {
                Depart => "Начните движение",
                Arrive => "Вы прибыли",
                Turn => "Поверните",
                Continue | NewName => "Продолжайте движение",
                Merge => "Перестройтесь",
                OnRamp => "Сверните на съезд",
                OffRamp => "Съезд",
                Fork => "Держитесь",
                EndOfRoad => "В конце дороги поверните",
                Roundabout => "На круговом движении",
                UseLane => "Следуйте указаниям полос",
            },
            Locale::En => match maneuver {
                Depart => "Depart",
                Arrive => "You have arrived",
                Turn => "Turn",
                Continue | NewName => "Continue",
                Merge => "Merge",
                OnRamp => "Take the ramp",
                OffRamp => "Take the exit",
                Fork => "Keep",
                EndOfRoad => "At the end of the road turn",
                Roundabout => "At the roundabout",
                UseLane => "Follow the lane guidance",
            },
        }
    }

    /// Direction suffix for a modifier.
    pub fn modifier(self, modifier: Modifier) -> &'static str {
        use Modifier::*;
        match self {
            Locale::Ru => match modifier {
                Left => "налево",
                Right => "направо",
                SharpLeft => "резко налево",
                SharpRight => "резко направо",
                SlightLeft => "слегка налево",
                SlightRight => "слегка направо",
                Straight => "прямо",
                Uturn => "развернитесь",
            },
            Locale::En => match modifier {
                Left => "left",
                Right => "right",
                SharpLeft => "sharp left",
                SharpRight => "sharp right",
                SlightLeft => "slight left",
                SlightRight => "slight right",
                Straight => "straight",
                Uturn => "make a u-turn",
            },
        }
    }

    /// Phrase for unknown maneuvers and empty instructions.
    pub fn generic(self) -> &'static str {
        match self {
            Locale::Ru => "Двигайтесь дальше",
            Locale::En => "Keep going",
        }
    }

    /// Word joining an instruction to the road name.
    pub fn preposition(self, arriving: bool) -> &'static str {
        match (self, arriving) {
            (Locale::Ru, false) => "по",
            (Locale::Ru, true) => "к",
            (Locale::En, false) => "onto",
            (Locale::En, true) => "at",
        }
    }

    pub fn no_route(self) -> &'static str {
        match self {
            Locale::Ru => "Маршрут не найден.",
            Locale::En => "No route found.",
        }
    }

    pub fn unnamed_segment(self) -> &'static str {
        match self {
            Locale::Ru => "Безымянный участок",
            Locale::En => "Unnamed segment",
        }
    }

    /// Placeholder for a waypoint without a name or location (1-based).
    pub fn point(self, index: usize) -> String {
        match self {
            Locale::Ru => format!("Точка {}", index),
            Locale::En => format!("Point {}", index),
        }
    }

    /// First line of the summary message.
    pub fn total_line(self, distance_km: f64, duration_min: f64) -> String {
        match self {
            Locale::Ru => format!("Маршрут: {:.1} км · {:.0} мин", distance_km, duration_min),
            Locale::En => format!("Route: {:.1} km · {:.0} min", distance_km, duration_min),
        }
    }

    /// Per-leg line of the summary message; `number` is 1-based.
    pub fn leg_line(
        self,
        number: usize,
        origin: &str,
        destination: &str,
        distance_km: f64,
        duration_min: f64,
    ) -> String {
        let (km, min) = match self {
            Locale::Ru => ("км", "мин"),
            Locale::En => ("km", "min"),
        };
        format!(
            "{}) {} → {}: {:.1} {} · {:.0} {}",
            number, origin, destination, distance_km, km, duration_min, min
        )
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    /// Accepts bare language codes and region-tagged forms such as `en-US`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let language = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            _ => Err(format!("unsupported language '{}', expected 'ru' or 'en'", s)),
        }
    }
}

/// Maneuver types the engine reports that have their own phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManeuverType {
    Depart,
    Arrive,
    Turn,
    Continue,
    NewName,
    Merge,
    OnRamp,
    OffRamp,
    Fork,
    EndOfRoad,
    Roundabout,
    UseLane,
}

impl ManeuverType {
    /// Map the engine's `type` string; `None` for anything without a phrase.
    pub fn parse(value: &str) -> Option<Self> {
        use ManeuverType::*;
        Some(match value {
            "depart" => Depart,
            "arrive" => Arrive,
            "turn" => Turn,
            "continue" => Continue,
            "new name" => NewName,
            "merge" => Merge,
            "on ramp" => OnRamp,
            "off ramp" => OffRamp,
            "fork" => Fork,
            "end of road" => EndOfRoad,
            "roundabout" => Roundabout,
            "use lane" => UseLane,
            _ => return None,
        })
    }
}

/// Direction modifiers with a translated suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Left,
    Right,
    SharpLeft,
    SharpRight,
    SlightLeft,
    SlightRight,
    Straight,
    Uturn,
}

impl Modifier {
    pub fn parse(value: &str) -> Option<Self> {
        use Modifier::*;
        Some(match value {
            "left" => Left,
            "right" => Right,
            "sharp left" => SharpLeft,
            "sharp right" => SharpRight,
            "slight left" => SlightLeft,
            "slight right" => SlightRight,
            "straight" => Straight,
            "uturn" => Uturn,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language_tags() {
        assert_eq!("ru".parse::<Locale>().unwrap(), Locale::Ru);
        assert_eq!("EN".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("en-GB".parse::<Locale>().unwrap(), Locale::En);
        assert_eq!("ru_UA".parse::<Locale>().unwrap(), Locale::Ru);
        assert!("uk".parse::<Locale>().is_err());
        assert_eq!(Locale::default(), Locale::Ru);
    }

    #[test]
    fn continue_and_new_name_share_a_phrase() {
        for locale in [Locale::Ru, Locale::En] {
            assert_eq!(
                locale.maneuver(ManeuverType::Continue),
                locale.maneuver(ManeuverType::NewName)
            );
        }
    }

    #[test]
    fn unknown_tokens_have_no_phrase() {
        assert!(ManeuverType::parse("notification").is_none());
        assert!(Modifier::parse("backwards").is_none());
        assert_eq!(ManeuverType::parse("end of road"), Some(ManeuverType::EndOfRoad));
    }

    #[test]
    fn message_lines() {
        assert_eq!(Locale::Ru.total_line(1.23, 2.4), "Маршрут: 1.2 км · 2 мин");
        assert_eq!(
            Locale::En.leg_line(1, "A", "B", 1.23, 2.7),
            "1) A → B: 1.2 km · 3 min"
        );
    }
}
