//! crates/sanctuary_core/src/recommendations.rs
//!
//! Flags room readings that fall outside the ideal wellness ranges.
//!
//! Rooms are scanned in order and each room is checked against [`RULES`] in
//! table order, so the output order is fully determined by the input.

use crate::domain::{Measurement, RoomRecord};

pub const ALL_CLEAR: &str = "All measurements within optimal wellness ranges! ✓";

/// One threshold check on one measurement field.
pub struct ThresholdRule {
    reading: fn(&RoomRecord) -> &Measurement,
    fires: fn(f64) -> bool,
    advice: fn(&str) -> String,
}

impl ThresholdRule {
    /// Returns the advisory text (without the room prefix) when the rule fires.
    /// Blank or unparsable readings never fire.
    pub fn check(&self, room: &RoomRecord) -> Option<String> {
        let reading = (self.reading)(room);
        let value = reading.value()?;
        (self.fires)(value).then(|| (self.advice)(&reading.to_string()))
    }
}

pub static RULES: [ThresholdRule; 5] = [
    ThresholdRule {
        reading: |r| &r.emf,
        fires: |v| v > 3.0,
        advice: |v| format!("Reduce EMF exposure - reading is {v}mG (ideal <3mG)"),
    },
    ThresholdRule {
        reading: |r| &r.rf,
        fires: |v| v > 0.1,
        advice: |v| format!("RF levels elevated at {v} mW/m² (ideal <0.1)"),
    },
    ThresholdRule {
        reading: |r| &r.radon,
        fires: |v| v > 2.0,
        advice: |v| format!("Radon mitigation recommended - {v} pCi/L (ideal <2.0)"),
    },
    ThresholdRule {
        reading: |r| &r.temperature,
        fires: |v| !(68.0..=74.0).contains(&v),
        advice: |v| format!("Optimize temperature - currently {v}°F (ideal 68-74°F)"),
    },
    ThresholdRule {
        reading: |r| &r.humidity,
        fires: |v| !(30.0..=50.0).contains(&v),
        advice: |v| format!("Adjust humidity - currently {v}% (ideal 30-50%)"),
    },
];

/// Builds the recommendation list for a set of rooms.
///
/// Never returns an empty list: when nothing fires the result is the single
/// [`ALL_CLEAR`] entry.
pub fn generate_recommendations(rooms: &[RoomRecord]) -> Vec<String> {
    let mut recommendations: Vec<String> = rooms
        .iter()
        .enumerate()
        .flat_map(|(i, room)| {
            RULES.iter().filter_map(move |rule| {
                rule.check(room)
                    .map(|advice| format!("Room {} ({}): {}", i + 1, room.name, advice))
            })
        })
        .collect();

    if recommendations.is_empty() {
        recommendations.push(ALL_CLEAR.to_string());
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(name: &str, readings: &[(&str, &str)]) -> RoomRecord {
        let mut room = RoomRecord {
            name: name.to_string(),
            ..RoomRecord::blank()
        };
        for (field, value) in readings {
            let m = Measurement::new(*value);
            match *field {
                "emf" => room.emf = m,
                "rf" => room.rf = m,
                "radon" => room.radon = m,
                "temperature" => room.temperature = m,
                "humidity" => room.humidity = m,
                "light" => room.light = m,
                other => panic!("unknown field {other}"),
            }
        }
        room
    }

    #[test]
    fn single_emf_violation() {
        let rooms = [room(
            "Bedroom",
            &[("emf", "5"), ("temperature", "70"), ("humidity", "40")],
        )];
        assert_eq!(
            generate_recommendations(&rooms),
            vec!["Room 1 (Bedroom): Reduce EMF exposure - reading is 5mG (ideal <3mG)"]
        );
    }

    #[test]
    fn in_range_rooms_give_all_clear() {
        let rooms = [
            room("Kitchen", &[("emf", "1"), ("rf", "0.05"), ("radon", "1.5")]),
            room("Den", &[("temperature", "68"), ("humidity", "50")]),
            room("Hall", &[("temperature", "74"), ("humidity", "30"), ("emf", "3")]),
        ];
        assert_eq!(generate_recommendations(&rooms), vec![ALL_CLEAR]);
    }

    #[test]
    fn blank_rooms_give_all_clear() {
        assert_eq!(generate_recommendations(&[RoomRecord::blank()]), vec![ALL_CLEAR]);
        assert_eq!(generate_recommendations(&[]), vec![ALL_CLEAR]);
    }

    #[test]
    fn messages_follow_room_order() {
        let rooms = [room("Basement", &[("radon", "3")]), room("Bath", &[("humidity", "20")])];
        assert_eq!(
            generate_recommendations(&rooms),
            vec![
                "Room 1 (Basement): Radon mitigation recommended - 3 pCi/L (ideal <2.0)",
                "Room 2 (Bath): Adjust humidity - currently 20% (ideal 30-50%)",
            ]
        );
    }

    #[test]
    fn rules_fire_in_table_order_within_a_room() {
        let rooms = [room(
            "",
            &[
                ("humidity", "60"),
                ("temperature", "80"),
                ("radon", "4.2"),
                ("rf", "0.3"),
                ("emf", "10"),
            ],
        )];
        assert_eq!(
            generate_recommendations(&rooms),
            vec![
                "Room 1 (): Reduce EMF exposure - reading is 10mG (ideal <3mG)",
                "Room 1 (): RF levels elevated at 0.3 mW/m² (ideal <0.1)",
                "Room 1 (): Radon mitigation recommended - 4.2 pCi/L (ideal <2.0)",
                "Room 1 (): Optimize temperature - currently 80°F (ideal 68-74°F)",
                "Room 1 (): Adjust humidity - currently 60% (ideal 30-50%)",
            ]
        );
    }

    #[test]
    fn cold_room_fires_temperature_rule() {
        let rooms = [room("Garage", &[("temperature", "55")])];
        assert_eq!(
            generate_recommendations(&rooms),
            vec!["Room 1 (Garage): Optimize temperature - currently 55°F (ideal 68-74°F)"]
        );
    }

    #[test]
    fn unparsable_and_unruled_fields_are_skipped() {
        let rooms = [room("Office", &[("emf", "high"), ("rf", "inf"), ("light", "9000")])];
        assert_eq!(generate_recommendations(&rooms), vec![ALL_CLEAR]);
    }

    #[test]
    fn zero_is_a_reading_not_a_blank() {
        let rooms = [room("Attic", &[("temperature", "0"), ("humidity", "")])];
        assert_eq!(
            generate_recommendations(&rooms),
            vec!["Room 1 (Attic): Optimize temperature - currently 0°F (ideal 68-74°F)"]
        );
    }

    #[test]
    fn output_is_deterministic() {
        let rooms = [room("A", &[("emf", "7")]), room("B", &[("rf", "1")])];
        assert_eq!(generate_recommendations(&rooms), generate_recommendations(&rooms));
    }
}
