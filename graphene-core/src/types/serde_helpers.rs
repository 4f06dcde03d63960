//! Serde helpers for the chain's fixed wire formats.

/// The chain's timestamp format: ISO-8601 without a zone designator,
/// e.g. `2016-08-08T12:24:17`. Nodes may append fractional seconds;
/// both forms are accepted, and values are always emitted without
/// fractions. The format is fixed so parsing never depends on the
/// host locale.
pub mod chain_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
    const FORMAT_WITH_FRACTION: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(
        time: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.trim_end_matches('Z');
        NaiveDateTime::parse_from_str(s, FORMAT_WITH_FRACTION)
            .or_else(|_| NaiveDateTime::parse_from_str(s, FORMAT))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Stamp {
        #[serde(with = "super::chain_time")]
        time: NaiveDateTime,
    }

    #[test]
    fn round_trips_whole_seconds() {
        let json = r#"{"time":"2016-08-08T12:24:17"}"#;
        let stamp: Stamp = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&stamp).unwrap(), json);
    }

    #[test]
    fn accepts_fractional_seconds_and_zone_suffix() {
        let stamp: Stamp =
            serde_json::from_str(r#"{"time":"2016-08-08T12:24:17.5000000Z"}"#).unwrap();
        assert_eq!(stamp.time.and_utc().timestamp(), 1470659057);
    }
}
