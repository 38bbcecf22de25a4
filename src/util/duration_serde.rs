//! `serde(with = "...")` helper so `Duration` config fields serialize as plain seconds.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    duration.as_secs().serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Wrapper {
        #[serde(with = "crate::util::duration_serde")]
        duration: Duration,
    }

    #[test]
    fn roundtrips_through_json() {
        let original = Wrapper {
            duration: Duration::from_secs(60),
        };
        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains("60"));
        let back: Wrapper = serde_json::from_str(&json).unwrap();
        assert_eq!(original, back);
    }
}
