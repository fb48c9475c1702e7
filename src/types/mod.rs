pub mod evidence;
pub mod execution;
pub mod params;
pub mod queue;
pub mod scan;
pub mod template;

use serde::{Deserialize, Serializer};
use uuid::Uuid;

/// Serde helper for `Option<Uuid>` fields persisted in MongoDB.
///
/// `mongodb::bson::serde_helpers::uuid_1_as_binary` only covers a bare `Uuid`;
/// this adapter applies the same binary (subtype 4) representation to optional
/// fields such as the evidence latest-execution pointer.
pub mod opt_uuid_1_as_binary {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<Uuid>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(uuid) => serializer.serialize_some(&mongodb::bson::Uuid::from_uuid_1(*uuid)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Option::<mongodb::bson::Uuid>::deserialize(deserializer)?;
        Ok(value.map(|uuid| uuid.to_uuid_1()))
    }
}

/// Serde helper for `Option<DateTime<Utc>>` fields persisted in MongoDB,
/// mirroring `chrono_datetime_as_bson_datetime` for optional timestamps such
/// as `started_at`/`completed_at`.
pub mod opt_datetime_as_bson_datetime {
    use super::*;
    use chrono::{DateTime, Utc};

    pub fn serialize<S: Serializer>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(datetime) => serializer.serialize_some(&mongodb::bson::DateTime::from_chrono(*datetime)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Option::<mongodb::bson::DateTime>::deserialize(deserializer)?;
        Ok(value.map(|datetime| datetime.to_chrono()))
    }
}
