use serde::de;

use attestor_types::Retries;

/// Deserializes a boolean value from either a native boolean or a string
pub fn bool_from_anything<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct BoolVisitor;

    impl de::Visitor<'_> for BoolVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "a boolean or a string representing a boolean")
        }

        fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            match v {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(E::custom(format!("invalid boolean string: {other}"))),
            }
        }
    }

    deserializer.deserialize_any(BoolVisitor)
}

/// Deserializes a retry budget from a positive integer or the string `infinite`.
/// Numeric strings are accepted as well, since environment variables are text.
pub fn retries_from_anything<'de, D>(deserializer: D) -> Result<Retries, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct RetriesVisitor;

    impl de::Visitor<'_> for RetriesVisitor {
        type Value = Retries;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "a positive integer or \"infinite\"")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v == 0 {
                return Err(E::custom("retries must be greater than zero"));
            }
            Ok(Retries::new(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            let v = u64::try_from(v)
                .map_err(|_| E::custom(format!("retries must be positive, got {v}")))?;
            self.visit_u64(v)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            v.parse::<Retries>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(RetriesVisitor)
}

pub fn retries_to_string<S>(retries: &Retries, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(retries)
}
