use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[cfg(feature = "database")]
use sea_orm::Value;

/// Discriminant selecting one of the mutually-exclusive person variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PersonKind {
    Student,
    Professor,
    Administrator,
}

/// Variant-specific fields supplied when creating a person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum PersonPayload {
    /// A fresh student number is assigned when none is given
    Student { student_number: Option<Uuid> },
    Professor { salary: f64 },
    Administrator,
}

impl PersonPayload {
    pub fn kind(&self) -> PersonKind {
        match self {
            Self::Student { .. } => PersonKind::Student,
            Self::Professor { .. } => PersonKind::Professor,
            Self::Administrator => PersonKind::Administrator,
        }
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::ValueType for PersonKind {
    fn try_from(v: Value) -> Result<Self, sea_orm::sea_query::ValueTypeErr> {
        match v {
            Value::String(Some(s)) => s.parse().map_err(|_| sea_orm::sea_query::ValueTypeErr),
            _ => Err(sea_orm::sea_query::ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "PersonKind".to_string()
    }

    fn array_type() -> sea_orm::sea_query::ArrayType {
        sea_orm::sea_query::ArrayType::String
    }

    fn column_type() -> sea_orm::sea_query::ColumnType {
        sea_orm::sea_query::ColumnType::Text
    }
}

#[cfg(feature = "database")]
impl From<PersonKind> for Value {
    fn from(kind: PersonKind) -> Self {
        Value::String(Some(Box::new(kind.to_string())))
    }
}

#[cfg(feature = "database")]
impl sea_orm::TryGetable for PersonKind {
    fn try_get_by<I: sea_orm::ColIdx>(
        res: &sea_orm::QueryResult,
        index: I,
    ) -> Result<Self, sea_orm::TryGetError> {
        let val: String = res.try_get_by(index)?;

        val.parse().map_err(|_| {
            sea_orm::TryGetError::DbErr(sea_orm::DbErr::Type(format!(
                "Unknown person kind: {val}"
            )))
        })
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::Nullable for PersonKind {
    fn null() -> Value {
        Value::String(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_kind_matches_variant() {
        let payload = PersonPayload::Student {
            student_number: None,
        };
        assert_eq!(payload.kind(), PersonKind::Student);

        let payload = PersonPayload::Professor { salary: 42_000.0 };
        assert_eq!(payload.kind(), PersonKind::Professor);

        assert_eq!(PersonPayload::Administrator.kind(), PersonKind::Administrator);
    }

    #[test]
    fn test_kind_roundtrip_through_string() {
        for kind in [
            PersonKind::Student,
            PersonKind::Professor,
            PersonKind::Administrator,
        ] {
            assert_eq!(kind.to_string().parse::<PersonKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_payload_tagged_by_kind() {
        let json = r#"{"kind":"PROFESSOR","salary":1200.5}"#;
        let payload: PersonPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload, PersonPayload::Professor { salary: 1200.5 });
    }
}
