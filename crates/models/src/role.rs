use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[cfg(feature = "database")]
use sea_orm::Value;

/// Access level attached to a login account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Professor,
    Student,
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::ValueType for Role {
    fn try_from(v: Value) -> Result<Self, sea_orm::sea_query::ValueTypeErr> {
        match v {
            Value::String(Some(s)) => s.parse().map_err(|_| sea_orm::sea_query::ValueTypeErr),
            _ => Err(sea_orm::sea_query::ValueTypeErr),
        }
    }

    fn type_name() -> String {
        "Role".to_string()
    }

    fn array_type() -> sea_orm::sea_query::ArrayType {
        sea_orm::sea_query::ArrayType::String
    }

    fn column_type() -> sea_orm::sea_query::ColumnType {
        sea_orm::sea_query::ColumnType::Text
    }
}

#[cfg(feature = "database")]
impl From<Role> for Value {
    fn from(role: Role) -> Self {
        Value::String(Some(Box::new(role.to_string())))
    }
}

#[cfg(feature = "database")]
impl sea_orm::TryGetable for Role {
    fn try_get_by<I: sea_orm::ColIdx>(
        res: &sea_orm::QueryResult,
        index: I,
    ) -> Result<Self, sea_orm::TryGetError> {
        let val: String = res.try_get_by(index)?;

        val.parse().map_err(|_| {
            sea_orm::TryGetError::DbErr(sea_orm::DbErr::Type(format!(
                "Unknown role value: {val}"
            )))
        })
    }
}

#[cfg(feature = "database")]
impl sea_orm::sea_query::Nullable for Role {
    fn null() -> Value {
        Value::String(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_string() {
        for role in [Role::Admin, Role::Professor, Role::Student] {
            let text = role.to_string();
            assert_eq!(text.parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_uppercase_wire_format() {
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert_eq!(Role::Professor.to_string(), "PROFESSOR");
        assert_eq!(Role::Student.to_string(), "STUDENT");
    }

    #[test]
    fn test_unknown_value_rejected() {
        assert!("TEACHER".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }
}
