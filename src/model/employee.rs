use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::model::attendance::AttendanceRecord;

pub const DEFAULT_CARGA: u32 = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "name": "Maria Souza",
        "position": "Cashier",
        "carga": 8
    })
)]
pub struct Employee {
    #[schema(example = 7)]
    pub id: u64,

    #[schema(example = "Maria Souza")]
    pub name: String,

    #[schema(example = "Cashier", nullable = true)]
    pub position: Option<String>,

    /// Contracted daily hours.
    #[schema(example = 8)]
    pub carga: u32,
}

/// An employee together with every daily point recorded for them.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeWithPoints {
    #[serde(flatten)]
    pub employee: Employee,
    pub points: Vec<AttendanceRecord>,
}

/// Columns of an employee row that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub position: Option<String>,
    pub carga: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Maria Souza")]
    pub name: String,
    #[schema(example = "Cashier")]
    pub position: Option<String>,
    /// Daily hours, defaults to 8
    #[schema(example = 8)]
    pub carga: Option<u32>,
}

/// Partial update. A missing field keeps the stored value; `"position": null`
/// clears it.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub name: Option<String>,

    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, nullable = true)]
    pub position: Option<Option<String>>,

    pub carga: Option<u32>,
}

// Wraps whatever was sent, null included, so that "absent" stays `None`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
