use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::StoreError;

/// An employee record as returned to clients.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct Employee {
    #[serde(rename = "_id")]
    #[schema(example = "6650f0c2a1b2c3d4e5f60718")]
    pub id: String,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john@example.com")]
    pub email: String,
    #[schema(example = "Sales")]
    pub department: String,
    #[schema(example = 50000)]
    pub salary: f64,
}

/// A validated employee that has not been stored yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub department: String,
    pub salary: f64,
}

impl NewEmployee {
    pub fn with_id(self, id: String) -> Employee {
        Employee {
            id,
            name: self.name,
            email: self.email,
            department: self.department,
            salary: self.salary,
        }
    }
}

/// Salary as the client sent it: a JSON number, or a string from a form
/// input. Conversion happens when the value is applied, so a bad value is
/// reported like any other store rejection.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SalaryValue {
    Number(f64),
    Text(String),
}

impl SalaryValue {
    /// Zero, NaN and the empty string count as "not supplied".
    pub fn is_supplied(&self) -> bool {
        match self {
            SalaryValue::Number(n) => *n != 0.0 && !n.is_nan(),
            SalaryValue::Text(text) => !text.is_empty(),
        }
    }

    /// `Ok(None)` for a blank string.
    pub fn to_number(&self) -> Result<Option<f64>, String> {
        match self {
            SalaryValue::Number(n) => Ok(Some(*n)),
            SalaryValue::Text(text) if text.trim().is_empty() => Ok(None),
            SalaryValue::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Some)
                .ok_or_else(|| {
                    format!(
                        "salary: Cast to Number failed for value \"{text}\" (type string) at path \"salary\""
                    )
                }),
        }
    }
}

/// Body of a create request. Fields are optional on the wire so that
/// missing values are reported the same way as any other store rejection.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct EmployeeInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub salary: Option<SalaryValue>,
}

impl EmployeeInput {
    pub fn validate(self) -> Result<NewEmployee, StoreError> {
        let mut errors = Vec::new();
        let name = required_text(self.name, "name", &mut errors);
        let email = required_text(self.email, "email", &mut errors);
        let department = required_text(self.department, "department", &mut errors);
        let salary = match self.salary.as_ref().map(SalaryValue::to_number) {
            Some(Ok(Some(salary))) => Some(salary),
            Some(Err(cast)) => {
                errors.push(cast);
                None
            }
            Some(Ok(None)) | None => {
                errors.push(required_message("salary"));
                None
            }
        };

        match (name, email, department, salary) {
            (Some(name), Some(email), Some(department), Some(salary)) => Ok(NewEmployee {
                name,
                email,
                department,
                salary,
            }),
            _ => Err(StoreError::Validation(errors.join(", "))),
        }
    }
}

fn required_text(value: Option<String>, path: &str, errors: &mut Vec<String>) -> Option<String> {
    match value {
        Some(text) if !text.is_empty() => Some(text),
        _ => {
            errors.push(required_message(path));
            None
        }
    }
}

fn required_message(path: &str) -> String {
    format!("{path}: Path `{path}` is required.")
}

/// Body of an update request.
///
/// Only values that are present *and* non-empty overwrite the stored record:
/// an empty string or a numeric zero keeps the existing value, while the
/// string `"0"` is a real value and sets the salary to zero.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct EmployeePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub salary: Option<SalaryValue>,
}

impl EmployeePatch {
    /// Leaves `employee` untouched when the salary can't be converted.
    pub fn apply_to(self, employee: &mut Employee) -> Result<(), StoreError> {
        let salary = match self.salary.filter(SalaryValue::is_supplied) {
            Some(value) => value.to_number().map_err(StoreError::Validation)?,
            None => None,
        };

        overwrite_text(&mut employee.name, self.name);
        overwrite_text(&mut employee.email, self.email);
        overwrite_text(&mut employee.department, self.department);
        if let Some(salary) = salary {
            employee.salary = salary;
        }
        Ok(())
    }
}

fn overwrite_text(field: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *field = value;
    }
}

/// `{ "message": ... }` body shared by errors and the delete confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct Message {
    #[schema(example = "Employee deleted")]
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
