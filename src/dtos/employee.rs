// src/dtos/employee.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub full_name: String,
    pub whatsapp: String,
    pub age: i32,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub full_name: Option<String>,
    pub whatsapp: Option<String>,
    pub age: Option<i32>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    pub id: i64,
    pub full_name: String,
    pub whatsapp: String,
    pub age: i32,
    pub role: String,
    pub created_at: String,
}

impl From<crate::models::employee::Employee> for EmployeeResponse {
    fn from(employee: crate::models::employee::Employee) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name,
            whatsapp: employee.whatsapp,
            age: employee.age,
            role: employee.role,
            created_at: employee.created_at.to_rfc3339(),
        }
    }
}
