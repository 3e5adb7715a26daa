//! In-process store used by the handler tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{EmployeeStore, StoreError};
use crate::model::{Employee, NewEmployee};

#[derive(Default)]
pub struct MemoryEmployeeStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    records: Vec<Employee>,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<&str>) -> bool {
        self.records
            .iter()
            .any(|e| e.email == email && Some(e.id.as_str()) != except)
    }
}

/// Ids follow the ObjectId shape: 24 hex digits.
fn check_id(id: &str) -> Result<(), StoreError> {
    if id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(StoreError::InvalidId(id.to_string()))
    }
}

fn duplicate(email: &str) -> StoreError {
    StoreError::Duplicate(format!(
        "E11000 duplicate key error collection: employees index: email_1 dup key: {{ email: \"{email}\" }}"
    ))
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn insert(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.email_taken(&employee.email, None) {
            return Err(duplicate(&employee.email));
        }
        state.next_id += 1;
        let employee = employee.with_id(format!("{:024x}", state.next_id));
        state.records.push(employee.clone());
        Ok(employee)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        check_id(id)?;
        let state = self.state.lock().unwrap();
        Ok(state.records.iter().find(|e| e.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self.state.lock().unwrap().records.clone())
    }

    async fn replace(&self, employee: &Employee) -> Result<Option<Employee>, StoreError> {
        check_id(&employee.id)?;
        let mut state = self.state.lock().unwrap();
        if state.email_taken(&employee.email, Some(&employee.id)) {
            return Err(duplicate(&employee.email));
        }
        match state.records.iter_mut().find(|e| e.id == employee.id) {
            Some(slot) => {
                *slot = employee.clone();
                Ok(Some(employee.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        check_id(id)?;
        let mut state = self.state.lock().unwrap();
        let index = state.records.iter().position(|e| e.id == id);
        Ok(index.map(|i| state.records.remove(i)))
    }
}
