use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::error::{Error, ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

use super::{EmployeeStore, StoreError};
use crate::model::{Employee, NewEmployee};

const COLL_NAME: &str = "employees";
const DUPLICATE_KEY: i32 = 11000;

/// Stored shape of an employee, keyed by a native ObjectId.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct EmployeeDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    email: String,
    department: String,
    salary: f64,
}

impl From<EmployeeDocument> for Employee {
    fn from(doc: EmployeeDocument) -> Self {
        Employee {
            id: doc.id.to_hex(),
            name: doc.name,
            email: doc.email,
            department: doc.department,
            salary: doc.salary,
        }
    }
}

impl From<Error> for StoreError {
    fn from(err: Error) -> Self {
        match *err.kind {
            ErrorKind::Write(WriteFailure::WriteError(ref e)) if e.code == DUPLICATE_KEY => {
                StoreError::Duplicate(err.to_string())
            }
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

impl TryFrom<&Employee> for EmployeeDocument {
    type Error = StoreError;

    fn try_from(employee: &Employee) -> Result<Self, Self::Error> {
        Ok(EmployeeDocument {
            id: parse_id(&employee.id)?,
            name: employee.name.clone(),
            email: employee.email.clone(),
            department: employee.department.clone(),
            salary: employee.salary,
        })
    }
}

fn parse_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::InvalidId(id.to_string()))
}

#[derive(Clone, Debug)]
pub struct MongoEmployeeStore {
    collection: Collection<EmployeeDocument>,
}

impl MongoEmployeeStore {
    pub fn new(client: &Client, database: &str) -> Self {
        Self {
            collection: client.database(database).collection(COLL_NAME),
        }
    }

    /// Creates the unique index on `email`. Safe to call on every start.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let options = IndexOptions::builder().unique(true).build();
        let model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(options)
            .build();
        self.collection.create_index(model).await?;
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for MongoEmployeeStore {
    async fn insert(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        let employee = employee.with_id(ObjectId::new().to_hex());
        let doc = EmployeeDocument::try_from(&employee)?;
        self.collection.insert_one(&doc).await?;
        Ok(employee)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        let oid = parse_id(id)?;
        let found = self.collection.find_one(doc! { "_id": oid }).await?;
        Ok(found.map(Employee::from))
    }

    async fn find_all(&self) -> Result<Vec<Employee>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        let docs: Vec<EmployeeDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Employee::from).collect())
    }

    async fn replace(&self, employee: &Employee) -> Result<Option<Employee>, StoreError> {
        let doc = EmployeeDocument::try_from(employee)?;
        let result = self
            .collection
            .replace_one(doc! { "_id": doc.id }, &doc)
            .await?;
        if result.matched_count == 0 {
            return Ok(None);
        }
        Ok(Some(doc.into()))
    }

    async fn delete(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        let oid = parse_id(id)?;
        let removed = self
            .collection
            .find_one_and_delete(doc! { "_id": oid })
            .await?;
        Ok(removed.map(Employee::from))
    }
}
