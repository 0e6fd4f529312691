//! MongoDB medicine store
//!
//! Documents live in the `medicines` collection with the field names the
//! frontend already expects (`_id`, `expiryDate`, ...). Stock deduction is a
//! single conditional `$inc`, so concurrent bills cannot drive a record's
//! quantity below zero.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Deduction, MedicineStore, StoreError, StoreInfo, StoreResult};
use crate::config::{StoreConfig, DEFAULT_DATABASE};
use crate::medicine::models::{Medicine, MedicineChanges, NewMedicine};

const COLLECTION: &str = "medicines";

/// Upper bound for a health-check ping, independent of the connect timeout.
const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Stored shape of a medicine.
#[derive(Debug, Serialize, Deserialize)]
struct MedicineDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    company: String,
    price: f64,
    quantity: i64,
    #[serde(rename = "expiryDate")]
    expiry_date: BsonDateTime,
}

impl MedicineDocument {
    fn from_new(medicine: NewMedicine) -> Self {
        Self {
            id: ObjectId::new(),
            name: medicine.name,
            company: medicine.company,
            price: medicine.price,
            quantity: i64::from(medicine.quantity),
            expiry_date: date_to_bson(medicine.expiry_date),
        }
    }
}

impl TryFrom<MedicineDocument> for Medicine {
    type Error = StoreError;

    fn try_from(document: MedicineDocument) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(document.quantity).map_err(|_| StoreError::Corrupt {
            message: format!(
                "medicine {} has quantity {}",
                document.id.to_hex(),
                document.quantity
            ),
        })?;
        Ok(Medicine {
            id: document.id.to_hex(),
            name: document.name,
            company: document.company,
            price: document.price,
            quantity,
            expiry_date: bson_to_date(document.expiry_date)?,
        })
    }
}

fn date_to_bson(date: NaiveDate) -> BsonDateTime {
    BsonDateTime::from_millis(date.and_time(NaiveTime::MIN).and_utc().timestamp_millis())
}

fn bson_to_date(value: BsonDateTime) -> StoreResult<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(value.timestamp_millis())
        .map(|timestamp| timestamp.date_naive())
        .ok_or_else(|| StoreError::Corrupt {
            message: format!("expiry date {value} is out of range"),
        })
}

/// Ids that are not valid ObjectIds can never match a document.
fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id.trim()).ok()
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. } | ErrorKind::DnsResolve { .. } => {
                StoreError::Connection {
                    message: err.to_string(),
                }
            }
            ErrorKind::BsonDeserialization(_) => StoreError::Corrupt {
                message: err.to_string(),
            },
            _ => StoreError::Query {
                message: err.to_string(),
            },
        }
    }
}

fn changes_to_set(changes: MedicineChanges) -> Document {
    let mut set = Document::new();
    if let Some(name) = changes.name {
        set.insert("name", name);
    }
    if let Some(company) = changes.company {
        set.insert("company", company);
    }
    if let Some(price) = changes.price {
        set.insert("price", price);
    }
    if let Some(quantity) = changes.quantity {
        set.insert("quantity", i64::from(quantity));
    }
    if let Some(expiry_date) = changes.expiry_date {
        set.insert("expiryDate", date_to_bson(expiry_date));
    }
    set
}

pub struct MongoMedicineStore {
    database: Database,
    collection: Collection<MedicineDocument>,
    info: StoreInfo,
}

impl MongoMedicineStore {
    /// Connect and verify the connection with a ping.
    ///
    /// Server selection gives up after `config.connect_timeout`, which bounds
    /// how long startup can block on an unreachable cluster.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let uri = config.uri.as_deref().ok_or_else(|| StoreError::Connection {
            message: "MONGODB_URI is not set".to_string(),
        })?;

        let mut options = ClientOptions::parse(uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.server_selection_timeout = Some(config.connect_timeout);
        options.connect_timeout = Some(config.connect_timeout);

        let info = StoreInfo {
            host: options
                .hosts
                .first()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unknown".to_string()),
            database: config
                .database
                .clone()
                .or_else(|| options.default_database.clone())
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        };

        let client = Client::with_options(options)?;
        let database = client.database(&info.database);
        database.run_command(doc! { "ping": 1 }).await?;

        Ok(Self {
            collection: database.collection(COLLECTION),
            database,
            info,
        })
    }

    /// Diagnostics for a store that never connected.
    pub fn detached_info(config: &StoreConfig) -> StoreInfo {
        StoreInfo {
            host: "unreachable".to_string(),
            database: config
                .database
                .clone()
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        }
    }
}

#[async_trait]
impl MedicineStore for MongoMedicineStore {
    async fn list(&self) -> StoreResult<Vec<Medicine>> {
        let documents: Vec<MedicineDocument> = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        documents.into_iter().map(Medicine::try_from).collect()
    }

    async fn find(&self, id: &str) -> StoreResult<Option<Medicine>> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        self.collection
            .find_one(doc! { "_id": oid })
            .await?
            .map(Medicine::try_from)
            .transpose()
    }

    async fn insert(&self, medicine: NewMedicine) -> StoreResult<Medicine> {
        let document = MedicineDocument::from_new(medicine);
        self.collection.insert_one(&document).await?;
        Medicine::try_from(document)
    }

    async fn insert_many(&self, medicines: Vec<NewMedicine>) -> StoreResult<usize> {
        let documents: Vec<MedicineDocument> = medicines
            .into_iter()
            .map(MedicineDocument::from_new)
            .collect();
        let result = self.collection.insert_many(documents).await?;
        Ok(result.inserted_ids.len())
    }

    async fn update(&self, id: &str, changes: MedicineChanges) -> StoreResult<Option<Medicine>> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let set = changes_to_set(changes);
        if set.is_empty() {
            return self.find(id).await;
        }
        self.collection
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .map(Medicine::try_from)
            .transpose()
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        let Some(oid) = parse_id(id) else {
            return Ok(false);
        };
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn deduct_stock(&self, id: &str, quantity: u32) -> StoreResult<Deduction> {
        let Some(oid) = parse_id(id) else {
            return Ok(Deduction::Missing);
        };
        let quantity = i64::from(quantity);
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": oid, "quantity": { "$gte": quantity } },
                doc! { "$inc": { "quantity": -quantity } },
            )
            .return_document(ReturnDocument::After)
            .await?;

        if let Some(document) = updated {
            return Ok(Deduction::Applied(Medicine::try_from(document)?));
        }

        debug!(id = %oid, "conditional stock decrement matched nothing");
        match self.collection.find_one(doc! { "_id": oid }).await? {
            Some(document) => Ok(Deduction::Insufficient(Medicine::try_from(document)?)),
            None => Ok(Deduction::Missing),
        }
    }

    async fn ping(&self) -> bool {
        let ping = async { self.database.run_command(doc! { "ping": 1 }).await };
        matches!(tokio::time::timeout(PING_TIMEOUT, ping).await, Ok(Ok(_)))
    }

    fn info(&self) -> StoreInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_dates_survive_bson_conversion() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(bson_to_date(date_to_bson(date)).unwrap(), date);
    }

    #[test]
    fn malformed_ids_never_parse() {
        assert!(parse_id("not-an-object-id").is_none());
        assert!(parse_id("65a1b2c3d4e5f60718293a4b").is_some());
    }

    #[test]
    fn negative_stored_quantity_is_corrupt() {
        let document = MedicineDocument {
            id: ObjectId::new(),
            name: "Aspirin".to_string(),
            company: "Bayer".to_string(),
            price: 1.0,
            quantity: -1,
            expiry_date: date_to_bson(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()),
        };
        assert!(matches!(
            Medicine::try_from(document),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn only_present_changes_are_set() {
        let set = changes_to_set(MedicineChanges {
            price: Some(9.5),
            quantity: Some(3),
            ..MedicineChanges::default()
        });
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_f64("price").unwrap(), 9.5);
        assert_eq!(set.get_i64("quantity").unwrap(), 3);
    }
}
