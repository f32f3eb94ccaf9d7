use sea_orm::{entity::prelude::*, sea_query::Expr, ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors;

/// A single item queued for retrieval from remote storage.
///
/// `retrieved_date_time` stays `None` while the item waits for pickup and is
/// written exactly once when staff confirm the retrieval.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "retrieval_queue")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hold_id: Option<String>,
    pub item_barcode: Option<String>,
    pub patron_barcode: Option<String>,
    pub patron_name: Option<String>,
    pub call_number: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub instance_title: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub instance_author: Option<String>,
    pub pickup_location: Option<String>,
    pub request_status: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub request_note: Option<String>,
    pub remote_storage_id: Uuid,
    pub created_date_time: DateTime,
    pub retrieved_date_time: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_retrieved(&self) -> bool {
        self.retrieved_date_time.is_some()
    }
}

/// New rows must point at a real storage configuration and must not be born retrieved.
pub fn validate_new(m: &Model) -> Result<(), errors::ModelError> {
    if m.remote_storage_id.is_nil() {
        return Err(errors::ModelError::Validation("remote_storage_id must reference a storage configuration".into()));
    }
    if m.retrieved_date_time.is_some() {
        return Err(errors::ModelError::Validation("new retrieval queue records cannot be retrieved".into()));
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, record: Model) -> Result<Model, errors::ModelError> {
    validate_new(&record)?;
    let am = ActiveModel {
        id: Set(record.id),
        hold_id: Set(record.hold_id),
        item_barcode: Set(record.item_barcode),
        patron_barcode: Set(record.patron_barcode),
        patron_name: Set(record.patron_name),
        call_number: Set(record.call_number),
        instance_title: Set(record.instance_title),
        instance_author: Set(record.instance_author),
        pickup_location: Set(record.pickup_location),
        request_status: Set(record.request_status),
        request_note: Set(record.request_note),
        remote_storage_id: Set(record.remote_storage_id),
        created_date_time: Set(record.created_date_time),
        retrieved_date_time: Set(None),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Stamp `retrieved_date_time` only if it is still empty.
/// Returns `false` when the row is missing or was already retrieved.
pub async fn mark_retrieved(db: &DatabaseConnection, id: Uuid, at: DateTime) -> Result<bool, errors::ModelError> {
    let res = Entity::update_many()
        .col_expr(Column::RetrievedDateTime, Expr::value(at))
        .filter(Column::Id.eq(id))
        .filter(Column::RetrievedDateTime.is_null())
        .exec(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Model {
        Model {
            id: Uuid::new_v4(),
            hold_id: Some("hold".into()),
            item_barcode: Some("4539876054382".into()),
            patron_barcode: None,
            patron_name: None,
            call_number: None,
            instance_title: None,
            instance_author: None,
            pickup_location: None,
            request_status: None,
            request_note: None,
            remote_storage_id: Uuid::new_v4(),
            created_date_time: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap().and_hms_opt(10, 0, 0).unwrap(),
            retrieved_date_time: None,
        }
    }

    #[test]
    fn validate_rejects_nil_storage() {
        let mut m = sample();
        m.remote_storage_id = Uuid::nil();
        assert!(matches!(validate_new(&m), Err(errors::ModelError::Validation(_))));
    }

    #[test]
    fn validate_rejects_prestamped_record() {
        let mut m = sample();
        m.retrieved_date_time = Some(m.created_date_time);
        assert!(validate_new(&m).is_err());
        assert!(m.is_retrieved());
    }

    #[test]
    fn validate_accepts_waiting_record() {
        let m = sample();
        assert!(validate_new(&m).is_ok());
        assert!(!m.is_retrieved());
    }
}
