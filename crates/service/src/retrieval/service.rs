use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use models::retrieval_queue;

use super::domain::{FilterCriteria, MovedEventRequest, RecordKey, RetrievalPage};
use super::filter::{self, uuid_or_sentinel};
use super::repository::RetrievalQueueRepository;
use crate::clients::domain::{Instance, Item, User};
use crate::clients::{InventoryClient, UsersClient};
use crate::errors::{require, ServiceError};
use crate::location::{LocationMapping, LocationMappingResolver};

/// Contributors of a paged item's instance are joined with this.
pub const MOVED_AUTHOR_SEPARATOR: &str = ";";

/// Queue of items to pull from remote storage: listing, retrieval
/// confirmation and record creation from item-moved events.
pub struct RetrievalQueueService {
    repo: Arc<dyn RetrievalQueueRepository>,
    locations: Arc<dyn LocationMappingResolver>,
    inventory: Arc<dyn InventoryClient>,
    users: Arc<dyn UsersClient>,
}

impl RetrievalQueueService {
    pub fn new(
        repo: Arc<dyn RetrievalQueueRepository>,
        locations: Arc<dyn LocationMappingResolver>,
        inventory: Arc<dyn InventoryClient>,
        users: Arc<dyn UsersClient>,
    ) -> Self {
        Self { repo, locations, inventory, users }
    }

    #[instrument(skip(self))]
    pub async fn list_retrievals(&self, criteria: &FilterCriteria) -> Result<RetrievalPage, ServiceError> {
        let (filter, page) = filter::parse(criteria)?;
        let (records, total_records) = self.repo.find_page(&filter, page).await?;
        debug!(count = records.len(), total_records, "list retrievals");
        Ok(RetrievalPage { records, total_records })
    }

    #[instrument(skip(self))]
    pub async fn mark_retrieved_by_id(&self, id: Uuid) -> Result<(), ServiceError> {
        let what = format!("Retrieval queue record with id {}", id);
        self.mark_retrieved(RecordKey::Id(id), what).await
    }

    #[instrument(skip(self))]
    pub async fn mark_retrieved_by_barcode(&self, barcode: &str) -> Result<(), ServiceError> {
        let what = format!("Retrieval queue record with item barcode {}", barcode);
        self.mark_retrieved(RecordKey::Barcode(barcode.to_string()), what).await
    }

    async fn mark_retrieved(&self, key: RecordKey, what: String) -> Result<(), ServiceError> {
        let record = require(self.repo.find_unretrieved(&key).await?, &what)?;
        // A concurrent confirmation may have stamped the row since the lookup
        if !self.repo.mark_retrieved(record.id, Utc::now().naive_utc()).await? {
            return Err(ServiceError::not_found(&what));
        }
        info!(id = %record.id, barcode = ?record.item_barcode, "retrieval_confirmed");
        Ok(())
    }

    /// Queue a paged item that lives in remote storage.
    ///
    /// Returns the new record, or `None` when the event is not a page request
    /// or the item's location is not remote.
    #[instrument(skip(self, event), fields(hold_id = ?event.hold_id, status = ?event.item_status_name))]
    pub async fn process_moved_event(&self, event: &MovedEventRequest) -> Result<Option<retrieval_queue::Model>, ServiceError> {
        if !event.is_paged() {
            debug!("ignoring moved event that is not a page request");
            return Ok(None);
        }
        info!("process moved request");

        let barcode = event.item_bar_code.as_deref().unwrap_or_default();
        let item = require(
            self.inventory.item_by_barcode(barcode).await?,
            format!("Item with barcode {}", barcode),
        )?;
        let location_id = item.effective_location_id.as_deref().unwrap_or_default();
        let Some(mapping) = self.locations.mapping_for_location(location_id).await? else {
            debug!(%location_id, "item location is not remote");
            return Ok(None);
        };
        info!(configuration_id = %mapping.configuration_id, "item location is remote, saving retrieval queue record");

        let requester_id = event.requester_id.as_deref().unwrap_or_default();
        let patron = require(
            self.users.user_by_id(requester_id).await?,
            format!("User with id {}", requester_id),
        )?;
        let instance_id = item.instance_id.as_deref().unwrap_or_default();
        let instance = require(
            self.inventory.instance_by_id(instance_id).await?,
            format!("Instance with id {}", instance_id),
        )?;

        let record = self
            .repo
            .insert(moved_record(event, &item, &patron, &mapping, &instance))
            .await?;
        info!(id = %record.id, remote_storage_id = %record.remote_storage_id, "retrieval_queue_record_created");
        Ok(Some(record))
    }
}

fn moved_record(
    event: &MovedEventRequest,
    item: &Item,
    patron: &User,
    mapping: &LocationMapping,
    instance: &Instance,
) -> retrieval_queue::Model {
    retrieval_queue::Model {
        id: Uuid::new_v4(),
        hold_id: event.hold_id.clone(),
        item_barcode: event.item_bar_code.clone(),
        patron_barcode: patron.barcode.clone(),
        patron_name: patron.username.clone(),
        call_number: item.call_number(),
        instance_title: instance.title.clone(),
        instance_author: Some(instance.authors(MOVED_AUTHOR_SEPARATOR)),
        pickup_location: event.pickup_service_point_id.clone(),
        request_status: event.request_status.clone(),
        request_note: event.request_note.clone(),
        remote_storage_id: uuid_or_sentinel(&mapping.configuration_id),
        created_date_time: Utc::now().naive_utc(),
        retrieved_date_time: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::domain::{Contributor, EffectiveCallNumberComponents};
    use crate::clients::mock::MockUpstream;
    use crate::location::ConfiguredLocationMappings;
    use crate::retrieval::repository::mock::MockRetrievalQueueRepository;

    const REMOTE_LOCATION: &str = "53cf956f-c1df-410b-8bea-27f712cca7c0";
    const STORAGE_ID: &str = "de17bad7-2a30-4f1c-bee5-f653ded15629";

    struct Fixture {
        repo: Arc<MockRetrievalQueueRepository>,
        svc: RetrievalQueueService,
    }

    fn item(location: &str, with_call_number: bool) -> Item {
        Item {
            id: "item-1".into(),
            barcode: Some("645398607547".into()),
            instance_id: Some("instance-1".into()),
            holdings_record_id: Some("holdings-1".into()),
            effective_location_id: Some(location.into()),
            effective_call_number_components: with_call_number.then(|| EffectiveCallNumberComponents {
                call_number: Some("K1 .M44".into()),
                ..Default::default()
            }),
        }
    }

    fn upstream(item: Item) -> MockUpstream {
        MockUpstream::default()
            .with_item(item)
            .with_user(User {
                id: "user-1".into(),
                username: Some("jhandey".into()),
                barcode: Some("4028164".into()),
                personal: None,
            })
            .with_instance(Instance {
                id: "instance-1".into(),
                title: Some("Interesting Times".into()),
                contributors: vec![
                    Contributor { name: Some("Pratchett, Terry".into()) },
                    Contributor { name: None },
                    Contributor { name: Some("Kidby, Paul".into()) },
                ],
            })
    }

    fn fixture(upstream: MockUpstream) -> Fixture {
        let repo = Arc::new(MockRetrievalQueueRepository::default());
        let upstream = Arc::new(upstream);
        let locations = Arc::new(ConfiguredLocationMappings::new([LocationMapping {
            folio_location_id: REMOTE_LOCATION.into(),
            configuration_id: STORAGE_ID.into(),
        }]));
        let svc = RetrievalQueueService::new(repo.clone(), locations, upstream.clone(), upstream);
        Fixture { repo, svc }
    }

    fn paged_event() -> MovedEventRequest {
        MovedEventRequest {
            hold_id: Some("hold-1".into()),
            item_bar_code: Some("645398607547".into()),
            requester_id: Some("user-1".into()),
            pickup_service_point_id: Some("sp-1".into()),
            request_status: Some("Open - Not yet filled".into()),
            request_note: Some("note".into()),
            item_status_name: Some("Paged".into()),
        }
    }

    fn waiting(barcode: &str, storage: Uuid) -> retrieval_queue::Model {
        retrieval_queue::Model {
            id: Uuid::new_v4(),
            hold_id: None,
            item_barcode: Some(barcode.into()),
            patron_barcode: None,
            patron_name: None,
            call_number: None,
            instance_title: None,
            instance_author: None,
            pickup_location: None,
            request_status: None,
            request_note: None,
            remote_storage_id: storage,
            created_date_time: Utc::now().naive_utc(),
            retrieved_date_time: None,
        }
    }

    #[tokio::test]
    async fn paged_remote_item_creates_one_record() {
        let f = fixture(upstream(item(REMOTE_LOCATION, true)));
        let created = f.svc.process_moved_event(&paged_event()).await.unwrap().unwrap();

        let all = f.repo.all().await;
        assert_eq!(all, vec![created.clone()]);
        assert_eq!(created.hold_id.as_deref(), Some("hold-1"));
        assert_eq!(created.item_barcode.as_deref(), Some("645398607547"));
        assert_eq!(created.patron_barcode.as_deref(), Some("4028164"));
        assert_eq!(created.patron_name.as_deref(), Some("jhandey"));
        assert_eq!(created.call_number.as_deref(), Some("K1 .M44"));
        assert_eq!(created.instance_title.as_deref(), Some("Interesting Times"));
        assert_eq!(created.instance_author.as_deref(), Some("Pratchett, Terry;Kidby, Paul"));
        assert_eq!(created.pickup_location.as_deref(), Some("sp-1"));
        assert_eq!(created.request_status.as_deref(), Some("Open - Not yet filled"));
        assert_eq!(created.request_note.as_deref(), Some("note"));
        assert_eq!(created.remote_storage_id.to_string(), STORAGE_ID);
        assert!(created.retrieved_date_time.is_none());
    }

    #[tokio::test]
    async fn missing_call_number_components_leave_call_number_empty() {
        let f = fixture(upstream(item(REMOTE_LOCATION, false)));
        let created = f.svc.process_moved_event(&paged_event()).await.unwrap().unwrap();
        assert!(created.call_number.is_none());
    }

    #[tokio::test]
    async fn non_paged_events_are_ignored() {
        let f = fixture(upstream(item(REMOTE_LOCATION, true)));
        for status in [Some("Available"), Some("In transit"), Some("paged"), None] {
            let event = MovedEventRequest { item_status_name: status.map(str::to_string), ..paged_event() };
            assert!(f.svc.process_moved_event(&event).await.unwrap().is_none());
        }
        assert!(f.repo.all().await.is_empty());
    }

    #[tokio::test]
    async fn local_location_creates_nothing() {
        let f = fixture(upstream(item("main-library-stacks", true)));
        assert!(f.svc.process_moved_event(&paged_event()).await.unwrap().is_none());
        assert!(f.repo.all().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_barcode_is_not_found() {
        let f = fixture(upstream(item(REMOTE_LOCATION, true)));
        let event = MovedEventRequest { item_bar_code: Some("000".into()), ..paged_event() };
        let err = f.svc.process_moved_event(&event).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Item with barcode 000 not found"));
        assert!(f.repo.all().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_requester_is_not_found() {
        let f = fixture(upstream(item(REMOTE_LOCATION, true)));
        let event = MovedEventRequest { requester_id: Some("ghost".into()), ..paged_event() };
        let err = f.svc.process_moved_event(&event).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "User with id ghost not found"));
        assert!(f.repo.all().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_instance_is_not_found() {
        let mut orphan = item(REMOTE_LOCATION, true);
        orphan.instance_id = Some("instance-404".into());
        let f = fixture(upstream(orphan));
        let err = f.svc.process_moved_event(&paged_event()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Instance with id instance-404 not found"));
    }

    #[tokio::test]
    async fn mark_by_id_stamps_once() {
        let f = fixture(MockUpstream::default());
        let record = f.repo.insert(waiting("b-1", Uuid::new_v4())).await.unwrap();

        f.svc.mark_retrieved_by_id(record.id).await.unwrap();
        let stamped = f.repo.all().await[0].retrieved_date_time;
        assert!(stamped.is_some());

        let again = f.svc.mark_retrieved_by_id(record.id).await.unwrap_err();
        assert!(matches!(again, ServiceError::NotFound(_)));
        assert_eq!(f.repo.all().await[0].retrieved_date_time, stamped);
    }

    #[tokio::test]
    async fn mark_unknown_id_is_not_found() {
        let f = fixture(MockUpstream::default());
        let id = Uuid::new_v4();
        let err = f.svc.mark_retrieved_by_id(id).await.unwrap_err();
        assert_eq!(err.to_string(), format!("not found: Retrieval queue record with id {} not found", id));
    }

    #[tokio::test]
    async fn mark_by_barcode_takes_waiting_records_in_order() {
        let f = fixture(MockUpstream::default());
        let storage = Uuid::new_v4();
        let mut older = waiting("shared", storage);
        older.created_date_time -= chrono::Duration::hours(1);
        let older = f.repo.insert(older).await.unwrap();
        let newer = f.repo.insert(waiting("shared", storage)).await.unwrap();

        f.svc.mark_retrieved_by_barcode("shared").await.unwrap();
        let all = f.repo.all().await;
        assert!(all.iter().find(|r| r.id == older.id).unwrap().is_retrieved());
        assert!(!all.iter().find(|r| r.id == newer.id).unwrap().is_retrieved());

        f.svc.mark_retrieved_by_barcode("shared").await.unwrap();
        let err = f.svc.mark_retrieved_by_barcode("shared").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Retrieval queue record with item barcode shared not found"));
    }

    #[tokio::test]
    async fn list_filters_by_retrieved_flag_and_storage() {
        let f = fixture(MockUpstream::default());
        let storage = Uuid::new_v4();
        let other = Uuid::new_v4();
        let done = f.repo.insert(waiting("a", storage)).await.unwrap();
        f.svc.mark_retrieved_by_id(done.id).await.unwrap();
        f.repo.insert(waiting("b", storage)).await.unwrap();
        f.repo.insert(waiting("c", other)).await.unwrap();

        let all = f.svc.list_retrievals(&FilterCriteria::default()).await.unwrap();
        assert_eq!(all.total_records, 3);

        let retrieved = f.svc.list_retrievals(&FilterCriteria { retrieved: Some(true), ..Default::default() }).await.unwrap();
        assert_eq!(retrieved.total_records, 1);
        assert_eq!(retrieved.records[0].id, done.id);

        let waiting_here = f
            .svc
            .list_retrievals(&FilterCriteria {
                retrieved: Some(false),
                storage_id: Some(storage.to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(waiting_here.total_records, 1);
        assert_eq!(waiting_here.records[0].item_barcode.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn list_with_bad_storage_id_is_empty_not_error() {
        let f = fixture(MockUpstream::default());
        f.repo.insert(waiting("a", Uuid::new_v4())).await.unwrap();
        let page = f
            .svc
            .list_retrievals(&FilterCriteria { storage_id: Some("xyz".into()), ..Default::default() })
            .await
            .unwrap();
        assert!(page.records.is_empty());
        assert_eq!(page.total_records, 0);
    }

    #[tokio::test]
    async fn list_with_bad_date_fails() {
        let f = fixture(MockUpstream::default());
        let err = f
            .svc
            .list_retrievals(&FilterCriteria { created_date_time: Some("01/02/2021".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn list_matches_exact_creation_time_and_pages() {
        let f = fixture(MockUpstream::default());
        let storage = Uuid::new_v4();
        let mut records = Vec::new();
        for n in 0..5 {
            records.push(f.repo.insert(waiting(&format!("p{n}"), storage)).await.unwrap());
        }
        let created = records[2].created_date_time.format("%Y-%m-%dT%H:%M:%S%.f").to_string();
        let exact = f
            .svc
            .list_retrievals(&FilterCriteria { created_date_time: Some(created), ..Default::default() })
            .await
            .unwrap();
        assert!(exact.records.iter().all(|r| r.created_date_time == records[2].created_date_time));
        assert!(exact.records.iter().any(|r| r.id == records[2].id));

        let page = f
            .svc
            .list_retrievals(&FilterCriteria { offset: Some(3), limit: Some(10), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page.total_records, 5);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].id, records[3].id);
    }
}
