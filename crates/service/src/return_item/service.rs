use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use models::retrieval_queue;

use super::domain::{CheckInItem, ReturnItemResponse};
use crate::clients::domain::Request;
use crate::clients::{CheckInClient, InventoryClient, ItemRequestsClient};
use crate::errors::ServiceError;
use crate::retrieval::repository::RetrievalQueueRepository;

/// Contributor names of a requested item are joined with this.
pub const RETURN_AUTHOR_SEPARATOR: &str = "; ";

pub struct ReturnItemService {
    inventory: Arc<dyn InventoryClient>,
    requests: Arc<dyn ItemRequestsClient>,
    repo: Arc<dyn RetrievalQueueRepository>,
    check_in: Arc<dyn CheckInClient>,
}

impl ReturnItemService {
    pub fn new(
        inventory: Arc<dyn InventoryClient>,
        requests: Arc<dyn ItemRequestsClient>,
        repo: Arc<dyn RetrievalQueueRepository>,
        check_in: Arc<dyn CheckInClient>,
    ) -> Self {
        Self { inventory, requests, repo, check_in }
    }

    /// Check an item back into remote storage.
    ///
    /// When a hold or recall is waiting at queue position 1 the item goes
    /// straight into the retrieval queue for that patron before check-in.
    #[instrument(skip(self, item), fields(barcode = %item.item_barcode))]
    pub async fn return_item(&self, storage_configuration_id: Uuid, item: CheckInItem) -> Result<ReturnItemResponse, ServiceError> {
        info!("start return");
        let found = self
            .inventory
            .item_by_barcode(&item.item_barcode)
            .await?
            .ok_or_else(|| ServiceError::ItemReturn(format!("Item does not exist for barcode {}", item.item_barcode)))?;

        let mut response = ReturnItemResponse::default();
        let waiting: Vec<Request> = self
            .requests
            .outstanding_requests(&found.id)
            .await?
            .into_iter()
            .filter(|r| r.request_type.waits_for_item())
            .collect();
        if !waiting.is_empty() {
            response.hold_or_recall_exists = true;
        }
        if let Some(next) = waiting.iter().find(|r| r.position == Some(1)) {
            let record = self.repo.insert(return_record(next, storage_configuration_id)).await?;
            info!(id = %record.id, request_id = %next.id, "retrieval_queue_record_created");
            response.queued_record = Some(record.id);
        }

        self.check_in.check_in_by_barcode(storage_configuration_id, &item).await?;
        info!(hold_or_recall = response.hold_or_recall_exists, "return success");
        Ok(response)
    }
}

/// Build a queue record from the first waiting request, skipping whatever
/// parts of the request payload are missing.
fn return_record(request: &Request, storage_configuration_id: Uuid) -> retrieval_queue::Model {
    let mut record = retrieval_queue::Model {
        id: Uuid::new_v4(),
        hold_id: None,
        item_barcode: None,
        patron_barcode: None,
        patron_name: None,
        call_number: None,
        instance_title: None,
        instance_author: None,
        pickup_location: None,
        request_status: request.status.clone(),
        request_note: request.patron_comments.clone(),
        remote_storage_id: storage_configuration_id,
        created_date_time: Utc::now().naive_utc(),
        retrieved_date_time: None,
    };
    if let Some(item) = &request.item {
        record.hold_id = item.holdings_record_id.clone();
        record.item_barcode = item.barcode.clone();
        record.instance_title = item.title.clone();
        record.call_number = item.call_number.clone();
        record.instance_author = Some(
            item.contributor_names
                .iter()
                .filter_map(|c| c.name.as_deref())
                .collect::<Vec<_>>()
                .join(RETURN_AUTHOR_SEPARATOR),
        );
    }
    if let Some(requester) = &request.requester {
        record.patron_barcode = requester.barcode.clone();
        let name = [requester.first_name.as_deref(), requester.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        record.patron_name = (!name.is_empty()).then_some(name);
    }
    if let Some(point) = &request.pickup_service_point {
        record.pickup_location = point.pickup_location.map(|p| p.to_string());
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::domain::{ContributorName, Item, PickupServicePoint, RequestType, RequestedItem, Requester};
    use crate::clients::mock::MockUpstream;
    use crate::retrieval::repository::mock::MockRetrievalQueueRepository;

    const BARCODE: &str = "90000";

    struct Fixture {
        repo: Arc<MockRetrievalQueueRepository>,
        upstream: Arc<MockUpstream>,
        svc: ReturnItemService,
    }

    fn fixture(upstream: MockUpstream) -> Fixture {
        let repo = Arc::new(MockRetrievalQueueRepository::default());
        let upstream = Arc::new(upstream);
        let svc = ReturnItemService::new(upstream.clone(), upstream.clone(), repo.clone(), upstream.clone());
        Fixture { repo, upstream, svc }
    }

    fn stored_item() -> Item {
        Item { id: "item-9".into(), barcode: Some(BARCODE.into()), ..Default::default() }
    }

    fn request(request_type: RequestType, position: i32) -> Request {
        Request {
            id: format!("req-{position}"),
            request_type,
            status: Some("Open - Awaiting pickup".into()),
            position: Some(position),
            patron_comments: Some("leave at desk".into()),
            item: Some(RequestedItem {
                holdings_record_id: Some("holdings-9".into()),
                barcode: Some(BARCODE.into()),
                title: Some("The Colour of Magic".into()),
                call_number: Some("PR6066 .R34".into()),
                contributor_names: vec![
                    ContributorName { name: Some("Pratchett, Terry".into()) },
                    ContributorName { name: Some("Kirby, Josh".into()) },
                ],
            }),
            requester: Some(Requester {
                barcode: Some("patron-7".into()),
                first_name: Some("Rincewind".into()),
                last_name: Some("Wizzard".into()),
            }),
            pickup_service_point: Some(PickupServicePoint { name: Some("Circ Desk 1".into()), pickup_location: Some(true) }),
        }
    }

    fn check_in() -> CheckInItem {
        CheckInItem { item_barcode: BARCODE.into(), service_point_id: None }
    }

    #[tokio::test]
    async fn unknown_barcode_is_a_return_error() {
        let f = fixture(MockUpstream::default());
        let err = f.svc.return_item(Uuid::new_v4(), check_in()).await.unwrap_err();
        assert!(matches!(err, ServiceError::ItemReturn(ref m) if m == "Item does not exist for barcode 90000"));
        assert!(f.upstream.check_ins().await.is_empty());
    }

    #[tokio::test]
    async fn no_requests_still_checks_in() {
        let f = fixture(MockUpstream::default().with_item(stored_item()));
        let storage = Uuid::new_v4();
        let resp = f.svc.return_item(storage, check_in()).await.unwrap();
        assert!(!resp.hold_or_recall_exists);
        assert!(resp.queued_record.is_none());
        assert!(f.repo.all().await.is_empty());
        assert_eq!(f.upstream.check_ins().await, vec![(storage, check_in())]);
    }

    #[tokio::test]
    async fn first_hold_creates_record() {
        let f = fixture(
            MockUpstream::default()
                .with_item(stored_item())
                .with_requests("item-9", vec![request(RequestType::Hold, 1), request(RequestType::Hold, 2)]),
        );
        let storage = Uuid::new_v4();
        let resp = f.svc.return_item(storage, check_in()).await.unwrap();
        assert!(resp.hold_or_recall_exists);

        let all = f.repo.all().await;
        assert_eq!(all.len(), 1);
        let r = &all[0];
        assert!(!r.id.is_nil());
        assert_eq!(resp.queued_record, Some(r.id));
        assert_eq!(r.hold_id.as_deref(), Some("holdings-9"));
        assert_eq!(r.item_barcode.as_deref(), Some(BARCODE));
        assert_eq!(r.instance_title.as_deref(), Some("The Colour of Magic"));
        assert_eq!(r.call_number.as_deref(), Some("PR6066 .R34"));
        assert_eq!(r.instance_author.as_deref(), Some("Pratchett, Terry; Kirby, Josh"));
        assert_eq!(r.patron_barcode.as_deref(), Some("patron-7"));
        assert_eq!(r.patron_name.as_deref(), Some("Rincewind Wizzard"));
        assert_eq!(r.pickup_location.as_deref(), Some("true"));
        assert_eq!(r.request_status.as_deref(), Some("Open - Awaiting pickup"));
        assert_eq!(r.request_note.as_deref(), Some("leave at desk"));
        assert_eq!(r.remote_storage_id, storage);
        assert!(r.retrieved_date_time.is_none());
        assert_eq!(f.upstream.check_ins().await.len(), 1);
    }

    #[tokio::test]
    async fn recall_not_at_front_only_sets_flag() {
        let f = fixture(
            MockUpstream::default()
                .with_item(stored_item())
                .with_requests("item-9", vec![request(RequestType::Page, 1), request(RequestType::Recall, 2)]),
        );
        let resp = f.svc.return_item(Uuid::new_v4(), check_in()).await.unwrap();
        assert!(resp.hold_or_recall_exists);
        assert!(resp.queued_record.is_none());
        assert!(f.repo.all().await.is_empty());
    }

    #[tokio::test]
    async fn page_requests_do_not_count() {
        let f = fixture(
            MockUpstream::default()
                .with_item(stored_item())
                .with_requests("item-9", vec![request(RequestType::Page, 1)]),
        );
        let resp = f.svc.return_item(Uuid::new_v4(), check_in()).await.unwrap();
        assert!(!resp.hold_or_recall_exists);
        assert!(f.repo.all().await.is_empty());
    }

    #[tokio::test]
    async fn partial_request_payload_is_tolerated() {
        let mut bare = request(RequestType::Recall, 1);
        bare.item = None;
        bare.requester = None;
        bare.pickup_service_point = None;
        let f = fixture(MockUpstream::default().with_item(stored_item()).with_requests("item-9", vec![bare]));
        let storage = Uuid::new_v4();
        f.svc.return_item(storage, check_in()).await.unwrap();

        let all = f.repo.all().await;
        assert_eq!(all.len(), 1);
        assert!(all[0].item_barcode.is_none());
        assert!(all[0].patron_name.is_none());
        assert!(all[0].pickup_location.is_none());
        assert_eq!(all[0].remote_storage_id, storage);
    }

    #[tokio::test]
    async fn check_in_failure_propagates() {
        let f = fixture(MockUpstream::default().with_item(stored_item()).failing_check_in());
        let err = f.svc.return_item(Uuid::new_v4(), check_in()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Upstream(_)));
    }

    #[test]
    fn record_ids_are_fresh() {
        let req = request(RequestType::Hold, 1);
        let storage = Uuid::new_v4();
        assert_ne!(return_record(&req, storage).id, return_record(&req, storage).id);
    }
}
