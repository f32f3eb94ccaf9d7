use utoipa::OpenApi;
use utoipa::ToSchema;

use crate::dto::{CheckInItemDoc, MovedEventDoc, RetrievalQueue, RetrievalQueues, ReturnItemResponseDoc};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::retrievals::list,
        crate::routes::retrievals::mark_by_id,
        crate::routes::retrievals::mark_by_barcode,
        crate::routes::returns::return_item,
        crate::routes::events::item_moved,
    ),
    components(
        schemas(
            HealthResponse,
            RetrievalQueue,
            RetrievalQueues,
            CheckInItemDoc,
            ReturnItemResponseDoc,
            MovedEventDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "retrievals"),
        (name = "returns"),
        (name = "events")
    )
)]
pub struct ApiDoc;
