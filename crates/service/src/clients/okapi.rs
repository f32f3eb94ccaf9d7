use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::domain::{Instance, Item, Request, ResultList, User};
use super::{CheckInClient, InventoryClient, ItemRequestsClient, UsersClient};
use crate::errors::ServiceError;
use crate::return_item::domain::CheckInItem;

const TENANT_HEADER: &str = "x-okapi-tenant";
const TOKEN_HEADER: &str = "x-okapi-token";
const REQUESTS_PAGE_LIMIT: u32 = 1000;

/// HTTP client for the platform gateway. One instance serves every
/// upstream trait; it is cheap to clone and share.
#[derive(Clone)]
pub struct OkapiClient {
    http: reqwest::Client,
    base_url: String,
    tenant: String,
    token: Option<String>,
    default_service_point: Option<Uuid>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckInRequest<'a> {
    item_barcode: &'a str,
    service_point_id: Uuid,
    check_in_date: String,
}

impl OkapiClient {
    pub fn new(base_url: &str, tenant: &str, token: Option<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tenant: tenant.to_string(),
            token,
            default_service_point: None,
        })
    }

    pub fn from_config(cfg: &configs::OkapiConfig) -> Result<Self, ServiceError> {
        let client = Self::new(&cfg.url, &cfg.tenant, cfg.token.clone(), Duration::from_secs(cfg.timeout_secs))?;
        match cfg.check_in_service_point_id.as_deref() {
            Some(sp) => {
                let sp = Uuid::parse_str(sp.trim())
                    .map_err(|e| ServiceError::Validation(format!("check-in service point '{}': {}", sp, e)))?;
                Ok(client.with_default_service_point(sp))
            }
            None => Ok(client),
        }
    }

    /// Service point sent with check-ins whose item does not name one.
    pub fn with_default_service_point(mut self, service_point_id: Uuid) -> Self {
        self.default_service_point = Some(service_point_id);
        self
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(TENANT_HEADER, &self.tenant);
        match &self.token {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }

    async fn query<T: DeserializeOwned>(&self, path: &str, cql: &str, limit: u32) -> Result<ResultList<T>, ServiceError> {
        debug!(%path, %cql, "okapi_query");
        let resp = self
            .request(Method::GET, path)
            .query(&[("query", cql.to_string()), ("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))?
            .error_for_status()
            .map_err(|e| ServiceError::Upstream(e.to_string()))?;
        resp.json::<ResultList<T>>()
            .await
            .map_err(|e| ServiceError::Upstream(format!("cannot parse {} response: {}", path, e)))
    }
}

/// `field=="value"` with the value quoted for CQL.
pub(crate) fn cql_exact(field: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("{}==\"{}\"", field, escaped)
}

#[async_trait]
impl InventoryClient for OkapiClient {
    #[instrument(skip(self))]
    async fn item_by_barcode(&self, barcode: &str) -> Result<Option<Item>, ServiceError> {
        let items = self.query::<Item>("/inventory/items", &cql_exact("barcode", barcode), 1).await?;
        Ok(items.into_first())
    }

    #[instrument(skip(self))]
    async fn instance_by_id(&self, instance_id: &str) -> Result<Option<Instance>, ServiceError> {
        let instances = self.query::<Instance>("/inventory/instances", &cql_exact("id", instance_id), 1).await?;
        Ok(instances.into_first())
    }
}

#[async_trait]
impl UsersClient for OkapiClient {
    #[instrument(skip(self))]
    async fn user_by_id(&self, user_id: &str) -> Result<Option<User>, ServiceError> {
        let users = self.query::<User>("/users", &cql_exact("id", user_id), 1).await?;
        Ok(users.into_first())
    }
}

#[async_trait]
impl ItemRequestsClient for OkapiClient {
    #[instrument(skip(self))]
    async fn outstanding_requests(&self, item_id: &str) -> Result<Vec<Request>, ServiceError> {
        let cql = format!("{} and status=\"Open*\" sortby position", cql_exact("itemId", item_id));
        let requests = self.query::<Request>("/circulation/requests", &cql, REQUESTS_PAGE_LIMIT).await?;
        Ok(requests.result)
    }
}

#[async_trait]
impl CheckInClient for OkapiClient {
    #[instrument(skip(self, item), fields(barcode = %item.item_barcode))]
    async fn check_in_by_barcode(&self, storage_configuration_id: Uuid, item: &CheckInItem) -> Result<(), ServiceError> {
        // Check-in by barcode is refused upstream without a service point
        let service_point_id = item.service_point_id.or(self.default_service_point).ok_or_else(|| {
            ServiceError::Validation(format!(
                "servicePointId is required to check in item {} for storage {}",
                item.item_barcode, storage_configuration_id
            ))
        })?;
        let body = CheckInRequest {
            item_barcode: &item.item_barcode,
            service_point_id,
            check_in_date: Utc::now().to_rfc3339(),
        };
        self.request(Method::POST, "/circulation/check-in-by-barcode")
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::Upstream(e.to_string()))?
            .error_for_status()
            .map_err(|e| ServiceError::Upstream(format!("check-in for storage {} failed: {}", storage_configuration_id, e)))?;
        Ok(())
    }
}
