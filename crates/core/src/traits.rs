use crate::analytics::AnalyticsEvent;
use crate::models::{GenericResultItem, QueryDescriptor};
use crate::SearchError;
use async_trait::async_trait;
use uuid::Uuid;

/// One page request as seen by a fetcher.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub request_id: Uuid,
    pub descriptor: QueryDescriptor,
}

#[async_trait]
pub trait ResultFetcher {
    type Payload: Send;

    async fn fetch(&self, request: &FetchRequest) -> Result<Self::Payload, SearchError>;
}

pub trait ResultTransformer {
    type Payload;

    fn transform(&self, payload: &Self::Payload) -> Vec<GenericResultItem>;
}

/// Fire-and-forget sink. Delivery failures stay inside the sink.
pub trait AnalyticsSink {
    fn emit(&self, event: AnalyticsEvent);
}
