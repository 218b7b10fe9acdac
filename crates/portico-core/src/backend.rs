// ── Backend seam ──
//
// The narrow I/O surface the controller and queries need. `ResourceClient`
// is the production implementation; tests script their own.

use futures::future::BoxFuture;
use portico_api::{Page, ResourceClient};
use serde_json::Value;
use tracing::debug;

use crate::command::Mutation;
use crate::error::CoreError;
use crate::form::format_datetime;
use crate::list::RequestParams;
use crate::model::{EntityId, Transition};

/// Untyped access to resource collections. Records stay as JSON here and
/// are decoded by whoever knows the entity type.
pub trait Backend: Send + Sync + 'static {
    fn list<'a>(
        &'a self,
        path: &'a str,
        params: &'a RequestParams,
    ) -> BoxFuture<'a, Result<Page<Value>, CoreError>>;

    fn get<'a>(&'a self, path: &'a str, id: &'a EntityId)
    -> BoxFuture<'a, Result<Value, CoreError>>;

    /// Apply one write. `None` when the server answered without a body.
    fn mutate<'a>(
        &'a self,
        path: &'a str,
        mutation: &'a Mutation,
    ) -> BoxFuture<'a, Result<Option<Value>, CoreError>>;
}

impl Backend for ResourceClient {
    fn list<'a>(
        &'a self,
        path: &'a str,
        params: &'a RequestParams,
    ) -> BoxFuture<'a, Result<Page<Value>, CoreError>> {
        Box::pin(async move {
            debug!(path, query = %params, "list");
            Ok(ResourceClient::list(self, path, params.pairs()).await?)
        })
    }

    fn get<'a>(
        &'a self,
        path: &'a str,
        id: &'a EntityId,
    ) -> BoxFuture<'a, Result<Value, CoreError>> {
        Box::pin(async move { Ok(ResourceClient::get(self, path, &id.to_string()).await?) })
    }

    fn mutate<'a>(
        &'a self,
        path: &'a str,
        mutation: &'a Mutation,
    ) -> BoxFuture<'a, Result<Option<Value>, CoreError>> {
        Box::pin(async move {
            let result = match mutation {
                Mutation::Create(body) => self.create(path, body).await?,
                Mutation::Update { id, body } => {
                    self.update(path, &id.to_string(), body).await?
                }
                Mutation::Delete { id } => {
                    self.delete(path, &id.to_string()).await?;
                    None
                }
                Mutation::Transition { id, transition } => {
                    let id = id.to_string();
                    match transition {
                        Transition::Publish { at } => {
                            self.publish(path, &id, at.as_ref().map(format_datetime))
                                .await?
                        }
                        Transition::Pin { order } => self.pin(path, &id, *order).await?,
                        Transition::Unpin => self.unpin(path, &id).await?,
                        Transition::Archive => self.archive(path, &id).await?,
                    }
                }
            };
            Ok(result)
        })
    }
}
