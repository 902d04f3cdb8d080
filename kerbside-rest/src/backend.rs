use std::future::Future;

use kerbside_core::{Bin, NewBin, Priority, SyncFailure, SyncRequest, SyncResponse};

use crate::client::BinsClient;
use crate::error::RestError;

/// Backend operations the bin map depends on.
///
/// Each call is independent: implementations must not let one call's
/// failure affect another in flight.
pub trait BinBackend: Send + Sync {
    type Error: std::error::Error + Into<SyncFailure> + Send + Sync + 'static;

    fn list_bins(&self) -> impl Future<Output = Result<Vec<Bin>, Self::Error>> + Send;
    fn create_bin(&self, new: &NewBin) -> impl Future<Output = Result<Bin, Self::Error>> + Send;
    fn delete_bin(&self, id: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;
    fn update_priority(
        &self,
        id: &str,
        priority: Priority,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Runs a bin map request and maps the result into a [`SyncResponse`].
    fn execute(
        &self,
        request: SyncRequest,
    ) -> impl Future<Output = Result<SyncResponse, SyncFailure>> + Send {
        async move {
            let response = match request {
                SyncRequest::ListBins => self.list_bins().await.map(SyncResponse::Listed),
                SyncRequest::CreateBin(new) => self.create_bin(&new).await.map(SyncResponse::Created),
                SyncRequest::DeleteBin(id) => {
                    let result = self.delete_bin(&id).await;
                    result.map(|()| SyncResponse::Deleted(id))
                }
                SyncRequest::UpdatePriority { id, priority } => {
                    let result = self.update_priority(&id, priority).await;
                    result.map(|()| SyncResponse::PriorityUpdated { id, priority })
                }
            };
            response.map_err(Into::into)
        }
    }
}

impl BinBackend for BinsClient {
    type Error = RestError;

    async fn list_bins(&self) -> Result<Vec<Bin>, Self::Error> {
        BinsClient::list_bins(self).await
    }

    async fn create_bin(&self, new: &NewBin) -> Result<Bin, Self::Error> {
        BinsClient::create_bin(self, new).await
    }

    async fn delete_bin(&self, id: &str) -> Result<(), Self::Error> {
        BinsClient::delete_bin(self, id).await
    }

    async fn update_priority(&self, id: &str, priority: Priority) -> Result<(), Self::Error> {
        BinsClient::update_priority(self, id, priority).await
    }
}
