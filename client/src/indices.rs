use osapi_core::{
    IndicesCreateReq, IndicesCreateResp, IndicesDeleteReq, IndicesDeleteResp, IndicesExistsReq,
};

use crate::{Alias, ApiResponse, Client, Result};

/// Index lifecycle endpoints.
pub struct Indices<'a> {
    client: &'a Client,
}

impl<'a> Indices<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn alias(&self) -> Alias<'a> {
        Alias::new(self.client)
    }

    pub async fn create(
        &self,
        req: &IndicesCreateReq,
    ) -> Result<ApiResponse<IndicesCreateResp>> {
        self.client.send(req).await
    }

    pub async fn delete(
        &self,
        req: &IndicesDeleteReq,
    ) -> Result<ApiResponse<IndicesDeleteResp>> {
        self.client.send(req).await
    }

    pub async fn exists(
        &self,
        req: &IndicesExistsReq,
    ) -> Result<ApiResponse<bool>> {
        self.client.exists(req).await
    }
}
