use osapi_core::{
    AliasDeleteReq, AliasDeleteResp, AliasExistsReq, AliasGetReq, AliasGetResp, AliasPutReq,
    AliasPutResp,
};

use crate::{ApiResponse, Client, Result};

/// The `_alias` endpoints.
pub struct Alias<'a> {
    client: &'a Client,
}

impl<'a> Alias<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn put(
        &self,
        req: &AliasPutReq,
    ) -> Result<ApiResponse<AliasPutResp>> {
        self.client.send(req).await
    }

    pub async fn get(
        &self,
        req: &AliasGetReq,
    ) -> Result<ApiResponse<AliasGetResp>> {
        self.client.send(req).await
    }

    /// `true` when every requested alias exists on the requested indices.
    pub async fn exists(
        &self,
        req: &AliasExistsReq,
    ) -> Result<ApiResponse<bool>> {
        self.client.exists(req).await
    }

    pub async fn delete(
        &self,
        req: &AliasDeleteReq,
    ) -> Result<ApiResponse<AliasDeleteResp>> {
        self.client.send(req).await
    }
}
