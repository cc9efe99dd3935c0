//! Index lifecycle endpoints used to set up and tear down alias targets.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    Endpoint, Method, join,
    params::{CommonParams, IndexOptions, Query, Timeouts},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicesCreateParams {
    pub timeouts: Timeouts,
    pub wait_for_active_shards: Option<String>,
    pub common: CommonParams,
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct IndicesCreateReq {
    #[validate(
        length(min = 1, message = "an index name is required"),
        custom(function = "crate::non_blank_name")
    )]
    pub index: String,
    /// Settings, mappings and aliases, passed through as-is.
    pub body: Option<serde_json::Value>,
    pub params: IndicesCreateParams,
}

impl Endpoint for IndicesCreateReq {
    const NAME: &'static str = "indices.create";

    fn method(&self) -> Method {
        Method::Put
    }

    fn path(&self) -> Vec<String> {
        vec![self.index.clone()]
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Query::new();
        self.params.timeouts.apply(&mut query);
        query.str(
            "wait_for_active_shards",
            self.params.wait_for_active_shards.as_deref(),
        );
        self.params.common.apply(&mut query);
        query.into_pairs()
    }

    fn body(&self) -> Result<Option<Vec<u8>>, serde_json::Error> {
        self.body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicesCreateResp {
    pub acknowledged: bool,
    pub shards_acknowledged: bool,
    pub index: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicesDeleteParams {
    pub index: IndexOptions,
    pub timeouts: Timeouts,
    pub common: CommonParams,
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct IndicesDeleteReq {
    #[validate(
        length(min = 1, message = "at least one index is required"),
        custom(function = "crate::non_blank")
    )]
    pub indices: Vec<String>,
    pub params: IndicesDeleteParams,
}

impl Endpoint for IndicesDeleteReq {
    const NAME: &'static str = "indices.delete";

    fn method(&self) -> Method {
        Method::Delete
    }

    fn path(&self) -> Vec<String> {
        vec![join(&self.indices)]
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Query::new();
        self.params.index.apply(&mut query);
        self.params.timeouts.apply(&mut query);
        self.params.common.apply(&mut query);
        query.into_pairs()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicesDeleteResp {
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicesExistsParams {
    pub index: IndexOptions,
    pub local: Option<bool>,
    pub include_defaults: Option<bool>,
    pub common: CommonParams,
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct IndicesExistsReq {
    #[validate(
        length(min = 1, message = "at least one index is required"),
        custom(function = "crate::non_blank")
    )]
    pub indices: Vec<String>,
    pub params: IndicesExistsParams,
}

impl Endpoint for IndicesExistsReq {
    const NAME: &'static str = "indices.exists";

    fn method(&self) -> Method {
        Method::Head
    }

    fn path(&self) -> Vec<String> {
        vec![join(&self.indices)]
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Query::new();
        self.params.index.apply(&mut query);
        query
            .bool("local", self.params.local)
            .bool("include_defaults", self.params.include_defaults);
        self.params.common.apply(&mut query);
        query.into_pairs()
    }
}
