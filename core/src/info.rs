//! Cluster root endpoint (`GET /`).

use serde::{Deserialize, Serialize};

use crate::{
    Endpoint, Method,
    params::{CommonParams, Query},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoReq {
    pub params: CommonParams,
}

impl validator::Validate for InfoReq {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        Ok(())
    }
}

impl Endpoint for InfoReq {
    const NAME: &'static str = "info";

    fn method(&self) -> Method {
        Method::Get
    }

    fn path(&self) -> Vec<String> {
        vec![]
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Query::new();
        self.params.apply(&mut query);
        query.into_pairs()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoResp {
    pub name: String,
    pub cluster_name: String,
    pub cluster_uuid: String,
    pub version: InfoVersion,
    pub tagline: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,
    pub number: String,
    pub build_type: String,
    pub build_hash: String,
    pub build_date: String,
    pub build_snapshot: bool,
    pub lucene_version: String,
    pub minimum_wire_compatibility_version: String,
    pub minimum_index_compatibility_version: String,
}
