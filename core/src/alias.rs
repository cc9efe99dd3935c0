//! Alias endpoints: `_alias` put, get, exists and delete.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    Endpoint, Method, join,
    params::{CommonParams, IndexOptions, Query, Timeouts},
};

/// Builds `/{indices}/_alias/{aliases}`, dropping the parts that are empty.
fn alias_path(
    indices: &[String],
    aliases: &[String],
) -> Vec<String> {
    let mut path = Vec::with_capacity(3);
    if !indices.is_empty() {
        path.push(join(indices));
    }
    path.push("_alias".to_string());
    if !aliases.is_empty() {
        path.push(join(aliases));
    }
    path
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasPutParams {
    pub timeouts: Timeouts,
    pub common: CommonParams,
}

/// Optional alias properties sent as the put body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AliasPutBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_routing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_routing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_write_index: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
}

/// Points `alias` at every index in `indices`.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct AliasPutReq {
    #[validate(
        length(min = 1, message = "at least one index is required"),
        custom(function = "crate::non_blank")
    )]
    pub indices: Vec<String>,
    #[validate(
        length(min = 1, message = "an alias name is required"),
        custom(function = "crate::non_blank_name")
    )]
    pub alias: String,
    pub body: Option<AliasPutBody>,
    pub params: AliasPutParams,
}

impl Endpoint for AliasPutReq {
    const NAME: &'static str = "indices.put_alias";

    fn method(&self) -> Method {
        Method::Put
    }

    fn path(&self) -> Vec<String> {
        vec![join(&self.indices), "_alias".into(), self.alias.clone()]
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Query::new();
        self.params.timeouts.apply(&mut query);
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
pub struct AliasPutResp {
    pub acknowledged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasGetParams {
    pub index: IndexOptions,
    pub local: Option<bool>,
    pub common: CommonParams,
}

impl AliasGetParams {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Query::new();
        self.index.apply(&mut query);
        query.bool("local", self.local);
        self.common.apply(&mut query);
        query.into_pairs()
    }
}

/// Exists takes the same options as get.
pub type AliasExistsParams = AliasGetParams;

/// Lists aliases, optionally narrowed to `indices` and alias names.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct AliasGetReq {
    #[validate(custom(function = "crate::non_blank"))]
    pub indices: Vec<String>,
    #[validate(custom(function = "crate::non_blank"))]
    pub alias: Vec<String>,
    pub params: AliasGetParams,
}

impl Endpoint for AliasGetReq {
    const NAME: &'static str = "indices.get_alias";

    fn method(&self) -> Method {
        Method::Get
    }

    fn path(&self) -> Vec<String> {
        alias_path(&self.indices, &self.alias)
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.params.query()
    }
}

/// Aliases of a single index, keyed by alias name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexAliases {
    #[serde(default)]
    pub aliases: BTreeMap<String, serde_json::Value>,
}

/// Body of a get alias call: index name to its aliases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasGetResp {
    pub indices: BTreeMap<String, IndexAliases>,
}

impl AliasGetResp {
    pub fn contains(
        &self,
        index: &str,
        alias: &str,
    ) -> bool {
        self.indices
            .get(index)
            .is_some_and(|it| it.aliases.contains_key(alias))
    }

    /// Indices the alias points at.
    pub fn indices_for<'a>(
        &'a self,
        alias: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.indices
            .iter()
            .filter(move |(_, it)| it.aliases.contains_key(alias))
            .map(|(index, _)| index.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct AliasExistsReq {
    #[validate(custom(function = "crate::non_blank"))]
    pub indices: Vec<String>,
    #[validate(custom(function = "crate::non_blank"))]
    pub alias: Vec<String>,
    pub params: AliasExistsParams,
}

impl Endpoint for AliasExistsReq {
    const NAME: &'static str = "indices.exists_alias";

    fn method(&self) -> Method {
        Method::Head
    }

    fn path(&self) -> Vec<String> {
        alias_path(&self.indices, &self.alias)
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.params.query()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasDeleteParams {
    pub timeouts: Timeouts,
    pub common: CommonParams,
}

/// Removes aliases. No indices means every index (`_all`).
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct AliasDeleteReq {
    #[validate(custom(function = "crate::non_blank"))]
    pub indices: Vec<String>,
    #[validate(
        length(min = 1, message = "at least one alias is required"),
        custom(function = "crate::non_blank")
    )]
    pub alias: Vec<String>,
    pub params: AliasDeleteParams,
}

impl Endpoint for AliasDeleteReq {
    const NAME: &'static str = "indices.delete_alias";

    fn method(&self) -> Method {
        Method::Delete
    }

    fn path(&self) -> Vec<String> {
        let indices = if self.indices.is_empty() {
            "_all".to_string()
        } else {
            join(&self.indices)
        };
        vec![indices, "_alias".into(), join(&self.alias)]
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Query::new();
        self.params.timeouts.apply(&mut query);
        self.params.common.apply(&mut query);
        query.into_pairs()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDeleteResp {
    pub acknowledged: bool,
}
