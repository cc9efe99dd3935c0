//! Alias conformance scenarios, runnable against the in-memory mock or a
//! live cluster.

use std::fmt;

use osapi_client::{
    ApiResponse, Client, Error, Inspect, Inspectable,
    core::{
        AliasDeleteReq, AliasDeleteResp, AliasExistsReq, AliasGetReq, AliasGetResp, AliasPutReq,
        AliasPutResp, IndicesCreateReq, IndicesDeleteReq,
    },
};
use osapi_testing::{
    FailingClient, MockOpenSearch, compare_raw_json_with_parsed_json, create_failing_client,
    logging, verify_inspect,
};

pub const INDEX: &str = "test-index-test";
pub const ALIAS: &str = "test-alias-test";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Put,
    Get,
    Exists,
    Delete,
}

impl Category {
    pub const ALL: [Self; 4] = [Self::Put, Self::Get, Self::Exists, Self::Delete];

    pub fn sub_cases(self) -> &'static [SubCase] {
        match self {
            Self::Get => &[SubCase::WithRequest, SubCase::WithoutIndices, SubCase::Inspect],
            _ => &[SubCase::WithRequest, SubCase::Inspect],
        }
    }

    /// Whether a successful result has a body worth comparing to the raw JSON.
    /// Get carries free-form alias metadata and exists has no body at all.
    pub fn compares_body(self) -> bool {
        matches!(self, Self::Put | Self::Delete)
    }
}

impl fmt::Display for Category {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::Put => "Put",
            Self::Get => "Get",
            Self::Exists => "Exists",
            Self::Delete => "Delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubCase {
    WithRequest,
    WithoutIndices,
    Inspect,
}

impl fmt::Display for SubCase {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::WithRequest => "with request",
            Self::WithoutIndices => "with request without indices",
            Self::Inspect => "inspect",
        };
        f.write_str(name)
    }
}

/// Whatever a scenario call returned on success.
#[derive(Debug)]
pub enum Outcome {
    Put(ApiResponse<AliasPutResp>),
    Get(ApiResponse<AliasGetResp>),
    Exists(ApiResponse<bool>),
    Delete(ApiResponse<AliasDeleteResp>),
}

impl Inspectable for Outcome {
    fn inspect(&self) -> Inspect<'_> {
        match self {
            Self::Put(it) => it.inspect(),
            Self::Get(it) => it.inspect(),
            Self::Exists(it) => it.inspect(),
            Self::Delete(it) => it.inspect(),
        }
    }
}

fn names(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

/// A working client plus the failing one used by `inspect` cases.
pub struct Harness {
    pub client: Client,
    pub failing: FailingClient,
    pub mock: Option<MockOpenSearch>,
}

impl Harness {
    pub fn mock() -> Self {
        logging();
        let mock = MockOpenSearch::start();
        Self {
            client: mock.client(),
            failing: create_failing_client(),
            mock: Some(mock),
        }
    }

    pub fn live(client: Client) -> Self {
        logging();
        Self {
            client,
            failing: create_failing_client(),
            mock: None,
        }
    }

    pub async fn create_index(&self) -> Result<(), Error> {
        self.client
            .indices()
            .create(&IndicesCreateReq {
                index: INDEX.into(),
                ..Default::default()
            })
            .await?;
        Ok(())
    }

    pub async fn put_alias(&self) -> Result<(), Error> {
        self.client
            .alias()
            .put(&put_req())
            .await?;
        Ok(())
    }

    /// Brings the cluster into the state `category` expects when run alone.
    pub async fn prepare(
        &self,
        category: Category,
    ) -> Result<(), Error> {
        self.create_index().await?;
        if category != Category::Put {
            self.put_alias().await?;
        }
        Ok(())
    }

    pub async fn run(
        &self,
        category: Category,
        sub: SubCase,
    ) -> Result<Outcome, Error> {
        let client = match sub {
            SubCase::Inspect => &self.failing.client,
            _ => &self.client,
        };
        let indices = match sub {
            SubCase::WithoutIndices => vec![],
            _ => names(INDEX),
        };
        tracing::debug!(%category, %sub, "running alias case");

        let alias = client.alias();
        Ok(match category {
            Category::Put => Outcome::Put(alias.put(&put_req()).await?),
            Category::Get => {
                Outcome::Get(
                    alias
                        .get(&AliasGetReq {
                            indices,
                            alias: names(ALIAS),
                            ..Default::default()
                        })
                        .await?,
                )
            },
            Category::Exists => {
                Outcome::Exists(
                    alias
                        .exists(&AliasExistsReq {
                            indices,
                            alias: names(ALIAS),
                            ..Default::default()
                        })
                        .await?,
                )
            },
            Category::Delete => {
                Outcome::Delete(
                    alias
                        .delete(&AliasDeleteReq {
                            indices,
                            alias: names(ALIAS),
                            ..Default::default()
                        })
                        .await?,
                )
            },
        })
    }

    /// Removes the index and the alias, ignoring whatever is already gone.
    pub async fn cleanup(&self) {
        let _ = self
            .client
            .indices()
            .delete(&IndicesDeleteReq {
                indices: names(INDEX),
                ..Default::default()
            })
            .await;
        let _ = self
            .client
            .alias()
            .delete(&AliasDeleteReq {
                alias: names(ALIAS),
                ..Default::default()
            })
            .await;
    }

    /// Every category and sub-case in order against one shared index.
    pub async fn run_sequence(&self) {
        self.cleanup().await;
        self.create_index()
            .await
            .expect("create test index");

        for category in Category::ALL {
            for sub in category.sub_cases() {
                let result = self.run(category, *sub).await;
                check(category, *sub, &result);
            }
        }

        self.cleanup().await;
    }
}

fn put_req() -> AliasPutReq {
    AliasPutReq {
        indices: names(INDEX),
        alias: ALIAS.into(),
        ..Default::default()
    }
}

/// Asserts the outcome of one case.
///
/// `inspect` cases must fail with the failing endpoint's response attached;
/// every other case must succeed with its raw response attached.
pub fn check(
    category: Category,
    sub: SubCase,
    result: &Result<Outcome, Error>,
) {
    match (sub, result) {
        (SubCase::Inspect, Err(err)) => {
            verify_inspect(err.inspect(), category != Category::Exists);
        },
        (SubCase::Inspect, Ok(outcome)) => {
            panic!("{category}/{sub}: expected failure, got {outcome:?}")
        },
        (_, Err(err)) => panic!("{category}/{sub}: {err}"),
        (_, Ok(outcome)) => {
            assert!(
                outcome.inspect().response.is_some(),
                "{category}/{sub}: missing raw response"
            );
            if category.compares_body() {
                match outcome {
                    Outcome::Put(resp) => compare_raw_json_with_parsed_json(resp),
                    Outcome::Delete(resp) => compare_raw_json_with_parsed_json(resp),
                    _ => {},
                }
            }
        },
    }
}
