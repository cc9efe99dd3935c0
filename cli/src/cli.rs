use std::process::ExitCode;

use osapi_client::{
    ApiResponse, Client, Config,
    core::{
        AliasDeleteReq, AliasExistsReq, AliasGetReq, AliasPutBody, AliasPutReq, IndicesCreateReq,
        IndicesDeleteReq, IndicesExistsReq, InfoReq,
    },
};
use serde::Serialize;
use url::Url;

#[derive(Default, clap::ValueEnum, Clone, Debug)]
pub enum LogLevel {
    Debug,
    Trace,
    #[default]
    Info,
    Error,
    Warn,
}

impl From<LogLevel> for tracing::Level {
    fn from(val: LogLevel) -> Self {
        match val {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
        }
    }
}

fn parse_json(s: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(s).map_err(|e| e.to_string())
}

#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "osapi", version)]
pub struct Cli {
    #[clap(
        long,
        global = true,
        default_value = "error",
        env = "LOG_LEVEL",
        help = "the verbosity level to print logs at."
    )]
    pub log_level: LogLevel,

    #[clap(
        short = 'c',
        long = "config",
        global = true,
        help = "the directory holding `osapi.toml`."
    )]
    config_dir: Option<String>,

    #[clap(
        short = 'a',
        long = "address",
        global = true,
        help = "a cluster address; repeat for several. overrides the config."
    )]
    addresses: Vec<Url>,

    #[clap(subcommand)]
    command: Command,
}

impl Cli {
    pub fn config(&self) -> crate::Result<Config> {
        let mut config = Config::load(self.config_dir.as_deref())?;
        if !self.addresses.is_empty() {
            config.addresses = self.addresses.clone();
        }
        Ok(config)
    }

    pub async fn run(self) -> crate::Result<ExitCode> {
        let client = Client::new(&self.config()?)?;

        match self.command {
            Command::Info => print(&client.info(&InfoReq::default()).await?),
            Command::Index { command } => {
                let indices = client.indices();
                match command {
                    IndexCommand::Create(args) => print(&indices.create(&args.request()).await?),
                    IndexCommand::Delete(args) => print(&indices.delete(&args.request()).await?),
                    IndexCommand::Exists(args) => {
                        Ok(exists(&indices.exists(&args.into()).await?))
                    },
                }
            },
            Command::Alias { command } => {
                let alias = client.alias();
                match command {
                    AliasCommand::Put(args) => print(&alias.put(&args.request()).await?),
                    AliasCommand::Get(args) => print(&alias.get(&args.request()).await?),
                    AliasCommand::Exists(args) => {
                        Ok(exists(&alias.exists(&args.into()).await?))
                    },
                    AliasCommand::Delete(args) => print(&alias.delete(&args.request()).await?),
                }
            },
        }
    }
}

fn print<T: Serialize>(resp: &ApiResponse<T>) -> crate::Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(resp.body())?);
    Ok(ExitCode::SUCCESS)
}

fn exists(resp: &ApiResponse<bool>) -> ExitCode {
    println!("{}", resp.body());
    if *resp.body() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[derive(clap::Subcommand, Debug, Clone)]
enum Command {
    /// prints the cluster's root information
    Info,

    #[clap(alias = "i")]
    /// index sub commands
    Index {
        #[clap(subcommand)]
        command: IndexCommand,
    },

    #[clap(alias = "a")]
    /// alias sub commands
    Alias {
        #[clap(subcommand)]
        command: AliasCommand,
    },
}

#[derive(clap::Subcommand, Debug, Clone)]
enum IndexCommand {
    /// creates an index
    Create(IndexCreateArgs),
    /// deletes indices
    Delete(IndexNamesArgs),
    /// checks whether indices exist
    Exists(IndexNamesArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct IndexCreateArgs {
    #[clap(help = "the name of the index to create.")]
    index: String,

    #[clap(
        long,
        value_parser = parse_json,
        help = "settings, mappings and aliases as JSON."
    )]
    body: Option<serde_json::Value>,
}

impl IndexCreateArgs {
    fn request(self) -> IndicesCreateReq {
        IndicesCreateReq {
            index: self.index,
            body: self.body,
            ..Default::default()
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
struct IndexNamesArgs {
    #[clap(required = true, help = "index names or patterns.")]
    indices: Vec<String>,
}

impl IndexNamesArgs {
    fn request(self) -> IndicesDeleteReq {
        IndicesDeleteReq {
            indices: self.indices,
            ..Default::default()
        }
    }
}

impl From<IndexNamesArgs> for IndicesExistsReq {
    fn from(args: IndexNamesArgs) -> Self {
        Self {
            indices: args.indices,
            ..Default::default()
        }
    }
}

#[derive(clap::Subcommand, Debug, Clone)]
enum AliasCommand {
    /// points an alias at indices
    Put(AliasPutArgs),
    /// lists aliases
    Get(AliasNamesArgs),
    /// checks whether aliases exist
    Exists(AliasNamesArgs),
    /// removes aliases
    Delete(AliasDeleteArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct AliasPutArgs {
    #[clap(
        short = 'i',
        long = "index",
        required = true,
        help = "an index the alias points at; repeat for several."
    )]
    indices: Vec<String>,

    #[clap(help = "the alias name.")]
    alias: String,

    #[clap(long, value_parser = parse_json, help = "a query filtering the alias, as JSON.")]
    filter: Option<serde_json::Value>,

    #[clap(long, help = "routing for both indexing and search.")]
    routing: Option<String>,

    #[clap(long, help = "mark the alias as the write index.")]
    is_write_index: Option<bool>,
}

impl AliasPutArgs {
    fn request(self) -> AliasPutReq {
        let body = AliasPutBody {
            filter: self.filter,
            routing: self.routing,
            is_write_index: self.is_write_index,
            ..Default::default()
        };

        AliasPutReq {
            indices: self.indices,
            alias: self.alias,
            body: (body != AliasPutBody::default()).then_some(body),
            ..Default::default()
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
struct AliasNamesArgs {
    #[clap(
        short = 'i',
        long = "index",
        help = "narrow to an index; repeat for several."
    )]
    indices: Vec<String>,

    #[clap(help = "alias names or patterns.")]
    aliases: Vec<String>,
}

impl AliasNamesArgs {
    fn request(self) -> AliasGetReq {
        AliasGetReq {
            indices: self.indices,
            alias: self.aliases,
            ..Default::default()
        }
    }
}

impl From<AliasNamesArgs> for AliasExistsReq {
    fn from(args: AliasNamesArgs) -> Self {
        Self {
            indices: args.indices,
            alias: args.aliases,
            ..Default::default()
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
struct AliasDeleteArgs {
    #[clap(
        short = 'i',
        long = "index",
        help = "remove only from this index; repeat for several. defaults to every index."
    )]
    indices: Vec<String>,

    #[clap(required = true, help = "alias names or patterns.")]
    aliases: Vec<String>,
}

impl AliasDeleteArgs {
    fn request(self) -> AliasDeleteReq {
        AliasDeleteReq {
            indices: self.indices,
            alias: self.aliases,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use osapi_testing::{MockOpenSearch, logging};

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("osapi").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn alias_put_builds_body_only_when_set() {
        let Command::Alias {
            command: AliasCommand::Put(args),
        } = parse(&["alias", "put", "-i", "logs-1", "-i", "logs-2", "logs"]).command
        else {
            panic!("expected alias put");
        };
        let req = args.request();
        assert_eq!(req.indices, vec!["logs-1", "logs-2"]);
        assert_eq!(req.alias, "logs");
        assert!(req.body.is_none());

        let Command::Alias {
            command: AliasCommand::Put(args),
        } = parse(&["alias", "put", "-i", "logs", "recent", "--routing", "1"]).command
        else {
            panic!("expected alias put");
        };
        assert_eq!(
            args.request()
                .body
                .and_then(|it| it.routing),
            Some("1".to_string())
        );
    }

    #[test]
    fn rejects_invalid_json_body() {
        let res = Cli::try_parse_from(["osapi", "index", "create", "books", "--body", "{"]);
        assert!(res.is_err());
    }

    #[test]
    fn alias_delete_needs_a_name() {
        assert!(Cli::try_parse_from(["osapi", "alias", "delete"]).is_err());
    }

    #[test]
    fn addresses_override_config() {
        let cli = parse(&["-a", "http://node-1:9200", "--address", "http://node-2:9200", "info"]);
        let config = cli.config().unwrap();
        assert_eq!(config.addresses.len(), 2);
        assert_eq!(config.addresses[0].host_str(), Some("node-1"));
    }

    #[tokio::test]
    async fn runs_against_cluster() {
        logging();
        let mock = MockOpenSearch::start();
        let url = mock.url().to_string();

        let code = parse(&["-a", &url, "index", "create", "books"])
            .run()
            .await
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let code = parse(&["-a", &url, "alias", "put", "-i", "books", "library"])
            .run()
            .await
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(mock.aliases("books").unwrap().contains_key("library"));

        let code = parse(&["-a", &url, "alias", "exists", "missing"])
            .run()
            .await
            .unwrap();
        assert_eq!(code, ExitCode::FAILURE);

        let err = parse(&["-a", &url, "index", "delete", "missing"])
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Client(..)));
    }
}
