use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use wavefront_core::TagState;
use wavefront_core::model::{EventQuery, MatchingMethod};

#[derive(Parser)]
#[command(name = "wf")]
#[command(about = "Wavefront CLI: converge sources and tags, read alerts, manage events")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Wavefront base URL (overrides config and WAVEFRONT_ENDPOINT env var)
    #[arg(short, long, global = true, env = "WAVEFRONT_ENDPOINT")]
    pub endpoint: Option<String>,

    /// API token (overrides stored credentials)
    #[arg(long, global = true, env = "WAVEFRONT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "WAVEFRONT_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(Clone, Copy, ValueEnum, Default, PartialEq, Eq, Debug)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read an alert as it currently is in Wavefront
    Alert(AlertArgs),
    /// Create or update a source (description, hidden flag, tags)
    Source(SourceArgs),
    /// Read or converge the tags of a source
    Tags(TagsArgs),
    /// Read, search, create, update or delete events
    Event(EventArgs),
    /// Run a module with a JSON argument file and print its result record
    Run(RunArgs),
    /// Store an API token for a profile
    Login(LoginArgs),
    /// Logout (remove stored credentials)
    Logout,
    /// Show current auth info
    Whoami,
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct AlertArgs {
    /// Alert id
    pub alert_id: String,
}

#[derive(clap::Args)]
pub struct SourceArgs {
    /// Source name
    pub source: String,
    /// Description to set
    #[arg(long)]
    pub description: Option<String>,
    /// Hide (true) or unhide (false) the source
    #[arg(long)]
    pub hidden: Option<bool>,
    /// Tag to set; repeat for several. Replaces the full tag set when given
    #[arg(long = "tag")]
    pub tags: Option<Vec<String>>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TagStateArg {
    /// Add the given tags
    Present,
    /// Remove the given tags
    Absent,
    /// Make the tag set exactly the given tags
    Replace,
}

impl From<TagStateArg> for TagState {
    fn from(state: TagStateArg) -> Self {
        match state {
            TagStateArg::Present => TagState::Present,
            TagStateArg::Absent => TagState::Absent,
            TagStateArg::Replace => TagState::Replace,
        }
    }
}

#[derive(clap::Args)]
pub struct TagsArgs {
    /// Source name
    pub source: String,
    /// How the given tags are applied; omit together with --tag to read
    #[arg(long)]
    pub state: Option<TagStateArg>,
    /// Tag; repeat for several
    #[arg(long = "tag")]
    pub tags: Option<Vec<String>>,
    /// Remove every tag (same as --state replace with an empty tag list)
    #[arg(long, conflicts_with_all = ["state", "tags"])]
    pub clear: bool,
}

impl TagsArgs {
    /// Tag mode and tag list to apply; `--clear` is a replace with no tags.
    pub fn desired(&self) -> (Option<TagState>, Option<Vec<String>>) {
        if self.clear {
            return (Some(TagState::Replace), Some(Vec::new()));
        }
        (self.state.map(Into::into), self.tags.clone())
    }
}

#[derive(clap::Args)]
pub struct EventArgs {
    #[command(subcommand)]
    pub command: EventCommands,
}

#[derive(Subcommand)]
pub enum EventCommands {
    /// Read an event by id (e.g. "1507307331000:deploy")
    Get {
        id: String,
    },
    /// Search events in a time window
    Search(EventSearchArgs),
    /// Create an event from a JSON body
    Create(EventBodyArgs),
    /// Update an event with a JSON body
    Update {
        id: String,
        #[command(flatten)]
        body: EventBodyArgs,
    },
    /// Delete an event by id
    Delete {
        id: String,
    },
}

#[derive(clap::Args)]
pub struct EventSearchArgs {
    /// Filter as key:value or key:METHOD:value (METHOD is CONTAINS, STARTSWITH or EQUALS)
    #[arg(long = "query", required = true, value_parser = parse_event_query)]
    pub queries: Vec<EventQuery>,
    /// Maximum number of events
    #[arg(long, default_value_t = wavefront_core::params::DEFAULT_EVENT_LIMIT)]
    pub limit: u32,
    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(clap::Args)]
pub struct EventBodyArgs {
    /// Path to JSON body (reads from stdin if omitted)
    #[arg(long)]
    pub body: Option<PathBuf>,
    #[command(flatten)]
    pub window: WindowArgs,
}

#[derive(clap::Args)]
pub struct WindowArgs {
    /// Window start in epoch milliseconds (default: one hour ago)
    #[arg(long)]
    pub start_time: Option<i64>,
    /// Window end in epoch milliseconds (default: now)
    #[arg(long)]
    pub end_time: Option<i64>,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Module name (wf_alert, wf_source, wf_source_tags, wf_event)
    pub module: String,
    /// JSON file holding the module arguments
    pub args_file: PathBuf,
}

#[derive(clap::Args)]
pub struct LoginArgs {
    /// API token to store
    #[arg(long = "api-token")]
    pub api_token: String,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (endpoint, format)
    pub key: String,
    /// Value
    pub value: String,
}

/// Parses `key:value` or `key:METHOD:value`. Values may themselves contain
/// colons; the middle part is only taken as a method when it names one.
pub fn parse_event_query(raw: &str) -> Result<EventQuery, String> {
    let (key, rest) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid query `{raw}`: expected key:value"))?;
    if key.is_empty() {
        return Err(format!("invalid query `{raw}`: empty key"));
    }

    let (matching_method, value) = match rest.split_once(':') {
        Some((method, value)) => match method.parse::<MatchingMethod>() {
            Ok(method) => (method, value),
            Err(_) => (MatchingMethod::default(), rest),
        },
        None => (MatchingMethod::default(), rest),
    };

    Ok(EventQuery {
        key: key.to_string(),
        value: value.to_string(),
        matching_method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_query_with_method() {
        let q = parse_event_query("name:STARTSWITH:ERROR").unwrap();
        assert_eq!(q.key, "name");
        assert_eq!(q.value, "ERROR");
        assert_eq!(q.matching_method, MatchingMethod::Startswith);
    }

    #[test]
    fn test_parse_query_defaults_to_contains() {
        let q = parse_event_query("hosts:cluster1").unwrap();
        assert_eq!(q.value, "cluster1");
        assert_eq!(q.matching_method, MatchingMethod::Contains);
    }

    #[test]
    fn test_parse_query_value_with_colon() {
        let q = parse_event_query("name:deploy:v2").unwrap();
        assert_eq!(q.value, "deploy:v2");
        assert_eq!(q.matching_method, MatchingMethod::Contains);
    }

    #[test]
    fn test_parse_query_rejects_missing_value() {
        assert!(parse_event_query("name").is_err());
        assert!(parse_event_query(":x").is_err());
    }

    #[test]
    fn test_tags_command_parses() {
        let cli = Cli::try_parse_from([
            "wf", "tags", "app-01", "--state", "present", "--tag", "prod", "--tag", "web",
        ])
        .unwrap();
        match cli.command {
            Commands::Tags(args) => {
                assert_eq!(args.source, "app-01");
                assert!(matches!(args.state, Some(TagStateArg::Present)));
                assert_eq!(args.tags.unwrap(), vec!["prod", "web"]);
            }
            _ => panic!("expected tags command"),
        }
    }

    #[test]
    fn test_tags_read_has_no_state_or_tags() {
        let cli = Cli::try_parse_from(["wf", "tags", "app-01"]).unwrap();
        match cli.command {
            Commands::Tags(args) => {
                assert!(args.state.is_none());
                assert!(args.tags.is_none());
            }
            _ => panic!("expected tags command"),
        }
    }

    #[test]
    fn test_clear_replaces_with_no_tags() {
        let cli = Cli::try_parse_from(["wf", "tags", "app-01", "--clear"]).unwrap();
        match cli.command {
            Commands::Tags(args) => {
                assert_eq!(args.desired(), (Some(TagState::Replace), Some(Vec::new())));
            }
            _ => panic!("expected tags command"),
        }
        assert!(Cli::try_parse_from(["wf", "tags", "app-01", "--clear", "--tag", "x"]).is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("yaml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert_eq!("TABLE".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
