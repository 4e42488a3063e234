//! CLI arguments and subcommands for coscale-cli.
//!
//! `coscale-cli [global flags] <object> <action> [flags]`. Flag names keep
//! the camelCase spelling the CoScale API uses for its fields.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "coscale-cli",
    about = "Command-line client for the CoScale monitoring API",
    long_about = "Command-line client for the CoScale monitoring API.\n\n\
                  Manages servers, metrics, events and alerts of a CoScale application \
                  and uploads or retrieves metric data. Results are printed as JSON.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Base url for the api
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    /// The application id
    #[arg(long = "app-id", global = true)]
    pub app_id: Option<String>,

    /// A valid access token for the given application
    #[arg(long = "access-token", global = true)]
    pub access_token: Option<String>,

    /// Print API answers as returned instead of pretty printed
    #[arg(long = "rawOutput", global = true)]
    pub raw_output: bool,

    /// Config file (api.conf, JSON, TOML or YAML)
    #[arg(short = 'c', long = "config-file", global = true)]
    pub config_file: Option<PathBuf>,

    /// Log level (logs go to stderr)
    #[arg(long, value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,
}

/// Object families
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage servers
    Server {
        #[command(subcommand)]
        action: ServerAction,
    },

    /// Manage server groups
    Servergroup {
        #[command(subcommand)]
        action: ServerGroupAction,
    },

    /// Manage metrics and their dimensions
    Metric {
        #[command(subcommand)]
        action: MetricAction,
    },

    /// Manage metric groups
    Metricgroup {
        #[command(subcommand)]
        action: MetricGroupAction,
    },

    /// Manage events and event data
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Manage alerts, alert types and triggers
    Alert {
        #[command(subcommand)]
        action: AlertAction,
    },

    /// Insert or retrieve metric data
    Data {
        #[command(subcommand)]
        action: DataAction,
    },

    /// Manage the CLI configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Selects an object by id or by name; the id wins when both are given.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct Target {
    /// Unique identifier
    #[arg(long)]
    pub id: Option<i64>,

    /// Name of the object
    #[arg(long)]
    pub name: Option<String>,
}

/// Member and group of an add/delete membership action.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct Membership {
    /// Id of the member
    #[arg(long = "idMember", alias = "idServer", alias = "idServergroup", alias = "idMetric")]
    pub id: Option<i64>,

    /// Name of the member
    #[arg(
        long = "nameMember",
        alias = "nameServer",
        alias = "nameServergroup",
        alias = "nameMetric"
    )]
    pub name: Option<String>,

    /// Id of the group
    #[arg(long = "idGroup")]
    pub id_group: Option<i64>,

    /// Name of the group
    #[arg(long = "nameGroup")]
    pub name_group: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ServerAction {
    /// List all servers
    List,
    /// Get a server by id or name
    Get(Target),
    /// Delete a server by id or name
    Delete(Target),
    /// Create a server
    New {
        /// Name for the server
        #[arg(long)]
        name: String,
        /// Description for the server
        #[arg(long, default_value = "")]
        description: String,
        /// Describes the type of server
        #[arg(long = "serverType", default_value = "")]
        server_type: String,
    },
    /// Update a server selected by id or name
    Update {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "type")]
        kind: Option<String>,
        /// ENABLED, INACTIVE or DISABLED
        #[arg(long)]
        state: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServerGroupAction {
    /// List all server groups
    List,
    /// Get a server group by id or name
    Get(Target),
    /// Delete a server group by id or name
    Delete(Target),
    /// Create a server group
    New {
        #[arg(long)]
        name: String,
        /// Server group that becomes the parent
        #[arg(long = "parentId")]
        parent_id: Option<i64>,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "type", default_value = "")]
        kind: String,
        #[arg(long, default_value = "")]
        state: String,
    },
    /// Update a server group selected by id or name
    Update {
        #[command(flatten)]
        target: Target,
        #[arg(long = "parentId")]
        parent_id: Option<i64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        state: Option<String>,
    },
    /// Add a server to a server group
    #[command(name = "addServer")]
    AddServer(Membership),
    /// Remove a server from a server group
    #[command(name = "deleteServer")]
    DeleteServer(Membership),
    /// Add a server group to a server group
    #[command(name = "addServergroup")]
    AddServergroup(Membership),
    /// Remove a server group from a server group
    #[command(name = "deleteServergroup")]
    DeleteServergroup(Membership),
}

#[derive(Subcommand, Debug)]
pub enum MetricAction {
    /// List all metrics
    List,
    /// Get a metric by id or name
    Get(Target),
    /// Delete a metric by id or name
    Delete(Target),
    /// List the metrics of a metric group selected by id or name
    #[command(name = "listbygroup")]
    ListByGroup(Target),
    /// Create a metric
    New {
        #[arg(long)]
        name: String,
        /// LONG, DOUBLE or HISTOGRAM
        #[arg(long = "dataType")]
        data_type: String,
        /// SERVER, GROUP or APPLICATION
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "")]
        unit: String,
        /// Seconds between two data points
        #[arg(long, default_value_t = 60)]
        period: i64,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Update a metric selected by id or name
    Update {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "dataType")]
        data_type: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        period: Option<i64>,
    },
    /// Manage metric dimensions
    Dimension {
        #[command(subcommand)]
        action: DimensionAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum DimensionAction {
    /// Create a dimension and attach it to a metric if one is given
    New {
        /// Name of the dimension
        #[arg(long)]
        name: String,
        /// Id of the metric
        #[arg(long)]
        id: Option<i64>,
        /// Name of the metric
        #[arg(long)]
        metric: Option<String>,
    },
    /// List the dimensions of a metric
    List {
        #[arg(long = "metricId")]
        metric_id: Option<i64>,
        #[arg(long)]
        metric: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum MetricGroupAction {
    /// List all metric groups
    List,
    /// Get a metric group by id or name
    Get(Target),
    /// Delete a metric group by id or name
    Delete(Target),
    /// Create a metric group
    New {
        #[arg(long)]
        name: String,
        /// APPLICATION, SERVERGROUP or SERVER
        #[arg(long)]
        subject: String,
        #[arg(long, default_value = "ENABLED")]
        state: String,
        #[arg(long = "type", default_value = "")]
        kind: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Update a metric group selected by id or name
    Update {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        state: Option<String>,
    },
    /// Add a metric to a metric group
    #[command(name = "addMetric")]
    AddMetric(Membership),
    /// Remove a metric from a metric group
    #[command(name = "deleteMetric")]
    DeleteMetric(Membership),
}

/// Fields of a new event data entry.
#[derive(ClapArgs, Debug, Clone)]
pub struct EventDataArgs {
    #[command(flatten)]
    pub event: Target,
    #[arg(long)]
    pub message: String,
    #[arg(long)]
    pub subject: String,
    /// JSON detailing the progress of the event
    #[arg(long, default_value = "{}")]
    pub attribute: String,
    /// Unix timestamp, or seconds ago when negative
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub timestamp: i64,
    #[arg(long = "stopTime", allow_hyphen_values = true)]
    pub stop_time: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum EventAction {
    /// List all events
    List,
    /// Get an event by id or name
    Get(Target),
    /// Delete an event by id or name
    Delete(Target),
    /// Create an event
    New {
        #[arg(long)]
        name: String,
        #[arg(long = "type", default_value = "")]
        kind: String,
        #[arg(long, default_value = "")]
        description: String,
        /// JSON describing the attribute items
        #[arg(long = "attributeDescriptions", default_value = "[]")]
        attribute_descriptions: String,
    },
    /// Update an event selected by id or name
    Update {
        #[command(flatten)]
        target: Target,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "attributeDescriptions")]
        attribute_descriptions: Option<String>,
    },
    /// Insert data for an event
    Data(EventDataArgs),
    /// Insert data for an event
    #[command(name = "newdata")]
    NewData(EventDataArgs),
    /// Update an event data entry
    #[command(name = "updatedata")]
    UpdateData {
        #[command(flatten)]
        event: Target,
        #[arg(long = "dataid")]
        data_id: i64,
        #[arg(long)]
        message: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        attribute: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        timestamp: Option<i64>,
        #[arg(long = "stopTime", allow_hyphen_values = true)]
        stop_time: Option<i64>,
    },
    /// Delete an event data entry
    #[command(name = "deletedata")]
    DeleteData {
        #[arg(long)]
        id: i64,
        #[arg(long = "dataid")]
        data_id: i64,
    },
}

/// Filter for `alert list`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlertFilterArg {
    Unresolved,
    Unacknowledged,
}

#[derive(Subcommand, Debug)]
pub enum AlertAction {
    /// List alerts
    List {
        #[arg(long, value_enum)]
        filter: Option<AlertFilterArg>,
    },
    /// Acknowledge an alert
    Acknowledge {
        #[arg(long)]
        id: i64,
    },
    /// Resolve an alert
    Resolve {
        #[arg(long)]
        id: i64,
    },
    /// Manage alert types
    Type {
        #[command(subcommand)]
        action: AlertTypeAction,
    },
    /// Manage alert triggers
    Trigger {
        #[command(subcommand)]
        action: TriggerAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum AlertTypeAction {
    /// List all alert types
    List,
    /// Get an alert type by id or name
    Get(Target),
    /// Delete an alert type by id or name
    Delete(Target),
    /// Create an alert type
    New {
        #[arg(long)]
        name: String,
        /// Delivery, e.g. "EMAILUSER:1 EMAIL:ops@example.com SLACK:<webhook>"
        #[arg(long)]
        handle: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "backupHandle")]
        backup_handle: Option<String>,
        #[arg(long = "backupSeconds")]
        backup_seconds: Option<i64>,
        #[arg(long = "escalationHandle")]
        escalation_handle: Option<String>,
        #[arg(long = "escalationSeconds")]
        escalation_seconds: Option<i64>,
    },
    /// Update an alert type selected by id or name
    Update {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        handle: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "backupHandle")]
        backup_handle: Option<String>,
        #[arg(long = "backupSeconds")]
        backup_seconds: Option<i64>,
        #[arg(long = "escalationHandle")]
        escalation_handle: Option<String>,
        #[arg(long = "escalationSeconds")]
        escalation_seconds: Option<i64>,
    },
}

/// Metric, server and server group a trigger watches.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct TriggerScope {
    #[arg(long)]
    pub metric: Option<String>,
    #[arg(long = "metricid")]
    pub metric_id: Option<i64>,
    #[arg(long)]
    pub server: Option<String>,
    #[arg(long = "serverid")]
    pub server_id: Option<i64>,
    #[arg(long = "servergroup")]
    pub server_group: Option<String>,
    #[arg(long = "servergroupid")]
    pub server_group_id: Option<i64>,
}

#[derive(Subcommand, Debug)]
pub enum TriggerAction {
    /// List the triggers of an alert type selected by id or name
    List(Target),
    /// Create a trigger
    New {
        #[arg(long)]
        name: String,
        /// e.g. "avg(300) > 25"
        #[arg(long)]
        config: String,
        /// Seconds until the alert resolves itself
        #[arg(long)]
        autoresolve: Option<i64>,
        #[command(flatten)]
        scope: TriggerScope,
        #[arg(long = "typename", default_value = "Default alerts")]
        type_name: String,
        #[arg(long = "typeid")]
        type_id: Option<i64>,
        #[arg(long, default_value = "")]
        description: String,
        /// JSON or "<dimId>:[<AGG>:]<values>;..."
        #[arg(long = "dimensionSpecs", default_value = "[]")]
        dimension_specs: String,
    },
    /// Update a trigger
    Update {
        #[command(flatten)]
        target: Target,
        #[arg(long = "typename")]
        type_name: Option<String>,
        #[arg(long = "typeid")]
        type_id: Option<i64>,
        #[arg(long)]
        config: Option<String>,
        #[arg(long)]
        autoresolve: Option<i64>,
        #[command(flatten)]
        scope: TriggerScope,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "dimensionSpecs")]
        dimension_specs: Option<String>,
    },
    /// Delete a trigger
    Delete {
        #[command(flatten)]
        target: Target,
        #[arg(long = "type")]
        type_name: Option<String>,
        #[arg(long = "typeid")]
        type_id: Option<i64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum DataAction {
    /// Retrieve calculated data of a metric
    Get {
        /// Metric id
        #[arg(long)]
        id: i64,
        /// Subjects, e.g. "s1,g2,a"
        #[arg(long = "subjectIds")]
        subject_ids: String,
        /// Unix timestamp, or seconds ago when zero or negative
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        start: i64,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        stop: i64,
        /// AVG, MIN or MAX
        #[arg(long, default_value = "AVG")]
        aggregator: String,
        /// DEFAULT, AVG, MIN, MAX, RATE or COUNT
        #[arg(long = "viewType", default_value = "DEFAULT")]
        view_type: String,
        #[arg(long = "dimensionsSpecs", default_value = "[]")]
        dimensions_specs: String,
        #[arg(long = "aggregateSubjects")]
        aggregate_subjects: bool,
    },
    /// Insert data points, e.g. --data "M1:S100:-60:1.2;M2:S100:0:2"
    Insert {
        #[arg(long, required_unless_present = "datapoint", allow_hyphen_values = true)]
        data: Option<String>,
        /// Deprecated: times are positive seconds ago
        #[arg(long, conflicts_with = "data", allow_hyphen_values = true)]
        datapoint: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Load the configuration and log in with it
    Check,
    /// Write the configuration file from --api-url, --app-id and --access-token
    Set,
    /// Print the effective configuration with the access token masked
    Show {
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_action() {
        let args = Args::try_parse_from([
            "coscale-cli",
            "server",
            "get",
            "--name",
            "web",
            "--app-id",
            "app",
            "--rawOutput",
        ])
        .unwrap();
        assert_eq!(args.app_id.as_deref(), Some("app"));
        assert!(args.raw_output);
        match args.command {
            Commands::Server {
                action: ServerAction::Get(target),
            } => assert_eq!(target.name.as_deref(), Some("web")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_negative_times() {
        let args = Args::try_parse_from([
            "coscale-cli",
            "data",
            "get",
            "--id",
            "3",
            "--subjectIds",
            "s1",
            "--start",
            "-3600",
        ])
        .unwrap();
        match args.command {
            Commands::Data {
                action: DataAction::Get { start, stop, .. },
            } => {
                assert_eq!(start, -3600);
                assert_eq!(stop, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_insert_needs_data() {
        assert!(Args::try_parse_from(["coscale-cli", "data", "insert"]).is_err());
        assert!(Args::try_parse_from([
            "coscale-cli",
            "data",
            "insert",
            "--data",
            "M1:S1:0:1",
            "--datapoint",
            "M1:S1:0:1"
        ])
        .is_err());
    }

    #[test]
    fn test_membership_aliases() {
        let args = Args::try_parse_from([
            "coscale-cli",
            "servergroup",
            "addServer",
            "--idServer",
            "4",
            "--nameGroup",
            "web",
        ])
        .unwrap();
        match args.command {
            Commands::Servergroup {
                action: ServerGroupAction::AddServer(membership),
            } => {
                assert_eq!(membership.id, Some(4));
                assert_eq!(membership.name_group.as_deref(), Some("web"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
