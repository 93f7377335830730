//! # CLI
//!
//! This module defines the command-line interface of `webhdfs` using `clap`.
//!
//! Connection flags are global so they can be given before or after the subcommand. They are
//! layered over the optional `--config` file: a flag always wins over the file.
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use webhdfs_core::ClientConfig;
use webhdfs_core::ops::permission::Permission;
use webhdfs_core::ops::xattr::{XAttrEncoding, XAttrSetFlag};
use webhdfs_core::protocol::{Authentication, Csrf, ProxyUser, RequestParams};

#[derive(Parser, Debug)]
#[command(name = "webhdfs", version, about = "WebHDFS client with namenode failover")]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Namenode address (host:port). Repeat it for HA clusters, namenodes are tried in order
    #[arg(short = 'n', long = "namenode", global = true)]
    pub namenodes: Vec<String>,

    /// Use https
    #[arg(long, global = true)]
    pub tls: bool,

    /// Give up on a namenode after this many milliseconds and try the next one
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Authenticated user (user.name)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Proxied user (doas)
    #[arg(long, global = true)]
    pub doas: Option<String>,

    /// Delegation token
    #[arg(long, global = true)]
    pub delegation: Option<String>,

    /// Value of the X-XSRF-HEADER header
    #[arg(long, global = true)]
    pub csrf: Option<String>,

    /// JSON client configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

impl ConnectionArgs {
    /// Merges the flags over the configuration file, if any.
    pub fn into_config(self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)
                .with_context(|| format!("Failed to load '{}'", path.display()))?,
            None => ClientConfig::default(),
        };

        if !self.namenodes.is_empty() {
            config.addresses = self.namenodes;
        }
        config.tls |= self.tls;
        if let Some(timeout) = self.timeout_ms {
            config.timeout_ms = Some(timeout);
        }

        let flags = RequestParams {
            auth: Authentication {
                delegation: self.delegation,
            },
            proxy: ProxyUser {
                user_name: self.user,
                doas: self.doas,
            },
            csrf: Csrf {
                xsrf_header: self.csrf,
            },
            ..RequestParams::default()
        };
        config.params = flags.merged_over(&config.params);

        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the status of a file or directory
    Status { path: String },

    /// List a directory
    Ls { path: String },

    /// Print the content of a file
    Cat {
        path: String,
        /// Starting byte position
        #[arg(long)]
        offset: Option<u64>,
        /// Number of bytes to read
        #[arg(long)]
        length: Option<u64>,
    },

    /// Upload a local file
    Put {
        local: PathBuf,
        path: String,
        #[arg(short, long)]
        overwrite: bool,
        /// Octal permission of the new file (e.g. 644)
        #[arg(long)]
        permission: Option<Permission>,
    },

    /// Append the content of a local file to a remote one
    Append { local: PathBuf, path: String },

    /// Create a directory and its parents
    Mkdir {
        path: String,
        /// Octal permission (e.g. 755)
        #[arg(long)]
        permission: Option<Permission>,
    },

    /// Rename a file or directory
    Mv { source: String, destination: String },

    /// Delete a file or directory
    Rm {
        path: String,
        #[arg(short, long)]
        recursive: bool,
    },

    /// Show the disk usage of a directory
    Du { path: String },

    /// Show the home directory of the user
    Home,

    /// Change permission bits
    ///
    /// ## Examples:
    ///
    /// ```bash
    /// webhdfs -n nn1:9870 -n nn2:9870 chmod 750 /data/reports
    /// ```
    Chmod { permission: Permission, path: String },

    /// Change owner and/or group, as `owner`, `owner:group` or `:group`
    Chown {
        #[arg(value_parser = parse_owner)]
        owner: (Option<String>, Option<String>),
        path: String,
    },

    /// Extended attributes
    Xattr {
        #[command(subcommand)]
        sub: XAttrCommands,
    },

    /// Storage policies
    StoragePolicy {
        #[command(subcommand)]
        sub: StoragePolicyCommands,
    },

    /// Erasure coding policies
    Ec {
        #[command(subcommand)]
        sub: EcCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum XAttrCommands {
    /// Read attributes, all of them when no name is given
    Get {
        path: String,
        #[arg(long = "name")]
        names: Vec<String>,
        /// text, hex or base64
        #[arg(short, long, default_value = "text")]
        encoding: XAttrEncoding,
    },
    /// List attribute names
    List { path: String },
    /// Set an attribute
    Set {
        path: String,
        name: String,
        /// Encoded value, e.g. '"blue"', 0x626c7565 or 0sYmx1ZQ==
        value: Option<String>,
        /// CREATE or REPLACE
        #[arg(long, default_value = "CREATE")]
        flag: XAttrSetFlag,
    },
    /// Remove an attribute
    Rm { path: String, name: String },
}

#[derive(Subcommand, Debug)]
pub enum StoragePolicyCommands {
    /// List every policy known to the cluster
    List,
    Get { path: String },
    Set { path: String, policy: String },
    Unset { path: String },
    /// Move blocks so the path satisfies its policy
    Satisfy { path: String },
}

#[derive(Subcommand, Debug)]
pub enum EcCommands {
    Get { path: String },
    Set { path: String, policy: String },
    Unset { path: String },
    /// Enable a policy on the cluster
    Enable { policy: String },
    /// Disable a policy on the cluster
    Disable { policy: String },
}

fn parse_owner(value: &str) -> Result<(Option<String>, Option<String>), String> {
    let (owner, group) = match value.split_once(':') {
        Some((owner, group)) => (owner.trim(), group.trim()),
        None => (value.trim(), ""),
    };

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
    match (non_empty(owner), non_empty(group)) {
        (None, None) => Err("Owner and group cannot both be empty".to_string()),
        pair => Ok(pair),
    }
}
