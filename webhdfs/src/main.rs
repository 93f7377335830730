//! # WebHDFS CLI Entry Point
//!
//! The main executable of the `webhdfs` tool. This file drives the application lifecycle:
//!
//! 1. **Initialization**: Parses command-line arguments using [`cli::Cli`] and installs the log
//!    subscriber.
//! 2. **Configuration**: Merges the connection flags over the optional config file and builds a
//!    `WebHdfsClient` from `webhdfs_core`.
//! 3. **Execution**: Runs the requested operation against the namenodes, in order. `Ctrl-C`
//!    cancels the call, including the namenodes not tried yet.
//! 4. **Presentation**: Formats and prints the resulting data or error to standard output/error.
mod cli;
mod formatter;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, EcCommands, StoragePolicyCommands, XAttrCommands};
use formatter::{
    Done, EcPolicyView, FormattedString, GenericError, Listing, NameList, PolicyList, StatusView,
    Summary, XAttrList,
};
use std::process;
use tokio::io::AsyncWriteExt;
use webhdfs_core::WebHdfsClient;
use webhdfs_core::ops::ec_policy::{
    DisableECPolicy, EnableECPolicy, GetECPolicy, SetECPolicy, UnsetECPolicy,
};
use webhdfs_core::ops::file::{
    Append, Create, Delete, GetContentSummary, GetFileStatus, GetHomeDirectory, ListStatus, MkDirs,
    Open, Rename,
};
use webhdfs_core::ops::permission::{SetOwner, SetPermission};
use webhdfs_core::ops::storage_policy::{
    GetAllStoragePolicy, GetStoragePolicy, SatisfyStoragePolicy, SetStoragePolicy,
    UnsetStoragePolicy,
};
use webhdfs_core::ops::xattr::{GetXAttrs, ListXAttrs, RemoveXAttr, SetXAttr};
use webhdfs_core::tokio_util::sync::CancellationToken;

/// What a command prints on success.
enum Output {
    Formatted(FormattedString),
    /// File content, written as is.
    Raw(Vec<u8>),
}

fn formatted(value: impl Into<FormattedString>) -> Output {
    Output::Formatted(value.into())
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();

    if let Err(err) = init_logging(&args.log_level) {
        eprintln!("{}", FormattedString::from(&err));
        process::exit(2);
    }

    let client = match connect(args.connection) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{}", FormattedString::from(&err));
            process::exit(2);
        }
    };

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    match run(&client, args.command, &cancel).await {
        Ok(Output::Formatted(out)) => println!("{out}"),
        Ok(Output::Raw(content)) => {
            let mut stdout = tokio::io::stdout();
            if let Err(err) = stdout.write_all(&content).await {
                eprintln!("{}", FormattedString::from(GenericError("Failed to write output", err)));
                process::exit(1);
            }
            let _ = stdout.flush().await;
        }
        Err(err) => {
            eprintln!("{}", FormattedString::from(&err));
            process::exit(1);
        }
    }
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

fn connect(connection: cli::ConnectionArgs) -> anyhow::Result<WebHdfsClient> {
    let config = connection.into_config()?;
    if config.addresses.is_empty() {
        anyhow::bail!("No namenode given, use --namenode or a config file with 'addresses'");
    }
    WebHdfsClient::from_config(config).context("Failed to build the client")
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("Interrupted, cancelling the call");
        cancel.cancel();
    }
}

async fn run(
    client: &WebHdfsClient,
    command: Commands,
    cancel: &CancellationToken,
) -> anyhow::Result<Output> {
    let output = match command {
        Commands::Status { path } => {
            let res = client
                .call_with_cancel(&GetFileStatus::new(&path), cancel)
                .await?;
            formatted(StatusView(path, res.value))
        }
        Commands::Ls { path } => {
            let res = client
                .call_with_cancel(&ListStatus::new(path), cancel)
                .await?;
            formatted(Listing(res.value))
        }
        Commands::Cat {
            path,
            offset,
            length,
        } => {
            let op = Open {
                offset,
                length,
                ..Open::new(path)
            };
            let res = client.call_with_cancel(&op, cancel).await?;
            Output::Raw(res.value.to_vec())
        }
        Commands::Put {
            local,
            path,
            overwrite,
            permission,
        } => {
            let data = read_local(&local).await?;
            let op = Create {
                overwrite: Some(overwrite),
                permission,
                ..Create::new(&path, data)
            };
            let res = client.call_with_cancel(&op, cancel).await?;
            formatted(Done(format!("created {path}"), res.namenode))
        }
        Commands::Append { local, path } => {
            let data = read_local(&local).await?;
            let res = client
                .call_with_cancel(&Append::new(&path, data), cancel)
                .await?;
            formatted(Done(format!("appended to {path}"), res.namenode))
        }
        Commands::Mkdir { path, permission } => {
            let op = MkDirs {
                permission,
                ..MkDirs::new(&path)
            };
            let res = client.call_with_cancel(&op, cancel).await?;
            applied(res.value, format!("created {path}"), res.namenode)?
        }
        Commands::Mv {
            source,
            destination,
        } => {
            let res = client
                .call_with_cancel(&Rename::new(&source, &destination), cancel)
                .await?;
            applied(
                res.value,
                format!("renamed {source} to {destination}"),
                res.namenode,
            )?
        }
        Commands::Rm { path, recursive } => {
            let op = Delete::new(&path).with_recursive(recursive);
            let res = client.call_with_cancel(&op, cancel).await?;
            applied(res.value, format!("deleted {path}"), res.namenode)?
        }
        Commands::Du { path } => {
            let res = client
                .call_with_cancel(&GetContentSummary::new(&path), cancel)
                .await?;
            formatted(Summary(path, res.value))
        }
        Commands::Home => {
            let res = client
                .call_with_cancel(&GetHomeDirectory::new(), cancel)
                .await?;
            formatted(FormattedString(res.value))
        }
        Commands::Chmod { permission, path } => {
            let res = client
                .call_with_cancel(&SetPermission::new(&path, permission), cancel)
                .await?;
            formatted(Done(format!("{path} is now {permission}"), res.namenode))
        }
        Commands::Chown {
            owner: (owner, group),
            path,
        } => {
            let op = SetOwner {
                owner,
                group,
                ..SetOwner::new(&path)
            };
            let res = client.call_with_cancel(&op, cancel).await?;
            formatted(Done(format!("changed ownership of {path}"), res.namenode))
        }
        Commands::Xattr { sub } => run_xattr(client, sub, cancel).await?,
        Commands::StoragePolicy { sub } => run_storage_policy(client, sub, cancel).await?,
        Commands::Ec { sub } => run_ec(client, sub, cancel).await?,
    };

    Ok(output)
}

async fn run_xattr(
    client: &WebHdfsClient,
    command: XAttrCommands,
    cancel: &CancellationToken,
) -> anyhow::Result<Output> {
    let output = match command {
        XAttrCommands::Get {
            path,
            names,
            encoding,
        } => {
            let op = GetXAttrs {
                names,
                encoding,
                ..GetXAttrs::new(path)
            };
            let res = client.call_with_cancel(&op, cancel).await?;
            formatted(XAttrList(res.value))
        }
        XAttrCommands::List { path } => {
            let res = client
                .call_with_cancel(&ListXAttrs::new(path), cancel)
                .await?;
            formatted(NameList("Attributes", res.value))
        }
        XAttrCommands::Set {
            path,
            name,
            value,
            flag,
        } => {
            let op = SetXAttr {
                value,
                ..SetXAttr::new(&path, &name, flag)
            };
            let res = client.call_with_cancel(&op, cancel).await?;
            formatted(Done(format!("set {name} on {path}"), res.namenode))
        }
        XAttrCommands::Rm { path, name } => {
            let res = client
                .call_with_cancel(&RemoveXAttr::new(&path, &name), cancel)
                .await?;
            formatted(Done(format!("removed {name} from {path}"), res.namenode))
        }
    };

    Ok(output)
}

async fn run_storage_policy(
    client: &WebHdfsClient,
    command: StoragePolicyCommands,
    cancel: &CancellationToken,
) -> anyhow::Result<Output> {
    let output = match command {
        StoragePolicyCommands::List => {
            let res = client
                .call_with_cancel(&GetAllStoragePolicy::new(), cancel)
                .await?;
            formatted(PolicyList(res.value))
        }
        StoragePolicyCommands::Get { path } => {
            let res = client
                .call_with_cancel(&GetStoragePolicy::new(path), cancel)
                .await?;
            formatted(res.value)
        }
        StoragePolicyCommands::Set { path, policy } => {
            let res = client
                .call_with_cancel(&SetStoragePolicy::new(&path, &policy), cancel)
                .await?;
            formatted(Done(format!("{path} now uses {policy}"), res.namenode))
        }
        StoragePolicyCommands::Unset { path } => {
            let res = client
                .call_with_cancel(&UnsetStoragePolicy::new(&path), cancel)
                .await?;
            formatted(Done(format!("unset the policy of {path}"), res.namenode))
        }
        StoragePolicyCommands::Satisfy { path } => {
            let res = client
                .call_with_cancel(&SatisfyStoragePolicy::new(&path), cancel)
                .await?;
            formatted(Done(format!("scheduled block moves for {path}"), res.namenode))
        }
    };

    Ok(output)
}

async fn run_ec(
    client: &WebHdfsClient,
    command: EcCommands,
    cancel: &CancellationToken,
) -> anyhow::Result<Output> {
    let output = match command {
        EcCommands::Get { path } => {
            let res = client
                .call_with_cancel(&GetECPolicy::new(&path), cancel)
                .await?;
            formatted(EcPolicyView(path, res.value))
        }
        EcCommands::Set { path, policy } => {
            let res = client
                .call_with_cancel(&SetECPolicy::new(&path, &policy), cancel)
                .await?;
            formatted(Done(format!("{path} now uses {policy}"), res.namenode))
        }
        EcCommands::Unset { path } => {
            let res = client
                .call_with_cancel(&UnsetECPolicy::new(&path), cancel)
                .await?;
            formatted(Done(format!("unset the policy of {path}"), res.namenode))
        }
        EcCommands::Enable { policy } => {
            let res = client
                .call_with_cancel(&EnableECPolicy::new(&policy), cancel)
                .await?;
            formatted(Done(format!("enabled {policy}"), res.namenode))
        }
        EcCommands::Disable { policy } => {
            let res = client
                .call_with_cancel(&DisableECPolicy::new(&policy), cancel)
                .await?;
            formatted(Done(format!("disabled {policy}"), res.namenode))
        }
    };

    Ok(output)
}

/// MKDIRS, RENAME and DELETE answer `false` instead of failing in some cases (e.g. a missing
/// source), which is reported as an error.
fn applied(done: bool, what: String, namenode: String) -> anyhow::Result<Output> {
    if !done {
        anyhow::bail!("Namenode {namenode} did not apply the change: {what}");
    }
    Ok(formatted(Done(what, namenode)))
}

async fn read_local(path: &std::path::Path) -> anyhow::Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))
}
