use colored::*;
use std::fmt::Display;
use webhdfs_core::error::{AggregateError, DispatchError};
use webhdfs_core::types::{
    BlockStoragePolicy, ContentSummary, ErasureCodingPolicy, FileStatus, FileType, XAttr,
};

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

/// Status of a single path.
pub struct StatusView(pub String, pub FileStatus);

/// Entries of a directory.
pub struct Listing(pub Vec<FileStatus>);

pub struct Summary(pub String, pub ContentSummary);

pub struct XAttrList(pub Vec<XAttr>);

pub struct NameList(pub &'static str, pub Vec<String>);

pub struct PolicyList(pub Vec<BlockStoragePolicy>);

pub struct EcPolicyView(pub String, pub Option<ErasureCodingPolicy>);

/// Confirmation of an operation without payload, with the namenode that served it.
pub struct Done(pub String, pub String);

pub struct GenericError<T: Display>(pub &'static str, pub T);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}

impl From<&AggregateError> for FormattedString {
    fn from(err: &AggregateError) -> Self {
        let mut out = format!(
            "{} every namenode failed ({} attempts)\n",
            "Call Failed:".red().bold(),
            err.len()
        );
        for (i, failure) in err.failures().iter().enumerate() {
            out.push_str(&format!(
                "\n  {} {} {}",
                format!("#{}", i + 1).dimmed(),
                failure.endpoint.yellow(),
                failure.error
            ));
        }
        FormattedString(out)
    }
}

impl From<&DispatchError> for FormattedString {
    fn from(err: &DispatchError) -> Self {
        match err {
            DispatchError::AllFailed(aggregate) => FormattedString::from(aggregate),
            DispatchError::Cancelled {
                endpoint, failed, ..
            } => FormattedString(format!(
                "{} while contacting {} ({} namenodes failed before)",
                "Cancelled:".yellow().bold(),
                endpoint.yellow(),
                failed.len()
            )),
            DispatchError::Validation(e) => {
                FormattedString::from(GenericError("Invalid Request", e))
            }
            other => FormattedString::from(GenericError("Call Failed", other)),
        }
    }
}

impl From<&anyhow::Error> for FormattedString {
    fn from(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<DispatchError>() {
            Some(dispatch) => FormattedString::from(dispatch),
            None => FormattedString::from(GenericError("Error", format!("{err:#}"))),
        }
    }
}

fn type_marker(file_type: FileType) -> ColoredString {
    match file_type {
        FileType::File => "-".normal(),
        FileType::Directory => "d".blue().bold(),
        FileType::Symlink => "l".cyan(),
    }
}

fn entry_line(status: &FileStatus, name: &str) -> String {
    let name = match status.file_type {
        FileType::Directory => format!("{}/", name).blue().bold(),
        FileType::Symlink => name.cyan(),
        FileType::File => name.normal(),
    };
    format!(
        "{}{:>5} {:>3} {:<10} {:<12} {:>12} {}",
        type_marker(status.file_type),
        status.permission,
        status.replication,
        status.owner,
        status.group,
        status.length,
        name
    )
}

impl From<StatusView> for FormattedString {
    fn from(StatusView(path, status): StatusView) -> Self {
        let mut out = entry_line(&status, &path);
        out.push_str(&format!(
            "\n\n  {} {}\n  {} {}\n  {} {}",
            "block size:".dimmed(),
            status.block_size,
            "modified:".dimmed(),
            status.modification_time,
            "file id:".dimmed(),
            status.file_id
        ));
        if let Some(target) = &status.symlink {
            out.push_str(&format!("\n  {} {}", "target:".dimmed(), target));
        }
        if let Some(policy) = &status.ec_policy {
            out.push_str(&format!("\n  {} {}", "ec policy:".dimmed(), policy));
        }
        FormattedString(out)
    }
}

impl From<Listing> for FormattedString {
    fn from(Listing(entries): Listing) -> Self {
        if entries.is_empty() {
            return FormattedString("Empty directory.".yellow().to_string());
        }

        let lines: Vec<String> = entries
            .iter()
            .map(|entry| entry_line(entry, &entry.path_suffix))
            .collect();
        FormattedString(lines.join("\n"))
    }
}

impl From<Summary> for FormattedString {
    fn from(Summary(path, summary): Summary) -> Self {
        let quota = |q: i64| {
            if q < 0 {
                "none".dimmed().to_string()
            } else {
                q.to_string()
            }
        };
        FormattedString(format!(
            "{}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}\n  {} {}",
            path.green(),
            "directories:".dimmed(),
            summary.directory_count,
            "files:".dimmed(),
            summary.file_count,
            "length:".dimmed(),
            summary.length,
            "space consumed:".dimmed(),
            summary.space_consumed,
            "name quota:".dimmed(),
            quota(summary.quota),
            "space quota:".dimmed(),
            quota(summary.space_quota)
        ))
    }
}

impl From<XAttrList> for FormattedString {
    fn from(XAttrList(xattrs): XAttrList) -> Self {
        if xattrs.is_empty() {
            return FormattedString("No attributes found.".yellow().to_string());
        }

        let mut out = String::new();
        for xattr in xattrs {
            let value = xattr.value.unwrap_or_default();
            out.push_str(&format!("{}={}\n", xattr.name.green(), value));
        }
        FormattedString(out.trim_end().to_string())
    }
}

impl From<NameList> for FormattedString {
    fn from(NameList(title, names): NameList) -> Self {
        if names.is_empty() {
            return FormattedString(format!("No {title} found.").yellow().to_string());
        }

        let mut out = String::new();
        out.push_str(&format!("{}:\n", title));
        for name in names {
            out.push_str(&format!("  - {}\n", name.green()));
        }
        FormattedString(out.trim_end().to_string())
    }
}

fn policy_line(policy: &BlockStoragePolicy) -> String {
    format!(
        "{} {} {} [{}]",
        format!("{:>3}", policy.id).dimmed(),
        policy.name.green(),
        "storage:".dimmed(),
        policy.storage_types.join(", ")
    )
}

impl From<BlockStoragePolicy> for FormattedString {
    fn from(policy: BlockStoragePolicy) -> Self {
        FormattedString(policy_line(&policy))
    }
}

impl From<PolicyList> for FormattedString {
    fn from(PolicyList(policies): PolicyList) -> Self {
        if policies.is_empty() {
            return FormattedString("No storage policies found.".yellow().to_string());
        }

        let lines: Vec<String> = policies.iter().map(policy_line).collect();
        FormattedString(lines.join("\n"))
    }
}

impl From<EcPolicyView> for FormattedString {
    fn from(EcPolicyView(path, policy): EcPolicyView) -> Self {
        match policy {
            None => FormattedString(format!("{} is {}", path.green(), "replicated".yellow())),
            Some(policy) => FormattedString(format!(
                "{} {} ({} data + {} parity units, cell {} bytes, codec {})",
                path.green(),
                policy.name.cyan(),
                policy.num_data_units,
                policy.num_parity_units,
                policy.cell_size,
                policy.codec_name
            )),
        }
    }
}

impl From<Done> for FormattedString {
    fn from(Done(what, namenode): Done) -> Self {
        FormattedString(format!(
            "{} {} {}",
            "OK".green().bold(),
            what,
            format!("(via {namenode})").dimmed()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(file_type: FileType, name: &str) -> FileStatus {
        FileStatus {
            access_time: 0,
            block_size: 134217728,
            children_num: 0,
            file_id: 1,
            group: "supergroup".to_string(),
            length: 42,
            modification_time: 0,
            owner: "hdfs".to_string(),
            path_suffix: name.to_string(),
            permission: "755".to_string(),
            replication: 3,
            storage_policy: 0,
            file_type,
            symlink: None,
            ec_policy: None,
        }
    }

    #[test]
    fn test_listing_marks_directories() {
        colored::control::set_override(false);
        let out = FormattedString::from(Listing(vec![
            status(FileType::Directory, "sub"),
            status(FileType::File, "a.txt"),
        ]));

        let lines: Vec<_> = out.0.lines().collect();
        assert!(lines[0].starts_with('d'));
        assert!(lines[0].ends_with("sub/"));
        assert!(lines[1].starts_with('-'));
        assert!(lines[1].ends_with("a.txt"));
    }

    #[test]
    fn test_empty_listing() {
        colored::control::set_override(false);
        let out = FormattedString::from(Listing(vec![]));
        assert_eq!(out.0, "Empty directory.");
    }
}
