//! Human-readable failure report

use tagsweep_common::LogEntry;

/// Closing banner line
pub const LOG_TAIL: &str = "=================================================";

/// Opening banner
pub fn log_head() -> String {
    format!("{LOG_TAIL}\n== Log Report: Failed Resource Deletion Events ==\n{LOG_TAIL}")
}

/// One report line for a failed deletion.
///
/// With a parent, the provider error is always appended, even when empty.
/// Without one, the provider error is used only when both code and message
/// are present, otherwise the local message if there is one.
pub fn format_log_entry(entry: &LogEntry) -> String {
    let mut line = format!(
        "Failed to delete {} {}",
        entry.resource_type, entry.resource_name
    );

    if let Some(parent) = entry.parent() {
        let parent_type = entry
            .parent_resource_type
            .map(|t| t.as_str())
            .unwrap_or_default();
        line.push_str(&format!(" from {parent_type} {parent}"));
        line.push_str(&format!(
            " ({}: {})",
            entry.aws_error_code, entry.aws_error_msg
        ));
    } else if entry.has_aws_error() {
        line.push_str(&format!(
            " ({}: {})",
            entry.aws_error_code, entry.aws_error_msg
        ));
    } else if !entry.err_msg.is_empty() {
        line.push_str(&format!(" ({})", entry.err_msg));
    }

    line
}

/// Full report: banner, one line per entry, closing banner
pub fn render_report(entries: &[LogEntry]) -> String {
    let mut out = log_head();
    out.push('\n');
    for entry in entries {
        out.push_str(&format_log_entry(entry));
        out.push('\n');
    }
    out.push_str(LOG_TAIL);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagsweep_common::ResourceType;

    fn entry() -> LogEntry {
        LogEntry::new(ResourceType::Ec2Subnet, "subnet-1".into())
    }

    #[test]
    fn test_banner_shape() {
        assert_eq!(LOG_TAIL.len(), 49);
        assert!(LOG_TAIL.chars().all(|c| c == '='));
        let head = log_head();
        let lines: Vec<_> = head.lines().collect();
        assert_eq!(lines, [LOG_TAIL, "== Log Report: Failed Resource Deletion Events ==", LOG_TAIL]);
    }

    #[test]
    fn test_provider_error() {
        let e = entry().with_aws_error("DependencyViolation", "has dependencies");
        assert_eq!(
            format_log_entry(&e),
            "Failed to delete AWS::EC2::Subnet subnet-1 (DependencyViolation: has dependencies)"
        );
    }

    #[test]
    fn test_local_message_when_provider_error_incomplete() {
        let e = entry().with_aws_error("Code", "").with_err_msg("call timed out");
        assert_eq!(
            format_log_entry(&e),
            "Failed to delete AWS::EC2::Subnet subnet-1 (call timed out)"
        );
    }

    #[test]
    fn test_no_detail() {
        assert_eq!(format_log_entry(&entry()), "Failed to delete AWS::EC2::Subnet subnet-1");
    }

    #[test]
    fn test_parent_always_carries_provider_error() {
        let e = LogEntry::new(ResourceType::Ec2InternetGateway, "igw-1".into())
            .with_parent(ResourceType::Ec2Vpc, "vpc-1".into())
            .with_err_msg("ignored");
        assert_eq!(
            format_log_entry(&e),
            "Failed to delete AWS::EC2::InternetGateway igw-1 from AWS::EC2::VPC vpc-1 (: )"
        );

        let e = e.with_aws_error("Gateway.NotAttached", "not attached");
        assert_eq!(
            format_log_entry(&e),
            "Failed to delete AWS::EC2::InternetGateway igw-1 from AWS::EC2::VPC vpc-1 \
             (Gateway.NotAttached: not attached)"
        );
    }

    #[test]
    fn test_empty_parent_name_is_no_parent() {
        let e = entry()
            .with_parent(ResourceType::Ec2Vpc, "".into())
            .with_err_msg("boom");
        assert_eq!(format_log_entry(&e), "Failed to delete AWS::EC2::Subnet subnet-1 (boom)");
    }

    #[test]
    fn test_render_report() {
        let report = render_report(&[entry().with_err_msg("boom")]);
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[3], "Failed to delete AWS::EC2::Subnet subnet-1 (boom)");
        assert_eq!(lines[4], LOG_TAIL);

        assert_eq!(render_report(&[]).lines().count(), 4);
    }
}
