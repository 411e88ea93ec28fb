//! Prompt templating for AI reports

use crate::core::error::ConsoleError;
use std::path::Path;

/// Marker replaced with the raw enumeration data in custom prompts
pub const PLACEHOLDER: &str = "{pacu_data}";

const DEFAULT_TEMPLATE: &str = r#"You are an AWS penetration tester. Analyze this Pacu enumeration data and create an offensive security report.

**ENUMERATION DATA:**
{pacu_data}

**REPORT FORMAT (Markdown):**

# AWS Penetration Test Report

## Executive Summary
Brief overview of access level, attack surface, and critical findings.

## Privilege Escalation Paths
Identify IAM policies and permissions that enable privilege escalation (iam:PutUserPolicy, iam:AttachRolePolicy, AssumeRole chains, etc.).

## Attack Chains
Document exploitable attack paths with step-by-step techniques to achieve objectives (data access, lateral movement, persistence).

## High-Value Targets
- Publicly accessible resources (S3 buckets, snapshots, databases)
- Overprivileged roles and users
- Credential harvesting opportunities (EC2 metadata, Lambda env vars, Secrets Manager)
- Sensitive data exposure risks

## Lateral Movement
Service-to-service access paths, cross-account possibilities, network pivoting opportunities.

## Defensive Gaps
Missing security controls (CloudTrail, GuardDuty, encryption, network segmentation).

## Recommendations
Prioritized remediation steps with specific commands/policy changes.

**INSTRUCTIONS:**
- Focus on exploitability and attack paths, not just misconfigurations
- Reference actual resource names, ARNs, and specific configurations
- Provide technical exploitation details and commands
- Think like an attacker"#;

/// Build the model prompt.
///
/// A custom prompt has every `{pacu_data}` replaced with `raw_data`; without
/// one the built-in offensive-security template is used.
pub fn build_prompt(raw_data: &str, custom_prompt: Option<&str>) -> String {
    match custom_prompt.filter(|p| !p.is_empty()) {
        Some(prompt) => prompt.replace(PLACEHOLDER, raw_data),
        None => default_prompt(raw_data),
    }
}

pub fn default_prompt(raw_data: &str) -> String {
    DEFAULT_TEMPLATE.replace(PLACEHOLDER, raw_data)
}

pub fn prompt_has_placeholder(prompt: &str) -> bool {
    prompt.contains(PLACEHOLDER)
}

/// Resolve the operator's custom prompt; inline text wins over a file.
///
/// Called before any enumeration work so an unreadable file is reported
/// up front.
pub async fn load_custom_prompt(
    inline: Option<&str>,
    file: Option<&Path>,
) -> Result<Option<String>, ConsoleError> {
    if let Some(prompt) = inline {
        return Ok(Some(prompt.to_string()));
    }

    let Some(path) = file else {
        return Ok(None);
    };

    match tokio::fs::read_to_string(path).await {
        Ok(prompt) => Ok(Some(prompt)),
        Err(e) => Err(ConsoleError::PromptFile {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
    }
}
