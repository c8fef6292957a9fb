//! Markdown and JSON report generation.
//!
//! Only sections that were part of the run are rendered; a code-only run
//! has no commit section at all rather than an empty one.

use crate::analysis::aggregator::top_factors;
use crate::analysis::session::{CodeFindings, RepoFindings};
use crate::models::{
    CommitAnalysis, ReadmeAnalysis, Report, ReportMetadata, SlopScoreResult, SomAnalysis, Verdict,
};
use anyhow::Result;
use serde_json::Value;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, include_reasoning: bool) -> String {
    let mut output = String::new();

    output.push_str("# SlopScan Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_headline_section(report));

    let session = &report.session;

    if let Some(repo) = session.repo() {
        if session.som_enabled() {
            output.push_str(&generate_links_section(repo));
        }
        output.push_str(&generate_readme_section(&repo.readme, include_reasoning));
        if session.commit_enabled() {
            output.push_str(&generate_commits_section(&repo.commits, include_reasoning));
        }
        if let Some(som) = repo.som.as_ref().filter(|_| session.som_enabled()) {
            output.push_str(&generate_som_section(som, include_reasoning));
        }
        output.push_str(&generate_composite_section(&repo.score, include_reasoning));
    }

    if let Some(code) = session.code().filter(|_| session.code_enabled()) {
        output.push_str(&generate_code_section(code, include_reasoning));
    }

    output.push_str(&generate_footer());

    output
}

fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Project:** {}\n", metadata.source_url));
    section.push_str(&format!("- **Mode:** `{}`\n", metadata.mode));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Backend:** {}\n", metadata.gateway_url));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn generate_headline_section(report: &Report) -> String {
    let mut section = String::new();
    let score = report.session.slop_score().slopscore;
    let verdict = Verdict::from_score(score);

    section.push_str("## Slop Score\n\n");
    section.push_str(&format!(
        "### {} {:.0}/100 ({})\n\n",
        verdict.emoji(),
        score,
        verdict
    ));

    let factors = top_factors(&report.session, 5);
    if !factors.is_empty() {
        section.push_str("**Main factors:**\n\n");
        for factor in factors {
            section.push_str(&format!("- {}\n", factor));
        }
        section.push('\n');
    }

    section
}

fn generate_links_section(repo: &RepoFindings) -> String {
    let mut section = String::new();
    section.push_str("## Project Links\n\n");
    if repo.links.is_empty() {
        section.push_str("*The project's repository could not be resolved.*\n\n");
        return section;
    }
    if let Some(ref link) = repo.links.repo_link {
        section.push_str(&format!("- **Repository:** {}\n", link));
    }
    if let Some(ref link) = repo.links.readme_link {
        section.push_str(&format!("- **README:** {}\n", link));
    }
    section.push('\n');
    section
}

fn generate_readme_section(readme: &ReadmeAnalysis, include_reasoning: bool) -> String {
    let mut section = String::new();

    section.push_str("## README\n\n");
    match readme.probability {
        Some(p) => section.push_str(&format!("- **AI probability:** {:.0}%\n", p)),
        None => section.push_str("- **AI probability:** n/a\n"),
    }
    if let Some(ref complexity) = readme.complexity {
        section.push_str(&format!("- **Complexity:** {}\n", display_value(complexity)));
    }
    section.push('\n');

    if let Some(ref summary) = readme.summary {
        section.push_str(&format!("{}\n\n", summary));
    }
    if include_reasoning {
        if let Some(ref reasoning) = readme.reasoning {
            section.push_str(&format!("> {}\n\n", reasoning));
        }
    }

    section
}

fn generate_commits_section(commits: &CommitAnalysis, include_reasoning: bool) -> String {
    let mut section = String::new();
    let verdict = &commits.analysis;

    section.push_str("## Commit History\n\n");
    if !commits.owner.is_empty() {
        section.push_str(&format!(
            "*{}/{} on `{}`, {} commits*\n\n",
            commits.owner, commits.repo, commits.branch, commits.total_commits
        ));
    }

    section.push_str("| AI | Adequacy | Fraud |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {:.0}% | {:.0}% | {:.0}% |\n\n",
        verdict.ai, verdict.adequacy, verdict.fraud
    ));

    if !verdict.red_flags.is_empty() {
        section.push_str("**Red flags:**\n\n");
        for flag in &verdict.red_flags {
            section.push_str(&format!("- 🚩 {}\n", flag));
        }
        section.push('\n');
    }

    if include_reasoning && !verdict.reasoning.is_empty() {
        section.push_str(&format!("> {}\n\n", verdict.reasoning));
    }

    section
}

fn generate_som_section(som: &SomAnalysis, include_reasoning: bool) -> String {
    let mut section = String::new();

    section.push_str("## Summer of Making Devlogs\n\n");
    if let Some(p) = som.probability {
        section.push_str(&format!("- **AI probability:** {:.0}%\n", p));
    }

    let mut keys: Vec<_> = som.extra.iter().filter(|(_, v)| is_scalar(v)).collect();
    keys.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in keys {
        section.push_str(&format!("- **{}:** {}\n", key, display_value(value)));
    }
    section.push('\n');

    if include_reasoning {
        if let Some(ref reasoning) = som.reasoning {
            section.push_str(&format!("> {}\n\n", reasoning));
        }
    }

    section
}

fn generate_composite_section(score: &SlopScoreResult, include_reasoning: bool) -> String {
    let mut section = String::new();

    section.push_str("## Composite Score\n\n");
    section.push_str(&format!("**{:.0}/100**\n\n", score.slopscore));
    if include_reasoning && !score.reasoning.is_empty() {
        section.push_str(&format!("> {}\n\n", score.reasoning));
    }

    section
}

fn generate_code_section(code: &CodeFindings, include_reasoning: bool) -> String {
    let mut section = String::new();
    let results = &code.code.ai_analysis.analysis_results;

    section.push_str("## Source Code\n\n");
    section.push_str(&format!(
        "*{} files analyzed from {}*\n\n",
        code.code.total_files_analyzed, code.repo_url
    ));
    section.push_str("| AI | Perfectness | Unused code |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {:.0}% | {:.0}% | {:.0}% |\n\n",
        results.ai, results.perfectness, results.unused
    ));

    if include_reasoning && !results.reasoning.is_empty() {
        section.push_str(&format!("> {}\n\n", results.reasoning));
    }

    section
}

fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(
        "*Scores are produced by a language model and are a signal, not proof. \
         Report generated by SlopScan.*\n",
    );

    footer
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
