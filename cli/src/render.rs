//! Text rendering of session views.

use trendsage::api::{Job, MatchResult};
use trendsage::monitor::{ResultsView, SessionPhase, SessionView};
use trendsage::SessionEvent;

pub fn event(event: &SessionEvent, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(event)?);
    } else {
        println!(
            "[{}] {}: {}",
            event.timestamp.format("%H:%M:%S"),
            event.kind,
            event.message
        );
    }
    Ok(())
}

pub fn view(view: &SessionView, json: bool, hide_prompt: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }

    match view.phase {
        SessionPhase::Loading => println!("Loading..."),
        SessionPhase::StartPrompt => {
            println!("No analysis has been run for '{}' yet.", view.project_key);
            if !hide_prompt {
                println!("Run `trendsage start {}` to find matching influencers.", view.project_key);
            }
        }
        SessionPhase::Running => {
            if let Some(job) = &view.job {
                println!("{}", job_line(job));
            }
            println!("Analysis in progress. This usually takes a few minutes.");
        }
        SessionPhase::JobFailed => {
            if let Some(job) = &view.job {
                println!("{}", job_line(job));
            }
            println!(
                "Analysis failed: {}",
                view.error.as_deref().unwrap_or("unknown error")
            );
            if view.can_retry {
                println!("Run `trendsage retry {}` to try again.", view.project_key);
            }
        }
        SessionPhase::Results => {
            if let Some(results) = &view.results {
                print!("{}", results_text(results));
            }
        }
        SessionPhase::Error => {
            println!(
                "Error: {}",
                view.error.as_deref().unwrap_or("failed to load job status")
            );
        }
    }
    Ok(())
}

fn job_line(job: &Job) -> String {
    format!(
        "Job {} ({}) created {}",
        job.id,
        job.status,
        job.created_at.format("%Y-%m-%d %H:%M UTC")
    )
}

fn card(index: usize, m: &MatchResult) -> String {
    let mut out = format!(
        "{:>3}. {}  [{}]  cred {:.1}  synergy {}/5\n",
        index, m.influencer_handle, m.tier, m.cred_score, m.synergy_rating_to_project
    );
    if !m.synergy_rationale.is_empty() {
        out.push_str(&format!("     {}\n", m.synergy_rationale));
    }
    if !m.recommended_marketing_angle.is_empty() {
        out.push_str(&format!("     Angle: {}\n", m.recommended_marketing_angle));
    }
    if !m.keywords_from_tweets.is_empty() {
        out.push_str(&format!("     Keywords: {}\n", m.keywords_from_tweets.join(", ")));
    }
    out
}

pub fn results_text(results: &ResultsView) -> String {
    let mut out = String::new();

    if let Some(error) = &results.error {
        out.push_str(&format!("Could not load matches: {}\n", error));
    }
    if results.matches.is_empty() {
        out.push_str(if results.filters.is_empty() && results.search.is_empty() {
            "No matches yet.\n"
        } else {
            "No matches for the current filters.\n"
        });
    }

    let offset = (results.pagination.page.saturating_sub(1) * results.pagination.page_size) as usize;
    for (i, m) in results.matches.iter().enumerate() {
        out.push_str(&card(offset + i + 1, m));
    }

    if results.show_pagination {
        let p = &results.pagination;
        let total = p
            .total_count
            .map(|t| format!(" of {}", t))
            .unwrap_or_default();
        out.push_str(&format!(
            "\nPage {} (showing {}{}){}{}\n",
            p.page,
            p.showing_count,
            total,
            if p.has_previous { "  < prev" } else { "" },
            if p.has_next { "  next >" } else { "" },
        ));
    }
    out
}
