//! PA Decision Orchestrator — Demo CLI
//!
//! Runs one or all of the reference scenarios against the orchestrator,
//! wired together with mock specialist services and the mock synthesizer.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- approval
//!   cargo run -p demo -- denial
//!   cargo run -p demo -- cache-hit
//!   cargo run -p demo -- interactions

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pa_audit::RateLimiter;
use pa_contracts::error::PaResult;
use pa_core::context::Context as CoreContext;
use pa_core::traits::DrugService;
use pa_orchestrator::PaOrchestrator;
use pa_specialists::{MockDrugService, MockGuidelineService, MockPatientService, MockPolicyService};
use pa_synthesizer::SynthesizerPipeline;

#[derive(Parser)]
#[command(
    name = "demo",
    about = "PA decision orchestrator demo",
    long_about = "Runs reference scenarios against the PA decision orchestrator,\n\
                  showing the gather -> evidence -> synthesis -> cache pipeline\n\
                  and its hash-chained audit trail.\n\n\
                  Scenarios:\n\
                  1. Approval            — patient-001 + Empagliflozin + UHC\n\
                  2. Denial               — patient-002, missing step therapy\n\
                  3. Cache hit            — re-issues the approval scenario\n\
                  4. Drug interactions    — warfarin + aspirin, order-independent"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all scenarios in sequence.
    RunAll,
    /// Scenario 1: Approval path.
    Approval,
    /// Scenario 2: Denial — missing step therapy.
    Denial,
    /// Scenario 3: Cache hit on a repeated request.
    CacheHit,
    /// Scenario 4: Drug interaction check.
    Interactions,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    print_banner();

    let orchestrator = build_orchestrator();

    let result = match cli.command {
        Command::RunAll => run_all(&orchestrator).await,
        Command::Approval => run_approval(&orchestrator).await,
        Command::Denial => run_denial(&orchestrator).await,
        Command::CacheHit => run_cache_hit(&orchestrator).await,
        Command::Interactions => run_interactions(&orchestrator).await,
    };

    match result {
        Ok(()) => println!("All selected scenarios completed successfully."),
        Err(e) => {
            eprintln!("Demo error: {e}");
            std::process::exit(1);
        }
    }
}

fn build_orchestrator() -> PaOrchestrator {
    let rate_limiter = RateLimiter::new(100, 60);
    PaOrchestrator::new(
        Arc::new(MockPatientService::new()),
        Arc::new(MockDrugService::new(rate_limiter)),
        Arc::new(MockPolicyService::new()),
        Arc::new(MockGuidelineService::new()),
        Arc::new(SynthesizerPipeline::new()),
        CoreContext::production(Default::default()),
    )
}

async fn run_all(orchestrator: &PaOrchestrator) -> PaResult<()> {
    run_approval(orchestrator).await?;
    run_denial(orchestrator).await?;
    run_cache_hit(orchestrator).await?;
    run_interactions(orchestrator).await?;
    Ok(())
}

async fn run_approval(orchestrator: &PaOrchestrator) -> PaResult<()> {
    println!("--- Scenario 1: Approval path ---");
    let result = orchestrator
        .predict_approval_likelihood("patient-001", "empagliflozin", "uhc", None)
        .await?;
    print_result(&result);
    Ok(())
}

async fn run_denial(orchestrator: &PaOrchestrator) -> PaResult<()> {
    println!("--- Scenario 2: Denial — missing step therapy ---");
    let result = orchestrator
        .predict_approval_likelihood("patient-002", "empagliflozin", "uhc", None)
        .await?;
    print_result(&result);
    Ok(())
}

async fn run_cache_hit(orchestrator: &PaOrchestrator) -> PaResult<()> {
    println!("--- Scenario 3: Cache hit ---");
    let first = orchestrator
        .predict_approval_likelihood("patient-001", "empagliflozin", "uhc", None)
        .await?;
    let second = orchestrator
        .predict_approval_likelihood("patient-001", "empagliflozin", "uhc", None)
        .await?;
    println!("first source={} second source={}", first.source, second.source);
    Ok(())
}

async fn run_interactions(orchestrator: &PaOrchestrator) -> PaResult<()> {
    println!("--- Scenario 4: Drug interaction check ---");
    let drugs = vec!["warfarin".to_string(), "aspirin".to_string()];
    let (results, summary) = orchestrator.drug_service().interactions(&drugs).await?;
    for interaction in &results {
        println!(
            "{} + {}: severity={:?} management={}",
            interaction.drugs.0, interaction.drugs.1, interaction.severity, interaction.management
        );
    }
    println!("highest severity: {:?}", summary.highest_severity);
    Ok(())
}

fn print_result(result: &pa_contracts::analysis::AnalysisResult) {
    println!("decision_id:        {}", result.decision_id);
    println!("decision:           {:?}", result.decision);
    println!("approval_likelihood: {:.1}%", result.approval_likelihood);
    println!("confidence:         {:.2} ({:?})", result.confidence_score, result.confidence_level);
    println!("rationale:          {}", result.clinical_rationale);
    println!("recommendations:    {:?}", result.recommendations);
    println!("source:             {}", result.source);
    println!("audit entries:      {}", result.audit_trail.len());
    println!();
}

fn print_banner() {
    println!();
    println!("PA Decision Orchestrator");
    println!("Reference Demo");
    println!("========================");
    println!();
    println!("Pipeline per request:");
    println!("  [1] Cache lookup by SHA-256(patient_id:drug_name:insurer_id)");
    println!("  [2] Parallel gather across patient/drug/policy/guideline services");
    println!("  [3] Evidence engine produces a weighted preliminary score");
    println!("  [4] Synthesizer pipeline: primary -> fallback -> rule-based");
    println!("  [5] Result cached, metrics updated, hash-chained audit trail sealed");
    println!();
}
