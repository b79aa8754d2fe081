//! Terminal shell for the intake interview.
//!
//! Reads one line per prompt from stdin. Choices accept an option number or
//! its label; multi-choice accepts a comma-separated list; measurements
//! accept a trailing unit ("70 kg", "5.9 in"). `:restart` and `:quit` are
//! available at any prompt. Logs go to stderr.

use std::io::Write as _;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::signal;
use tracing::{error, info};

use intake_sherpa::adapters::provider_from_config;
use intake_sherpa::application::{IntakeSession, PlanGenerationClient};
use intake_sherpa::config::{AppConfig, LoggingConfig};
use intake_sherpa::domain::classification::Unit;
use intake_sherpa::domain::flow::{intake_flow, AnswerValue, InputKind, StepPrompt};
use intake_sherpa::domain::interview::{EngineOutput, EngineResponse, InterviewError};
use intake_sherpa::domain::plan::Plan;

fn init_tracing(config: &LoggingConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr);
    if config.json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);
    config.validate().context("invalid configuration")?;

    let provider = provider_from_config(&config.ai).context("failed to create AI provider")?;
    let client = PlanGenerationClient::new(provider).with_temperature(config.ai.temperature);
    let flow = intake_flow().context("intake flow definition is invalid")?;

    info!(version = env!("CARGO_PKG_VERSION"), "intake shell starting");

    let mut session = IntakeSession::new(flow);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut response = session.start()?;

    loop {
        render(&response);

        match &response.output {
            EngineOutput::GeneratePlan { .. } => {
                generate(&mut session, &client).await?;
                return Ok(());
            }
            EngineOutput::Finished { .. } => return Ok(()),
            EngineOutput::AwaitingInput { .. } | EngineOutput::Rejected { .. } => {}
        }

        let Some(line) = read_line(&mut lines).await? else {
            return Ok(());
        };

        let result = match line.trim() {
            ":quit" => return Ok(()),
            ":restart" => session.restart(),
            input => submit(&mut session, response.output.prompt(), input),
        };

        match result {
            Ok(next) => response = next,
            Err(e) if e.is_configuration() => {
                error!(error = %e, "flow definition defect");
                return Err(e.into());
            }
            Err(e) => println!("  ! {}", e),
        }
    }
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

fn submit(
    session: &mut IntakeSession,
    prompt: &StepPrompt,
    input: &str,
) -> std::result::Result<EngineResponse, InterviewError> {
    if session.engine().state().is_clarifying() {
        return session.submit_clarification(input);
    }

    let options = prompt.input.options;
    let answer = match prompt.input.kind {
        InputKind::Choice => AnswerValue::text(pick(options, input)),
        InputKind::MultiChoice => AnswerValue::List(
            input
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| pick(options, part))
                .collect(),
        ),
        InputKind::NumberWithUnit => {
            let (number, unit) = split_unit(input);
            if let Some(unit) = unit {
                session.set_unit(unit.category(), unit)?;
            }
            AnswerValue::text(number)
        }
        _ => AnswerValue::text(input),
    };

    session.submit_answer(answer)
}

/// Resolves a 1-based option number to its label; anything else passes through.
fn pick(options: &[&str], input: &str) -> String {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| options.get(index))
        .map(|label| label.to_string())
        .unwrap_or_else(|| input.to_string())
}

fn split_unit(input: &str) -> (&str, Option<Unit>) {
    let split = input
        .find(|c: char| c.is_ascii_alphabetic())
        .map(|index| input.split_at(index));
    match split {
        Some((number, unit)) => match unit.parse::<Unit>() {
            Ok(unit) => (number.trim(), Some(unit)),
            Err(_) => (input, None),
        },
        None => (input, None),
    }
}

fn render(response: &EngineResponse) {
    for notice in &response.notices {
        println!("\n{}", notice);
    }

    let prompt = response.output.prompt();
    if let EngineOutput::Rejected { error, .. } = &response.output {
        println!("  ! {}", error);
        return;
    }

    println!("\n{}", prompt.text);
    for (index, option) in prompt.input.options.iter().enumerate() {
        println!("  {}. {}", index + 1, option);
    }
    if let Some(scale) = prompt.input.scale {
        println!("  ({}-{})", scale.min, scale.max);
    }
    if let Some(category) = prompt.input.unit_category {
        let units: Vec<&str> = category.units().iter().map(Unit::as_str).collect();
        println!("  (units: {})", units.join(" / "));
    }
    if let Some(placeholder) = prompt.input.placeholder {
        println!("  e.g. {}", placeholder);
    }
}

async fn generate(session: &mut IntakeSession, client: &PlanGenerationClient) -> Result<()> {
    let ticket = session.plan_ticket()?;
    let (request, handle) = client.generate_plan_abortable(
        ticket.interview_id,
        ticket.answers.clone(),
        ticket.classification,
    );

    println!("\nGenerating your plan (Ctrl-C to cancel)...");
    let plan = tokio::select! {
        result = request => result.ok(),
        _ = signal::ctrl_c() => {
            handle.abort();
            None
        }
    };

    match plan {
        Some(plan) => print_plan(session.accept_plan(&ticket, plan)?),
        None => println!("Plan generation cancelled."),
    }
    Ok(())
}

fn print_plan(plan: &Plan) {
    if plan.is_fallback() {
        println!("\nWe could not personalise your plan. General guidance follows.");
    }
    for (title, text) in plan.titled_sections() {
        println!("\n## {}\n{}", title, text);
    }
}
