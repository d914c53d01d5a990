//! Line-oriented terminal walkthrough driving a [`Session`].
//!
//! Generic over its input and output so the same flow runs on stdin/stdout
//! and under test with in-memory buffers. Typing `quit` at any prompt ends
//! the walkthrough without an order.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::debug;

use crate::catalog::Category;
use crate::encounter::intake::{band_weight, parse_ward_weight};
use crate::encounter::{CareSetting, DependencyStatus};
use crate::engine::{AdvisoryKind, Engine};
use crate::rules::RulesConfig;
use crate::session::{Session, WeightProposal};
use crate::summary::OrderSummary;

const HELP: &str = "\
Commands:
  <n>.<m>   toggle item m of category n
  state     print the current selection as JSON
  done      review and finish the order
  help      show this message
  quit      leave without ordering";

/// Read one trimmed line. `None` on end of input or `quit`.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> Result<Option<String>> {
    write!(output, "{} ", text)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line).context("Failed to read input")? == 0 {
        return Ok(None);
    }
    let line = line.trim();
    if line.eq_ignore_ascii_case("quit") {
        return Ok(None);
    }
    Ok(Some(line.to_string()))
}

/// Run the full walkthrough. Returns the order summary when the user
/// finishes with `done`, or `None` if they quit or input ends early.
pub fn run_shell<R: BufRead, W: Write>(
    engine: &Engine,
    mut input: R,
    mut output: W,
) -> Result<Option<OrderSummary>> {
    let mut session = Session::new(engine);

    if !choose_location(&mut session, &mut input, &mut output)? {
        return Ok(None);
    }
    if !enter_patient_id(&mut session, &mut input, &mut output)? {
        return Ok(None);
    }
    if !enter_weight(&mut session, &mut input, &mut output)? {
        return Ok(None);
    }
    if !choose_dependency(&mut session, &mut input, &mut output)? {
        return Ok(None);
    }
    choose_equipment(&mut session, &mut input, &mut output)
}

fn choose_location<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    let locations = &session_rules(session).locations;
    writeln!(output, "Locations:")?;
    for (idx, loc) in locations.iter().enumerate() {
        writeln!(output, "  {}. {} ({})", idx + 1, loc.label, loc.code)?;
    }

    loop {
        let Some(answer) = prompt(input, output, "Location (number or code):")? else {
            return Ok(false);
        };
        let code = match answer.parse::<usize>() {
            Ok(n) if (1..=locations.len()).contains(&n) => locations[n - 1].code.clone(),
            _ => answer.to_ascii_uppercase(),
        };
        match session.set_location(&code) {
            Ok(()) => break,
            Err(e) => writeln!(output, "  {}", e)?,
        }
    }

    if session.location().map(|l| l.setting) == Some(CareSetting::Ward) {
        loop {
            let Some(answer) = prompt(input, output, "Ward name:")? else {
                return Ok(false);
            };
            match session.set_ward_name(&answer) {
                Ok(()) => break,
                Err(e) => writeln!(output, "  {}", e.message)?,
            }
        }
    }
    Ok(true)
}

fn enter_patient_id<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    loop {
        let Some(answer) = prompt(input, output, "Patient NHI:")? else {
            return Ok(false);
        };
        match session.set_patient_id(&answer) {
            Ok(()) => return Ok(true),
            Err(e) => writeln!(output, "  {}", e.message)?,
        }
    }
}

fn enter_weight<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    let emergency = session.location().map(|l| l.setting) == Some(CareSetting::Emergency);
    let rules = session_rules(session);

    if emergency {
        writeln!(output, "Weight bands:")?;
        for (idx, band) in rules.weight_bands.iter().enumerate() {
            writeln!(output, "  {}. {}", idx + 1, band.label)?;
        }
    }

    loop {
        let text = if emergency { "Weight band:" } else { "Weight (kg):" };
        let Some(answer) = prompt(input, output, text)? else {
            return Ok(false);
        };

        let weight = if emergency {
            let index = answer.parse::<usize>().ok().and_then(|n| n.checked_sub(1));
            match index.map(|i| band_weight(rules, i)) {
                Some(Ok(w)) => w,
                Some(Err(e)) => {
                    writeln!(output, "  {}", e)?;
                    continue;
                }
                None => {
                    writeln!(output, "  Enter a band number")?;
                    continue;
                }
            }
        } else {
            match parse_ward_weight(&answer) {
                Ok(w) => w,
                Err(e) => {
                    writeln!(output, "  {}", e.message)?;
                    continue;
                }
            }
        };

        match session.propose_weight(weight)? {
            WeightProposal::Committed => return Ok(true),
            WeightProposal::NeedsConfirmation(alert) => {
                writeln!(output, "  ! {}", alert.message)?;
                let Some(answer) = prompt(input, output, "Continue with this weight? [y/n]")? else {
                    return Ok(false);
                };
                if answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes") {
                    session.confirm_weight()?;
                    return Ok(true);
                }
                session.cancel_pending_weight();
            }
        }
    }
}

fn choose_dependency<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    if session.location().map(|l| l.setting) != Some(CareSetting::Ward) {
        return Ok(true);
    }

    loop {
        let Some(answer) = prompt(input, output, "Dependency [d]ependent / [i]ndependent:")? else {
            return Ok(false);
        };
        let status = match answer.to_ascii_lowercase().as_str() {
            "d" | "dependent" => DependencyStatus::Dependent,
            "i" | "independent" => DependencyStatus::Independent,
            _ => {
                writeln!(output, "  Answer d or i")?;
                continue;
            }
        };
        session.set_dependency(status);
        return Ok(true);
    }
}

fn render_plan<W: Write>(session: &Session<'_>, output: &mut W) -> Result<Vec<Category>> {
    let plan = session.plan();
    let categories: Vec<Category> = plan.categories().collect();

    writeln!(output)?;
    for (n, &category) in categories.iter().enumerate() {
        let marker = if plan.is_optional(category) { " (optional)" } else { "" };
        writeln!(output, "{}. {}{}", n + 1, category, marker)?;

        let selected = session.selections().get(&category);
        for (m, item) in session.eligible(category).enumerate() {
            let mark = if selected == Some(&item.name) {
                if session.is_derived(category) { "[auto]" } else { "[x]" }
            } else {
                "[ ]"
            };
            match item.effective_max_load() {
                Some(kg) => writeln!(output, "   {}.{} {} {} (SWL {} kg)", n + 1, m + 1, mark, item.name, kg)?,
                None => writeln!(output, "   {}.{} {} {}", n + 1, m + 1, mark, item.name)?,
            }
        }
    }

    for advisory in session.advisories() {
        let tag = match advisory.kind {
            AdvisoryKind::Notice => "Note",
            AdvisoryKind::NoEquipment => "Warning",
        };
        match advisory.category {
            Some(category) => writeln!(output, "{} ({}): {}", tag, category, advisory.message)?,
            None => writeln!(output, "{}: {}", tag, advisory.message)?,
        }
    }

    Ok(categories)
}

/// Parse "<n>.<m>" into zero-based indices.
fn parse_pick(command: &str) -> Option<(usize, usize)> {
    let (n, m) = command.split_once('.')?;
    let n = n.trim().parse::<usize>().ok()?.checked_sub(1)?;
    let m = m.trim().parse::<usize>().ok()?.checked_sub(1)?;
    Some((n, m))
}

fn choose_equipment<R: BufRead, W: Write>(
    session: &mut Session<'_>,
    input: &mut R,
    output: &mut W,
) -> Result<Option<OrderSummary>> {
    let mut categories = render_plan(session, output)?;
    writeln!(output, "{}", HELP)?;

    loop {
        let Some(command) = prompt(input, output, ">")? else {
            return Ok(None);
        };

        match command.as_str() {
            "" => continue,
            "help" => writeln!(output, "{}", HELP)?,
            "state" => {
                let json = serde_json::to_string_pretty(session.selections())?;
                writeln!(output, "{}", json)?;
            }
            "done" => {
                let missing = session.missing_required();
                if missing.is_empty() && session.can_complete() {
                    let summary = session.summary()?;
                    writeln!(output)?;
                    write!(output, "{}", summary)?;
                    return Ok(Some(summary));
                }
                let names: Vec<&str> = missing.iter().map(|c| c.as_str()).collect();
                writeln!(output, "Still required: {}", names.join(", "))?;
            }
            other => {
                let picked = parse_pick(other).and_then(|(n, m)| {
                    let category = *categories.get(n)?;
                    let item = session.eligible(category).nth(m)?;
                    Some((category, item.name.clone()))
                });
                let Some((category, name)) = picked else {
                    writeln!(output, "Unknown command: {} (type help)", other)?;
                    continue;
                };

                debug!("Shell toggling {} = {}", category, name);
                if let Err(e) = session.select(category, &name) {
                    writeln!(output, "  {}", e)?;
                }
                categories = render_plan(session, output)?;
            }
        }
    }
}

fn session_rules<'e>(session: &Session<'e>) -> &'e RulesConfig {
    session.engine().rules()
}
