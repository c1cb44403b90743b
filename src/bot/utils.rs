//! Argument parsing and validation for the watch commands.

use crate::bot::error::BotError;

pub const SEASONS: [&str; 4] = ["fall", "winter", "spring", "summer"];

/// Validated arguments of `add <quarter> <subject> <class id>`.
#[derive(Debug, PartialEq, Eq)]
pub struct AddArgs {
    pub quarter: String,
    pub subject: String,
    pub class_id: String,
}

/// Validated arguments of `remove <quarter> <class id>`.
#[derive(Debug, PartialEq, Eq)]
pub struct RemoveArgs {
    pub quarter: String,
    pub class_id: String,
}

pub fn parse_add_args(raw: &str) -> Result<AddArgs, BotError> {
    let params = split_params(raw);
    check_count(&params, 3, "quarter name, class name and class item number")?;
    Ok(AddArgs {
        quarter: validate_quarter(&params[0])?,
        subject: validate_subject(&params[1])?,
        class_id: validate_class_id(&params[2])?,
    })
}

pub fn parse_remove_args(raw: &str) -> Result<RemoveArgs, BotError> {
    let params = split_params(raw);
    check_count(&params, 2, "quarter name and class item number")?;
    Ok(RemoveArgs {
        quarter: validate_quarter(&params[0])?,
        class_id: validate_class_id(&params[1])?,
    })
}

/// Whitespace-delimited parameters, lower-cased.
fn split_params(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_lowercase).collect()
}

fn check_count(params: &[String], expected: usize, usage: &'static str) -> Result<(), BotError> {
    if params.len() != expected {
        return Err(BotError::WrongArgumentCount {
            expected,
            found: params.len(),
            usage,
        });
    }
    Ok(())
}

/// `[fall|winter|spring|summer]YYYY`, e.g. `fall2024`.
pub fn validate_quarter(quarter: &str) -> Result<String, BotError> {
    let year = SEASONS
        .iter()
        .find_map(|season| quarter.strip_prefix(season));
    match year {
        Some(year) if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) => {
            Ok(quarter.to_string())
        }
        _ => Err(BotError::InvalidCommandArgument {
            parameter: "quarter name".to_string(),
            reason: format!(
                "`{quarter}` must look like FALL2024 (FALL, WINTER, SPRING or SUMMER followed by the full year)."
            ),
        }),
    }
}

/// 3-5 letter subject code, optionally followed by `&` (e.g. `engl&`).
pub fn validate_subject(subject: &str) -> Result<String, BotError> {
    let letters = subject.strip_suffix('&').unwrap_or(subject);
    if (3..=5).contains(&letters.len()) && letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Ok(subject.to_string());
    }
    Err(BotError::InvalidCommandArgument {
        parameter: "class name".to_string(),
        reason: format!("`{subject}` must be the 3-5 letter class code (e.g. ACCT)."),
    })
}

/// 3-4 digit class item number.
pub fn validate_class_id(class_id: &str) -> Result<String, BotError> {
    if (3..=4).contains(&class_id.len()) && class_id.chars().all(|c| c.is_ascii_digit()) {
        return Ok(class_id.to_string());
    }
    Err(BotError::InvalidCommandArgument {
        parameter: "class item number".to_string(),
        reason: format!("`{class_id}` must be the 3-4 digit class item number."),
    })
}
