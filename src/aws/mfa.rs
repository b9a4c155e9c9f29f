use dialoguer::{Input, theme::ColorfulTheme};
use tracing::debug;

use crate::error::CredentialError;

/// Prompt on the terminal for the one-time code of the given MFA device
pub fn prompt_token(serial: &str) -> Result<String, CredentialError> {
    debug!("Prompting for MFA token: {}", serial);

    let code = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Enter MFA code for {serial}"))
        .validate_with(|input: &String| validate_token(input))
        .interact_text()
        .map_err(|source| CredentialError::TokenPrompt {
            serial: serial.to_string(),
            source,
        })?;

    Ok(code.trim().to_string())
}

fn validate_token(input: &str) -> Result<(), &'static str> {
    let code = input.trim();
    if code.len() == 6 && code.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err("MFA code must be 6 digits")
    }
}
