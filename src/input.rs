use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::debug;

use crate::devops::Credentials;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Pull Request Number must be a valid number (got '{0}').")]
    InvalidPrNumber(String),

    #[error("Please fill in all fields ({0} is empty).")]
    MissingField(&'static str),
}

/// The five form fields exactly as the user typed them.
#[derive(Default)]
pub struct RawInputs {
    pub token: String,
    pub organization: String,
    pub project: String,
    pub repository: String,
    pub pr_number: String,
}

/// Turn raw form input into session credentials.
///
/// Organization, project, repository and PR number are trimmed; the PR
/// number must parse as a positive integer, and no field may be blank.
/// Nothing here touches the network.
pub fn validate_inputs(raw: &RawInputs) -> Result<Credentials, ValidationError> {
    let organization = raw.organization.trim();
    let project = raw.project.trim();
    let repository = raw.repository.trim();
    let pr_number = raw.pr_number.trim();

    let pr_number = match pr_number.parse::<i64>() {
        Ok(n) if n > 0 => n as u64,
        _ => return Err(ValidationError::InvalidPrNumber(pr_number.to_string())),
    };

    let required = [
        ("Personal Access Token", raw.token.trim()),
        ("Organization", organization),
        ("Project", project),
        ("Repository", repository),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
        return Err(ValidationError::MissingField(*field));
    }

    debug!(organization, project, repository, pr_number, "validated inputs");
    Ok(Credentials {
        token: raw.token.clone(),
        organization: organization.to_string(),
        project: project.to_string(),
        repository: repository.to_string(),
        pr_number,
    })
}

/// Prompt for the five form fields, one line each.
///
/// The token is obtained through `read_secret`, which receives the prompt
/// label; the other four fields are read from `reader`.
pub fn prompt_inputs<R, W, F>(reader: &mut R, writer: &mut W, read_secret: F) -> io::Result<RawInputs>
where
    R: BufRead,
    W: Write,
    F: FnOnce(&str) -> io::Result<String>,
{
    Ok(RawInputs {
        token: read_secret("Personal Access Token")?,
        organization: prompt(reader, writer, "Organization Name")?,
        project: prompt(reader, writer, "Project Name")?,
        repository: prompt(reader, writer, "Repository Name")?,
        pr_number: prompt(reader, writer, "Pull Request Number")?,
    })
}

/// Read a secret from the terminal without echoing it.
pub fn read_hidden(label: &str) -> io::Result<String> {
    rpassword::prompt_password(format!("{}: ", label))
}

/// Ask a yes/no question. Empty input means yes.
pub fn confirm<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, question: &str) -> io::Result<bool> {
    let answer = prompt(reader, writer, &format!("{} [Y/n]", question))?;
    let answer = answer.trim();
    Ok(answer.is_empty() || answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

fn prompt<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, label: &str) -> io::Result<String> {
    write!(writer, "{}: ", label)?;
    writer.flush()?;

    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn raw(token: &str, org: &str, project: &str, repo: &str, pr: &str) -> RawInputs {
        RawInputs {
            token: token.to_string(),
            organization: org.to_string(),
            project: project.to_string(),
            repository: repo.to_string(),
            pr_number: pr.to_string(),
        }
    }

    #[test]
    fn test_valid_inputs_are_trimmed() {
        let credentials = validate_inputs(&raw("pat", "  Contoso ", "Web\t", " frontend", " 42 ")).unwrap();
        assert_eq!(credentials.organization, "Contoso");
        assert_eq!(credentials.project, "Web");
        assert_eq!(credentials.repository, "frontend");
        assert_eq!(credentials.pr_number, 42);
        assert_eq!(credentials.token, "pat");
    }

    #[test]
    fn test_non_numeric_pr_number() {
        for bad in ["abc", "4two", "", "  ", "1.5"] {
            let err = validate_inputs(&raw("pat", "Contoso", "Web", "frontend", bad)).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidPrNumber(_)), "input {:?}", bad);
        }
    }

    #[test]
    fn test_non_positive_pr_number() {
        for bad in ["0", "-3"] {
            let err = validate_inputs(&raw("pat", "Contoso", "Web", "frontend", bad)).unwrap_err();
            assert!(matches!(err, ValidationError::InvalidPrNumber(_)));
        }
    }

    #[test]
    fn test_missing_fields() {
        let err = validate_inputs(&raw("", "Contoso", "Web", "frontend", "42")).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("Personal Access Token")));

        let err = validate_inputs(&raw("pat", "   ", "Web", "frontend", "42")).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("Organization")));

        let err = validate_inputs(&raw("pat", "Contoso", "", "frontend", "42")).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("Project")));

        let err = validate_inputs(&raw("pat", "Contoso", "Web", " ", "42")).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField("Repository")));
    }

    #[test]
    fn test_pr_number_checked_before_missing_fields() {
        let err = validate_inputs(&raw("", "", "", "", "nope")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPrNumber(_)));
    }

    #[test]
    fn test_prompt_inputs_reads_five_fields() {
        let mut reader = Cursor::new("Contoso\r\nWeb\nfrontend\n42\n");
        let mut out = Vec::new();
        let raw = prompt_inputs(&mut reader, &mut out, |_| Ok("secret".to_string())).unwrap();

        assert_eq!(raw.token, "secret");
        assert_eq!(raw.organization, "Contoso");
        assert_eq!(raw.project, "Web");
        assert_eq!(raw.repository, "frontend");
        assert_eq!(raw.pr_number, "42");

        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Organization Name: "));
        assert!(shown.contains("Pull Request Number: "));
    }

    #[test]
    fn test_token_never_written_to_output() {
        let mut reader = Cursor::new("Contoso\nWeb\nfrontend\n42\n");
        let mut out = Vec::new();
        let mut asked = None;
        let raw = prompt_inputs(&mut reader, &mut out, |label| {
            asked = Some(label.to_string());
            Ok("pat-value-123".to_string())
        })
        .unwrap();

        assert_eq!(raw.token, "pat-value-123");
        assert_eq!(asked.as_deref(), Some("Personal Access Token"));
        let shown = String::from_utf8(out).unwrap();
        assert!(!shown.contains("pat-value-123"));
        assert!(!shown.contains("Personal Access Token"));
    }

    #[test]
    fn test_secret_reader_error_propagates() {
        let mut reader = Cursor::new("Contoso\nWeb\nfrontend\n42\n");
        let err = prompt_inputs(&mut reader, &mut Vec::<u8>::new(), |_| {
            Err(io::Error::new(io::ErrorKind::Other, "no tty"))
        })
        .err()
        .unwrap();
        assert_eq!(err.to_string(), "no tty");
    }

    #[test]
    fn test_prompt_inputs_at_eof_yields_empty_fields() {
        let mut reader = Cursor::new("Contoso\n");
        let raw = prompt_inputs(&mut reader, &mut Vec::<u8>::new(), |_| Ok("pat".to_string())).unwrap();
        assert_eq!(raw.organization, "Contoso");
        assert!(raw.pr_number.is_empty());
        assert!(validate_inputs(&raw).is_err());
    }

    #[test]
    fn test_confirm() {
        assert!(confirm(&mut Cursor::new("\n"), &mut Vec::<u8>::new(), "Save?").unwrap());
        assert!(confirm(&mut Cursor::new("Y\n"), &mut Vec::<u8>::new(), "Save?").unwrap());
        assert!(confirm(&mut Cursor::new("yes\n"), &mut Vec::<u8>::new(), "Save?").unwrap());
        assert!(!confirm(&mut Cursor::new("n\n"), &mut Vec::<u8>::new(), "Save?").unwrap());
        assert!(!confirm(&mut Cursor::new("later\n"), &mut Vec::<u8>::new(), "Save?").unwrap());
    }
}
