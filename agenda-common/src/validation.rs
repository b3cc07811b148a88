//! Contact field validation and normalization
//!
//! Every form value arrives as a raw string. Validation trims it, rejects
//! malformed input with a user-facing message (`Error::InvalidInput`) and
//! normalizes what it accepts:
//! - email: lower-cased
//! - phone: `(DD)NNNNN-NNNN` / `(DD)NNNN-NNNN`
//! - CPF: `000.000.000-00`, check digits verified

use crate::db::ContactDetails;
use crate::password::MIN_PASSWORD_LEN;
use crate::{Error, Result};
use chrono::NaiveDate;

pub const MAX_NAME_LEN: usize = 120;
pub const MAX_EMAIL_LEN: usize = 254;

/// Raw contact form fields, as submitted
#[derive(Debug, Clone, Default)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birth_date: String,
    pub cpf: String,
}

impl ContactFields {
    /// Validate every field, stopping at the first failure
    pub fn validate(&self, today: NaiveDate) -> Result<ContactDetails> {
        Ok(ContactDetails {
            name: normalize_name(&self.name)?,
            email: normalize_email(&self.email)?,
            phone: normalize_phone(&self.phone)?,
            birth_date: parse_birth_date(&self.birth_date, today)?,
            cpf: normalize_cpf(&self.cpf)?,
        })
    }
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::InvalidInput(msg.into())
}

pub fn normalize_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(invalid("O campo Nome é obrigatório."));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(invalid(format!(
            "O nome deve ter no máximo {} caracteres.",
            MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(invalid("O campo Email é obrigatório."));
    }

    let malformed = || invalid(format!("Email inválido: {}", raw.trim()));

    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(malformed());
    }
    let (local, domain) = email.split_once('@').ok_or_else(malformed)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || domain.contains("..")
    {
        return Err(malformed());
    }
    Ok(email)
}

/// Empty input means "no phone"
pub fn normalize_phone(raw: &str) -> Result<Option<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if raw
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '(' | ')' | '-' | ' ')))
    {
        return Err(invalid(format!("Telefone inválido: {}", raw)));
    }

    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => Ok(Some(format!(
            "({}){}-{}",
            &digits[..2],
            &digits[2..6],
            &digits[6..]
        ))),
        11 => Ok(Some(format!(
            "({}){}-{}",
            &digits[..2],
            &digits[2..7],
            &digits[7..]
        ))),
        _ => Err(invalid(format!(
            "Telefone inválido: {} (use o formato (00)00000-0000)",
            raw
        ))),
    }
}

/// Empty input means "no CPF"
pub fn normalize_cpf(raw: &str) -> Result<Option<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if raw
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '.' | '-' | ' ')))
    {
        return Err(invalid(format!("CPF inválido: {}", raw)));
    }

    let digits: Vec<u32> = raw.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() != 11 || !cpf_check_digits_valid(&digits) {
        return Err(invalid(format!("CPF inválido: {}", raw)));
    }

    let s: String = digits
        .iter()
        .filter_map(|d| char::from_digit(*d, 10))
        .collect();
    Ok(Some(format!(
        "{}.{}.{}-{}",
        &s[..3],
        &s[3..6],
        &s[6..9],
        &s[9..]
    )))
}

/// Modulo-11 check of the two trailing CPF digits
///
/// Sequences of one repeated digit pass the arithmetic but are not valid CPFs.
fn cpf_check_digits_valid(digits: &[u32]) -> bool {
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check = |len: usize| -> u32 {
        let weight_start = len as u32 + 1;
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (weight_start - i as u32))
            .sum();
        match (sum * 10) % 11 {
            10 => 0,
            r => r,
        }
    };

    check(9) == digits[9] && check(10) == digits[10]
}

/// Accepts `YYYY-MM-DD` (HTML date input) and `DD/MM/YYYY`
///
/// Empty input means "no birth date".
pub fn parse_birth_date(raw: &str, today: NaiveDate) -> Result<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .map_err(|_| invalid(format!("Data de nascimento inválida: {}", raw)))?;

    if date > today {
        return Err(invalid("A data de nascimento não pode estar no futuro."));
    }
    Ok(Some(date))
}

/// Empty input means "no password" (or "keep the current one" on update)
pub fn validate_password(raw: &str) -> Result<Option<String>> {
    if raw.is_empty() {
        return Ok(None);
    }
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(format!(
            "A senha deve ter pelo menos {} caracteres.",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(Some(raw.to_string()))
}
