//! Personal data entered into the booking form.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    M,
    W,
}

impl Gender {
    pub fn form_value(self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::W => "W",
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "M" => Ok(Gender::M),
            "W" => Ok(Gender::W),
            other => Err(Error::InvalidCredentials(format!(
                "'gender' must be one of M, W (got '{other}')"
            ))),
        }
    }
}

/// Registration category. Decides fees and which identifier is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Student of the university.
    StudentUnit,
    /// Student of another university.
    StudentOther,
    /// Employee of the university.
    EmployeeUnit,
    /// Employee of the university hospital.
    EmployeeHospital,
    /// Employee of another university.
    EmployeeOther,
    /// Not affiliated.
    Extern,
}

impl RegistrationStatus {
    pub const ALL: [RegistrationStatus; 6] = [
        RegistrationStatus::StudentUnit,
        RegistrationStatus::StudentOther,
        RegistrationStatus::EmployeeUnit,
        RegistrationStatus::EmployeeHospital,
        RegistrationStatus::EmployeeOther,
        RegistrationStatus::Extern,
    ];

    /// Option value in the form's status dropdown.
    pub fn form_value(self) -> &'static str {
        match self {
            RegistrationStatus::StudentUnit => "S-UNIT",
            RegistrationStatus::StudentOther => "S-aH",
            RegistrationStatus::EmployeeUnit => "B-UNIT",
            RegistrationStatus::EmployeeHospital => "B-UKT",
            RegistrationStatus::EmployeeOther => "B-aH",
            RegistrationStatus::Extern => "Extern",
        }
    }

    /// Name of the identifier input the form shows for this category:
    /// matriculation number for students, employee number for staff.
    pub fn pid_field(self) -> Option<&'static str> {
        match self {
            RegistrationStatus::StudentUnit | RegistrationStatus::StudentOther => Some("matnr"),
            RegistrationStatus::EmployeeUnit
            | RegistrationStatus::EmployeeHospital
            | RegistrationStatus::EmployeeOther => Some("mitnr"),
            RegistrationStatus::Extern => None,
        }
    }

    pub fn requires_pid(self) -> bool {
        self.pid_field().is_some()
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_value())
    }
}

impl FromStr for RegistrationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.form_value() == s)
            .ok_or_else(|| {
                let allowed: Vec<&str> = Self::ALL.iter().map(|s| s.form_value()).collect();
                Error::InvalidCredentials(format!(
                    "'status' must be one of {} (got '{s}')",
                    allowed.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub surname: String,
    pub gender: Gender,
    pub street: String,
    pub number: String,
    pub zipcode: String,
    pub city: String,
    pub status: RegistrationStatus,
    /// Matriculation or employee number. Not used for `Extern`.
    pub pid: Option<String>,
    pub email: String,
}

impl Credentials {
    /// First reason these credentials cannot be used, if any.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("name", &self.name),
            ("surname", &self.surname),
            ("street", &self.street),
            ("number", &self.number),
            ("zipcode", &self.zipcode),
            ("city", &self.city),
            ("email", &self.email),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(Error::InvalidCredentials(format!("No {field} provided")));
        }
        if self.status.requires_pid() && self.pid.as_deref().map_or(true, |p| p.trim().is_empty()) {
            return Err(Error::InvalidCredentials(format!(
                "No matriculation / employee number ('pid') provided for status {}",
                self.status
            )));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// "Street Number" as the form's single street field expects it.
    pub fn street_line(&self) -> String {
        format!("{} {}", self.street.trim(), self.number.trim())
    }

    /// "Zipcode City" as the form's single city field expects it.
    pub fn city_line(&self) -> String {
        format!("{} {}", self.zipcode.trim(), self.city.trim())
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let raw: RawCredentials = serde_json::from_str(s)
            .map_err(|e| Error::InvalidCredentials(format!("malformed JSON: {e}")))?;
        raw.into_credentials()
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        let raw: RawCredentials = serde_yaml::from_str(s)
            .map_err(|e| Error::InvalidCredentials(format!("malformed YAML: {e}")))?;
        raw.into_credentials()
    }

    /// Load a `.json`, `.yaml` or `.yml` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        let parse: fn(&str) -> Result<Self> = match ext.as_str() {
            "json" => Self::from_json_str,
            "yaml" | "yml" => Self::from_yaml_str,
            _ => {
                return Err(Error::InvalidCredentials(format!(
                    "unsupported file type {}: JSON or YAML required",
                    path.display()
                )))
            }
        };
        let contents = std::fs::read_to_string(path)?;
        parse(&contents)
    }
}

/// Credentials as written in the file, before any checks.
#[derive(Debug, Default, Deserialize)]
struct RawCredentials {
    #[serde(default, deserialize_with = "scalar")]
    name: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    surname: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    gender: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    street: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    number: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    zipcode: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    city: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    status: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pid: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    email: Option<String>,
}

impl RawCredentials {
    fn into_credentials(self) -> Result<Credentials> {
        let name = required(self.name, "name")?;
        let surname = required(self.surname, "surname")?;
        let gender = required(self.gender, "gender")?.parse()?;
        let street = required(self.street, "street")?;
        let number = required(self.number, "number")?;
        let zipcode = required(self.zipcode, "zipcode")?;
        let city = required(self.city, "city")?;
        let status: RegistrationStatus = required(self.status, "status")?.parse()?;
        let pid = if status.requires_pid() {
            Some(required(self.pid, "pid").map_err(|_| {
                Error::InvalidCredentials(format!(
                    "No matriculation / employee number ('pid') provided for status {status}"
                ))
            })?)
        } else {
            None
        };
        let email = required(self.email, "email")?;

        Ok(Credentials {
            name,
            surname,
            gender,
            street,
            number,
            zipcode,
            city,
            status,
            pid,
            email,
        })
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::InvalidCredentials(format!("No {field} provided"))),
    }
}

/// Accept strings and bare numbers alike: YAML reads `zipcode: 72070` as an
/// integer.
fn scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|s| match s {
        Scalar::Text(t) => t,
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => f.to_string(),
    }))
}
