//! Credentials and connection settings read from the environment.

use std::env;
use std::fmt;

use crate::error::{LmError, Result};

/// Environment variable holding the API token access id.
pub const ACCESS_ID_VAR: &str = "ACCESS_ID";
/// Environment variable holding the API token access key.
pub const ACCESS_KEY_VAR: &str = "ACCESS_KEY";
/// Environment variable holding the portal (company) name.
pub const COMPANY_VAR: &str = "COMPANY";
/// Optional override for the REST base URL.
pub const API_URL_VAR: &str = "LM_API_URL";

/// LMv1 API token and the portal it belongs to.
#[derive(Clone)]
pub struct Credentials {
    pub access_id: String,
    pub access_key: String,
    pub company: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_id", &self.access_id)
            .field("company", &self.company)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn new(
        access_id: impl Into<String>,
        access_key: impl Into<String>,
        company: impl Into<String>,
    ) -> Self {
        Self {
            access_id: access_id.into(),
            access_key: access_key.into(),
            company: company.into(),
        }
    }

    /// Read `ACCESS_ID`, `ACCESS_KEY` and `COMPANY` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`LmError::ConfigMissing`] naming every variable that is unset
    /// or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let access_id = read(ACCESS_ID_VAR);
        let access_key = read(ACCESS_KEY_VAR);
        let company = read(COMPANY_VAR);

        match (access_id, access_key, company) {
            (Some(access_id), Some(access_key), Some(company)) => Ok(Self {
                access_id,
                access_key,
                company,
            }),
            (id, key, company) => {
                let missing: Vec<&str> = [
                    (id.is_none(), ACCESS_ID_VAR),
                    (key.is_none(), ACCESS_KEY_VAR),
                    (company.is_none(), COMPANY_VAR),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();
                Err(LmError::ConfigMissing(format!(
                    "{} not set",
                    missing.join(" / ")
                )))
            }
        }
    }

    /// Default REST base URL for this portal.
    pub fn default_base_url(&self) -> String {
        format!("https://{}.logicmonitor.com/santaba/rest", self.company)
    }
}

/// Base URL from `LM_API_URL`, if set.
pub fn base_url_override() -> Option<String> {
    env::var(API_URL_VAR).ok().filter(|v| !v.trim().is_empty())
}
