use anyhow::{Result, bail};

use super::settings::Settings;

pub const DEFAULT_API_URL: &str = "https://www.pivotaltracker.com/services/v5";

pub const TOKEN_ENV: &str = "PIVOTAL_TOKEN";
pub const PROJECT_ENV: &str = "PIVOTAL_PROJECT";
pub const API_URL_ENV: &str = "PIVOTAL_API_URL";

/// Where a setting came from, highest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Flag,
    Env,
    File,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Token,
    Project,
    ApiUrl,
}

impl Field {
    fn key(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Project => "project",
            Self::ApiUrl => "api_url",
        }
    }

    fn env_var(self) -> &'static str {
        match self {
            Self::Token => TOKEN_ENV,
            Self::Project => PROJECT_ENV,
            Self::ApiUrl => API_URL_ENV,
        }
    }

    /// Human name of `source` for this field, e.g. `PIVOTAL_TOKEN` or `[tracker].project`
    pub fn origin(self, source: Source) -> String {
        match source {
            Source::Flag => format!("--{}", self.key()),
            Source::Env => self.env_var().to_string(),
            Source::File => format!("[tracker].{}", self.key()),
            Source::Default => "built-in default".to_string(),
        }
    }
}

/// One set of optional values: command line, environment or config file
#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub project: Option<String>,
}

impl Layer {
    /// Snapshot the `PIVOTAL_*` variables once, up front
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            api_url: var(API_URL_ENV),
            token: var(TOKEN_ENV),
            project: var(PROJECT_ENV),
        }
    }

    fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Token => self.token.as_deref(),
            Field::Project => self.project.as_deref(),
            Field::ApiUrl => self.api_url.as_deref(),
        }
    }
}

/// Outcome of looking up one field across the layers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found { value: String, source: Source },
    /// The highest-precedence source was set but blank; lower layers are not consulted.
    Blank(Source),
    Missing,
}

impl Lookup {
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Found { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<Source> {
        match self {
            Self::Found { source, .. } => Some(*source),
            Self::Blank(source) => Some(*source),
            Self::Missing => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub token: Lookup,
    pub project: Lookup,
    pub api_url: Lookup,
}

fn lookup(field: Field, layers: [(Source, &Layer); 3]) -> Lookup {
    for (source, layer) in layers {
        if let Some(raw) = layer.get(field) {
            let value = raw.trim();
            if value.is_empty() {
                return Lookup::Blank(source);
            }
            return Lookup::Found {
                value: value.to_string(),
                source,
            };
        }
    }
    Lookup::Missing
}

impl Resolution {
    pub fn from_layers(flags: &Layer, env: &Layer, file: &Layer) -> Self {
        let layers = [(Source::Flag, flags), (Source::Env, env), (Source::File, file)];

        let api_url = match lookup(Field::ApiUrl, layers) {
            Lookup::Found { value, source } => Lookup::Found {
                value: value.trim_end_matches('/').to_string(),
                source,
            },
            Lookup::Missing => Lookup::Found {
                value: DEFAULT_API_URL.to_string(),
                source: Source::Default,
            },
            blank => blank,
        };

        Self {
            token: lookup(Field::Token, layers),
            project: lookup(Field::Project, layers),
            api_url,
        }
    }

    /// One line per field for `config show`; the token value is never printed.
    pub fn report(&self) -> Vec<String> {
        [
            (Field::Token, &self.token),
            (Field::Project, &self.project),
            (Field::ApiUrl, &self.api_url),
        ]
        .into_iter()
        .map(|(field, lookup)| {
            let status = match lookup {
                Lookup::Found { source, .. } if field == Field::Token => {
                    format!("set (from {})", field.origin(*source))
                }
                Lookup::Found { value, source } => {
                    format!("{} (from {})", value, field.origin(*source))
                }
                Lookup::Blank(source) => {
                    format!("invalid: {} is empty/whitespace", field.origin(*source))
                }
                Lookup::Missing => "missing".to_string(),
            };
            format!("{:<8} {}", format!("{}:", field.key()), status)
        })
        .collect()
    }

    pub fn into_settings(self) -> Result<Settings> {
        tracing::debug!(
            token_source = ?self.token.source(),
            project = self.project.value(),
            api_url = self.api_url.value(),
            "resolved settings"
        );

        Ok(Settings {
            token: require(Field::Token, self.token)?,
            project: require(Field::Project, self.project)?,
            api_url: require(Field::ApiUrl, self.api_url)?,
        })
    }
}

fn require(field: Field, lookup: Lookup) -> Result<String> {
    match lookup {
        Lookup::Found { value, .. } => Ok(value),
        Lookup::Blank(source) => bail!(
            "{} is empty or whitespace. Set a valid {} or unset it to fall back to the next source.",
            field.origin(source),
            field.key()
        ),
        Lookup::Missing => match field {
            Field::Token => bail!(
                "Pivotal Tracker token not found.\n\n\
                Pass --token <token>, export {}=\"your-token\", or add \
                'token = \"your-token\"' under [tracker] in config.toml",
                TOKEN_ENV
            ),
            _ => bail!(
                "Pivotal Tracker {} not set.\n\n\
                Pass --{} <value>, export {}=\"...\", or add it under [tracker] in config.toml",
                field.key(),
                field.key(),
                field.env_var()
            ),
        },
    }
}
