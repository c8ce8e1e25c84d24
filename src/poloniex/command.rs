//! Request descriptors
//!
//! A [`Command`] names one API operation and its query parameters. It renders
//! to the suffix appended to the flavor's base URL and is what error values
//! report back to the caller.

use std::fmt;

/// Which of the two public APIs a command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    /// `https://poloniex.com/public?command=...`, errors carry an `error` field
    Legacy,
    /// `https://api.poloniex.com/markets/...`, errors carry a `code` field
    Markets,
}

/// One API call: flavor, command name or path, ordered query parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    flavor: ApiFlavor,
    target: String,
    params: Vec<(&'static str, String)>,
}

impl Command {
    /// Legacy command such as `returnTicker`
    pub fn legacy(name: impl Into<String>) -> Self {
        Self {
            flavor: ApiFlavor::Legacy,
            target: name.into(),
            params: Vec::new(),
        }
    }

    /// Markets path such as `/markets/BTC_USDT/price`
    pub fn market(path: impl Into<String>) -> Self {
        Self {
            flavor: ApiFlavor::Markets,
            target: path.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    pub fn param_opt(self, key: &'static str, value: Option<impl fmt::Display>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    pub fn flavor(&self) -> ApiFlavor {
        self.flavor
    }

    /// Command name or path, without parameters
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn params(&self) -> &[(&'static str, String)] {
        &self.params
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target)?;
        for (idx, (key, value)) in self.params.iter().enumerate() {
            let sep = match self.flavor {
                ApiFlavor::Legacy => '&',
                ApiFlavor::Markets if idx == 0 => '?',
                ApiFlavor::Markets => '&',
            };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}
