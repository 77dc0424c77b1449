use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{contract, ContractViolation, Error, Result};

/// Ordered layer widths, input first, output last.
///
/// Parsing (`"2 4 1"`, `"2,4,1"`) and deserialization validate the widths and
/// report problems as [`Error::InvalidConfig`]; they come from user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Architecture(Vec<usize>);

impl Architecture {
    pub fn new(widths: Vec<usize>) -> Result<Architecture> {
        if widths.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "architecture needs at least two layers, got {}",
                widths.len()
            )));
        }
        if let Some(pos) = widths.iter().position(|&w| w == 0) {
            return Err(Error::InvalidConfig(format!(
                "layer {pos} of architecture {widths:?} has zero width"
            )));
        }
        Ok(Architecture(widths))
    }

    /// Contract check for architectures passed straight to the allocator.
    pub(crate) fn check(widths: &[usize]) {
        contract!(widths.len() >= 2, ContractViolation::ArchitectureTooShort(widths.len()));
        if let Some(pos) = widths.iter().position(|&w| w == 0) {
            ContractViolation::ZeroWidthLayer(pos).raise();
        }
    }

    pub fn widths(&self) -> &[usize] {
        &self.0
    }

    pub fn input_width(&self) -> usize {
        self.0[0]
    }

    pub fn output_width(&self) -> usize {
        self.0[self.0.len() - 1]
    }

    /// Number of weight layers (one less than the number of widths).
    pub fn layer_count(&self) -> usize {
        self.0.len() - 1
    }
}

impl FromStr for Architecture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Architecture> {
        let widths = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|tok| !tok.is_empty())
            .map(|tok| {
                tok.parse::<usize>()
                    .map_err(|e| Error::InvalidConfig(format!("bad layer width {tok:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Architecture::new(widths)
    }
}

impl TryFrom<Vec<usize>> for Architecture {
    type Error = Error;

    fn try_from(widths: Vec<usize>) -> Result<Architecture> {
        Architecture::new(widths)
    }
}

impl From<Architecture> for Vec<usize> {
    fn from(arch: Architecture) -> Vec<usize> {
        arch.0
    }
}

impl AsRef<[usize]> for Architecture {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|w| w.to_string()).collect();
        write!(f, "{}", parts.join("-"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whitespace_and_commas() {
        let a: Architecture = "2 4\n1".parse().unwrap();
        assert_eq!(a.widths(), &[2, 4, 1]);
        let b: Architecture = "6, 12, 4".parse().unwrap();
        assert_eq!(b.widths(), &[6, 12, 4]);
        assert_eq!(b.layer_count(), 2);
        assert_eq!(b.input_width(), 6);
        assert_eq!(b.output_width(), 4);
        assert_eq!(b.to_string(), "6-12-4");
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!("3".parse::<Architecture>(), Err(Error::InvalidConfig(_))));
        assert!(matches!("2 0 1".parse::<Architecture>(), Err(Error::InvalidConfig(_))));
        assert!(matches!("2 x 1".parse::<Architecture>(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn deserialization_validates() {
        let ok: Architecture = serde_json::from_str("[2, 4, 1]").unwrap();
        assert_eq!(ok.widths(), &[2, 4, 1]);
        assert!(serde_json::from_str::<Architecture>("[5]").is_err());
    }

    #[test]
    #[should_panic(expected = "at least two layers")]
    fn check_rejects_single_layer() {
        Architecture::check(&[3]);
    }
}
