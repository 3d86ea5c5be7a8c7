use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::distribution::{ConditioningKey, Distribution};
use super::reference::Reference;
use crate::pgm::common::error::{NetworkError, Result};
use crate::pgm::inference::BayesianNetwork;

/// A network as plain data, the shape of a network definition file.
///
/// ```json
/// {"distributions": [
///   {"name": "rain", "labels": ["no", "yes"], "probabilities": [0.8, 0.2]},
///   {"name": "grass", "labels": ["dry", "wet"], "given": ["rain"],
///    "rows": [{"when": ["no"], "probabilities": [0.9, 0.1]},
///             {"when": ["yes"], "probabilities": [0.2, 0.8]}]}
/// ]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDefinition {
    pub distributions: Vec<DistributionDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionDefinition {
    pub name: String,
    pub labels: Vec<String>,
    /// Probabilities of a root distribution, one per label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f64>>,
    /// Names of the distributions this one is conditioned on, declared earlier.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<RowDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDefinition {
    /// One label per entry of `given`, in the same order.
    pub when: Vec<String>,
    pub probabilities: Vec<f64>,
}

impl NetworkDefinition {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading network definition from {}", path.display());
        let json = fs::read_to_string(path).map_err(|source| NetworkError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds every distribution in file order and assembles the network.
    pub fn build(&self) -> Result<BayesianNetwork> {
        let mut built: Vec<(String, Distribution)> = Vec::with_capacity(self.distributions.len());
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for definition in &self.distributions {
            let table = definition.build(&built, &positions)?;
            positions.insert(definition.name.as_str(), built.len());
            built.push((definition.name.clone(), table));
        }
        BayesianNetwork::new(built)
    }
}

impl DistributionDefinition {
    fn build(
        &self,
        built: &[(String, Distribution)],
        positions: &HashMap<&str, usize>,
    ) -> Result<Distribution> {
        match (&self.probabilities, self.given.is_empty()) {
            (Some(probabilities), true) => {
                if probabilities.len() != self.labels.len() {
                    return Err(NetworkError::Definition(format!(
                        "'{}' declares {} labels but {} probabilities",
                        self.name,
                        self.labels.len(),
                        probabilities.len()
                    )));
                }
                Distribution::independent(self.labels.iter().zip(probabilities.iter().copied()))
            }
            (None, false) => {
                let dependencies = self
                    .given
                    .iter()
                    .map(|name| {
                        positions
                            .get(name.as_str())
                            .map(|position| &built[*position].1)
                            .ok_or_else(|| {
                                NetworkError::Definition(format!(
                                    "'{}' is given '{}', which is not declared before it",
                                    self.name, name
                                ))
                            })
                    })
                    .collect::<Result<Vec<&Distribution>>>()?;

                let rows = self
                    .rows
                    .iter()
                    .map(|row| self.conditioning_key(&dependencies, row))
                    .collect::<Result<Vec<_>>>()?;
                Distribution::dependent(&self.labels, rows)
            }
            (Some(_), false) => Err(NetworkError::Definition(format!(
                "'{}' has both root probabilities and conditioning rows",
                self.name
            ))),
            (None, true) => Err(NetworkError::Definition(format!(
                "'{}' needs either probabilities or given tables with rows",
                self.name
            ))),
        }
    }

    fn conditioning_key(
        &self,
        dependencies: &[&Distribution],
        row: &RowDefinition,
    ) -> Result<(ConditioningKey, Vec<f64>)> {
        if row.when.len() != dependencies.len() {
            return Err(NetworkError::Definition(format!(
                "'{}' row {:?} needs one label per given table {:?}",
                self.name, row.when, self.given
            )));
        }
        let references = dependencies
            .iter()
            .zip(&row.when)
            .map(|(dependency, label)| dependency.reference(label))
            .collect::<Result<Vec<Reference>>>()?;
        Ok((ConditioningKey::Tuple(references), row.probabilities.clone()))
    }
}

impl BayesianNetwork {
    /// Exports the network so that building the definition again yields the
    /// same tables.
    pub fn to_definition(&self) -> Result<NetworkDefinition> {
        let distributions = self
            .distributions()
            .map(|table| {
                let name = table.name().unwrap_or_default().to_string();
                let labels = table.labels().iter().map(|l| l.name().to_string()).collect();
                let rows = table.rows()?;

                if table.is_root() {
                    let probabilities = rows.into_iter().next().map(|(_, p)| p);
                    return Ok(DistributionDefinition {
                        name,
                        labels,
                        probabilities,
                        given: Vec::new(),
                        rows: Vec::new(),
                    });
                }

                let given = table
                    .dependencies()
                    .iter()
                    .map(|dependency| dependency.display_name())
                    .collect();
                let rows = rows
                    .into_iter()
                    .map(|(condition, probabilities)| RowDefinition {
                        when: condition.iter().map(|r| r.name().to_string()).collect(),
                        probabilities,
                    })
                    .collect();
                Ok(DistributionDefinition {
                    name,
                    labels,
                    probabilities: None,
                    given,
                    rows,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(NetworkDefinition { distributions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEATHER: &str = r#"{"distributions": [
        {"name": "rain", "labels": ["no", "yes"], "probabilities": [0.8, 0.2]},
        {"name": "grass", "labels": ["dry", "wet"], "given": ["rain"],
         "rows": [{"when": ["no"], "probabilities": [0.9, 0.1]},
                  {"when": ["yes"], "probabilities": [0.2, 0.8]}]}
    ]}"#;

    #[test]
    fn test_build_from_json() {
        let network = NetworkDefinition::from_json_str(WEATHER).unwrap().build().unwrap();
        let wet = network.reference("grass.wet").unwrap();
        let p = network.joint_probability(&[wet]).unwrap();
        assert!((p - (0.8 * 0.1 + 0.2 * 0.8)).abs() < 1e-12);
    }

    #[test]
    fn test_forward_reference_is_rejected() {
        let json = r#"{"distributions": [
            {"name": "grass", "labels": ["dry", "wet"], "given": ["rain"],
             "rows": [{"when": ["no"], "probabilities": [0.9, 0.1]}]},
            {"name": "rain", "labels": ["no", "yes"], "probabilities": [0.8, 0.2]}
        ]}"#;
        let result = NetworkDefinition::from_json_str(json).unwrap().build();
        assert!(matches!(result, Err(NetworkError::Definition(_))));
    }

    #[test]
    fn test_unknown_row_label_fails_name_resolution() {
        let json = WEATHER.replace(r#"["yes"]"#, r#"["maybe"]"#);
        let result = NetworkDefinition::from_json_str(&json).unwrap().build();
        assert!(matches!(result, Err(NetworkError::NameResolution { .. })));
    }
}
