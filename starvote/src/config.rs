use crate::*;
use std::env::var;
use std::str::FromStr;

/// What to do when a commitment is added to a poll that already contains it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MemberPolicy {
    RejectDuplicates,
    AllowDuplicates,
}

impl FromStr for MemberPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "reject-duplicates" => Ok(MemberPolicy::RejectDuplicates),
            "allow-duplicates" => Ok(MemberPolicy::AllowDuplicates),
            other => Err(Error::InvalidConfig(format!(
                "unknown member policy '{}'",
                other
            ))),
        }
    }
}

/// Registry configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Smallest supported membership tree depth
    pub min_tree_depth: usize,

    /// Largest supported membership tree depth
    pub max_tree_depth: usize,

    pub member_policy: MemberPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            min_tree_depth: 16,
            max_tree_depth: 32,
            member_policy: MemberPolicy::RejectDuplicates,
        }
    }
}

impl Config {
    /// Read the configuration from `STARVOTE_*` environment variables, using defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self, Error> {
        let defaults = Config::default();

        let min_tree_depth = match var("STARVOTE_MIN_TREE_DEPTH") {
            Ok(val) => parse_depth("STARVOTE_MIN_TREE_DEPTH", &val)?,
            Err(_e) => defaults.min_tree_depth,
        };

        let max_tree_depth = match var("STARVOTE_MAX_TREE_DEPTH") {
            Ok(val) => parse_depth("STARVOTE_MAX_TREE_DEPTH", &val)?,
            Err(_e) => defaults.max_tree_depth,
        };

        let member_policy = match var("STARVOTE_MEMBER_POLICY") {
            Ok(val) => val.parse()?,
            Err(_e) => defaults.member_policy,
        };

        let config = Config {
            min_tree_depth,
            max_tree_depth,
            member_policy,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.min_tree_depth == 0 || self.min_tree_depth > self.max_tree_depth {
            return Err(Error::InvalidConfig(format!(
                "tree depth range {}..={} is empty or starts at zero",
                self.min_tree_depth, self.max_tree_depth
            )));
        }
        if self.max_tree_depth > MAX_TREE_DEPTH {
            return Err(Error::InvalidConfig(format!(
                "max tree depth {} exceeds {}",
                self.max_tree_depth, MAX_TREE_DEPTH
            )));
        }
        Ok(())
    }

    pub fn supports_depth(&self, depth: usize) -> bool {
        depth >= self.min_tree_depth && depth <= self.max_tree_depth
    }
}

fn parse_depth(name: &str, val: &str) -> Result<usize, Error> {
    val.trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("{} must be an integer, got '{}'", name, val)))
}
