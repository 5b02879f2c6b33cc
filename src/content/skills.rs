use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator used by the persisted `projects.skills` column.
pub const SKILL_DELIMITER: char = ',';

/// Ordered list of project tags.
///
/// Persisted as a single delimited string. Parsing trims every tag and drops
/// empty ones, so a tag survives the round trip unchanged as long as it has
/// no surrounding whitespace and does not contain the delimiter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SkillsInput", into = "Vec<String>")]
pub struct Skills(Vec<String>);

/// The API accepts either a tag array or the joined form typed into a form.
#[derive(Deserialize)]
#[serde(untagged)]
enum SkillsInput {
    List(Vec<String>),
    Joined(String),
}

impl From<SkillsInput> for Skills {
    fn from(input: SkillsInput) -> Self {
        match input {
            SkillsInput::List(tags) => Skills::from_tags(tags),
            SkillsInput::Joined(raw) => Skills::parse(&raw),
        }
    }
}

impl From<Skills> for Vec<String> {
    fn from(skills: Skills) -> Self {
        skills.0
    }
}

impl Skills {
    pub fn parse(raw: &str) -> Self {
        Skills(
            raw.split(SKILL_DELIMITER)
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }

    pub fn from_tags<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        // Re-splitting keeps array input consistent with what storage returns.
        let mut out = Vec::new();
        for tag in tags {
            out.extend(Skills::parse(tag.as_ref()).0);
        }
        Skills(out)
    }

    pub fn to_stored(&self) -> String {
        self.0.join(&SKILL_DELIMITER.to_string())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Skills {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_stored())
    }
}
