use serde::{Deserialize, Serialize};

/// Number of hatims a sign-up sheet is split into.
pub const HATIM_COUNT: u8 = 5;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Cuz {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "hatimNumber")]
    pub hatim_number: u8,
    #[serde(rename = "cuzNumber")]
    pub cuz_number: u32,
    #[serde(rename = "personName", default)]
    pub person_name: Option<String>,
}

/// Identifies one cüz inside one hatim. Transient UI state is keyed by this.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartKey {
    pub hatim: u8,
    pub cuz: u32,
}

impl Cuz {
    pub fn create(id: &str, hatim_number: u8, cuz_number: u32, person_name: Option<&str>) -> Self {
        Cuz {
            id: id.to_string(),
            hatim_number,
            cuz_number,
            person_name: person_name.map(str::to_string),
        }
    }

    pub fn key(&self) -> PartKey {
        PartKey {
            hatim: self.hatim_number,
            cuz: self.cuz_number,
        }
    }

    /// The assigned name, or "" when nobody has signed up.
    pub fn name(&self) -> &str {
        self.person_name.as_deref().unwrap_or("")
    }

    // Whitespace-only names do not count as taken.
    pub fn is_taken(&self) -> bool {
        !self.name().trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wire_format_with_missing_name() {
        let json = r#"{"_id":"abc","hatimNumber":2,"cuzNumber":17}"#;
        let cuz: Cuz = serde_json::from_str(json).unwrap();
        assert_eq!(cuz.id, "abc");
        assert_eq!(cuz.hatim_number, 2);
        assert_eq!(cuz.cuz_number, 17);
        assert_eq!(cuz.person_name, None);
        assert!(!cuz.is_taken());
    }

    #[test]
    fn decodes_null_name_and_ignores_unknown_fields() {
        let json = r#"{"_id":"x","hatimNumber":1,"cuzNumber":3,"personName":null,"__v":0}"#;
        let cuz: Cuz = serde_json::from_str(json).unwrap();
        assert_eq!(cuz.name(), "");
    }

    #[test]
    fn whitespace_name_is_not_taken() {
        assert!(!Cuz::create("1", 1, 1, Some("   ")).is_taken());
        assert!(Cuz::create("1", 1, 1, Some("Ali")).is_taken());
    }

    #[test]
    fn key_pairs_hatim_and_cuz() {
        let cuz = Cuz::create("1", 3, 12, None);
        assert_eq!(cuz.key(), PartKey { hatim: 3, cuz: 12 });
    }
}
