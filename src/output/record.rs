use std::collections::HashMap;

/// Column order of the output file
pub const OUTPUT_FIELDS: &[&str] = &[
    "Вакансия",
    "Компания",
    "Опыт работы",
    "График работы",
    "Занятость",
    "Адрес",
    "Город",
    "Регион",
    "E-mail",
    "Телефон",
    "Ссылка",
];

/// Written in place of an absent field
pub const NULL_SENTINEL: &str = "NULL";

pub const CITY_FIELD: &str = "Город";
pub const REGION_FIELD: &str = "Регион";
pub const LINK_FIELD: &str = "Ссылка";

/// One advertisement: field name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    /// Overlays `other` on this record; fields present in both take `other`'s value
    pub fn merge(&mut self, other: HashMap<String, String>) {
        self.fields.extend(other);
    }

    /// Projects the record onto [`OUTPUT_FIELDS`], absent fields become [`NULL_SENTINEL`]
    pub fn to_row(&self) -> Vec<&str> {
        OUTPUT_FIELDS
            .iter()
            .map(|field| self.get(field).unwrap_or(NULL_SENTINEL))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_record() -> Record {
        let mut record = Record::default();
        for field in OUTPUT_FIELDS {
            record.set(field, format!("value of {}", field));
        }
        record
    }

    #[test]
    fn test_full_record_row_follows_column_order() {
        let record = full_record();
        let expected: Vec<String> = OUTPUT_FIELDS
            .iter()
            .map(|field| format!("value of {}", field))
            .collect();

        assert_eq!(record.to_row(), expected);
    }

    #[test]
    fn test_missing_field_becomes_sentinel() {
        let full = full_record();
        let mut fields = full.fields.clone();
        fields.remove("E-mail");
        let partial = Record::new(fields);

        let full_row = full.to_row();
        let partial_row = partial.to_row();
        let email = OUTPUT_FIELDS.iter().position(|f| *f == "E-mail").unwrap();

        for (i, (a, b)) in full_row.iter().zip(&partial_row).enumerate() {
            if i == email {
                assert_eq!(*b, NULL_SENTINEL);
            } else {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    fn test_fields_outside_output_are_ignored() {
        let mut record = full_record();
        record.set("Зарплата", "100");
        assert_eq!(record.to_row().len(), OUTPUT_FIELDS.len());
        assert!(!record.to_row().contains(&"100"));
    }

    #[test]
    fn test_merge_overrides() {
        let mut record = Record::default();
        record.set("Телефон", "old");
        record.set("Компания", "ООО Ромашка");

        let mut contacts = HashMap::new();
        contacts.insert("Телефон".to_string(), "+7 900 000-00-00".to_string());
        record.merge(contacts);

        assert_eq!(record.get("Телефон"), Some("+7 900 000-00-00"));
        assert_eq!(record.get("Компания"), Some("ООО Ромашка"));
    }
}
