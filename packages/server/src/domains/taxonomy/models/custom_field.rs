use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::common::utils::{slugify, Validator};
use crate::common::CustomFieldId;

pub const FIELD_TYPES: &[&str] = &["text", "textarea", "number", "select", "checkbox", "date", "url"];
pub const APPLIES_TO: &[&str] = &["job", "resume"];

/// Admin-defined extra attribute for jobs or resumes
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CustomField {
    pub id: CustomFieldId,
    pub name: String,
    pub key: String,
    pub field_type: String,
    pub options: Vec<String>,
    pub required: bool,
    pub applies_to: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomFieldInput {
    pub name: String,
    pub key: Option<String>,
    pub field_type: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    pub applies_to: String,
    #[serde(default)]
    pub sort_order: i32,
}

impl CustomFieldInput {
    pub fn validate(&self) -> Result<(), String> {
        let mut v = Validator::new();
        v.required("name", &self.name)
            .one_of("field_type", &self.field_type, FIELD_TYPES)
            .one_of("applies_to", &self.applies_to, APPLIES_TO)
            .check(!self.key().is_empty(), "key must contain at least one letter or digit")
            .check(
                self.field_type != "select" || !self.options.is_empty(),
                "options are required for select fields",
            );
        v.finish()
    }

    /// Keys are snake_case so they read naturally inside JSON objects
    fn key(&self) -> String {
        let source = self.key.as_deref().unwrap_or(&self.name);
        slugify(source).replace('-', "_")
    }
}

impl CustomField {
    /// Check one submitted value against this field's type
    fn check_value(&self, value: &Value) -> Result<(), String> {
        let ok = match self.field_type.as_str() {
            "number" => value.is_number(),
            "checkbox" => value.is_boolean(),
            "select" => value
                .as_str()
                .map(|s| self.options.iter().any(|o| o == s))
                .unwrap_or(false),
            "date" => value
                .as_str()
                .map(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok())
                .unwrap_or(false),
            "url" => value
                .as_str()
                .map(|s| s.starts_with("http://") || s.starts_with("https://"))
                .unwrap_or(false),
            _ => value.is_string(),
        };

        if ok {
            Ok(())
        } else {
            Err(format!(
                "custom field {} must be a valid {} value",
                self.key, self.field_type
            ))
        }
    }
}

/// Validate a record's custom field values against the defined fields
///
/// Required fields must be present and non-null, every present value must
/// match its field type, and keys that are not defined are rejected.
pub fn validate_custom_values(
    fields: &[CustomField],
    values: &Map<String, Value>,
) -> Result<(), String> {
    let mut v = Validator::new();

    for field in fields {
        match values.get(&field.key) {
            None | Some(Value::Null) => {
                v.check(!field.required, format!("custom field {} is required", field.key));
            }
            Some(value) => {
                if let Err(e) = field.check_value(value) {
                    v.check(false, e);
                }
            }
        }
    }

    for key in values.keys() {
        v.check(
            fields.iter().any(|f| &f.key == key),
            format!("unknown custom field {}", key),
        );
    }

    v.finish()
}

impl CustomField {
    pub async fn find_all(applies_to: Option<&str>, pool: &PgPool) -> Result<Vec<Self>> {
        let fields = sqlx::query_as::<_, CustomField>(
            r#"
            SELECT * FROM custom_fields
            WHERE ($1::TEXT IS NULL OR applies_to = $1)
            ORDER BY applies_to, sort_order, name
            "#,
        )
        .bind(applies_to)
        .fetch_all(pool)
        .await?;
        Ok(fields)
    }

    pub async fn find_by_id(id: CustomFieldId, pool: &PgPool) -> Result<Option<Self>> {
        let field = sqlx::query_as::<_, CustomField>("SELECT * FROM custom_fields WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(field)
    }

    pub async fn create(input: &CustomFieldInput, pool: &PgPool) -> Result<Self> {
        let field = sqlx::query_as::<_, CustomField>(
            r#"
            INSERT INTO custom_fields (id, name, key, field_type, options, required, applies_to, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(CustomFieldId::new())
        .bind(input.name.trim())
        .bind(input.key())
        .bind(&input.field_type)
        .bind(&input.options)
        .bind(input.required)
        .bind(&input.applies_to)
        .bind(input.sort_order)
        .fetch_one(pool)
        .await?;
        Ok(field)
    }

    pub async fn update(
        id: CustomFieldId,
        input: &CustomFieldInput,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let field = sqlx::query_as::<_, CustomField>(
            r#"
            UPDATE custom_fields
            SET name = $2, key = $3, field_type = $4, options = $5, required = $6,
                applies_to = $7, sort_order = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.key())
        .bind(&input.field_type)
        .bind(&input.options)
        .bind(input.required)
        .bind(&input.applies_to)
        .bind(input.sort_order)
        .fetch_optional(pool)
        .await?;
        Ok(field)
    }

    pub async fn delete(id: CustomFieldId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM custom_fields WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(key: &str, field_type: &str, required: bool, options: &[&str]) -> CustomField {
        CustomField {
            id: CustomFieldId::new(),
            name: key.to_string(),
            key: key.to_string(),
            field_type: field_type.to_string(),
            options: options.iter().map(|s| s.to_string()).collect(),
            required,
            applies_to: "job".to_string(),
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn values(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_input_key_is_snake_case() {
        let input = CustomFieldInput {
            name: "Security Clearance".to_string(),
            key: None,
            field_type: "checkbox".to_string(),
            options: vec![],
            required: false,
            applies_to: "job".to_string(),
            sort_order: 0,
        };
        assert!(input.validate().is_ok());
        assert_eq!(input.key(), "security_clearance");
    }

    #[test]
    fn test_select_requires_options() {
        let input = CustomFieldInput {
            name: "Seniority".to_string(),
            key: None,
            field_type: "select".to_string(),
            options: vec![],
            required: true,
            applies_to: "job".to_string(),
            sort_order: 0,
        };
        assert!(input.validate().unwrap_err().contains("options are required"));
    }

    #[test]
    fn test_unknown_field_type_rejected() {
        let input = CustomFieldInput {
            name: "Color".to_string(),
            key: None,
            field_type: "colour".to_string(),
            options: vec![],
            required: false,
            applies_to: "job".to_string(),
            sort_order: 0,
        };
        assert!(input.validate().unwrap_err().contains("field_type must be one of"));
    }

    #[test]
    fn test_values_accepted() {
        let fields = vec![
            field("seniority", "select", true, &["junior", "senior"]),
            field("visa", "checkbox", false, &[]),
            field("start_date", "date", false, &[]),
            field("headcount", "number", false, &[]),
        ];
        let submitted = values(json!({
            "seniority": "senior",
            "visa": true,
            "start_date": "2026-11-01",
            "headcount": 3
        }));
        assert!(validate_custom_values(&fields, &submitted).is_ok());
    }

    #[test]
    fn test_values_rejected() {
        let fields = vec![
            field("seniority", "select", true, &["junior", "senior"]),
            field("visa", "checkbox", false, &[]),
        ];

        let err = validate_custom_values(&fields, &values(json!({"visa": "yes", "extra": 1})))
            .unwrap_err();
        assert!(err.contains("custom field seniority is required"));
        assert!(err.contains("custom field visa must be a valid checkbox value"));
        assert!(err.contains("unknown custom field extra"));

        let err = validate_custom_values(&fields, &values(json!({"seniority": "lead"})))
            .unwrap_err();
        assert!(err.contains("seniority must be a valid select value"));
    }
}
