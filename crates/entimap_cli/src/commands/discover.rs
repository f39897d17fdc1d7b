//! Discover command implementation.

use crate::description::ModelDescription;
use entimap_core::{EntityType, Model, RelationalForeignKey};
use serde::Serialize;
use std::path::Path;

/// Model summary after conventions ran.
#[derive(Debug, Serialize)]
pub struct DiscoverResult {
    /// Model file path.
    pub path: String,
    /// Entity types in declaration order.
    pub entity_types: Vec<EntityTypeSummary>,
}

/// One entity type.
#[derive(Debug, Serialize)]
pub struct EntityTypeSummary {
    /// Entity type name.
    pub name: String,
    /// Primary key property names, if a key exists.
    pub primary_key: Option<Vec<String>>,
    /// Configuration source of the primary key.
    pub primary_key_source: Option<String>,
    /// Properties in declaration order.
    pub properties: Vec<PropertySummary>,
    /// Foreign keys declared on this type.
    pub foreign_keys: Vec<ForeignKeySummary>,
}

/// One property.
#[derive(Debug, Serialize)]
pub struct PropertySummary {
    /// Property name.
    pub name: String,
    /// Value type name.
    pub value_type: String,
    /// Whether the property has no backing field.
    pub shadow: bool,
    /// Whether a value must be present.
    pub required: bool,
}

/// One foreign key.
#[derive(Debug, Serialize)]
pub struct ForeignKeySummary {
    /// Relational constraint name.
    pub name: String,
    /// Principal entity type name.
    pub principal: String,
    /// Foreign key property names on the dependent.
    pub properties: Vec<String>,
    /// Referenced property names on the principal.
    pub referenced: Vec<String>,
    /// Whether each principal has at most one dependent.
    pub unique: bool,
    /// Whether every foreign key property is required.
    pub required: bool,
    /// How the foreign key properties were chosen.
    pub properties_source: String,
}

/// Runs the discover command.
pub fn run(
    path: &Path,
    no_conventions: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let description = ModelDescription::load(path)?;
    let model = description.build(&description.config(no_conventions))?;
    let result = summarize(path, &model);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

/// Collects a serializable summary of `model`.
pub fn summarize(path: &Path, model: &Model) -> DiscoverResult {
    DiscoverResult {
        path: path.display().to_string(),
        entity_types: model
            .entity_types()
            .iter()
            .map(|et| summarize_entity_type(model, et))
            .collect(),
    }
}

fn summarize_entity_type(model: &Model, et: &EntityType) -> EntityTypeSummary {
    let names = |ids: &[entimap_core::PropertyId]| -> Vec<String> {
        ids.iter()
            .map(|id| model.property(*id).map_or_else(|| id.to_string(), |p| p.name().to_string()))
            .collect()
    };

    EntityTypeSummary {
        name: et.name().to_string(),
        primary_key: et.primary_key().map(|k| names(k.properties())),
        primary_key_source: et
            .primary_key()
            .map(|k| k.configuration_source().to_string()),
        properties: et
            .properties()
            .iter()
            .map(|p| PropertySummary {
                name: p.name().to_string(),
                value_type: p.value_type().to_string(),
                shadow: p.is_shadow(),
                required: p.is_required(),
            })
            .collect(),
        foreign_keys: et
            .foreign_keys()
            .iter()
            .map(|fk| ForeignKeySummary {
                name: RelationalForeignKey::new(model, fk).name(),
                principal: model
                    .entity_type(fk.principal())
                    .map_or_else(|| fk.principal().to_string(), |p| p.name().to_string()),
                properties: names(fk.properties()),
                referenced: names(fk.referenced_properties()),
                unique: fk.is_unique(),
                required: fk.is_required(et),
                properties_source: fk.properties_configuration_source().to_string(),
            })
            .collect(),
    }
}

fn print_text_output(result: &DiscoverResult) {
    println!("EntiMap Model");
    println!("=============");
    println!();
    println!("Path: {}", result.path);

    for et in &result.entity_types {
        println!();
        println!("{}", et.name);
        match (&et.primary_key, &et.primary_key_source) {
            (Some(key), Some(source)) => println!("  Key: ({}) [{}]", key.join(", "), source),
            _ => println!("  Key: none"),
        }
        for p in &et.properties {
            println!(
                "  {:<24} {:<7}{}{}",
                p.name,
                p.value_type,
                if p.required { " required" } else { "" },
                if p.shadow { " shadow" } else { "" },
            );
        }
        for fk in &et.foreign_keys {
            println!(
                "  {}: ({}) -> {}({}) [{}{}{}]",
                fk.name,
                fk.properties.join(", "),
                fk.principal,
                fk.referenced.join(", "),
                fk.properties_source,
                if fk.unique { ", unique" } else { "" },
                if fk.required { ", required" } else { "" },
            );
        }
    }
}
