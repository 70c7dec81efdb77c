//! `places` command: list the built-in campus catalog

use crate::error::{GuideChatError, Result};
use crate::places::{catalog, Place, CURRENT_PLACE_ID};
use prettytable::{row, Table};

/// List every known place
///
/// # Arguments
///
/// * `json` - Print pretty JSON instead of a table
///
/// # Errors
///
/// Returns error if JSON serialization fails
pub fn list_places(json: bool) -> Result<()> {
    let places = catalog();
    tracing::debug!("places::list_places - {} places, json: {}", places.len(), json);

    if json {
        println!("{}", places_json(&places)?);
    } else {
        places_table(&places).printstd();
    }
    Ok(())
}

fn places_json(places: &[Place]) -> Result<String> {
    serde_json::to_string_pretty(places)
        .map_err(|e| GuideChatError::Serialization(e).into())
}

fn places_table(places: &[Place]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Id", "Name", "Building", "Floor", "Brief", "Current"]);
    for place in places {
        let current = if place.id == CURRENT_PLACE_ID { "*" } else { "" };
        table.add_row(row![
            place.id,
            place.name,
            place.building,
            place.floor,
            place.brief,
            current
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_places_table_marks_current() {
        let table = places_table(&catalog());
        assert_eq!(table.len(), catalog().len() + 1);
        let rendered = table.to_string();
        assert!(rendered.contains("图书馆"));
        assert!(rendered.contains("体育馆"));
        assert!(rendered.contains('*'));
    }

    #[test]
    fn test_places_json_round_trips() {
        let json = places_json(&catalog()).unwrap();
        let parsed: Vec<Place> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, catalog());
    }
}
