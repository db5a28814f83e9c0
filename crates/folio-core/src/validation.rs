//! Per-section validation of submitted documents.
//!
//! Documents are checked as `serde_json::Value`s and stored untouched, so
//! unknown fields survive a save/read round trip.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

fn invalid(msg: impl Into<String>) -> Error {
    Error::Validation(msg.into())
}

fn non_empty_str(item: &Map<String, Value>, field: &str) -> bool {
    item.get(field)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// `null` counts as absent for optional fields.
fn present<'a>(item: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    item.get(field).filter(|v| !v.is_null())
}

fn require_strings(item: &Map<String, Value>, fields: &[&str], at: &str) -> Result<()> {
    for field in fields {
        if !non_empty_str(item, field) {
            return Err(invalid(format!("Missing or invalid '{}' {}.", field, at)));
        }
    }
    Ok(())
}

fn optional_links(item: &Map<String, Value>, at: &str) -> Result<()> {
    match present(item, "links") {
        Some(links) if !links.is_object() => Err(invalid(format!(
            "Invalid 'links' {}. Expected an object of key-value pairs.",
            at
        ))),
        _ => Ok(()),
    }
}

/// Walk an array of objects, running `check` on each with its index.
fn each_object<F>(value: &Value, what: &str, mut check: F) -> Result<()>
where
    F: FnMut(usize, &Map<String, Value>) -> Result<()>,
{
    let items = value
        .as_array()
        .ok_or_else(|| invalid(format!("Invalid data format. Expected an array of {}.", what)))?;
    for (i, item) in items.iter().enumerate() {
        let obj = item.as_object().ok_or_else(|| {
            invalid(format!(
                "Invalid item format at index {}. Expected an object.",
                i
            ))
        })?;
        check(i, obj)?;
    }
    Ok(())
}

pub fn object(value: &Value) -> Result<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(invalid("Invalid data format. Expected an object."))
    }
}

pub fn array_of_objects(value: &Value) -> Result<()> {
    each_object(value, "objects", |_, _| Ok(()))
}

pub fn books(value: &Value) -> Result<()> {
    each_object(value, "books", |i, book| {
        require_strings(book, &["title", "author"], &format!("at index {}", i))?;
        if let Some(rating) = present(book, "rating") {
            let ok = rating.as_f64().is_some_and(|r| (1.0..=5.0).contains(&r));
            if !ok {
                return Err(invalid(format!(
                    "Invalid 'rating' at index {}. Expected a number between 1 and 5.",
                    i
                )));
            }
        }
        Ok(())
    })
}

pub fn images(value: &Value) -> Result<()> {
    each_object(value, "images", |i, photo| {
        for (field, limit) in [("lat", 90.0), ("lng", 180.0)] {
            if let Some(coord) = present(photo, field) {
                let ok = coord
                    .as_f64()
                    .is_some_and(|c| c.is_finite() && (-limit..=limit).contains(&c));
                if !ok {
                    return Err(invalid(format!(
                        "Invalid '{}' at index {}. Expected a number between {} and {}.",
                        field, i, -limit, limit
                    )));
                }
            }
        }
        if let Some(sort_index) = present(photo, "sortIndex") {
            if sort_index.as_i64().is_none() {
                return Err(invalid(format!(
                    "Invalid 'sortIndex' at index {}. Expected an integer.",
                    i
                )));
            }
        }
        Ok(())
    })
}

pub fn projects(value: &Value) -> Result<()> {
    each_object(value, "projects", |i, project| {
        let at = format!("at index {}", i);
        if present(project, "id").is_some() && !non_empty_str(project, "id") {
            return Err(invalid(format!("Missing or invalid 'id' {}.", at)));
        }
        optional_links(project, &at)
    })
}

pub fn trips(value: &Value) -> Result<()> {
    each_object(value, "trips", |i, trip| {
        require_strings(trip, &["id", "name"], &format!("at index {}", i))
    })
}

fn journal_entry(i: usize, entry: &Map<String, Value>) -> Result<()> {
    let at = format!("at index {}", i);
    require_strings(entry, &["id", "title", "authors", "venue"], &at)?;
    optional_links(entry, &at)
}

pub fn journal(value: &Value) -> Result<()> {
    each_object(value, "journal articles", journal_entry)
}

/// The thesis is either a single object or an array of journal-shaped entries.
pub fn thesis(value: &Value) -> Result<()> {
    match value {
        Value::Object(thesis) => {
            require_strings(thesis, &["title", "authors", "venue"], "in thesis")?;
            optional_links(thesis, "in thesis")
        }
        Value::Array(_) => each_object(value, "thesis entries", journal_entry),
        _ => Err(invalid("Invalid data format. Expected a thesis object.")),
    }
}

/// Conference papers and patents.
pub fn research_entries(value: &Value) -> Result<()> {
    each_object(value, "entries", |i, entry| {
        optional_links(entry, &format!("at index {}", i))
    })
}

pub fn contact_banner(value: &Value) -> Result<()> {
    let banner = value
        .as_object()
        .ok_or_else(|| invalid("Invalid input. Expected a contact banner object."))?;

    let links = banner
        .get("links")
        .filter(|l| l.is_array())
        .ok_or_else(|| invalid("Invalid input. 'links' must be an array."))?;
    each_object(links, "links", |i, link| {
        require_strings(link, &["id"], &format!("in link at index {}", i))
    })?;

    if present(banner, "emails").is_some_and(|e| !e.is_array()) {
        return Err(invalid("Invalid input. 'emails' must be an array."));
    }
    if present(banner, "html").is_some_and(|h| !h.is_string()) {
        return Err(invalid("Invalid input. 'html' must be a string."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(result: Result<()>) -> String {
        match result {
            Err(Error::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_books_accepts_valid() {
        let shelf = json!([
            {"title": "Dune", "author": "Frank Herbert", "rating": 5, "spineColor": "#aa0000"},
            {"title": "Emma", "author": "Jane Austen"}
        ]);
        assert!(books(&shelf).is_ok());
    }

    #[test]
    fn test_books_requires_array() {
        assert_eq!(
            message(books(&json!({"title": "x"}))),
            "Invalid data format. Expected an array of books."
        );
    }

    #[test]
    fn test_books_item_must_be_object() {
        assert_eq!(
            message(books(&json!([{"title": "a", "author": "b"}, 3]))),
            "Invalid item format at index 1. Expected an object."
        );
    }

    #[test]
    fn test_books_missing_title() {
        assert_eq!(
            message(books(&json!([{"title": "  ", "author": "b"}]))),
            "Missing or invalid 'title' at index 0."
        );
        assert_eq!(
            message(books(&json!([{"title": "a"}]))),
            "Missing or invalid 'author' at index 0."
        );
    }

    #[test]
    fn test_books_rating_bounds() {
        for bad in [json!(0), json!(6), json!("5")] {
            let doc = json!([{"title": "a", "author": "b", "rating": bad}]);
            assert!(message(books(&doc)).contains("between 1 and 5"));
        }
        assert!(books(&json!([{"title": "a", "author": "b", "rating": 3.5}])).is_ok());
        assert!(books(&json!([{"title": "a", "author": "b", "rating": null}])).is_ok());
    }

    #[test]
    fn test_images_coordinates() {
        assert!(images(&json!([{"lat": 48.85, "lng": 2.35}, {"title": "no gps"}])).is_ok());
        assert!(message(images(&json!([{"lat": 91.0}]))).contains("'lat' at index 0"));
        assert!(message(images(&json!([{"lng": "east"}]))).contains("'lng'"));
        assert!(message(images(&json!([{"sortIndex": 1.5}]))).contains("sortIndex"));
    }

    #[test]
    fn test_projects_links_must_be_object() {
        assert!(projects(&json!([{"id": "p1", "links": {"code": "https://x"}}])).is_ok());
        assert!(message(projects(&json!([{"id": "p1", "links": ["x"]}]))).contains("'links'"));
        assert!(message(projects(&json!([{"id": ""}]))).contains("'id'"));
    }

    #[test]
    fn test_trips_require_id_and_name() {
        assert!(trips(&json!([{"id": "t1", "name": "Alps"}])).is_ok());
        assert!(message(trips(&json!([{"id": "t1"}]))).contains("'name'"));
    }

    #[test]
    fn test_journal_requires_fields_in_order() {
        let doc = json!([{"id": "j1", "title": "T", "venue": "V"}]);
        assert_eq!(
            message(journal(&doc)),
            "Missing or invalid 'authors' at index 0."
        );
    }

    #[test]
    fn test_thesis_object_or_array() {
        let object = json!({"title": "T", "authors": "A", "venue": "Uni", "links": {}});
        assert!(thesis(&object).is_ok());
        let array = json!([{"id": "t", "title": "T", "authors": "A", "venue": "Uni"}]);
        assert!(thesis(&array).is_ok());
        assert_eq!(
            message(thesis(&json!({"title": "T", "authors": "A"}))),
            "Missing or invalid 'venue' in thesis."
        );
        assert!(thesis(&json!("thesis")).is_err());
    }

    #[test]
    fn test_contact_banner() {
        let ok = json!({
            "html": "<p>hi</p>",
            "links": [{"id": "gh", "icon": "icons/gh.svg", "href": "https://github.com", "order": 0}],
            "emails": ["me@example.com"]
        });
        assert!(contact_banner(&ok).is_ok());
        assert!(contact_banner(&json!({"links": []})).is_ok());
        assert!(contact_banner(&json!({"emails": []})).is_err());
        assert!(contact_banner(&json!({"links": [{"href": "x"}]})).is_err());
        assert!(contact_banner(&json!({"links": [], "emails": "me"})).is_err());
    }

    #[test]
    fn test_generic_shapes() {
        assert!(object(&json!({"languages": ["Rust"]})).is_ok());
        assert!(object(&json!([])).is_err());
        assert!(array_of_objects(&json!([{}, {"a": 1}])).is_ok());
        assert!(array_of_objects(&json!([[]])).is_err());
        assert!(research_entries(&json!([{"links": "nope"}])).is_err());
    }
}
