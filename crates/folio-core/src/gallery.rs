//! Gallery context linking: which photos open alongside a clicked photo.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{Photo, Trip};

/// Grouping a gallery is built around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GalleryContext {
    #[default]
    Trip,
    Country,
    Single,
}

impl FromStr for GalleryContext {
    type Err = Error;

    /// Only `trip` and `country` may be requested.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "trip" => Ok(GalleryContext::Trip),
            "country" => Ok(GalleryContext::Country),
            other => Err(Error::Validation(format!(
                "Invalid context '{}'. Expected 'trip' or 'country'.",
                other
            ))),
        }
    }
}

impl fmt::Display for GalleryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GalleryContext::Trip => "trip",
            GalleryContext::Country => "country",
            GalleryContext::Single => "single",
        })
    }
}

/// One photo in a gallery, with its position in the full image list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryItem {
    pub index: usize,
    pub photo: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Gallery {
    pub context: GalleryContext,
    pub context_value: Option<String>,
    pub description: String,
    /// Position of the clicked photo within `items`.
    pub start_index: usize,
    pub items: Vec<GalleryItem>,
}

/// Build the gallery opened by clicking `photos[clicked]`.
///
/// A `trip` request falls back to the photo's country, then to a single-photo
/// gallery. A trip gallery holding only the clicked photo is widened to the
/// country when the photo has one.
pub fn build_gallery(
    photos: &[Value],
    trips: &[Trip],
    clicked: usize,
    initial: GalleryContext,
) -> Result<Gallery> {
    if clicked >= photos.len() {
        return Err(Error::NotFound(format!("Photo index {} not found.", clicked)));
    }
    let parsed: Vec<Photo> = photos
        .iter()
        .map(|p| serde_json::from_value(p.clone()).unwrap_or_default())
        .collect();
    let target = &parsed[clicked];

    let mut context = resolve(target, initial);
    let mut indices = members(&parsed, target, clicked, context);
    if context == GalleryContext::Trip
        && indices.len() == 1
        && indices[0] == clicked
        && target.country_name().is_some()
    {
        context = GalleryContext::Country;
        indices = members(&parsed, target, clicked, context);
    }

    indices.sort_by(|&a, &b| gallery_order(&parsed[a], &parsed[b]).then(a.cmp(&b)));

    let start_index = indices
        .iter()
        .position(|&i| i == clicked)
        .ok_or_else(|| {
            Error::Internal(format!(
                "Clicked photo {} is missing from its {} gallery.",
                clicked, context
            ))
        })?;

    let (context_value, description) = match context {
        GalleryContext::Trip => {
            let trip_id = target.trip().unwrap_or_default();
            let name = trips
                .iter()
                .find(|t| t.id == trip_id)
                .map(Trip::display_name)
                .unwrap_or(trip_id);
            (Some(trip_id.to_string()), format!("Trip: {}", name))
        }
        GalleryContext::Country => {
            let country = target.country_name().unwrap_or_default();
            (Some(country.to_string()), format!("Country: {}", country))
        }
        GalleryContext::Single => (None, "Single Photo".to_string()),
    };

    Ok(Gallery {
        context,
        context_value,
        description,
        start_index,
        items: indices
            .into_iter()
            .map(|index| GalleryItem {
                index,
                photo: photos[index].clone(),
            })
            .collect(),
    })
}

fn resolve(photo: &Photo, initial: GalleryContext) -> GalleryContext {
    match initial {
        GalleryContext::Trip if photo.trip().is_some() => GalleryContext::Trip,
        GalleryContext::Trip | GalleryContext::Country if photo.country_name().is_some() => {
            GalleryContext::Country
        }
        _ => GalleryContext::Single,
    }
}

fn members(
    photos: &[Photo],
    target: &Photo,
    clicked: usize,
    context: GalleryContext,
) -> Vec<usize> {
    let same = |key: fn(&Photo) -> Option<&str>| -> Vec<usize> {
        let wanted = key(target);
        photos
            .iter()
            .enumerate()
            .filter(|(_, p)| wanted.is_some() && key(p) == wanted)
            .map(|(i, _)| i)
            .collect()
    };
    match context {
        GalleryContext::Trip => same(Photo::trip),
        GalleryContext::Country => same(Photo::country_name),
        GalleryContext::Single => vec![clicked],
    }
}

/// Photos with a `sortIndex` first (ascending), then by `date` string.
fn gallery_order(a: &Photo, b: &Photo) -> Ordering {
    let by_sort_index = match (a.sort_index, b.sort_index) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_sort_index.then_with(|| {
        a.date
            .as_deref()
            .unwrap_or_default()
            .cmp(b.date.as_deref().unwrap_or_default())
    })
}
