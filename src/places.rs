//! Built-in catalog of campus places
//!
//! Each place carries the contextual info the guide talks about. Lookups use
//! 1-based ids and wrap around the catalog, so every positive id resolves.

use serde::{Deserialize, Serialize};

use crate::error::{GuideChatError, Result};
use crate::prompts::ContextInfo;

/// Id of the place the kiosk reports as "current"
pub const CURRENT_PLACE_ID: u32 = 1;

/// A location on the campus map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// 1-based catalog id
    pub id: u32,
    /// Map x coordinate (percent of map width)
    pub x: f64,
    /// Map y coordinate (percent of map height)
    pub y: f64,
    /// Floor number
    pub floor: u32,
    /// Place name
    pub name: String,
    /// Building the place belongs to
    pub building: String,
    /// One-line description
    pub brief: String,
    /// Longer description
    pub detail: String,
}

impl Place {
    /// Context handed to the dispatcher when the visitor is here
    pub fn context(&self) -> ContextInfo {
        ContextInfo::new(&self.name, &self.brief, &self.detail)
    }
}

/// Returns every place in catalog order
pub fn catalog() -> Vec<Place> {
    vec![
        Place {
            id: 1,
            x: 20.0,
            y: 20.0,
            floor: 1,
            name: "图书馆".into(),
            building: "教学楼".into(),
            brief: "学校图书中心".into(),
            detail: "这里有丰富的图书资源，供学生和教职工借阅。".into(),
        },
        Place {
            id: 2,
            x: 70.0,
            y: 50.0,
            floor: 2,
            name: "体育馆".into(),
            building: "艺体楼".into(),
            brief: "学校体育活动场所".into(),
            detail: "这里有各种体育设施，供学生锻炼和比赛使用。".into(),
        },
    ]
}

/// Look up a place by id
///
/// Ids past the end of the catalog wrap around.
///
/// # Errors
///
/// Returns [`GuideChatError::UnknownPlace`] for id `0`.
///
/// # Examples
///
/// ```
/// use guidechat::places::find_place;
///
/// assert_eq!(find_place(1).unwrap().name, "图书馆");
/// assert_eq!(find_place(3).unwrap().name, "图书馆");
/// assert!(find_place(0).is_err());
/// ```
pub fn find_place(id: u32) -> Result<Place> {
    let places = catalog();
    if id == 0 || places.is_empty() {
        return Err(GuideChatError::UnknownPlace(id).into());
    }
    let index = (id as usize - 1) % places.len();
    Ok(places[index].clone())
}

/// The place the visitor is currently at
pub fn current_place() -> Result<Place> {
    find_place(CURRENT_PLACE_ID)
}
