//! Exam centres nested under state, district, and city. Each state is one row
//! whose district tree lives in a JSONB column; mutations read the tree under
//! a row lock, rewrite it in memory, and write it back in the same transaction.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Centre {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub city_name: String,
    pub centres: Vec<Centre>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub district_name: String,
    pub cities: Vec<City>,
}

#[derive(Clone, Debug, Serialize)]
pub struct StateCentres {
    pub state_name: String,
    pub districts: Vec<District>,
}

/// Deepest level that had to be created while adding centres.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddedLevel {
    State,
    District,
    City,
    Centres,
}

impl AddedLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AddedLevel::State => "state",
            AddedLevel::District => "district",
            AddedLevel::City => "city",
            AddedLevel::Centres => "centres",
        }
    }
}

/// First level of the path that did not resolve while removing a centre.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingLevel {
    District,
    City,
    Centre,
}

impl MissingLevel {
    pub fn describe(self) -> &'static str {
        match self {
            MissingLevel::District => "district not found",
            MissingLevel::City => "city not found",
            MissingLevel::Centre => "centre not found",
        }
    }
}

/// Walk the tree and graft the centres at the first level that is missing.
/// Existing cities get the centres appended.
pub fn add_centres(
    districts: &mut Vec<District>,
    district_name: &str,
    city_name: &str,
    centres: Vec<Centre>,
) -> AddedLevel {
    let Some(district) = districts
        .iter_mut()
        .find(|d| d.district_name == district_name)
    else {
        districts.push(District {
            district_name: district_name.to_string(),
            cities: vec![City {
                city_name: city_name.to_string(),
                centres,
            }],
        });
        return AddedLevel::District;
    };
    let Some(city) = district.cities.iter_mut().find(|c| c.city_name == city_name) else {
        district.cities.push(City {
            city_name: city_name.to_string(),
            centres,
        });
        return AddedLevel::City;
    };
    city.centres.extend(centres);
    AddedLevel::Centres
}

/// Remove one centre by name, reporting the first missing path level.
pub fn remove_centre(
    districts: &mut [District],
    district_name: &str,
    city_name: &str,
    centre_name: &str,
) -> Result<(), MissingLevel> {
    let district = districts
        .iter_mut()
        .find(|d| d.district_name == district_name)
        .ok_or(MissingLevel::District)?;
    let city = district
        .cities
        .iter_mut()
        .find(|c| c.city_name == city_name)
        .ok_or(MissingLevel::City)?;
    let idx = city
        .centres
        .iter()
        .position(|c| c.name == centre_name)
        .ok_or(MissingLevel::Centre)?;
    city.centres.remove(idx);
    Ok(())
}

/// Add centres under a state, creating the state row when it is new. Returns
/// the deepest created level and the full tree after the change.
pub async fn add_for_state(
    pool: &PgPool,
    state_name: &str,
    district_name: &str,
    city_name: &str,
    centres: Vec<Centre>,
) -> Result<(AddedLevel, StateCentres), AppError> {
    let mut tx = pool.begin().await?;
    let row: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT districts FROM exam_centre_states WHERE state_name = $1 FOR UPDATE")
            .bind(state_name)
            .fetch_optional(&mut *tx)
            .await?;
    let (level, districts) = match row {
        None => {
            let districts = vec![District {
                district_name: district_name.to_string(),
                cities: vec![City {
                    city_name: city_name.to_string(),
                    centres,
                }],
            }];
            sqlx::query("INSERT INTO exam_centre_states (state_name, districts) VALUES ($1, $2)")
                .bind(state_name)
                .bind(districts_json(&districts)?)
                .execute(&mut *tx)
                .await?;
            (AddedLevel::State, districts)
        }
        Some((value,)) => {
            let mut districts = decode_districts(state_name, value)?;
            let level = add_centres(&mut districts, district_name, city_name, centres);
            sqlx::query(
                "UPDATE exam_centre_states SET districts = $2, updated_at = NOW() \
                 WHERE state_name = $1",
            )
            .bind(state_name)
            .bind(districts_json(&districts)?)
            .execute(&mut *tx)
            .await?;
            (level, districts)
        }
    };
    tx.commit().await?;
    Ok((
        level,
        StateCentres {
            state_name: state_name.to_string(),
            districts,
        },
    ))
}

/// Remove one centre. 404s name the first level of the path that is missing.
pub async fn remove_for_state(
    pool: &PgPool,
    state_name: &str,
    district_name: &str,
    city_name: &str,
    centre_name: &str,
) -> Result<StateCentres, AppError> {
    let mut tx = pool.begin().await?;
    let row: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT districts FROM exam_centre_states WHERE state_name = $1 FOR UPDATE")
            .bind(state_name)
            .fetch_optional(&mut *tx)
            .await?;
    let Some((value,)) = row else {
        return Err(AppError::NotFound("state not found".into()));
    };
    let mut districts = decode_districts(state_name, value)?;
    remove_centre(&mut districts, district_name, city_name, centre_name)
        .map_err(|missing| AppError::NotFound(missing.describe().to_string()))?;
    sqlx::query(
        "UPDATE exam_centre_states SET districts = $2, updated_at = NOW() WHERE state_name = $1",
    )
    .bind(state_name)
    .bind(districts_json(&districts)?)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(StateCentres {
        state_name: state_name.to_string(),
        districts,
    })
}

pub async fn list_states(pool: &PgPool) -> Result<Vec<StateCentres>, AppError> {
    let rows: Vec<(String, serde_json::Value)> =
        sqlx::query_as("SELECT state_name, districts FROM exam_centre_states ORDER BY state_name")
            .fetch_all(pool)
            .await?;
    rows.into_iter()
        .map(|(state_name, value)| {
            let districts = decode_districts(&state_name, value)?;
            Ok(StateCentres {
                state_name,
                districts,
            })
        })
        .collect()
}

fn districts_json(districts: &[District]) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(districts).map_err(|e| AppError::Internal(format!("encode centre tree: {e}")))
}

fn decode_districts(state_name: &str, value: serde_json::Value) -> Result<Vec<District>, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Internal(format!("corrupt centre tree for state '{state_name}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centre(name: &str) -> Centre {
        Centre { name: name.into() }
    }

    fn sample() -> Vec<District> {
        vec![District {
            district_name: "North".into(),
            cities: vec![City {
                city_name: "Rivertown".into(),
                centres: vec![centre("Alpha School"), centre("Beta College")],
            }],
        }]
    }

    #[test]
    fn adding_under_a_new_district_creates_the_whole_branch() {
        let mut districts = sample();
        let level = add_centres(&mut districts, "South", "Laketown", vec![centre("Gamma Hall")]);
        assert_eq!(level, AddedLevel::District);
        assert_eq!(districts.len(), 2);
        assert_eq!(districts[1].cities[0].city_name, "Laketown");
    }

    #[test]
    fn adding_under_a_new_city_keeps_the_district() {
        let mut districts = sample();
        let level = add_centres(&mut districts, "North", "Hilltown", vec![centre("Gamma Hall")]);
        assert_eq!(level, AddedLevel::City);
        assert_eq!(districts.len(), 1);
        assert_eq!(districts[0].cities.len(), 2);
    }

    #[test]
    fn adding_to_an_existing_city_appends() {
        let mut districts = sample();
        let level = add_centres(&mut districts, "North", "Rivertown", vec![centre("Gamma Hall")]);
        assert_eq!(level, AddedLevel::Centres);
        assert_eq!(districts[0].cities[0].centres.len(), 3);
    }

    #[test]
    fn removal_deletes_exactly_one_centre() {
        let mut districts = sample();
        remove_centre(&mut districts, "North", "Rivertown", "Alpha School").unwrap();
        assert_eq!(districts[0].cities[0].centres, vec![centre("Beta College")]);
    }

    #[test]
    fn removal_names_the_first_missing_level() {
        let mut districts = sample();
        assert_eq!(
            remove_centre(&mut districts, "West", "Rivertown", "Alpha School"),
            Err(MissingLevel::District)
        );
        assert_eq!(
            remove_centre(&mut districts, "North", "Laketown", "Alpha School"),
            Err(MissingLevel::City)
        );
        assert_eq!(
            remove_centre(&mut districts, "North", "Rivertown", "Missing"),
            Err(MissingLevel::Centre)
        );
    }
}
