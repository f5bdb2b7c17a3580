//! enviroCar payload fixtures

use serde_json::{Value, json};

/// Sensor (vehicle) description shared by listings and track documents
fn sensor(n: usize) -> Value {
    json!({
        "type": "car",
        "properties": {
            "id": format!("5750591e50bd5d0b8e5a{n:04}"),
            "manufacturer": "Volkswagen",
            "model": "Golf",
            "fuelType": "gasoline",
            "constructionYear": 2012,
            "engineDisplacement": 1390
        }
    })
}

fn track_summary(id: &str, n: usize) -> Value {
    json!({
        "id": id,
        "name": format!("Track {n}"),
        "created": "2020-04-21T07:05:11Z",
        "modified": "2020-04-21T07:05:11Z",
        "length": 4.5 + n as f64,
        "begin": "2020-04-21T06:48:17Z",
        "end": "2020-04-21T07:01:42Z",
        "sensor": sensor(n)
    })
}

/// Track id in the service's format
pub fn track_id(n: usize) -> String {
    format!("5e9eb5c0e2a4b6{n:010}")
}

/// Listing page (`GET tracks`) with one summary per id
pub fn listing_page(ids: &[String]) -> String {
    let tracks: Vec<Value> = ids
        .iter()
        .enumerate()
        .map(|(n, id)| track_summary(id, n))
        .collect();
    json!({ "tracks": tracks }).to_string()
}

/// Listing page with `count` generated tracks
pub fn generated_listing(count: usize) -> String {
    listing_page(&(0..count).map(track_id).collect::<Vec<_>>())
}

/// Track document (`GET tracks/{id}`) with `points` measurements
pub fn track_document(id: &str, points: usize) -> String {
    let features: Vec<Value> = (0..points)
        .map(|i| {
            let step = i as f64;
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "Point",
                    "coordinates": [7.6123 + step * 0.0004, 51.9567 + step * 0.0002]
                },
                "properties": {
                    "id": format!("{id}-{i}"),
                    "time": format!("2020-04-21T06:48:{:02}Z", (17 + i * 5) % 60),
                    "phenomenons": {
                        "Speed": { "value": 42.0 + step, "unit": "km/h" },
                        "GPS Speed": { "value": 41.5 + step, "unit": "km/h" },
                        "GPS Accuracy": { "value": 3.0, "unit": "%" },
                        "Rpm": { "value": 1850.0, "unit": "u/min" },
                        "Consumption": { "value": 5.75, "unit": "l/h" }
                    }
                }
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "properties": {
            "id": id,
            "name": "Münster",
            "length": 6.5,
            "begin": "2020-04-21T06:48:17Z",
            "end": "2020-04-21T07:01:42Z",
            "sensor": sensor(0)
        },
        "features": features
    })
    .to_string()
}

/// `Link` header announcing `last_page` as the final listing page
pub fn last_page_link(base: &str, path: &str, limit: usize, last_page: u32) -> String {
    format!(
        "<{base}/{path}?limit={limit}&page=2>; rel=\"next\";type=\"application/json\", \
         <{base}/{path}?limit={limit}&page={last_page}>; rel=\"last\";type=\"application/json\""
    )
}
