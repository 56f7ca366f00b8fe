use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::{
    entities::{Coordinates, PayloadNode, RouteCandidate, RouteDraft, SubmissionPayload},
    error::{
        distance_mismatch_error, leg_count_mismatch_error, missing_place_error, Error,
    },
};

// metres of disagreement tolerated between the legs and the reported total
const DISTANCE_TOLERANCE: f64 = 1.0;

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    utc(date.and_time(NaiveTime::default()))
}

fn utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&naive)
}

/// Builds the route document for a validated draft from the chosen directions
/// alternative. Nodes run origin, stops in list order, destination; each carries
/// the distance travelled so far and the start of its scheduled day.
#[tracing::instrument(skip_all, fields(waypoints = route.waypoints.len(), legs = candidate.legs.len()))]
pub fn build_submission_payload(
    route: &RouteDraft,
    candidate: &RouteCandidate,
) -> Result<SubmissionPayload, Error> {
    let origin = route
        .origin
        .as_ref()
        .ok_or_else(|| missing_place_error("origin"))?;
    let destination = route
        .destination
        .as_ref()
        .ok_or_else(|| missing_place_error("destination"))?;

    if candidate.legs.len() != route.waypoints.len() + 1 {
        tracing::warn!("directions do not match the current stops");
        return Err(leg_count_mismatch_error(
            candidate.legs.len(),
            route.waypoints.len(),
        ));
    }

    if candidate
        .legs
        .iter()
        .any(|leg| !leg.distance.is_finite() || leg.distance < 0.0)
    {
        return Err(distance_mismatch_error());
    }

    if (candidate.leg_distance_sum() - candidate.distance).abs() > DISTANCE_TOLERANCE {
        tracing::warn!(
            "leg distances add up to {} but the route reports {}",
            candidate.leg_distance_sum(),
            candidate.distance
        );
        return Err(distance_mismatch_error());
    }

    let mut stops: Vec<(String, Coordinates, NaiveDate)> =
        Vec::with_capacity(route.waypoints.len() + 2);

    stops.push((
        origin.name.clone(),
        origin.coordinates,
        route.window.departure_date,
    ));

    for waypoint in route.waypoints.iter() {
        let place = waypoint
            .place()
            .ok_or_else(|| missing_place_error(&waypoint.name))?;
        stops.push((place.name, place.coordinates, waypoint.scheduled_arrival));
    }

    stops.push((
        destination.name.clone(),
        destination.coordinates,
        route.window.end_date,
    ));

    let mut cumulative_distance = 0.0;
    let mut nodes = Vec::with_capacity(stops.len());

    for (i, (name, coordinates, date)) in stops.into_iter().enumerate() {
        if i > 0 {
            cumulative_distance += candidate.legs[i - 1].distance;
        }

        nodes.push(PayloadNode {
            name,
            coordinates: coordinates.into(),
            cumulative_distance,
            arrival_timestamp: start_of_day(date),
        });
    }

    Ok(SubmissionPayload {
        route_id: None,
        departure: utc(route.window.departure()),
        arrival: utc(route.window.arrival()),
        waypoints: nodes,
        path: candidate
            .path
            .points()
            .map(|point| [point.x(), point.y()])
            .collect(),
        distance: candidate.distance,
        duration: candidate.duration,
        seats_available: route.attributes.seats_available,
        price: route.attributes.price,
        max_pickup_distance: route.attributes.max_pickup_distance,
        is_negotiable: route.attributes.is_negotiable,
    })
}

#[cfg(test)]
pub(crate) fn candidate(leg_distances: &[f64]) -> RouteCandidate {
    use crate::entities::Leg;
    use geo_types::LineString;

    let legs: Vec<Leg> = leg_distances
        .iter()
        .map(|distance| Leg {
            distance: *distance,
            duration: distance / 20.0,
        })
        .collect();

    RouteCandidate {
        distance: leg_distances.iter().sum(),
        duration: legs.iter().map(|leg| leg.duration).sum(),
        legs,
        path: LineString::from(vec![(4.8, 45.7), (5.0, 46.3), (5.04, 47.3)]),
    }
}

#[cfg(test)]
fn draft_with_stops(days: &[u32]) -> RouteDraft {
    use crate::entities::{date, june_window, Place, Waypoint};

    let mut route = RouteDraft::new(june_window());
    route.origin = Some(Place::new("Lyon", Coordinates::new(4.8357, 45.764)));
    route.destination = Some(Place::new("Dijon", Coordinates::new(5.0415, 47.322)));
    route.waypoints = days
        .iter()
        .enumerate()
        .map(|(i, day)| {
            Waypoint::new(
                Place::new(format!("stop {}", i), Coordinates::new(4.9, 46.0)),
                date(2024, 6, *day),
            )
        })
        .collect();

    route
}

#[test]
fn cumulative_distances_sum_preceding_legs() {
    let route = draft_with_stops(&[2]);

    let payload = build_submission_payload(&route, &candidate(&[5000.0, 7000.0])).unwrap();

    assert_eq!(payload.cumulative_distances(), vec![0.0, 5000.0, 12000.0]);

    let names: Vec<&str> = payload.waypoints.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["Lyon", "stop 0", "Dijon"]);
}

#[test]
fn arrival_timestamps_are_start_of_day() {
    let route = draft_with_stops(&[2]);

    let payload = build_submission_payload(&route, &candidate(&[5000.0, 7000.0])).unwrap();

    let timestamps: Vec<String> = payload
        .waypoints
        .iter()
        .map(|node| node.arrival_timestamp.to_rfc3339())
        .collect();
    assert_eq!(
        timestamps,
        vec![
            "2024-06-01T00:00:00+00:00",
            "2024-06-02T00:00:00+00:00",
            "2024-06-03T00:00:00+00:00",
        ]
    );

    // route-level instants keep their time of day
    assert_eq!(payload.departure.to_rfc3339(), "2024-06-01T08:30:00+00:00");
    assert_eq!(payload.arrival.to_rfc3339(), "2024-06-03T18:00:00+00:00");
}

#[test]
fn cumulative_distance_increases_and_ends_at_total() {
    let route = draft_with_stops(&[1, 2, 2, 3]);
    let directions = candidate(&[1200.0, 800.5, 30.0, 4000.0, 15.25]);

    let payload = build_submission_payload(&route, &directions).unwrap();
    let distances = payload.cumulative_distances();

    for pair in distances.windows(2) {
        assert!(pair[0] < pair[1]);
    }
    assert_eq!(distances.last().copied(), Some(directions.distance));
    assert_eq!(payload.distance, directions.distance);
}

#[test]
fn leg_count_must_match_stops() {
    let route = draft_with_stops(&[2, 3]);

    let err = build_submission_payload(&route, &candidate(&[5000.0, 7000.0])).unwrap_err();

    assert_eq!(err, leg_count_mismatch_error(2, 2));
    assert!(err.is_payload());
}

#[test]
fn inconsistent_totals_are_rejected() {
    let route = draft_with_stops(&[2]);
    let mut directions = candidate(&[5000.0, 7000.0]);
    directions.distance = 20000.0;

    let err = build_submission_payload(&route, &directions).unwrap_err();
    assert_eq!(err, distance_mismatch_error());

    let directions = candidate(&[-5000.0, 7000.0]);
    assert!(build_submission_payload(&route, &directions).is_err());
}

#[test]
fn payload_serializes_in_camel_case() {
    let route = draft_with_stops(&[]);

    let payload = build_submission_payload(&route, &candidate(&[12000.0])).unwrap();
    let json = serde_json::to_value(&payload).unwrap();

    assert_eq!(json["seatsAvailable"], 1);
    assert_eq!(json["waypoints"][1]["cumulativeDistance"], 12000.0);
    assert_eq!(json["waypoints"][0]["coordinates"][0], 4.8357);
    assert!(json.get("routeId").is_none());
    assert_eq!(json["path"].as_array().map(|p| p.len()), Some(3));
}
